use srcmodel_core::{CallType, Import, ParseResult, SymbolKind};
use srcmodel_parser::SourceParser;

fn parse(source: &str) -> ParseResult {
    SourceParser::default().parse_source("store.rs", source, "rust")
}

const STORE: &str = "\
//! Storage engine.

use std::collections::HashMap;
use std::io::{self, Write as W};
use serde::Serialize;

/// A key-value store.
#[derive(Debug, Clone)]
pub struct Store {
    /// Backing map.
    items: HashMap<String, u64>,
    pub name: String,
}

pub enum Mode {
    Fast,
    Safe { retries: u32 },
}

pub trait Backend: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<u64>;
    const VERSION: u32;
}

impl Store {
    /// Build an empty store.
    pub fn new(name: &str) -> Self {
        let items = HashMap::new();
        let name = String::from(name);
        Self::validate(&name);
        Store { items, name }
    }

    fn validate(name: &str) {
        helper(name);
        io::stdout().flush();
    }
}

impl Backend for Store {
    fn get(&self, key: &str) -> Option<u64> {
        self.items.get(key).copied()
    }

    const VERSION: u32 = 1;
}

pub type Result<T> = std::result::Result<T, Error>;

pub const LIMIT: usize = 10;

mod inner {
    pub fn helper() {}
}
";

#[test]
fn test_module_doc_and_use_trees() {
    let result = parse(STORE);
    assert!(result.is_ok());
    assert_eq!(result.module_docstring.as_deref(), Some("Storage engine."));
    assert_eq!(
        result.imports,
        vec![
            Import::member("std::collections", "HashMap", None),
            Import::module("std::io", None),
            Import::member("std::io", "Write", Some("W".into())),
            Import::member("serde", "Serialize", None),
        ]
    );
}

#[test]
fn test_struct_with_docs_and_attributes() {
    let result = parse(STORE);
    let store = result.symbol("Store").unwrap();
    assert_eq!(store.kind, SymbolKind::Struct);
    assert_eq!(store.signature, "pub struct Store");
    assert_eq!(store.docstring.as_deref(), Some("A key-value store."));
    assert_eq!(store.annotations.len(), 1);
    assert_eq!(store.annotations[0].name, "derive");
    assert_eq!(
        store.annotations[0].arguments.get("1").map(String::as_str),
        Some("Clone")
    );

    let items = result.symbol("Store.items").unwrap();
    assert_eq!(items.kind, SymbolKind::Field);
    assert_eq!(items.docstring.as_deref(), Some("Backing map."));
    assert_eq!(result.symbol("Store.name").unwrap().kind, SymbolKind::Field);
}

#[test]
fn test_enum_trait_and_items() {
    let result = parse(STORE);
    let kind = |name: &str| result.symbol(name).map(|s| s.kind);

    assert_eq!(kind("Mode"), Some(SymbolKind::Enum));
    assert_eq!(kind("Mode.Fast"), Some(SymbolKind::Field));
    assert_eq!(kind("Mode.Safe"), Some(SymbolKind::Field));

    assert_eq!(kind("Backend"), Some(SymbolKind::Trait));
    assert_eq!(kind("Backend.get"), Some(SymbolKind::Method));
    assert_eq!(kind("Backend.VERSION"), Some(SymbolKind::Field));
    assert_eq!(
        result.parents_of("Backend"),
        vec!["std::marker::Send", "std::marker::Sync"]
    );

    assert_eq!(kind("Result"), Some(SymbolKind::TypeAlias));
    assert_eq!(kind("LIMIT"), Some(SymbolKind::Module));
    assert_eq!(kind("inner"), Some(SymbolKind::Module));
    assert_eq!(kind("inner.helper"), Some(SymbolKind::Function));
}

#[test]
fn test_impl_blocks() {
    let result = parse(STORE);
    let new = result.symbol("Store.new").unwrap();
    assert_eq!(new.kind, SymbolKind::Method);
    assert_eq!(new.docstring.as_deref(), Some("Build an empty store."));
    assert_eq!(new.signature, "pub fn new(name: &str) -> Self");

    assert_eq!(result.symbol("Store.get").unwrap().kind, SymbolKind::Method);
    assert_eq!(result.symbol("Store.VERSION").unwrap().kind, SymbolKind::Field);
    assert_eq!(result.parents_of("Store"), vec!["Backend"]);
}

#[test]
fn test_calls() {
    let result = parse(STORE);
    let new: Vec<(Option<&str>, CallType, usize)> = result
        .calls_from("Store.new")
        .iter()
        .map(|c| (c.callee.as_deref(), c.call_type, c.arguments_count))
        .collect();
    assert_eq!(
        new,
        vec![
            (Some("std::collections::HashMap::new"), CallType::StaticMethod, 0),
            (Some("std::string::String::from"), CallType::StaticMethod, 1),
            (Some("Self::validate"), CallType::StaticMethod, 1),
            (Some("Store"), CallType::Constructor, 2),
        ]
    );

    let validate: Vec<(Option<&str>, CallType)> = result
        .calls_from("Store.validate")
        .iter()
        .map(|c| (c.callee.as_deref(), c.call_type))
        .collect();
    assert_eq!(
        validate,
        vec![
            (Some("helper"), CallType::Function),
            (None, CallType::Dynamic),
            (Some("std::io::stdout"), CallType::Function),
        ]
    );

    let get = result.calls_from("Store.get");
    assert_eq!(get[1].callee.as_deref(), Some("self.items.get"));
    assert_eq!(get[1].call_type, CallType::Method);
}

#[test]
fn test_prelude_constructors() {
    let source = "\
fn wrap(x: u32) -> Option<u32> {
    Some(x)
}
";
    let result = parse(source);
    let calls = result.calls_from("wrap");
    assert_eq!(calls[0].callee.as_deref(), Some("std::option::Option::Some"));
    assert_eq!(calls[0].call_type, CallType::Constructor);
}
