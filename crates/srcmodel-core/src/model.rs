//! Normalized entity model shared by every language extractor.
//!
//! All entities are plain owned data: an extractor builds them fresh for each
//! parse, the resolver rewrites reference strings in place, and the finished
//! [`ParseResult`] is handed to the caller. Nothing here is shared between
//! parses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ParseError;

/// Placeholder caller name for invocations at file/module scope.
pub const MODULE_SCOPE: &str = "<module>";

/// The closed set of declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    /// Structs and records.
    Struct,
    /// Traits and mixin-like constructs (Rust traits, PHP traits).
    Trait,
    Function,
    Method,
    Constructor,
    Field,
    Property,
    TypeAlias,
    /// A module-level declaration: top-level constants and variables, and
    /// module/namespace blocks.
    Module,
}

impl SymbolKind {
    /// Kinds that introduce a new type scope for nested declarations.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Enum | Self::Struct | Self::Trait
        )
    }

    /// Functions, methods and constructors.
    pub fn is_routine(self) -> bool {
        matches!(self, Self::Function | Self::Method | Self::Constructor)
    }

    /// Kinds whose body can hold call sites, and so can appear as
    /// [`Call::caller`]: routines, plus properties with accessor bodies.
    pub fn is_caller(self) -> bool {
        self.is_routine() || self == Self::Property
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Trait => "trait",
            Self::Function => "function",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Property => "property",
            Self::TypeAlias => "type_alias",
            Self::Module => "module",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decorator/attribute-style metadata attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    /// Argument name (or positional index) to argument source text.
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }
}

/// One declared entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Dot-joined path through every enclosing declaration (`Outer.Inner.method`).
    pub name: String,
    pub kind: SymbolKind,
    /// Declaration header as written, whitespace runs collapsed.
    pub signature: String,
    #[serde(default)]
    pub docstring: Option<String>,
    /// 1-based, inclusive.
    pub line_start: usize,
    /// 1-based, inclusive.
    pub line_end: usize,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Symbol {
    /// The leaf identifier, without the enclosing declaration path.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The enclosing declaration path, if the symbol is nested.
    pub fn parent_path(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(parent, _)| parent)
    }
}

/// One name-binding statement, expanded to a single bound name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// The imported path/namespace as written.
    pub module: String,
    /// Imported members. Empty means the whole module/namespace is bound.
    #[serde(default)]
    pub names: Vec<String>,
    pub is_from: bool,
    #[serde(default)]
    pub alias: Option<String>,
}

impl Import {
    /// `import module` / `import module as alias`.
    pub fn module(module: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            module: module.into(),
            names: Vec::new(),
            is_from: false,
            alias,
        }
    }

    /// `from module import name` / `from module import name as alias`.
    pub fn member(module: impl Into<String>, name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            module: module.into(),
            names: vec![name.into()],
            is_from: true,
            alias,
        }
    }

    /// The local name this import introduces when one is given explicitly.
    pub fn bound_name(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .or_else(|| self.names.first().map(String::as_str))
    }
}

/// A directed `child → parent` type relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inheritance {
    pub child: String,
    pub parent: String,
}

/// Syntactic shape of an invocation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Function,
    Method,
    StaticMethod,
    Constructor,
    Dynamic,
}

impl CallType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::StaticMethod => "static_method",
            Self::Constructor => "constructor",
            Self::Dynamic => "dynamic",
        }
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One potential invocation site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Enclosing routine's name, or [`MODULE_SCOPE`].
    pub caller: String,
    /// `None` when the target cannot be determined statically.
    pub callee: Option<String>,
    /// 1-based.
    pub line_number: usize,
    pub call_type: CallType,
    pub arguments_count: usize,
}

/// The per-file output of the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub path: String,
    /// Canonical language id, empty when it could not be determined.
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub inheritances: Vec<Inheritance>,
    #[serde(default)]
    pub calls: Vec<Call>,
    #[serde(default)]
    pub module_docstring: Option<String>,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub file_lines: usize,
}

impl ParseResult {
    /// An empty successful result for `path`.
    pub fn new(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            ..Default::default()
        }
    }

    /// A failed result. Entity lists are always empty.
    pub fn failed(path: impl Into<String>, language: impl Into<String>, error: &ParseError) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Look up a symbol by its dotted name.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Parents recorded for `child`, in source order.
    pub fn parents_of(&self, child: &str) -> Vec<&str> {
        self.inheritances
            .iter()
            .filter(|i| i.child == child)
            .map(|i| i.parent.as_str())
            .collect()
    }

    /// Calls made from `caller`, in source order.
    pub fn calls_from(&self, caller: &str) -> Vec<&Call> {
        self.calls.iter().filter(|c| c.caller == caller).collect()
    }

    pub fn stats(&self) -> ParseStats {
        ParseStats {
            symbols: self.symbols.len(),
            imports: self.imports.len(),
            inheritances: self.inheritances.len(),
            calls: self.calls.len(),
            unresolved_calls: self.calls.iter().filter(|c| c.callee.is_none()).count(),
        }
    }
}

/// Entity counts for a [`ParseResult`], used for logging and CLI summaries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub symbols: usize,
    pub imports: usize,
    pub inheritances: usize,
    pub calls: usize,
    pub unresolved_calls: usize,
}

impl std::fmt::Display for ParseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} symbols, {} imports, {} inheritances, {} calls ({} dynamic)",
            self.symbols, self.imports, self.inheritances, self.calls, self.unresolved_calls
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SymbolKind::TypeAlias).unwrap();
        assert_eq!(json, "\"type_alias\"");
        let json = serde_json::to_string(&CallType::StaticMethod).unwrap();
        assert_eq!(json, "\"static_method\"");
    }

    #[test]
    fn test_caller_kinds() {
        assert!(SymbolKind::Method.is_caller());
        assert!(SymbolKind::Property.is_caller());
        assert!(!SymbolKind::Property.is_routine());
        assert!(!SymbolKind::Field.is_caller());
        assert!(!SymbolKind::Class.is_caller());
    }

    #[test]
    fn test_short_name_and_parent_path() {
        let sym = Symbol {
            name: "Outer.Inner.run".to_string(),
            kind: SymbolKind::Method,
            signature: "void run()".to_string(),
            docstring: None,
            line_start: 3,
            line_end: 5,
            annotations: Vec::new(),
        };
        assert_eq!(sym.short_name(), "run");
        assert_eq!(sym.parent_path(), Some("Outer.Inner"));
    }

    #[test]
    fn test_failed_result_has_empty_lists() {
        let err = ParseError::UnsupportedLanguage("cobol".to_string());
        let result = ParseResult::failed("a.cbl", "", &err);
        assert!(!result.is_ok());
        assert!(result.symbols.is_empty());
        assert!(result.imports.is_empty());
        assert!(result.inheritances.is_empty());
        assert!(result.calls.is_empty());
        assert!(result.error.as_deref().unwrap().contains("cobol"));
    }

    #[test]
    fn test_error_field_omitted_on_success() {
        let result = ParseResult::new("a.py", "python");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_bound_name_prefers_alias() {
        let imp = Import::member("os.path", "join", Some("pjoin".to_string()));
        assert_eq!(imp.bound_name(), Some("pjoin"));
        let imp = Import::member("os.path", "join", None);
        assert_eq!(imp.bound_name(), Some("join"));
        let imp = Import::module("numpy", None);
        assert_eq!(imp.bound_name(), None);
    }
}
