// ---------------------------------------------------------------------------
// Rust
// ---------------------------------------------------------------------------

use srcmodel_core::{Annotation, CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, Container, collapse_whitespace, count_arguments, nested, new_symbol,
    parse_arguments, qualify, split_top_level, strip_type_arguments,
};

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    c.out.module_docstring = inner_docs(&c, root);
    walk(&mut c, root, &[], Container::Module);
    c.collect_calls(root, call_site);

    c.out
}

fn is_outer_doc(text: &str) -> bool {
    (text.starts_with("///") && !text.starts_with("////"))
        || (text.starts_with("/**") && !text.starts_with("/**/"))
}

/// `//!` lines and `/*! */` blocks at the top of the file.
fn inner_docs(c: &Collector<'_>, root: Node<'_>) -> Option<String> {
    let mut lines = Vec::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "line_comment" if c.text(child).starts_with("//!") => lines.push(c.text(child)),
            "block_comment" if c.text(child).starts_with("/*!") => {
                if lines.is_empty() {
                    return docstring::from_block_comment(c.text(child));
                }
                break;
            }
            "line_comment" | "block_comment" | "inner_attribute_item" => {}
            _ => break,
        }
    }
    docstring::from_line_comments(&lines)
}

fn walk(c: &mut Collector<'_>, node: Node<'_>, scope: &[String], container: Container) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "use_declaration" => use_declaration(c, child),
            "extern_crate_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    let alias = child
                        .child_by_field_name("alias")
                        .map(|a| c.text(a).to_string());
                    let import = Import::module(c.text(name), alias);
                    c.out.imports.push(import);
                }
            }
            "function_item" | "function_signature_item" => {
                function_item(c, child, scope, container);
            }
            "struct_item" | "union_item" => struct_item(c, child, scope),
            "enum_item" => enum_item(c, child, scope),
            "trait_item" => trait_item(c, child, scope),
            "impl_item" => impl_item(c, child, scope),
            "mod_item" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let name = c.text(name);
                let body = child.child_by_field_name("body");
                let sym = item_symbol(c, child, qualify(scope, name), SymbolKind::Module, body);
                c.push(child, sym);
                if let Some(body) = body {
                    walk(c, body, &nested(scope, name), Container::Module);
                }
            }
            "const_item" | "static_item" if container != Container::Routine => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let kind = if container == Container::Type {
                    SymbolKind::Field
                } else {
                    SymbolKind::Module
                };
                let value = child.child_by_field_name("value");
                let mut sym = item_symbol(c, child, qualify(scope, c.text(name)), kind, value);
                sym.signature = sym.signature.trim_end_matches('=').trim_end().to_string();
                c.push(child, sym);
            }
            "type_item" | "associated_type" => {
                let Some(name) = child.child_by_field_name("name") else {
                    continue;
                };
                let sym = item_symbol(
                    c,
                    child,
                    qualify(scope, c.text(name)),
                    SymbolKind::TypeAlias,
                    None,
                );
                c.push(child, sym);
            }
            _ => walk(c, child, scope, container),
        }
    }
}

/// A symbol for an item whose header ends where `body` begins.
fn item_symbol(
    c: &Collector<'_>,
    node: Node<'_>,
    name: String,
    kind: SymbolKind,
    body: Option<Node<'_>>,
) -> srcmodel_core::Symbol {
    let end = body.map_or(node.end_byte(), |b| b.start_byte());
    let signature = c
        .header(node.start_byte(), end)
        .trim_end_matches(';')
        .trim_end()
        .to_string();
    let mut sym = new_symbol(node, name, kind, signature);
    sym.docstring = outer_docs(c, node);
    sym.annotations = attributes(c, node);
    sym
}

fn function_item(c: &mut Collector<'_>, node: Node<'_>, scope: &[String], container: Container) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name);
    let kind = if container == Container::Type {
        SymbolKind::Method
    } else {
        SymbolKind::Function
    };
    let body = node.child_by_field_name("body");
    let sym = item_symbol(c, node, qualify(scope, name), kind, body);
    c.push(node, sym);

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Routine);
    }
}

fn struct_item(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name);
    let body = node.child_by_field_name("body");
    let sym = item_symbol(c, node, qualify(scope, name), SymbolKind::Struct, body);
    c.push(node, sym);

    let Some(body) = body.filter(|b| b.kind() == "field_declaration_list") else {
        return;
    };
    let inner = nested(scope, name);
    let mut cursor = body.walk();
    for field in body.named_children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let Some(field_name) = field.child_by_field_name("name") else {
            continue;
        };
        let mut sym = new_symbol(
            field,
            qualify(&inner, c.text(field_name)),
            SymbolKind::Field,
            c.header(field.start_byte(), field.end_byte()),
        );
        sym.docstring = outer_docs(c, field);
        sym.annotations = attributes(c, field);
        c.push(field, sym);
    }
}

fn enum_item(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name);
    let body = node.child_by_field_name("body");
    let sym = item_symbol(c, node, qualify(scope, name), SymbolKind::Enum, body);
    c.push(node, sym);

    let Some(body) = body else {
        return;
    };
    let inner = nested(scope, name);
    let mut cursor = body.walk();
    for variant in body.named_children(&mut cursor) {
        if variant.kind() != "enum_variant" {
            continue;
        }
        let Some(variant_name) = variant.child_by_field_name("name") else {
            continue;
        };
        let mut sym = new_symbol(
            variant,
            qualify(&inner, c.text(variant_name)),
            SymbolKind::Field,
            c.header(variant.start_byte(), variant.end_byte()),
        );
        sym.docstring = outer_docs(c, variant);
        sym.annotations = attributes(c, variant);
        c.push(variant, sym);
    }
}

fn trait_item(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name);
    let qualified = qualify(scope, name);
    let body = node.child_by_field_name("body");
    let sym = item_symbol(c, node, qualified.clone(), SymbolKind::Trait, body);
    c.push(node, sym);

    if let Some(bounds) = node.child_by_field_name("bounds") {
        let text = c.text(bounds).trim().trim_start_matches(':');
        for bound in split_top_level(text, '+', true) {
            let bound = bound.trim();
            // lifetimes and `?Sized` are not supertraits
            if bound.starts_with('\'') || bound.starts_with('?') {
                continue;
            }
            c.push_inheritance(&qualified, bound);
        }
    }

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Type);
    }
}

/// `impl Type { .. }` and `impl Trait for Type { .. }`. Members are named
/// `Type.member`; a trait impl also yields a `Type → Trait` edge.
fn impl_item(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(ty) = node.child_by_field_name("type") else {
        return;
    };
    let ty = strip_type_arguments(c.text(ty).trim_start_matches('&'));
    let ty = collapse_whitespace(&ty);
    if ty.is_empty() {
        return;
    }
    let owner = if ty.contains("::") {
        ty.clone()
    } else {
        qualify(scope, &ty)
    };

    if let Some(t) = node.child_by_field_name("trait") {
        let parent = c.text(t).trim_start_matches('!');
        c.push_inheritance(&owner, parent);
    }

    if let Some(body) = node.child_by_field_name("body") {
        walk(c, body, &nested(scope, &ty), Container::Type);
    }
}

/// `///` and `/** */` comments above an item, stepping over attributes.
fn outer_docs(c: &Collector<'_>, node: Node<'_>) -> Option<String> {
    let comments = c.doc_comments_before(node, is_outer_doc, &["attribute_item"]);
    match comments.as_slice() {
        [] => None,
        [only] if c.text(*only).starts_with("/**") => docstring::from_block_comment(c.text(*only)),
        many => {
            let lines: Vec<&str> = many.iter().map(|n| c.text(*n)).collect();
            docstring::from_line_comments(&lines)
        }
    }
}

/// Outer `#[...]` attributes directly above an item, in source order.
/// `#[doc = ...]` is documentation, not metadata.
fn attributes(c: &Collector<'_>, node: Node<'_>) -> Vec<Annotation> {
    let mut out = Vec::new();
    let mut sibling = node.prev_sibling();
    while let Some(s) = sibling {
        match s.kind() {
            "attribute_item" => {
                if let Some(annotation) = parse_attribute(c.text(s)) {
                    out.push(annotation);
                }
            }
            "line_comment" | "block_comment" => {}
            _ => break,
        }
        sibling = s.prev_sibling();
    }
    out.reverse();
    out
}

fn parse_attribute(text: &str) -> Option<Annotation> {
    let inner = text
        .trim()
        .strip_prefix("#[")?
        .strip_suffix(']')?
        .trim();
    let split = inner.find(['(', '=']).unwrap_or(inner.len());
    let name = inner[..split].trim();
    if name.is_empty() || name == "doc" {
        return None;
    }
    let mut annotation = Annotation::new(name);
    let rest = inner[split..].trim();
    if let Some(value) = rest.strip_prefix('=') {
        annotation.arguments = parse_arguments(value, None);
    } else if !rest.is_empty() {
        annotation.arguments = parse_arguments(rest, None);
    }
    Some(annotation)
}

fn use_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let Some(argument) = node.child_by_field_name("argument") else {
        return;
    };
    let tree = collapse_whitespace(c.text(argument));
    expand_use_tree("", &tree, &mut c.out.imports);
}

fn join_path(prefix: &str, rest: &str) -> String {
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}::{rest}"),
    }
}

/// Expand one `use` tree into one import per bound name:
/// `a::{b, c::d as e, self, *}` → `a::b`, `a::c::d as e`, `a`, `a::*`.
fn expand_use_tree(prefix: &str, tree: &str, out: &mut Vec<Import>) {
    let tree = tree.trim().trim_start_matches("::").trim();
    if tree.is_empty() {
        return;
    }

    if tree.ends_with('}')
        && let Some(open) = tree.find('{')
    {
        let base = tree[..open].trim().trim_end_matches("::");
        let group = join_path(prefix, base);
        for part in split_top_level(&tree[open + 1..tree.len() - 1], ',', false) {
            expand_use_tree(&group, part, out);
        }
        return;
    }

    let (path, alias) = match tree.split_once(" as ") {
        Some((path, alias)) => (path.trim(), Some(alias.trim().to_string())),
        None => (tree, None),
    };
    if path == "self" {
        if !prefix.is_empty() {
            out.push(Import::module(prefix, alias));
        }
        return;
    }
    let full = join_path(prefix, path);
    match full.rsplit_once("::") {
        Some((module, name)) => out.push(Import::member(module, name, alias)),
        None => out.push(Import::module(full, alias)),
    }
}

fn is_static_path(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "self" => true,
        "field_expression" => node
            .child_by_field_name("value")
            .is_some_and(is_static_path),
        _ => false,
    }
}

fn starts_upper(text: &str) -> bool {
    text.starts_with(|ch: char| ch.is_uppercase())
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    match node.kind() {
        "call_expression" => {
            let mut function = node.child_by_field_name("function")?;
            if function.kind() == "generic_function" {
                function = function.child_by_field_name("function")?;
            }
            let args = count_arguments(node.child_by_field_name("arguments"));
            let site = match function.kind() {
                "identifier" => {
                    let name = c.text(function);
                    let call_type = if starts_upper(name) {
                        CallType::Constructor
                    } else {
                        CallType::Function
                    };
                    CallSite::new(name, call_type, args)
                }
                "scoped_identifier" => {
                    let name = function
                        .child_by_field_name("name")
                        .map(|n| c.text(n))
                        .unwrap_or_default();
                    let path = function
                        .child_by_field_name("path")
                        .map(|p| strip_type_arguments(c.text(p)))
                        .unwrap_or_default();
                    let last = path.rsplit("::").next().unwrap_or_default();
                    let call_type = if starts_upper(name) {
                        CallType::Constructor
                    } else if starts_upper(last) {
                        CallType::StaticMethod
                    } else {
                        CallType::Function
                    };
                    CallSite::new(strip_type_arguments(c.text(function)), call_type, args)
                }
                "field_expression" if is_static_path(function) => {
                    CallSite::new(c.text(function), CallType::Method, args)
                }
                _ => CallSite::dynamic(args),
            };
            Some(site)
        }
        "struct_expression" => {
            let name = node.child_by_field_name("name")?;
            let args = count_arguments(node.child_by_field_name("body"));
            Some(CallSite::new(
                strip_type_arguments(c.text(name)),
                CallType::Constructor,
                args,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(tree: &str) -> Vec<Import> {
        let mut out = Vec::new();
        expand_use_tree("", tree, &mut out);
        out
    }

    #[test]
    fn test_expand_simple_path() {
        assert_eq!(
            expand("std::collections::HashMap"),
            vec![Import::member("std::collections", "HashMap", None)]
        );
        assert_eq!(expand("serde"), vec![Import::module("serde", None)]);
    }

    #[test]
    fn test_expand_nested_group() {
        let imports = expand("std::{fmt::{self, Display}, io::Write as W, sync::*}");
        assert_eq!(
            imports,
            vec![
                Import::module("std::fmt", None),
                Import::member("std::fmt", "Display", None),
                Import::member("std::io", "Write", Some("W".into())),
                Import::member("std::sync", "*", None),
            ]
        );
    }

    #[test]
    fn test_expand_leading_colons_and_crate_paths() {
        assert_eq!(
            expand("::anyhow::Result"),
            vec![Import::member("anyhow", "Result", None)]
        );
        assert_eq!(
            expand("crate::model::{Symbol, SymbolKind}"),
            vec![
                Import::member("crate::model", "Symbol", None),
                Import::member("crate::model", "SymbolKind", None),
            ]
        );
    }

    #[test]
    fn test_parse_attribute() {
        let a = parse_attribute("#[derive(Debug, Clone)]").unwrap();
        assert_eq!(a.name, "derive");
        assert_eq!(a.arguments.get("0").map(String::as_str), Some("Debug"));
        assert_eq!(a.arguments.get("1").map(String::as_str), Some("Clone"));

        let a = parse_attribute(r#"#[serde(rename_all = "snake_case")]"#).unwrap();
        assert_eq!(
            a.arguments.get("rename_all").map(String::as_str),
            Some("snake_case")
        );

        assert!(parse_attribute(r#"#[doc = "hidden"]"#).is_none());
        assert_eq!(parse_attribute("#[test]").unwrap().arguments.len(), 0);
    }
}
