// ---------------------------------------------------------------------------
// Go
// ---------------------------------------------------------------------------

use srcmodel_core::{CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, child_of_kind, count_arguments, new_symbol, strip_type_arguments,
    unquote,
};
use crate::resolve::go_package_name;

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    walk(&mut c, root);

    c.module_aliases = c
        .out
        .imports
        .iter()
        .filter_map(|imp| match imp.alias.as_deref() {
            Some("_" | ".") => None,
            Some(alias) => Some(alias.to_string()),
            None => Some(go_package_name(&imp.module).to_string()),
        })
        .collect();
    c.collect_calls(root, call_site);

    c.out
}

/// Doc comments are `//` runs; build constraints and compiler directives are
/// not documentation.
fn is_doc(text: &str) -> bool {
    !(text.starts_with("//go:") || text.starts_with("// +build") || text.starts_with("//nolint"))
}

fn walk(c: &mut Collector<'_>, root: Node<'_>) {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "package_clause" => {
                if let Some(name) = child_of_kind(child, "package_identifier") {
                    c.out.namespace = c.text(name).to_string();
                }
                c.out.module_docstring = go_doc(c, child);
            }
            "import_declaration" => import_declaration(c, child),
            "function_declaration" => function_declaration(c, child),
            "method_declaration" => method_declaration(c, child),
            "type_declaration" => type_declaration(c, child),
            "const_declaration" | "var_declaration" => value_declaration(c, child, child),
            _ => {}
        }
    }
}

fn go_doc(c: &Collector<'_>, node: Node<'_>) -> Option<String> {
    let comments = c.doc_comments_before(node, is_doc, &[]);
    match comments.as_slice() {
        [] => None,
        [only] if c.text(*only).starts_with("/*") => docstring::from_block_comment(c.text(*only)),
        many => {
            let lines: Vec<&str> = many.iter().map(|n| c.text(*n)).collect();
            docstring::from_line_comments(&lines)
        }
    }
}

fn import_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => import_spec(c, child),
            "import_spec_list" => {
                let mut lc = child.walk();
                for spec in child.named_children(&mut lc) {
                    if spec.kind() == "import_spec" {
                        import_spec(c, spec);
                    }
                }
            }
            _ => {}
        }
    }
}

fn import_spec(c: &mut Collector<'_>, spec: Node<'_>) {
    let Some(path) = spec.child_by_field_name("path") else {
        return;
    };
    let alias = spec
        .child_by_field_name("name")
        .map(|n| c.text(n).to_string());
    let import = Import::module(unquote(c.text(path)), alias);
    c.out.imports.push(import);
}

fn function_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let mut sym = new_symbol(
        node,
        c.text(name).to_string(),
        SymbolKind::Function,
        signature(c, node),
    );
    sym.docstring = go_doc(c, node);
    c.push(node, sym);
}

/// Methods are named `Receiver.Method`, with pointer and type parameters
/// dropped from the receiver type.
fn method_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|r| {
            let mut cursor = r.walk();
            r.named_children(&mut cursor)
                .find(|p| p.kind() == "parameter_declaration")
        })
        .and_then(|p| p.child_by_field_name("type"))
        .map(|t| receiver_type(c.text(t)));
    let qualified = match receiver {
        Some(recv) if !recv.is_empty() => format!("{recv}.{}", c.text(name)),
        _ => c.text(name).to_string(),
    };

    let mut sym = new_symbol(node, qualified, SymbolKind::Method, signature(c, node));
    sym.docstring = go_doc(c, node);
    c.push(node, sym);
}

fn receiver_type(text: &str) -> String {
    strip_type_arguments(text.trim().trim_start_matches('*'))
}

fn signature(c: &Collector<'_>, node: Node<'_>) -> String {
    let end = node
        .child_by_field_name("body")
        .map_or(node.end_byte(), |b| b.start_byte());
    c.header(node.start_byte(), end)
}

fn type_declaration(c: &mut Collector<'_>, decl: Node<'_>) {
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };
        let name = c.text(name);
        let kind = match (spec.kind(), ty.kind()) {
            ("type_spec", "struct_type") => SymbolKind::Struct,
            ("type_spec", "interface_type") => SymbolKind::Interface,
            _ => SymbolKind::TypeAlias,
        };

        let header = c.header(spec.start_byte(), spec.end_byte());
        let header = if matches!(kind, SymbolKind::Struct | SymbolKind::Interface) {
            header.split('{').next().unwrap_or_default().trim_end().to_string()
        } else {
            header
        };
        let span = if decl.named_child_count() == 1 { decl } else { spec };
        let mut sym = new_symbol(span, name.to_string(), kind, format!("type {header}"));
        sym.docstring = go_doc(c, spec).or_else(|| go_doc(c, decl));
        c.push(span, sym);

        match ty.kind() {
            "struct_type" => struct_fields(c, ty, name),
            "interface_type" => interface_elements(c, ty, name),
            _ => {}
        }
    }
}

fn struct_fields(c: &mut Collector<'_>, ty: Node<'_>, owner: &str) {
    let Some(list) = child_of_kind(ty, "field_declaration_list") else {
        return;
    };
    let mut cursor = list.walk();
    for field in list.named_children(&mut cursor) {
        if field.kind() != "field_declaration" {
            continue;
        }
        let mut nc = field.walk();
        let names: Vec<Node<'_>> = field.children_by_field_name("name", &mut nc).collect();
        if names.is_empty() {
            // embedded type
            if let Some(embedded) = field.child_by_field_name("type") {
                let parent = c.text(embedded).trim_start_matches('*');
                c.push_inheritance(owner, parent);
            }
            continue;
        }
        let end = field
            .child_by_field_name("tag")
            .map_or(field.end_byte(), |t| t.start_byte());
        let header = c.header(field.start_byte(), end);
        let doc = go_doc(c, field);
        for name in names {
            let mut sym = new_symbol(
                field,
                format!("{owner}.{}", c.text(name)),
                SymbolKind::Field,
                header.clone(),
            );
            sym.docstring = doc.clone();
            c.push(field, sym);
        }
    }
}

fn interface_elements(c: &mut Collector<'_>, ty: Node<'_>, owner: &str) {
    let mut cursor = ty.walk();
    for elem in ty.named_children(&mut cursor) {
        match elem.kind() {
            "method_elem" | "method_spec" => {
                let Some(name) = elem.child_by_field_name("name") else {
                    continue;
                };
                let mut sym = new_symbol(
                    elem,
                    format!("{owner}.{}", c.text(name)),
                    SymbolKind::Method,
                    c.header(elem.start_byte(), elem.end_byte()),
                );
                sym.docstring = go_doc(c, elem);
                c.push(elem, sym);
            }
            "type_elem" | "interface_type_name" | "constraint_elem" => {
                let text = c.text(elem).trim();
                // union and approximation constraints are not embeddings
                if text.contains('|') || text.starts_with('~') {
                    continue;
                }
                c.push_inheritance(owner, text);
            }
            _ => {}
        }
    }
}

/// Package-level `const` and `var` names.
fn value_declaration(c: &mut Collector<'_>, decl: Node<'_>, node: Node<'_>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        match spec.kind() {
            "const_spec" | "var_spec" => {
                let end = spec
                    .child_by_field_name("value")
                    .map_or(spec.end_byte(), |v| v.start_byte());
                let keyword = if decl.kind() == "const_declaration" {
                    "const"
                } else {
                    "var"
                };
                let header = c.header(spec.start_byte(), end);
                let header = header.trim_end_matches('=').trim_end();
                let doc = go_doc(c, spec).or_else(|| go_doc(c, decl));
                let span = if node == decl && decl.named_child_count() == 1 {
                    decl
                } else {
                    spec
                };
                let mut nc = spec.walk();
                let names: Vec<Node<'_>> = spec.children_by_field_name("name", &mut nc).collect();
                for name in names {
                    let name = c.text(name);
                    if name == "_" {
                        continue;
                    }
                    let mut sym = new_symbol(
                        span,
                        name.to_string(),
                        SymbolKind::Module,
                        format!("{keyword} {header}"),
                    );
                    sym.docstring = doc.clone();
                    c.push(span, sym);
                }
            }
            "var_spec_list" => value_declaration(c, decl, spec),
            _ => {}
        }
    }
}

fn is_static_path(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" => true,
        "selector_expression" => node
            .child_by_field_name("operand")
            .is_some_and(is_static_path),
        _ => false,
    }
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    let args = count_arguments(node.child_by_field_name("arguments"));
    let site = match function.kind() {
        "identifier" => CallSite::new(c.text(function), CallType::Function, args),
        "selector_expression" if is_static_path(function) => {
            let operand = function.child_by_field_name("operand")?;
            let call_type = if operand.kind() == "identifier"
                && c.module_aliases.contains(c.text(operand))
            {
                CallType::Function
            } else {
                CallType::Method
            };
            CallSite::new(c.text(function), call_type, args)
        }
        _ => CallSite::dynamic(args),
    };
    Some(site)
}
