// ---------------------------------------------------------------------------
// C#
// ---------------------------------------------------------------------------

use srcmodel_core::{Annotation, CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, child_of_kind, count_arguments, member_call_type, nested, new_symbol,
    parse_arguments, qualify, split_top_level, start_after_leading, strip_type_arguments,
};

const SELF_KEYWORDS: &[&str] = &["this", "base"];

const NAMESPACE_KINDS: &[&str] = &[
    "namespace_declaration",
    "file_scoped_namespace_declaration",
];

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    let mut header_kinds = vec!["using_directive", "extern_alias_directive"];
    header_kinds.extend_from_slice(NAMESPACE_KINDS);
    let module_doc = c.leading_doc_comments(root, is_xml_doc, &[], &header_kinds);
    if !module_doc.is_empty() {
        let lines: Vec<&str> = module_doc.iter().map(|n| c.text(*n)).collect();
        c.out.module_docstring = docstring::from_xml_doc(&lines);
    }

    walk(&mut c, root, &[]);
    c.collect_calls(root, call_site);

    c.out
}

fn is_xml_doc(text: &str) -> bool {
    text.starts_with("///") && !text.starts_with("////")
}

fn walk(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "using_directive" => using_directive(c, child),
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                if c.out.namespace.is_empty()
                    && let Some(name) = child.child_by_field_name("name")
                {
                    c.out.namespace = c.text(name).to_string();
                }
                walk(c, child, scope);
            }
            "class_declaration"
            | "struct_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "record_struct_declaration" => type_declaration(c, child, scope),
            "delegate_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    let qualified = qualify(scope, c.text(name));
                    let sym = member_symbol(c, child, qualified, SymbolKind::TypeAlias, None);
                    c.push(child, sym);
                }
            }
            "method_declaration" | "constructor_declaration" | "local_function_statement" => {
                method_declaration(c, child, scope);
            }
            "property_declaration" | "indexer_declaration" => property_declaration(c, child, scope),
            "field_declaration" | "event_field_declaration" => field_declaration(c, child, scope),
            "enum_member_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    let qualified = qualify(scope, c.text(name));
                    let sym = member_symbol(c, child, qualified, SymbolKind::Field, None);
                    c.push(child, sym);
                }
            }
            _ => walk(c, child, scope),
        }
    }
}

fn type_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let qualified = qualify(scope, name);
    let kind = match node.kind() {
        "interface_declaration" => SymbolKind::Interface,
        "enum_declaration" => SymbolKind::Enum,
        "struct_declaration" | "record_declaration" | "record_struct_declaration" => {
            SymbolKind::Struct
        }
        _ => SymbolKind::Class,
    };
    let body = node.child_by_field_name("body");
    let sym = member_symbol(c, node, qualified.clone(), kind, body);
    c.push(node, sym);

    if let Some(bases) = child_of_kind(node, "base_list") {
        let text = c.text(bases).trim().trim_start_matches(':');
        for base in split_top_level(text, ',', true) {
            // record primary-constructor arguments: `Base(X)`
            let base = base.split('(').next().unwrap_or_default();
            c.push_inheritance(&qualified, base);
        }
    }

    let inner = nested(scope, name);
    if let Some(params) = child_of_kind(node, "parameter_list") {
        // positional record parameters become properties
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != "parameter" {
                continue;
            }
            let Some(param_name) = param.child_by_field_name("name") else {
                continue;
            };
            let mut sym = new_symbol(
                param,
                qualify(&inner, c.text(param_name)),
                SymbolKind::Property,
                c.header(param.start_byte(), param.end_byte()),
            );
            sym.annotations = attributes(c, param);
            c.push(param, sym);
        }
    }
    if let Some(body) = body {
        walk(c, body, &inner);
    }
}

fn method_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let kind = match node.kind() {
        "constructor_declaration" => SymbolKind::Constructor,
        "local_function_statement" => SymbolKind::Function,
        _ => SymbolKind::Method,
    };
    let body = node
        .child_by_field_name("body")
        .or_else(|| child_of_kind(node, "arrow_expression_clause"));
    let end = node
        .child_by_field_name("initializer")
        .or_else(|| child_of_kind(node, "constructor_initializer"))
        .or(body);
    let sym = member_symbol(c, node, qualify(scope, name), kind, end);
    c.push(node, sym);

    // local functions
    if let Some(body) = body {
        walk(c, body, &nested(scope, name));
    }
}

fn property_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let name = match node.child_by_field_name("name") {
        Some(n) => c.text(n),
        None if node.kind() == "indexer_declaration" => "this[]",
        None => return,
    };
    let end = node
        .child_by_field_name("accessors")
        .or_else(|| child_of_kind(node, "accessor_list"))
        .or_else(|| child_of_kind(node, "arrow_expression_clause"));
    let sym = member_symbol(c, node, qualify(scope, name), SymbolKind::Property, end);
    c.push(node, sym);
}

fn field_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(declaration) = child_of_kind(node, "variable_declaration") else {
        return;
    };
    let type_end = declaration
        .child_by_field_name("type")
        .map(|t| t.end_byte());
    let mut cursor = declaration.walk();
    for declarator in declaration.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name) = declarator
            .child_by_field_name("name")
            .or_else(|| child_of_kind(declarator, "identifier"))
        else {
            continue;
        };
        let end = declarator
            .child_by_field_name("value")
            .or_else(|| child_of_kind(declarator, "equals_value_clause"));
        let qualified = qualify(scope, c.text(name));
        let mut sym = member_symbol(c, node, qualified, SymbolKind::Field, None);
        // `int a = 1, b;` keeps the shared type, not the first initializer
        let prefix = c.header(
            start_after_leading(node, &["attribute_list"]),
            type_end.unwrap_or(declarator.start_byte()),
        );
        let decl_end = end.map_or(declarator.end_byte(), |e| e.start_byte());
        let own = c.header(declarator.start_byte(), decl_end);
        sym.signature = format!("{prefix} {own}")
            .trim_end_matches('=')
            .trim_end()
            .to_string();
        c.push(node, sym);
    }
}

/// A member symbol with attributes, XML doc and a header ending at `end`.
fn member_symbol(
    c: &Collector<'_>,
    node: Node<'_>,
    name: String,
    kind: SymbolKind,
    end: Option<Node<'_>>,
) -> srcmodel_core::Symbol {
    let start = start_after_leading(node, &["attribute_list"]);
    let end = end.map_or(node.end_byte(), |e| e.start_byte());
    let signature = c
        .header(start, end)
        .trim_end_matches(';')
        .trim_end()
        .to_string();
    let mut sym = new_symbol(node, name, kind, signature);
    sym.docstring = xml_doc(c, node);
    sym.annotations = attributes(c, node);
    sym
}

fn xml_doc(c: &Collector<'_>, node: Node<'_>) -> Option<String> {
    let comments = c.doc_comments_before(node, is_xml_doc, &[]);
    if comments.is_empty() {
        return None;
    }
    let lines: Vec<&str> = comments.iter().map(|n| c.text(*n)).collect();
    docstring::from_xml_doc(&lines)
}

fn attributes(c: &Collector<'_>, node: Node<'_>) -> Vec<Annotation> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for list in node.children(&mut cursor) {
        if list.kind() != "attribute_list" {
            continue;
        }
        let mut lc = list.walk();
        for attribute in list.named_children(&mut lc) {
            if attribute.kind() != "attribute" {
                continue;
            }
            let Some(name) = attribute.child_by_field_name("name") else {
                continue;
            };
            let mut annotation = Annotation::new(c.text(name));
            if let Some(args) = child_of_kind(attribute, "attribute_argument_list") {
                annotation.arguments = parse_arguments(c.text(args), None);
            }
            out.push(annotation);
        }
    }
    out
}

/// `using X.Y;`, `using static X.Y;`, `using A = X.Y;`, `global using ...;`.
fn using_directive(c: &mut Collector<'_>, node: Node<'_>) {
    let text = c.text(node).trim();
    let text = text.strip_prefix("global").map_or(text, str::trim_start);
    let Some(rest) = text.strip_prefix("using") else {
        return;
    };
    let rest = rest.trim().trim_end_matches(';').trim();

    let import = if let Some(path) = rest.strip_prefix("static ") {
        Import::member(compact(path), "*", None)
    } else if let Some((alias, path)) = rest.split_once('=') {
        Import::module(compact(path), Some(compact(alias)))
    } else {
        Import::module(compact(rest), None)
    };
    c.out.imports.push(import);
}

fn compact(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn is_static_path(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "this" | "this_expression" | "base" | "base_expression"
        | "predefined_type" | "qualified_name" | "generic_name" => true,
        "member_access_expression" => node
            .child_by_field_name("expression")
            .is_some_and(is_static_path),
        _ => false,
    }
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    match node.kind() {
        "invocation_expression" => {
            let function = node.child_by_field_name("function")?;
            let args = count_arguments(node.child_by_field_name("arguments"));
            let site = match function.kind() {
                "identifier" | "generic_name" => CallSite::new(
                    strip_type_arguments(c.text(function)),
                    CallType::Function,
                    args,
                ),
                "member_access_expression" if is_static_path(function) => {
                    let receiver = function
                        .child_by_field_name("expression")
                        .map(|e| c.text(e))
                        .unwrap_or_default();
                    CallSite::new(
                        strip_type_arguments(c.text(function)),
                        member_call_type(receiver, SELF_KEYWORDS),
                        args,
                    )
                }
                _ => CallSite::dynamic(args),
            };
            Some(site)
        }
        "object_creation_expression" => {
            let ty = node.child_by_field_name("type")?;
            let args = count_arguments(node.child_by_field_name("arguments"));
            Some(CallSite::new(
                strip_type_arguments(c.text(ty)),
                CallType::Constructor,
                args,
            ))
        }
        "constructor_initializer" => {
            let text = c.text(node).trim_start_matches(':').trim_start();
            let target = if text.starts_with("base") { "base" } else { "this" };
            let args = count_arguments(child_of_kind(node, "argument_list"));
            Some(CallSite::new(target, CallType::Constructor, args))
        }
        _ => None,
    }
}
