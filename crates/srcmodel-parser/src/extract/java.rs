// ---------------------------------------------------------------------------
// Java
// ---------------------------------------------------------------------------

use srcmodel_core::{Annotation, CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, child_of_kind, count_arguments, member_call_type, nested, new_symbol,
    parse_arguments, qualify, split_top_level, strip_type_arguments,
};

const SELF_KEYWORDS: &[&str] = &["this", "super"];

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    let module_doc = c.leading_doc_comments(
        root,
        is_javadoc,
        &[],
        &["package_declaration", "import_declaration", "module_declaration"],
    );
    c.out.module_docstring = module_doc
        .first()
        .and_then(|n| docstring::from_block_comment(c.text(*n)));

    walk(&mut c, root, &[]);
    c.collect_calls(root, call_site);

    c.out
}

fn is_javadoc(text: &str) -> bool {
    text.starts_with("/**") && text != "/**/"
}

fn walk(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "package_declaration" => {
                let mut pc = child.walk();
                let name = child
                    .named_children(&mut pc)
                    .find(|n| matches!(n.kind(), "identifier" | "scoped_identifier"));
                if let Some(name) = name {
                    c.out.namespace = c.text(name).to_string();
                }
            }
            "import_declaration" => import_declaration(c, child),
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => type_declaration(c, child, scope),
            "method_declaration"
            | "constructor_declaration"
            | "compact_constructor_declaration" => method_declaration(c, child, scope),
            "field_declaration" | "constant_declaration" => field_declaration(c, child, scope),
            "enum_constant" => enum_constant(c, child, scope),
            "module_declaration" => module_declaration(c, child),
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
        "interface_declaration" | "annotation_type_declaration" => SymbolKind::Interface,
        "enum_declaration" => SymbolKind::Enum,
        "record_declaration" => SymbolKind::Struct,
        _ => SymbolKind::Class,
    };
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(node, qualified.clone(), kind, signature(c, node, body));
    sym.docstring = javadoc(c, node);
    sym.annotations = annotations(c, node);
    c.push(node, sym);

    if let Some(superclass) = node.child_by_field_name("superclass") {
        let parent = c.text(superclass).trim().trim_start_matches("extends");
        c.push_inheritance(&qualified, parent);
    }
    let interfaces = node
        .child_by_field_name("interfaces")
        .or_else(|| child_of_kind(node, "extends_interfaces"));
    if let Some(interfaces) = interfaces {
        let text = c.text(interfaces).trim();
        let text = text
            .strip_prefix("implements")
            .or_else(|| text.strip_prefix("extends"))
            .unwrap_or(text);
        for parent in split_top_level(text, ',', true) {
            c.push_inheritance(&qualified, parent);
        }
    }

    let inner = nested(scope, name);
    if node.kind() == "record_declaration"
        && let Some(params) = node.child_by_field_name("parameters")
    {
        record_components(c, params, &inner);
    }
    if let Some(body) = body {
        walk(c, body, &inner);
    }
}

fn record_components(c: &mut Collector<'_>, params: Node<'_>, scope: &[String]) {
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        if param.kind() != "formal_parameter" {
            continue;
        }
        let Some(name) = param.child_by_field_name("name") else {
            continue;
        };
        let sym = new_symbol(
            param,
            qualify(scope, c.text(name)),
            SymbolKind::Field,
            c.header(param.start_byte(), param.end_byte()),
        );
        c.push(param, sym);
    }
}

fn method_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let kind = if node.kind() == "method_declaration" {
        SymbolKind::Method
    } else {
        SymbolKind::Constructor
    };
    let body = node.child_by_field_name("body");
    let name = c.text(name_node);

    let mut sym = new_symbol(node, qualify(scope, name), kind, signature(c, node, body));
    sym.docstring = javadoc(c, node);
    sym.annotations = annotations(c, node);
    c.push(node, sym);

    // local and anonymous classes
    if let Some(body) = body {
        walk(c, body, &nested(scope, name));
    }
}

fn field_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let signature = signature(c, node, None);
    let doc = javadoc(c, node);
    let annotations = annotations(c, node);
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        let Some(name) = declarator.child_by_field_name("name") else {
            continue;
        };
        let mut sym = new_symbol(
            node,
            qualify(scope, c.text(name)),
            SymbolKind::Field,
            signature.clone(),
        );
        sym.docstring = doc.clone();
        sym.annotations = annotations.clone();
        c.push(node, sym);
    }
}

fn enum_constant(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name);
    let mut sym = new_symbol(
        node,
        qualify(scope, name),
        SymbolKind::Field,
        name.to_string(),
    );
    sym.docstring = javadoc(c, node);
    sym.annotations = annotations(c, node);
    c.push(node, sym);
    if let Some(body) = node.child_by_field_name("body") {
        walk(c, body, &nested(scope, name));
    }
}

/// `module com.example.app { ... }` in module-info.java.
fn module_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };
    let body = node.child_by_field_name("body");
    let mut sym = new_symbol(
        node,
        c.text(name).to_string(),
        SymbolKind::Module,
        signature(c, node, body),
    );
    sym.docstring = javadoc(c, node);
    sym.annotations = annotations(c, node);
    c.push(node, sym);
}

/// Header text after any annotations, up to the body.
fn signature(c: &Collector<'_>, node: Node<'_>, body: Option<Node<'_>>) -> String {
    let mut start = node.start_byte();
    if let Some(modifiers) = child_of_kind(node, "modifiers") {
        let mut cursor = modifiers.walk();
        for m in modifiers.children(&mut cursor) {
            if matches!(m.kind(), "annotation" | "marker_annotation") {
                start = m.end_byte();
            }
        }
    }
    let end = body.map_or(node.end_byte(), |b| b.start_byte());
    c.header(start, end).trim_end_matches(';').trim_end().to_string()
}

fn javadoc(c: &Collector<'_>, node: Node<'_>) -> Option<String> {
    c.doc_comments_before(node, is_javadoc, &[])
        .last()
        .and_then(|n| docstring::from_block_comment(c.text(*n)))
}

fn annotations(c: &Collector<'_>, node: Node<'_>) -> Vec<Annotation> {
    let Some(modifiers) = child_of_kind(node, "modifiers") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = modifiers.walk();
    for m in modifiers.children(&mut cursor) {
        if !matches!(m.kind(), "annotation" | "marker_annotation") {
            continue;
        }
        let Some(name) = m.child_by_field_name("name") else {
            continue;
        };
        let mut annotation = Annotation::new(c.text(name));
        if let Some(args) = m.child_by_field_name("arguments") {
            annotation.arguments = parse_arguments(c.text(args), Some("value"));
        }
        out.push(annotation);
    }
    out
}

fn import_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let text = c.text(node).trim();
    let path = text
        .trim_start_matches("import")
        .trim_start()
        .trim_start_matches("static ")
        .trim_end_matches(';')
        .trim();
    let path: String = path.chars().filter(|ch| !ch.is_whitespace()).collect();

    let import = match path.rsplit_once('.') {
        Some((module, member)) => Import::member(module, member, None),
        None => Import::module(path, None),
    };
    c.out.imports.push(import);
}

/// Receivers that are plain names or field chains, not computed values.
fn is_static_path(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "this" | "super" | "type_identifier" => true,
        "field_access" => node
            .child_by_field_name("object")
            .is_some_and(is_static_path),
        "scoped_identifier" => true,
        _ => false,
    }
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    let args = count_arguments(node.child_by_field_name("arguments"));
    match node.kind() {
        "method_invocation" => {
            let name = c.text(node.child_by_field_name("name")?);
            let site = match node.child_by_field_name("object") {
                None => CallSite::new(name, CallType::Function, args),
                Some(object) if is_static_path(object) => {
                    let receiver = c.text(object);
                    CallSite::new(
                        format!("{receiver}.{name}"),
                        member_call_type(receiver, SELF_KEYWORDS),
                        args,
                    )
                }
                Some(_) => CallSite::dynamic(args),
            };
            Some(site)
        }
        "object_creation_expression" => {
            let ty = node.child_by_field_name("type")?;
            Some(CallSite::new(
                strip_type_arguments(c.text(ty)),
                CallType::Constructor,
                args,
            ))
        }
        "explicit_constructor_invocation" => {
            let target = node.child_by_field_name("constructor")?;
            Some(CallSite::new(c.text(target), CallType::Constructor, args))
        }
        _ => None,
    }
}
