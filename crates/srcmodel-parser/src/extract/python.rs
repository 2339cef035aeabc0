// ---------------------------------------------------------------------------
// Python
// ---------------------------------------------------------------------------

use srcmodel_core::{Annotation, CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, Container, count_arguments, member_call_type, nested, new_symbol,
    parse_arguments, qualify, receiver_head,
};

const SELF_KEYWORDS: &[&str] = &["self", "cls", "super"];

const PROPERTY_DECORATORS: &[&str] = &[
    "property",
    "cached_property",
    "functools.cached_property",
    "abc.abstractproperty",
    "abstractproperty",
];

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    c.out.module_docstring = body_docstring(&c, root);
    walk(&mut c, root, &[], Container::Module);

    c.module_aliases = c
        .out
        .imports
        .iter()
        .filter(|imp| imp.names.is_empty())
        .map(|imp| match &imp.alias {
            Some(alias) => alias.clone(),
            None => receiver_head(&imp.module).to_string(),
        })
        .collect();
    c.collect_calls(root, call_site);

    c.out
}

fn walk(c: &mut Collector<'_>, node: Node<'_>, scope: &[String], container: Container) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "import_statement" => import_statement(c, child),
            "import_from_statement" | "future_import_statement" => from_import(c, child),
            "class_definition" => class_definition(c, child, child, scope, Vec::new()),
            "function_definition" => {
                function_definition(c, child, child, scope, container, Vec::new());
            }
            "decorated_definition" => {
                let decorators = decorators(c, child);
                if let Some(def) = child.child_by_field_name("definition") {
                    match def.kind() {
                        "class_definition" => class_definition(c, child, def, scope, decorators),
                        "function_definition" => {
                            function_definition(c, child, def, scope, container, decorators);
                        }
                        _ => {}
                    }
                }
            }
            "expression_statement" if container != Container::Routine => {
                assignment(c, child, scope, container);
            }
            "type_alias_statement" if container != Container::Routine => {
                type_alias(c, child, scope);
            }
            _ => walk(c, child, scope, container),
        }
    }
}

fn class_definition(
    c: &mut Collector<'_>,
    span: Node<'_>,
    def: Node<'_>,
    scope: &[String],
    annotations: Vec<Annotation>,
) {
    let Some(name_node) = def.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let qualified = qualify(scope, name);
    let body = def.child_by_field_name("body");

    let end = body.map_or(def.end_byte(), |b| b.start_byte());
    let signature = c.header(def.start_byte(), end);
    let mut sym = new_symbol(
        span,
        qualified.clone(),
        SymbolKind::Class,
        signature.trim_end_matches(':').trim_end().to_string(),
    );
    sym.docstring = body.and_then(|b| body_docstring(c, b));
    sym.annotations = annotations;
    c.push(span, sym);

    if let Some(bases) = def.child_by_field_name("superclasses") {
        let mut cursor = bases.walk();
        for base in bases.named_children(&mut cursor) {
            // metaclass=..., *bases and **kwargs are not parents
            if matches!(
                base.kind(),
                "keyword_argument" | "list_splat" | "dictionary_splat" | "comment"
            ) {
                continue;
            }
            c.push_inheritance(&qualified, c.text(base));
        }
    }

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Type);
    }
}

fn function_definition(
    c: &mut Collector<'_>,
    span: Node<'_>,
    def: Node<'_>,
    scope: &[String],
    container: Container,
    annotations: Vec<Annotation>,
) {
    let Some(name_node) = def.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let kind = if container != Container::Type {
        SymbolKind::Function
    } else if name == "__init__" {
        SymbolKind::Constructor
    } else if annotations.iter().any(|a| is_property_decorator(&a.name)) {
        SymbolKind::Property
    } else {
        SymbolKind::Method
    };

    let body = def.child_by_field_name("body");
    let end = body.map_or(def.end_byte(), |b| b.start_byte());
    let signature = c.header(def.start_byte(), end);
    let mut sym = new_symbol(
        span,
        qualify(scope, name),
        kind,
        signature.trim_end_matches(':').trim_end().to_string(),
    );
    sym.docstring = body.and_then(|b| body_docstring(c, b));
    sym.annotations = annotations;
    c.push(span, sym);

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Routine);
    }
}

fn is_property_decorator(name: &str) -> bool {
    PROPERTY_DECORATORS.contains(&name)
        || name.ends_with(".setter")
        || name.ends_with(".getter")
        || name.ends_with(".deleter")
}

/// Module-level variables and class attributes bound to a plain name.
fn assignment(c: &mut Collector<'_>, stmt: Node<'_>, scope: &[String], container: Container) {
    let Some(assign) = stmt.named_child(0).filter(|n| n.kind() == "assignment") else {
        return;
    };
    let Some(left) = assign
        .child_by_field_name("left")
        .filter(|l| l.kind() == "identifier")
    else {
        return;
    };
    let annotation = assign.child_by_field_name("type").map(|t| c.text(t));
    let kind = if annotation.is_some_and(|t| t == "TypeAlias" || t.ends_with(".TypeAlias")) {
        SymbolKind::TypeAlias
    } else if container == Container::Type {
        SymbolKind::Field
    } else {
        SymbolKind::Module
    };
    let end = assign
        .child_by_field_name("right")
        .map_or(assign.end_byte(), |r| r.start_byte());
    let signature = c.header(assign.start_byte(), end);
    let sym = new_symbol(
        stmt,
        qualify(scope, c.text(left)),
        kind,
        signature.trim_end_matches('=').trim_end().to_string(),
    );
    c.push(stmt, sym);
}

/// `type Alias = ...` (PEP 695).
fn type_alias(c: &mut Collector<'_>, stmt: Node<'_>, scope: &[String]) {
    let Some(name) = stmt
        .child_by_field_name("left")
        .or_else(|| stmt.named_child(0))
    else {
        return;
    };
    let name = c.text(name);
    let name = name.split('[').next().unwrap_or(name).trim();
    let sym = new_symbol(
        stmt,
        qualify(scope, name),
        SymbolKind::TypeAlias,
        c.header(stmt.start_byte(), stmt.end_byte()),
    );
    c.push(stmt, sym);
}

fn decorators(c: &Collector<'_>, decorated: Node<'_>) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut cursor = decorated.walk();
    for child in decorated.children(&mut cursor) {
        if child.kind() != "decorator" {
            continue;
        }
        let Some(expr) = child.named_child(0) else {
            continue;
        };
        let annotation = if expr.kind() == "call" {
            let mut a = Annotation::new(
                expr.child_by_field_name("function")
                    .map(|f| c.text(f))
                    .unwrap_or_default(),
            );
            if let Some(args) = expr.child_by_field_name("arguments") {
                a.arguments = parse_arguments(c.text(args), None);
            }
            a
        } else {
            Annotation::new(c.text(expr))
        };
        annotations.push(annotation);
    }
    annotations
}

fn body_docstring(c: &Collector<'_>, body: Node<'_>) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0).filter(|n| n.kind() == "string")?;
    docstring::from_python_string(c.text(string))
}

fn import_statement(c: &mut Collector<'_>, node: Node<'_>) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        let import = match name.kind() {
            "aliased_import" => {
                let Some(module) = name.child_by_field_name("name") else {
                    continue;
                };
                let alias = name.child_by_field_name("alias").map(|a| c.text(a).to_string());
                Import::module(c.text(module), alias)
            }
            _ => Import::module(c.text(name), None),
        };
        c.out.imports.push(import);
    }
}

fn from_import(c: &mut Collector<'_>, node: Node<'_>) {
    let module = if node.kind() == "future_import_statement" {
        "__future__".to_string()
    } else {
        match node.child_by_field_name("module_name") {
            Some(m) => c.text(m).to_string(),
            None => return,
        }
    };

    let mut cursor = node.walk();
    if node
        .children(&mut cursor)
        .any(|ch| ch.kind() == "wildcard_import")
    {
        c.out.imports.push(Import::member(module.clone(), "*", None));
    }

    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        let import = match name.kind() {
            "aliased_import" => {
                let Some(member) = name.child_by_field_name("name") else {
                    continue;
                };
                let alias = name.child_by_field_name("alias").map(|a| c.text(a).to_string());
                Import::member(module.clone(), c.text(member), alias)
            }
            _ => Import::member(module.clone(), c.text(name), None),
        };
        c.out.imports.push(import);
    }
}

/// Dotted paths through names and attributes, plus `super()`.
fn is_static_path(c: &Collector<'_>, node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" => true,
        "attribute" => node
            .child_by_field_name("object")
            .is_some_and(|o| is_static_path(c, o)),
        "call" => c.text(node) == "super()",
        _ => false,
    }
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    if node.kind() != "call" {
        return None;
    }
    let func = node.child_by_field_name("function")?;
    let args = count_arguments(node.child_by_field_name("arguments"));
    let site = match func.kind() {
        "identifier" => {
            let name = c.text(func);
            let call_type = if name.starts_with(|ch: char| ch.is_uppercase()) {
                CallType::Constructor
            } else {
                CallType::Function
            };
            CallSite::new(name, call_type, args)
        }
        "attribute" if is_static_path(c, func) => {
            let receiver = func
                .child_by_field_name("object")
                .map(|o| c.text(o))
                .unwrap_or_default();
            let call_type = if c.module_aliases.contains(receiver_head(receiver)) {
                CallType::Function
            } else {
                member_call_type(receiver, SELF_KEYWORDS)
            };
            CallSite::new(c.text(func), call_type, args)
        }
        _ => CallSite::dynamic(args),
    };
    Some(site)
}
