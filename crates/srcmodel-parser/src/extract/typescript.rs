// ---------------------------------------------------------------------------
// TypeScript / TSX / JavaScript
// ---------------------------------------------------------------------------

use srcmodel_core::{Annotation, CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, Container, child_of_kind, count_arguments, has_child_kind,
    member_call_type, nested, new_symbol, parse_arguments, qualify, split_top_level,
    start_after_leading, strip_type_arguments, unquote,
};

const SELF_KEYWORDS: &[&str] = &["this", "super"];

const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    let module_doc = c.leading_doc_comments(
        root,
        is_jsdoc,
        &["hash_bang_line"],
        &["import_statement"],
    );
    c.out.module_docstring = module_doc
        .first()
        .and_then(|n| docstring::from_block_comment(c.text(*n)));

    walk(&mut c, root, &[], Container::Module);
    c.collect_calls(root, call_site);

    c.out
}

fn is_jsdoc(text: &str) -> bool {
    text.starts_with("/**") && text != "/**/"
}

fn walk(c: &mut Collector<'_>, node: Node<'_>, scope: &[String], container: Container) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "import_statement" => import_statement(c, child),
            "export_statement" if child.child_by_field_name("source").is_some() => {
                re_export(c, child);
            }
            "class_declaration" | "abstract_class_declaration" => {
                class_declaration(c, child, scope);
            }
            "interface_declaration" => interface_declaration(c, child, scope),
            "enum_declaration" => enum_declaration(c, child, scope),
            "type_alias_declaration" => {
                if let Some(name) = child.child_by_field_name("name") {
                    let mut sym = new_symbol(
                        child,
                        qualify(scope, c.text(name)),
                        SymbolKind::TypeAlias,
                        signature(c, child, None),
                    );
                    sym.docstring = jsdoc(c, child);
                    c.push(child, sym);
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                function_declaration(c, child, scope);
            }
            "lexical_declaration" | "variable_declaration" => {
                variable_declaration(c, child, scope, container);
            }
            "internal_module" | "module" => namespace_declaration(c, child, scope),
            _ => walk(c, child, scope, container),
        }
    }
}

fn class_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let qualified = qualify(scope, name);
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(
        node,
        qualified.clone(),
        SymbolKind::Class,
        signature(c, node, body),
    );
    sym.docstring = jsdoc(c, node);
    sym.annotations = decorators(c, node);
    c.push(node, sym);

    if let Some(heritage) = child_of_kind(node, "class_heritage") {
        let mut cursor = heritage.walk();
        let clauses: Vec<Node<'_>> = heritage
            .children(&mut cursor)
            .filter(|n| matches!(n.kind(), "extends_clause" | "implements_clause"))
            .collect();
        if clauses.is_empty() {
            // JavaScript: `extends <expression>`
            let text = c.text(heritage);
            push_parents(c, &qualified, text);
        } else {
            for clause in clauses {
                let text = c.text(clause);
                push_parents(c, &qualified, text);
            }
        }
    }

    if let Some(body) = body {
        class_body(c, body, &nested(scope, name));
    }
}

/// `extends A<T>, B` / `implements C, D` clause text.
fn push_parents(c: &mut Collector<'_>, child: &str, clause: &str) {
    let clause = clause.trim();
    let list = clause
        .strip_prefix("extends")
        .or_else(|| clause.strip_prefix("implements"))
        .unwrap_or(clause);
    for parent in split_top_level(list, ',', true) {
        let parent = strip_type_arguments(parent);
        // mixin(Base) → mixin
        let parent = parent.split('(').next().unwrap_or_default();
        c.push_inheritance(child, parent);
    }
}

fn class_body(c: &mut Collector<'_>, body: Node<'_>, scope: &[String]) {
    let mut cursor = body.walk();
    for member in body.children(&mut cursor) {
        if member.is_error() {
            continue;
        }
        match member.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                method(c, member, scope);
            }
            "public_field_definition" | "field_definition" => field(c, member, scope),
            "class_static_block" => walk(c, member, scope, Container::Routine),
            _ => {}
        }
    }
}

fn method(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let kind = if name == "constructor" {
        SymbolKind::Constructor
    } else if has_child_kind(node, "get") || has_child_kind(node, "set") {
        SymbolKind::Property
    } else {
        SymbolKind::Method
    };
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(node, qualify(scope, name), kind, signature(c, node, body));
    sym.docstring = jsdoc(c, node);
    sym.annotations = decorators(c, node);
    c.push(node, sym);

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Routine);
    }
}

fn field(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node
        .child_by_field_name("name")
        .or_else(|| node.child_by_field_name("property"))
    else {
        return;
    };
    let name = c.text(name_node);
    let value = node.child_by_field_name("value");
    let function_value = value.filter(|v| FUNCTION_VALUES.contains(&v.kind()));
    let kind = if function_value.is_some() {
        SymbolKind::Method
    } else {
        SymbolKind::Field
    };
    let end = match function_value {
        Some(f) => f
            .child_by_field_name("body")
            .map_or(f.end_byte(), |b| b.start_byte()),
        None => value.map_or(node.end_byte(), |v| v.start_byte()),
    };
    let header = c.header(start_after_leading(node, &["decorator"]), end);

    let mut sym = new_symbol(
        node,
        qualify(scope, name),
        kind,
        header
            .trim_end_matches(';')
            .trim_end_matches('=')
            .trim_end()
            .to_string(),
    );
    sym.docstring = jsdoc(c, node);
    sym.annotations = decorators(c, node);
    c.push(node, sym);

    if let Some(f) = function_value {
        walk(c, f, &nested(scope, name), Container::Routine);
    }
}

fn interface_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let qualified = qualify(scope, name);
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(
        node,
        qualified.clone(),
        SymbolKind::Interface,
        signature(c, node, body),
    );
    sym.docstring = jsdoc(c, node);
    c.push(node, sym);

    if let Some(extends) = child_of_kind(node, "extends_type_clause") {
        let text = c.text(extends);
        push_parents(c, &qualified, text);
    }

    let Some(body) = body else {
        return;
    };
    let inner = nested(scope, name);
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let kind = match member.kind() {
            "property_signature" => SymbolKind::Property,
            "method_signature" => SymbolKind::Method,
            _ => continue,
        };
        let Some(member_name) = member.child_by_field_name("name") else {
            continue;
        };
        let mut sym = new_symbol(
            member,
            qualify(&inner, c.text(member_name)),
            kind,
            c.header(member.start_byte(), member.end_byte())
                .trim_end_matches([';', ','])
                .to_string(),
        );
        sym.docstring = jsdoc(c, member);
        c.push(member, sym);
    }
}

fn enum_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(
        node,
        qualify(scope, name),
        SymbolKind::Enum,
        signature(c, node, body),
    );
    sym.docstring = jsdoc(c, node);
    c.push(node, sym);

    let Some(body) = body else {
        return;
    };
    let inner = nested(scope, name);
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let member_name = match member.kind() {
            "enum_assignment" => match member.child_by_field_name("name") {
                Some(n) => c.text(n),
                None => continue,
            },
            "property_identifier" | "string" => c.text(member),
            _ => continue,
        };
        let member_name = unquote(member_name);
        let sym = new_symbol(
            member,
            qualify(&inner, &member_name),
            SymbolKind::Field,
            c.header(member.start_byte(), member.end_byte()),
        );
        c.push(member, sym);
    }
}

fn function_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(
        node,
        qualify(scope, name),
        SymbolKind::Function,
        signature(c, node, body),
    );
    sym.docstring = jsdoc(c, node);
    c.push(node, sym);

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Routine);
    }
}

/// `const`/`let`/`var` declarations: `require()` bindings become imports,
/// function values become functions, other top-level bindings become
/// module-level symbols.
fn variable_declaration(
    c: &mut Collector<'_>,
    node: Node<'_>,
    scope: &[String],
    container: Container,
) {
    let statement_start = declaration_start(node);
    let mut first = true;
    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let start = if first {
            statement_start
        } else {
            declarator.start_byte()
        };
        first = false;

        let Some(name_node) = declarator.child_by_field_name("name") else {
            continue;
        };
        let value = declarator.child_by_field_name("value");
        if let Some(module) = value.and_then(|v| require_source(c, v)) {
            require_binding(c, name_node, &module);
            continue;
        }
        if name_node.kind() != "identifier" {
            continue;
        }
        let name = c.text(name_node);

        match value.filter(|v| FUNCTION_VALUES.contains(&v.kind())) {
            Some(function) => {
                let end = function
                    .child_by_field_name("body")
                    .map_or(function.end_byte(), |b| b.start_byte());
                let mut sym = new_symbol(
                    node,
                    qualify(scope, name),
                    SymbolKind::Function,
                    c.header(start, end),
                );
                sym.docstring = jsdoc(c, node);
                c.push(node, sym);
                walk(c, function, &nested(scope, name), Container::Routine);
            }
            None if container != Container::Routine => {
                let end = value.map_or(declarator.end_byte(), |v| v.start_byte());
                let mut sym = new_symbol(
                    node,
                    qualify(scope, name),
                    SymbolKind::Module,
                    c.header(start, end)
                        .trim_end_matches(';')
                        .trim_end_matches('=')
                        .trim_end()
                        .to_string(),
                );
                sym.docstring = jsdoc(c, node);
                c.push(node, sym);
                if let Some(value) = value {
                    walk(c, value, scope, container);
                }
            }
            None => {
                if let Some(value) = value {
                    walk(c, value, scope, container);
                }
            }
        }
    }
}

/// `require("x")` → `"x"`.
fn require_source(c: &Collector<'_>, value: Node<'_>) -> Option<String> {
    if value.kind() != "call_expression" {
        return None;
    }
    let function = value.child_by_field_name("function")?;
    if c.text(function) != "require" {
        return None;
    }
    let args = value.child_by_field_name("arguments")?;
    let first = args.named_child(0)?;
    (first.kind() == "string").then(|| unquote(c.text(first)))
}

fn require_binding(c: &mut Collector<'_>, pattern: Node<'_>, module: &str) {
    match pattern.kind() {
        "identifier" => {
            let alias = c.text(pattern).to_string();
            c.out.imports.push(Import::module(module, Some(alias)));
        }
        "object_pattern" => {
            let mut cursor = pattern.walk();
            for prop in pattern.named_children(&mut cursor) {
                match prop.kind() {
                    "shorthand_property_identifier_pattern" => {
                        let import = Import::member(module, c.text(prop), None);
                        c.out.imports.push(import);
                    }
                    "pair_pattern" => {
                        let (Some(key), Some(value)) = (
                            prop.child_by_field_name("key"),
                            prop.child_by_field_name("value"),
                        ) else {
                            continue;
                        };
                        let import = Import::member(module, c.text(key), Some(c.text(value).to_string()));
                        c.out.imports.push(import);
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn namespace_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = unquote(c.text(name_node));
    let body = node.child_by_field_name("body");

    let mut sym = new_symbol(
        node,
        qualify(scope, &name),
        SymbolKind::Module,
        signature(c, node, body),
    );
    sym.docstring = jsdoc(c, node);
    c.push(node, sym);

    if let Some(body) = body {
        walk(c, body, &nested(scope, &name), Container::Module);
    }
}

/// Where a declaration's header begins: the `export` keyword when exported,
/// otherwise the first token after any decorators.
fn declaration_start(node: Node<'_>) -> usize {
    match node.parent().filter(|p| p.kind() == "export_statement") {
        Some(export) => start_after_leading(export, &["decorator"]),
        None => start_after_leading(node, &["decorator"]),
    }
}

fn signature(c: &Collector<'_>, node: Node<'_>, body: Option<Node<'_>>) -> String {
    let end = body.map_or(node.end_byte(), |b| b.start_byte());
    c.header(declaration_start(node), end)
        .trim_end_matches(';')
        .trim_end()
        .to_string()
}

/// The node whose preceding sibling holds the doc comment.
fn doc_anchor(node: Node<'_>) -> Node<'_> {
    node.parent()
        .filter(|p| p.kind() == "export_statement")
        .unwrap_or(node)
}

fn jsdoc(c: &Collector<'_>, node: Node<'_>) -> Option<String> {
    c.doc_comments_before(doc_anchor(node), is_jsdoc, &["decorator"])
        .last()
        .and_then(|n| docstring::from_block_comment(c.text(*n)))
}

fn decorators(c: &Collector<'_>, node: Node<'_>) -> Vec<Annotation> {
    // TypeScript keeps method decorators in the class body, ahead of the method
    let mut nodes = Vec::new();
    let mut sibling = node.prev_sibling();
    while let Some(s) = sibling.filter(|s| s.kind() == "decorator") {
        nodes.push(s);
        sibling = s.prev_sibling();
    }
    nodes.reverse();

    let export = node.parent().filter(|p| p.kind() == "export_statement");
    for holder in export.into_iter().chain(std::iter::once(node)) {
        let mut cursor = holder.walk();
        nodes.extend(
            holder
                .children(&mut cursor)
                .filter(|child| child.kind() == "decorator"),
        );
    }

    nodes
        .into_iter()
        .filter_map(|decorator| decorator.named_child(0))
        .map(|expr| {
            if expr.kind() != "call_expression" {
                return Annotation::new(c.text(expr));
            }
            let mut a = Annotation::new(
                expr.child_by_field_name("function")
                    .map(|f| c.text(f))
                    .unwrap_or_default(),
            );
            if let Some(args) = expr.child_by_field_name("arguments") {
                a.arguments = parse_arguments(c.text(args), None);
            }
            a
        })
        .collect()
}

fn import_statement(c: &mut Collector<'_>, node: Node<'_>) {
    if let Some(require) = child_of_kind(node, "import_require_clause") {
        // import fs = require("fs")
        let (Some(name), Some(source)) = (
            require.named_child(0).filter(|n| n.kind() == "identifier"),
            require.child_by_field_name("source"),
        ) else {
            return;
        };
        let import = Import::module(unquote(c.text(source)), Some(c.text(name).to_string()));
        c.out.imports.push(import);
        return;
    }

    let Some(source) = node.child_by_field_name("source") else {
        return;
    };
    let module = unquote(c.text(source));
    let Some(clause) = child_of_kind(node, "import_clause") else {
        // side-effect import
        c.out.imports.push(Import::module(module, None));
        return;
    };

    let mut cursor = clause.walk();
    for part in clause.named_children(&mut cursor) {
        match part.kind() {
            "identifier" => {
                let alias = c.text(part).to_string();
                c.out.imports.push(Import::module(module.clone(), Some(alias)));
            }
            "namespace_import" => {
                if let Some(alias) = child_of_kind(part, "identifier") {
                    let alias = c.text(alias).to_string();
                    c.out.imports.push(Import::module(module.clone(), Some(alias)));
                }
            }
            "named_imports" => {
                let mut sc = part.walk();
                for spec in part.named_children(&mut sc) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let alias = spec
                        .child_by_field_name("alias")
                        .map(|a| c.text(a).to_string());
                    let import = Import::member(module.clone(), unquote(c.text(name)), alias);
                    c.out.imports.push(import);
                }
            }
            _ => {}
        }
    }
}

/// `export { a, b as c } from "x"`, `export * from "x"`, `export * as ns from "x"`.
fn re_export(c: &mut Collector<'_>, node: Node<'_>) {
    let Some(source) = node.child_by_field_name("source") else {
        return;
    };
    let module = unquote(c.text(source));

    if let Some(clause) = child_of_kind(node, "export_clause") {
        let mut cursor = clause.walk();
        for spec in clause.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let alias = spec
                .child_by_field_name("alias")
                .map(|a| c.text(a).to_string());
            let import = Import::member(module.clone(), unquote(c.text(name)), alias);
            c.out.imports.push(import);
        }
    } else if let Some(ns) = child_of_kind(node, "namespace_export") {
        let alias = ns
            .named_child(0)
            .map(|n| unquote(c.text(n)));
        c.out.imports.push(Import::module(module, alias));
    } else {
        c.out.imports.push(Import::member(module, "*", None));
    }
}

fn is_static_path(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "this" | "super" => true,
        "member_expression" => node
            .child_by_field_name("object")
            .is_some_and(is_static_path),
        _ => false,
    }
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    let args = count_arguments(node.child_by_field_name("arguments"));
    match node.kind() {
        "call_expression" => {
            let function = node.child_by_field_name("function")?;
            let site = match function.kind() {
                "identifier" | "import" => {
                    CallSite::new(c.text(function), CallType::Function, args)
                }
                "super" => CallSite::new("super", CallType::Constructor, args),
                "member_expression" if is_static_path(function) => {
                    let receiver = function
                        .child_by_field_name("object")
                        .map(|o| c.text(o))
                        .unwrap_or_default();
                    CallSite::new(
                        c.text(function),
                        member_call_type(receiver, SELF_KEYWORDS),
                        args,
                    )
                }
                _ => CallSite::dynamic(args),
            };
            Some(site)
        }
        "new_expression" => {
            let constructor = node.child_by_field_name("constructor")?;
            let site = if is_static_path(constructor) {
                CallSite::new(
                    strip_type_arguments(c.text(constructor)),
                    CallType::Constructor,
                    args,
                )
            } else {
                CallSite::dynamic(args)
            };
            Some(site)
        }
        _ => None,
    }
}
