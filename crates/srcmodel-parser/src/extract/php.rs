// ---------------------------------------------------------------------------
// PHP
// ---------------------------------------------------------------------------

use srcmodel_core::{Annotation, CallType, Import, SymbolKind};
use tree_sitter::Node;

use super::Extraction;
use super::docstring;
use super::helpers::{
    CallSite, Collector, Container, child_of_kind, count_arguments, nested, new_symbol,
    parse_arguments, qualify, split_top_level, start_after_leading,
};

const SELF_KEYWORDS: &[&str] = &["$this", "self", "static", "parent"];

pub fn extract(tree: &tree_sitter::Tree, source: &str) -> Extraction {
    let mut c = Collector::new(source);
    let root = tree.root_node();

    let module_doc = c.leading_doc_comments(
        root,
        is_phpdoc,
        &["php_tag", "text"],
        &[
            "namespace_definition",
            "namespace_use_declaration",
            "declare_statement",
        ],
    );
    c.out.module_docstring = module_doc
        .first()
        .and_then(|n| docstring::from_block_comment(c.text(*n)));

    walk(&mut c, root, &[], Container::Module);
    c.collect_calls(root, call_site);

    c.out
}

fn is_phpdoc(text: &str) -> bool {
    text.starts_with("/**") && text != "/**/"
}

fn walk(c: &mut Collector<'_>, node: Node<'_>, scope: &[String], container: Container) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() {
            continue;
        }
        match child.kind() {
            "namespace_definition" => {
                if c.out.namespace.is_empty()
                    && let Some(name) = child.child_by_field_name("name")
                {
                    c.out.namespace = c.text(name).trim_start_matches('\\').to_string();
                }
                if let Some(body) = child.child_by_field_name("body") {
                    walk(c, body, scope, container);
                }
            }
            "namespace_use_declaration" => use_declaration(c, child),
            "class_declaration"
            | "interface_declaration"
            | "trait_declaration"
            | "enum_declaration" => type_declaration(c, child, scope),
            "function_definition" | "method_declaration" => {
                function_definition(c, child, scope, container);
            }
            "property_declaration" => property_declaration(c, child, scope),
            "const_declaration" => const_declaration(c, child, scope, container),
            "enum_case" => {
                if let Some(name) = child.child_by_field_name("name") {
                    let qualified = qualify(scope, c.text(name));
                    let sym = member_symbol(c, child, qualified, SymbolKind::Field, None);
                    c.push(child, sym);
                }
            }
            // `use SomeTrait;` inside a class body
            "use_declaration" if container == Container::Type => trait_use(c, child, scope),
            _ => walk(c, child, scope, container),
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
        "trait_declaration" => SymbolKind::Trait,
        "enum_declaration" => SymbolKind::Enum,
        _ => SymbolKind::Class,
    };
    let body = node
        .child_by_field_name("body")
        .or_else(|| child_of_kind(node, "declaration_list"))
        .or_else(|| child_of_kind(node, "enum_declaration_list"));
    let sym = member_symbol(c, node, qualified.clone(), kind, body);
    c.push(node, sym);

    for clause in ["base_clause", "class_interface_clause"] {
        if let Some(list) = child_of_kind(node, clause) {
            let text = c.text(list).trim();
            let text = text
                .strip_prefix("extends")
                .or_else(|| text.strip_prefix("implements"))
                .unwrap_or(text);
            for parent in split_top_level(text, ',', false) {
                c.push_inheritance(&qualified, parent.trim().trim_start_matches('\\'));
            }
        }
    }

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Type);
    }
}

fn trait_use(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let Some(owner) = (!scope.is_empty()).then(|| scope.join(".")) else {
        return;
    };
    let text = c.text(node).trim();
    let text = text.strip_prefix("use").unwrap_or(text);
    // drop an `{ A::x insteadof B; }` conflict-resolution block
    let text = text.split('{').next().unwrap_or_default();
    for name in split_top_level(text.trim_end_matches(';'), ',', false) {
        c.push_inheritance(&owner, name.trim().trim_start_matches('\\'));
    }
}

fn function_definition(
    c: &mut Collector<'_>,
    node: Node<'_>,
    scope: &[String],
    container: Container,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };
    let name = c.text(name_node);
    let kind = match (node.kind(), container) {
        ("method_declaration", _) if name.eq_ignore_ascii_case("__construct") => {
            SymbolKind::Constructor
        }
        ("method_declaration", _) | (_, Container::Type) => SymbolKind::Method,
        _ => SymbolKind::Function,
    };
    let body = node.child_by_field_name("body");
    let sym = member_symbol(c, node, qualify(scope, name), kind, body);
    c.push(node, sym);

    if let Some(body) = body {
        walk(c, body, &nested(scope, name), Container::Routine);
    }
}

fn property_declaration(c: &mut Collector<'_>, node: Node<'_>, scope: &[String]) {
    let mut cursor = node.walk();
    let elements: Vec<Node<'_>> = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "property_element")
        .collect();
    let Some(first) = elements.first() else {
        return;
    };
    let prefix = c.header(
        start_after_leading(node, &["attribute_list"]),
        first.start_byte(),
    );
    for element in elements {
        let Some(var) = element
            .child_by_field_name("name")
            .or_else(|| child_of_kind(element, "variable_name"))
        else {
            continue;
        };
        let name = c.text(var).trim_start_matches('$');
        let end = element
            .child_by_field_name("default_value")
            .map_or(element.end_byte(), |e| e.start_byte());
        let mut sym = member_symbol(c, node, qualify(scope, name), SymbolKind::Property, None);
        let own = c.header(element.start_byte(), end);
        sym.signature = format!("{prefix} {own}")
            .trim_end_matches('=')
            .trim_end()
            .to_string();
        c.push(node, sym);
    }
}

fn const_declaration(
    c: &mut Collector<'_>,
    node: Node<'_>,
    scope: &[String],
    container: Container,
) {
    let kind = if container == Container::Type {
        SymbolKind::Field
    } else {
        SymbolKind::Module
    };
    let mut cursor = node.walk();
    let elements: Vec<Node<'_>> = node
        .named_children(&mut cursor)
        .filter(|n| n.kind() == "const_element")
        .collect();
    for element in elements {
        let Some(name) = element
            .child_by_field_name("name")
            .or_else(|| child_of_kind(element, "name"))
        else {
            continue;
        };
        let qualified = qualify(scope, c.text(name));
        let sym = member_symbol(c, node, qualified, kind, None);
        c.push(node, sym);
    }
}

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
    sym.docstring = c
        .doc_comments_before(node, is_phpdoc, &[])
        .last()
        .and_then(|n| docstring::from_block_comment(c.text(*n)));
    sym.annotations = attributes(c, node);
    sym
}

/// `#[Route('/users', methods: ['GET'])]` attribute groups.
fn attributes(c: &Collector<'_>, node: Node<'_>) -> Vec<Annotation> {
    let Some(list) = child_of_kind(node, "attribute_list") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut stack = vec![list];
    while let Some(current) = stack.pop() {
        let mut cursor = current.walk();
        let children: Vec<Node<'_>> = current.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            if child.kind() != "attribute" {
                stack.push(child);
                continue;
            }
            let Some(name) = child.named_child(0) else {
                continue;
            };
            let mut annotation = Annotation::new(c.text(name).trim_start_matches('\\'));
            if let Some(args) = child
                .child_by_field_name("parameters")
                .or_else(|| child_of_kind(child, "arguments"))
            {
                annotation.arguments = parse_arguments(c.text(args), None);
            }
            out.push(annotation);
        }
    }
    out
}

/// `use A\B;`, `use A\B as C;`, `use A\{B, C as D};`, `use function A\f;`,
/// `use const A\X;`: one import per bound name.
fn use_declaration(c: &mut Collector<'_>, node: Node<'_>) {
    let text = c.text(node).trim();
    let Some(rest) = text.strip_prefix("use") else {
        return;
    };
    let rest = strip_use_kind(rest.trim().trim_end_matches(';').trim());

    let (prefix, items) = match (rest.find('{'), rest.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            rest[..open].trim().trim_end_matches('\\'),
            &rest[open + 1..close],
        ),
        _ => ("", rest),
    };
    for item in split_top_level(items, ',', false) {
        let item = strip_use_kind(item.trim());
        if item.is_empty() {
            continue;
        }
        let (path, alias) = match item.split_once(" as ") {
            Some((path, alias)) => (path.trim(), Some(alias.trim().to_string())),
            None => (item, None),
        };
        let full = if prefix.is_empty() {
            path.to_string()
        } else {
            format!("{prefix}\\{path}")
        };
        let full = full.trim_start_matches('\\');
        let import = match full.rsplit_once('\\') {
            Some((module, name)) => Import::member(module, name, alias),
            None => Import::module(full, alias),
        };
        c.out.imports.push(import);
    }
}

fn strip_use_kind(text: &str) -> &str {
    text.strip_prefix("function ")
        .or_else(|| text.strip_prefix("const "))
        .map_or(text, str::trim_start)
}

fn is_static_path(node: Node<'_>) -> bool {
    match node.kind() {
        "variable_name" | "name" | "qualified_name" => true,
        "member_access_expression" | "nullsafe_member_access_expression" => node
            .child_by_field_name("object")
            .is_some_and(is_static_path),
        _ => false,
    }
}

fn call_site(c: &Collector<'_>, node: Node<'_>) -> Option<CallSite> {
    let args = count_arguments(node.child_by_field_name("arguments"));
    let site = match node.kind() {
        "function_call_expression" => {
            let function = node.child_by_field_name("function")?;
            match function.kind() {
                "name" | "qualified_name" => CallSite::new(
                    c.text(function).trim_start_matches('\\'),
                    CallType::Function,
                    args,
                ),
                _ => CallSite::dynamic(args),
            }
        }
        "member_call_expression" | "nullsafe_member_call_expression" => {
            let object = node.child_by_field_name("object")?;
            let name = node.child_by_field_name("name")?;
            if name.kind() == "name" && is_static_path(object) {
                CallSite::new(
                    format!("{}->{}", c.text(object), c.text(name)),
                    CallType::Method,
                    args,
                )
            } else {
                CallSite::dynamic(args)
            }
        }
        "scoped_call_expression" => {
            let scope = node.child_by_field_name("scope")?;
            let name = node.child_by_field_name("name")?;
            let receiver = c.text(scope).trim_start_matches('\\');
            if name.kind() != "name" || scope.kind() == "variable_name" {
                CallSite::dynamic(args)
            } else {
                let call_type = if SELF_KEYWORDS.contains(&receiver) {
                    CallType::Method
                } else {
                    CallType::StaticMethod
                };
                CallSite::new(format!("{receiver}::{}", c.text(name)), call_type, args)
            }
        }
        "object_creation_expression" => {
            let mut cursor = node.walk();
            let class = node
                .named_children(&mut cursor)
                .find(|n| n.kind() != "attribute_list" && n.kind() != "arguments")?;
            let args = count_arguments(child_of_kind(node, "arguments"));
            match class.kind() {
                "name" | "qualified_name" => CallSite::new(
                    c.text(class).trim_start_matches('\\'),
                    CallType::Constructor,
                    args,
                ),
                // `new static` / `new self`
                "relative_scope" => CallSite::new(c.text(class), CallType::Constructor, args),
                _ => CallSite::dynamic(args),
            }
        }
        _ => return None,
    };
    Some(site)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_use_kind() {
        assert_eq!(strip_use_kind("function App\\helper"), "App\\helper");
        assert_eq!(strip_use_kind("const App\\VERSION"), "App\\VERSION");
        assert_eq!(strip_use_kind("App\\Models\\User"), "App\\Models\\User");
    }
}
