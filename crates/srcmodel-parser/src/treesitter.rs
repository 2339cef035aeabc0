//! Tree-sitter integration for multi-language AST parsing.

use srcmodel_core::ParseError;

/// Parse source text with `grammar` and return the tree-sitter tree.
///
/// A fresh `tree_sitter::Parser` is created per call so that callers on
/// different threads never share parser state.
pub fn parse_source(
    grammar: &tree_sitter::Language,
    language_name: &str,
    source: &str,
) -> Result<tree_sitter::Tree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| ParseError::GrammarUnavailable {
            language: language_name.to_string(),
            reason: e.to_string(),
        })?;
    parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| ParseError::Syntax(format!("{language_name} parser produced no tree")))
}

/// Visit every descendant of `root` in pre-order (source order) without
/// recursion, so tree depth never turns into stack depth. `visit` gets each
/// node with its depth below `root` (children of `root` are at depth 1) and
/// returns whether to descend into that node's children.
pub fn walk_preorder<'t>(
    root: tree_sitter::Node<'t>,
    mut visit: impl FnMut(tree_sitter::Node<'t>, usize) -> bool,
) {
    let mut cursor = root.walk();
    if !cursor.goto_first_child() {
        return;
    }
    let mut depth = 1;
    loop {
        if visit(cursor.node(), depth) && cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        while !cursor.goto_next_sibling() {
            if depth == 1 || !cursor.goto_parent() {
                return;
            }
            depth -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python(source: &str) -> tree_sitter::Tree {
        parse_source(&tree_sitter_python::LANGUAGE.into(), "python", source).unwrap()
    }

    #[test]
    fn test_walk_preorder_visits_in_source_order() {
        let tree = python("f(g(1))\n");
        let mut calls = Vec::new();
        walk_preorder(tree.root_node(), |node, depth| {
            if node.kind() == "call" {
                calls.push((node.start_byte(), depth));
            }
            true
        });
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, 0);
        assert_eq!(calls[1].0, 2);
        assert!(calls[1].1 > calls[0].1);
    }

    #[test]
    fn test_walk_preorder_can_skip_subtrees() {
        let tree = python("f(g(1))\nh()\n");
        let mut seen = Vec::new();
        walk_preorder(tree.root_node(), |node, _| {
            if node.kind() == "call" {
                seen.push(node.start_byte());
                return false;
            }
            true
        });
        assert_eq!(seen, vec![0, 8]);
    }

    #[test]
    fn test_walk_preorder_survives_deep_trees() {
        let source = format!("x = {}1\n", "-".repeat(20_000));
        let tree = python(&source);
        let mut deepest = 0;
        walk_preorder(tree.root_node(), |_, depth| {
            deepest = deepest.max(depth);
            true
        });
        assert!(deepest > 20_000);
    }
}
