//! Decide whether a syntax tree is usable as a whole.
//!
//! A tree fails when its root is an `ERROR` node, or when the bytes inside
//! outermost `ERROR` nodes plus one byte per `MISSING` node exceed the
//! language's error ratio of the source length. Anything less is a localized
//! error: the file succeeds and extractors skip the `ERROR` subtrees.
//! Trees nested deeper than [`MAX_NESTING`] also fail.

use srcmodel_core::ParseError;
use tree_sitter::Tree;

use crate::treesitter::walk_preorder;

/// Deepest syntax nesting the extractors accept. Their declaration walkers
/// recurse once per level.
pub const MAX_NESTING: usize = 512;

/// How much of a tree the parser could not make sense of.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Damage {
    /// Bytes covered by outermost `ERROR` nodes.
    pub error_bytes: usize,
    pub error_nodes: usize,
    pub missing_nodes: usize,
}

impl Damage {
    pub fn is_clean(&self) -> bool {
        self.error_nodes == 0 && self.missing_nodes == 0
    }

    fn weight(&self) -> usize {
        self.error_bytes + self.missing_nodes
    }
}

pub fn measure(tree: &Tree) -> Damage {
    let mut damage = Damage::default();
    let root = tree.root_node();
    if root.is_error() {
        damage.error_nodes = 1;
        damage.error_bytes = root.end_byte() - root.start_byte();
        return damage;
    }
    if !root.has_error() {
        return damage;
    }
    walk_preorder(root, |node, _| {
        if node.is_error() {
            damage.error_nodes += 1;
            damage.error_bytes += node.end_byte() - node.start_byte();
            return false;
        }
        if node.is_missing() {
            damage.missing_nodes += 1;
            return false;
        }
        node.has_error()
    });
    damage
}

/// Depth of the deepest node below the root, counting no further than
/// `limit + 1`.
pub fn nesting_depth(tree: &Tree, limit: usize) -> usize {
    let mut deepest = 0;
    walk_preorder(tree.root_node(), |_, depth| {
        deepest = deepest.max(depth);
        depth <= limit
    });
    deepest
}

/// Accept or reject `tree` under `max_error_ratio`.
pub fn assess(tree: &Tree, source: &str, max_error_ratio: f64) -> Result<Damage, ParseError> {
    if source.trim().is_empty() {
        return Ok(Damage::default());
    }
    let root = tree.root_node();
    if root.is_error() {
        return Err(ParseError::Syntax(
            "the file could not be parsed as a whole".to_string(),
        ));
    }

    if nesting_depth(tree, MAX_NESTING) > MAX_NESTING {
        return Err(ParseError::Syntax(format!(
            "nesting too deep (more than {MAX_NESTING} levels)"
        )));
    }

    let damage = measure(tree);
    let budget = max_error_ratio * source.len() as f64;
    if damage.weight() as f64 > budget {
        return Err(ParseError::Syntax(format!(
            "{} of {} bytes unparseable ({} error, {} missing nodes; limit {:.0}%)",
            damage.weight(),
            source.len(),
            damage.error_nodes,
            damage.missing_nodes,
            max_error_ratio * 100.0
        )));
    }
    Ok(damage)
}
