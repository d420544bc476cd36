use alloc::vec::Vec;

use crate::node::{NodeId, Tree};

/// One visible node plus its position in the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FlatRow {
    pub(crate) node: NodeId,
    pub(crate) level: usize,
    pub(crate) index_in_level: usize,
    pub(crate) level_size: usize,
}

/// Pre-order walk of the visible nodes below the root (the root itself is never emitted).
///
/// Collapsed nodes contribute only themselves. `out` is cleared first.
pub(crate) fn flatten<T>(tree: &Tree<T>, out: &mut Vec<FlatRow>) {
    out.clear();
    let mut stack = Vec::new();
    push_children(tree, tree.root(), 0, &mut stack);
    while let Some(row) = stack.pop() {
        out.push(row);
        push_children(tree, row.node, row.level + 1, &mut stack);
    }
}

fn push_children<T>(tree: &Tree<T>, id: NodeId, level: usize, stack: &mut Vec<FlatRow>) {
    let Some(children) = tree.children(id) else {
        return;
    };
    let level_size = children.len();
    for (index_in_level, &node) in children.iter().enumerate().rev() {
        stack.push(FlatRow {
            node,
            level,
            index_in_level,
            level_size,
        });
    }
}
