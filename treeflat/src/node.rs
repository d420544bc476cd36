use alloc::vec::Vec;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A stable handle to a node in a [`crate::TreeList`].
    ///
    /// Handles stay valid until the node is discarded by a collapse, a delete, a re-synchronization
    /// of its parent or a new root item list.
    pub struct NodeId;
}

/// A tree element wrapping one item plus its expansion state.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    /// `None` only for a synthetic root without a logical item.
    pub(crate) item: Option<T>,
    pub(crate) parent: Option<NodeId>,
    /// `None` means "not expanded", which is distinct from an empty materialized list.
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) expandable: bool,
}

impl<T> Node<T> {
    pub(crate) fn is_expanded(&self) -> bool {
        self.children.is_some()
    }
}

/// Arena that owns every node; parents are plain handles into the same arena.
#[derive(Clone, Debug)]
pub(crate) struct Tree<T> {
    nodes: SlotMap<NodeId, Node<T>>,
    root: NodeId,
}

impl<T> Tree<T> {
    pub(crate) fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            item: None,
            parent: None,
            children: None,
            expandable: true,
        });
        Self { nodes, root }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn root_node(&self) -> &Node<T> {
        &self.nodes[self.root]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn alloc(&mut self, item: T, parent: NodeId, expandable: bool) -> NodeId {
        self.nodes.insert(Node {
            item: Some(item),
            parent: Some(parent),
            children: None,
            expandable,
        })
    }

    pub(crate) fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id)?.children.as_deref()
    }

    pub(crate) fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_expanded)
    }

    /// Releases `id` and every node below it.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut pending = Vec::from([id]);
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children.into_iter().flatten());
            }
        }
    }

    /// Drops the materialized children of `id`, returning it to the "not expanded" state.
    ///
    /// Returns `false` if the node was not expanded.
    pub(crate) fn clear_children(&mut self, id: NodeId) -> bool {
        let Some(children) = self.nodes.get_mut(id).and_then(|n| n.children.take()) else {
            return false;
        };
        for child in children {
            self.free_subtree(child);
        }
        true
    }

    /// Replaces the children of `id`, releasing the previous ones.
    pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        self.clear_children(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.children = Some(children);
        }
    }

    /// Collapses every sibling branch along the path from `id` up to the root.
    ///
    /// Afterwards at most one child is expanded at every ancestor level of `id`.
    pub(crate) fn collapse_path_siblings(&mut self, id: NodeId) {
        let mut current = id;
        while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent) {
            let siblings: Vec<NodeId> = self
                .children(parent)
                .map(|c| c.iter().copied().filter(|&c| c != current).collect())
                .unwrap_or_default();
            for sibling in siblings {
                self.clear_children(sibling);
            }
            current = parent;
        }
    }

    /// Items of the expanded nodes below the root, in pre-order.
    pub(crate) fn expanded_items(&self) -> Vec<&T> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .children(self.root)
            .map(|c| c.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if let (Some(item), Some(children)) = (&node.item, &node.children) {
                out.push(item);
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }
}

/// A read-only view of one node.
#[derive(Debug)]
pub struct NodeRef<'a, T> {
    pub(crate) id: NodeId,
    pub(crate) node: &'a Node<T>,
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<'a, T> NodeRef<'a, T> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The wrapped item; `None` only for the synthetic root without a logical item.
    pub fn item(&self) -> Option<&'a T> {
        self.node.item.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// The materialized children, or `None` when the node is not expanded.
    pub fn children(&self) -> Option<&'a [NodeId]> {
        self.node.children.as_deref()
    }

    pub fn is_expandable(&self) -> bool {
        self.node.expandable
    }

    pub fn is_expanded(&self) -> bool {
        self.node.is_expanded()
    }
}
