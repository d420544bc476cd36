use alloc::vec::Vec;

use crate::DataSource;
use crate::node::{NodeId, Tree};

/// How far a build descends below the nodes it creates.
pub(crate) enum Plan<'p, T> {
    /// Create the nodes only (unless the list is in always-expanded mode).
    Lazy,
    /// Materialize every expandable descendant.
    Eager,
    /// Descend only into the child matching the first element, then continue with the rest.
    Path(&'p [T]),
}

impl<T> Clone for Plan<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Plan<'_, T> {}

/// Creates subtrees of nodes from data source items.
///
/// Every entry point either completes or releases everything it allocated before returning the
/// data source error, so the tree is never left half-built.
pub(crate) struct Builder<'s, S> {
    source: &'s S,
    always_expanded: bool,
}

impl<'s, S: DataSource> Builder<'s, S> {
    pub(crate) fn new(source: &'s S, always_expanded: bool) -> Self {
        Self {
            source,
            always_expanded,
        }
    }

    /// Fetches the children of `parent` from the source and installs them, replacing any
    /// previously materialized children.
    pub(crate) fn materialize(
        &self,
        tree: &mut Tree<S::Item>,
        parent: NodeId,
        plan: Plan<'_, S::Item>,
    ) -> Result<(), S::Error> {
        let item = tree.get(parent).and_then(|n| n.item.clone());
        let items = self.source.children_of(item.as_ref())?.unwrap_or_default();
        let children = self.build_nodes(tree, parent, items, plan)?;
        tree.set_children(parent, children);
        Ok(())
    }

    /// Creates one node per item under `parent` without attaching them to it.
    pub(crate) fn build_nodes(
        &self,
        tree: &mut Tree<S::Item>,
        parent: NodeId,
        items: Vec<S::Item>,
        plan: Plan<'_, S::Item>,
    ) -> Result<Vec<NodeId>, S::Error> {
        let mut built = Vec::with_capacity(items.len());
        for item in items {
            match self.build_node(tree, parent, item, plan) {
                Ok(id) => built.push(id),
                Err(err) => {
                    for id in built {
                        tree.free_subtree(id);
                    }
                    return Err(err);
                }
            }
        }
        Ok(built)
    }

    fn build_node(
        &self,
        tree: &mut Tree<S::Item>,
        parent: NodeId,
        item: S::Item,
        plan: Plan<'_, S::Item>,
    ) -> Result<NodeId, S::Error> {
        let expandable = self.source.is_expandable(&item)?;
        let descend = if expandable {
            self.descend(&item, plan)
        } else {
            None
        };

        let id = tree.alloc(item, parent, expandable);
        if let Some(next) = descend {
            if let Err(err) = self.materialize(tree, id, next) {
                tree.free_subtree(id);
                return Err(err);
            }
        }
        Ok(id)
    }

    fn descend<'p>(&self, item: &S::Item, plan: Plan<'p, S::Item>) -> Option<Plan<'p, S::Item>> {
        match plan {
            Plan::Eager => Some(Plan::Eager),
            Plan::Path([next, rest @ ..]) if next == item => Some(Plan::Path(rest)),
            _ if self.always_expanded => Some(Plan::Eager),
            _ => None,
        }
    }
}
