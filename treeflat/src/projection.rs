use slotmap::Key;

use crate::node::NodeId;
use crate::tree_list::TreeList;
use crate::{DataSource, FlatEntry, ItemInfo};

/// A read-only view over the current flat sequence, for the display surface.
///
/// Positions and identities are valid until the next successful mutation of the underlying
/// [`TreeList`].
pub struct Projection<'a, S: DataSource> {
    list: &'a TreeList<S>,
}

impl<S: DataSource> Clone for Projection<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: DataSource> Copy for Projection<'_, S> {}

impl<'a, S: DataSource> Projection<'a, S> {
    pub(crate) fn new(list: &'a TreeList<S>) -> Self {
        Self { list }
    }

    pub fn count(&self) -> usize {
        self.list.count()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn item_at(&self, position: usize) -> Option<&'a S::Item> {
        self.list.item_at(position)
    }

    pub fn info_at(&self, position: usize) -> Option<ItemInfo> {
        self.list.info_at(position)
    }

    pub fn entry_at(&self, position: usize) -> Option<FlatEntry<'a, S::Item>> {
        self.list.entry_at(position)
    }

    pub fn node_at(&self, position: usize) -> Option<NodeId> {
        self.list.node_at(position)
    }

    /// A stable numeric identity for the row at `position`.
    ///
    /// The same node keeps the same id across mutations that do not discard it.
    pub fn item_id(&self, position: usize) -> Option<u64> {
        self.node_at(position).map(|id| id.data().as_ffi())
    }

    pub fn iter(&self) -> impl Iterator<Item = FlatEntry<'a, S::Item>> + 'a {
        self.list.entries()
    }
}
