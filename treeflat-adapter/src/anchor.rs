use treeflat::{DataSource, ItemHandle, Revealed, TreeList};

/// An item remembered by identity so its row can be found again after the flat sequence changes.
///
/// Typical use cases:
/// - keeping the selection on the same item when rows are inserted or removed above it
/// - keeping the first visible row steady across a collapse/expand elsewhere
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemAnchor<T> {
    pub item: T,
    /// The flat position the item had when the anchor was captured.
    pub position: usize,
}

impl<T: ItemHandle> ItemAnchor<T> {
    /// Captures the item shown at `position`.
    ///
    /// Returns `None` if `position` is out of range.
    pub fn capture<S: DataSource<Item = T>>(list: &TreeList<S>, position: usize) -> Option<Self> {
        let item = list.item_at(position)?.clone();
        Some(Self { item, position })
    }

    /// The current position of the anchored item, if it is still visible.
    pub fn resolve<S: DataSource<Item = T>>(&self, list: &TreeList<S>) -> Option<usize> {
        list.position_of(&self.item)
    }

    /// How far the anchored row moved since capture (positive means down).
    ///
    /// Returns `None` if the item is no longer visible.
    pub fn displacement<S: DataSource<Item = T>>(&self, list: &TreeList<S>) -> Option<isize> {
        let now = self.resolve(list)?;
        Some(now as isize - self.position as isize)
    }

    /// Resolves the anchored item, expanding its ancestors first if it is hidden.
    ///
    /// Returns `None` if the item cannot be reached (or is the synthetic root's item).
    pub fn reveal<S: DataSource<Item = T>>(
        &self,
        list: &mut TreeList<S>,
    ) -> Result<Option<usize>, S::Error> {
        Ok(list.expand_path_to(&self.item)?.and_then(Revealed::position))
    }
}
