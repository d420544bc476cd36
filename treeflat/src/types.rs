/// How an expansion treats branches that are already open elsewhere in the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NestMode {
    /// Opening a branch collapses every other open branch at each ancestor level.
    Exclusive,
    /// Any number of branches may be open at any depth.
    #[default]
    Concurrent,
}

/// Layout information for one row of the flat sequence.
///
/// Renderers use this to draw indentation, connecting lines and toggle affordances without
/// walking the tree themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInfo {
    /// Depth from the synthetic root; top-level items are at level 0.
    pub level: usize,
    /// Ordinal within the parent's children.
    pub index_in_level: usize,
    /// Number of children of the parent.
    pub level_size: usize,
    pub is_expandable: bool,
    pub is_expanded: bool,
}

impl ItemInfo {
    pub fn is_first_in_level(&self) -> bool {
        self.index_in_level == 0
    }

    pub fn is_last_in_level(&self) -> bool {
        self.index_in_level + 1 == self.level_size
    }
}

/// One row of the flat sequence: the item plus its [`ItemInfo`].
#[derive(Debug, PartialEq, Eq)]
pub struct FlatEntry<'a, T> {
    pub item: &'a T,
    pub info: ItemInfo,
}

impl<T> Clone for FlatEntry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlatEntry<'_, T> {}

/// Outcome of a successful [`crate::TreeList::expand_path_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Revealed {
    /// The target is the logical item of the synthetic root and has no row of its own.
    Root,
    /// The target is visible at this flat position.
    Position(usize),
}

impl Revealed {
    pub fn position(self) -> Option<usize> {
        match self {
            Self::Root => None,
            Self::Position(p) => Some(p),
        }
    }
}

/// Addresses the node whose children [`crate::TreeList::add_item`] re-synchronizes.
#[derive(Debug, PartialEq, Eq)]
pub enum ParentLocator<'a, T> {
    /// The node at this flat position is the parent.
    Position(usize),
    /// The parent of the node at this flat position (the synthetic root for top-level rows).
    SiblingOf(usize),
    /// The node wrapping this item, revealed first if it is not visible yet.
    Item(&'a T),
    /// The synthetic root.
    Root,
}

impl<T> Clone for ParentLocator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ParentLocator<'_, T> {}
