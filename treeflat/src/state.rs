use alloc::vec::Vec;

/// A serializable snapshot of which branches are open.
///
/// Holds the items of every expanded node in pre-order, so restoring it re-opens parents before
/// their children. Use it to keep open branches across [`crate::TreeList::reload`] or to persist
/// them between sessions.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpansionState<T> {
    pub expanded: Vec<T>,
}

impl<T> Default for ExpansionState<T> {
    fn default() -> Self {
        Self {
            expanded: Vec::new(),
        }
    }
}

impl<T> ExpansionState<T> {
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }
}
