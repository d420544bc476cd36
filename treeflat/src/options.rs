use alloc::sync::Arc;

use crate::tree_list::TreeList;
use crate::{DataSource, NestMode};

/// A callback fired once after every successful mutation of a [`TreeList`].
///
/// The flat sequence is already regenerated when the callback runs.
pub type OnChangeCallback<S> = Arc<dyn Fn(&TreeList<S>) + Send + Sync>;

/// Configuration for [`crate::TreeList`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
pub struct TreeListOptions<S: DataSource> {
    /// Materializes every expandable descendant whenever nodes are built.
    ///
    /// Consulted at build time only; switching it does not rebuild the current tree.
    pub always_expanded: bool,

    /// The nest mode `toggle` expands with.
    pub toggle_mode: NestMode,

    /// Optional callback fired when the flat sequence changes.
    pub on_change: Option<OnChangeCallback<S>>,
}

impl<S: DataSource> TreeListOptions<S> {
    pub fn new() -> Self {
        Self {
            always_expanded: false,
            toggle_mode: NestMode::Concurrent,
            on_change: None,
        }
    }

    pub fn with_always_expanded(mut self, always_expanded: bool) -> Self {
        self.always_expanded = always_expanded;
        self
    }

    pub fn with_toggle_mode(mut self, toggle_mode: NestMode) -> Self {
        self.toggle_mode = toggle_mode;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&TreeList<S>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl<S: DataSource> Default for TreeListOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DataSource> Clone for TreeListOptions<S> {
    fn clone(&self) -> Self {
        Self {
            always_expanded: self.always_expanded,
            toggle_mode: self.toggle_mode,
            on_change: self.on_change.clone(),
        }
    }
}

impl<S: DataSource> core::fmt::Debug for TreeListOptions<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeListOptions")
            .field("always_expanded", &self.always_expanded)
            .field("toggle_mode", &self.toggle_mode)
            .field("on_change", &self.on_change.as_ref().map(|_| ".."))
            .finish()
    }
}
