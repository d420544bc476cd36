use alloc::vec::Vec;

use treeflat::{
    DataSource, ExpansionState, NestMode, ParentLocator, Projection, Revealed, TreeList,
    TreeListOptions,
};

use crate::{Error, ItemAnchor, Renderer, Surface};

/// A framework-neutral controller that binds a `treeflat::TreeList` to a display surface.
///
/// At most one [`Surface`] is attached at a time. While attached:
/// - its policies (always-expanded, nest mode) drive the engine options
/// - every mutation that changes the flat sequence calls [`Surface::notify_changed`] exactly once
///
/// Mutations require an attached surface and fail with [`Error::NotAttached`] otherwise. Read-only
/// queries work at any time.
pub struct Controller<S: DataSource, V> {
    list: TreeList<S>,
    surface: Option<V>,
}

impl<S: DataSource, V: Surface> Controller<S, V> {
    pub fn new(source: S) -> Self {
        Self::from_list(TreeList::new(source))
    }

    pub fn with_options(source: S, options: TreeListOptions<S>) -> Self {
        Self::from_list(TreeList::with_options(source, options))
    }

    pub fn from_list(list: TreeList<S>) -> Self {
        Self {
            list,
            surface: None,
        }
    }

    pub fn list(&self) -> &TreeList<S> {
        &self.list
    }

    /// Direct access to the engine. Changes made through it do not notify the surface.
    pub fn list_mut(&mut self) -> &mut TreeList<S> {
        &mut self.list
    }

    pub fn into_list(self) -> TreeList<S> {
        self.list
    }

    pub fn source_mut(&mut self) -> &mut S {
        self.list.source_mut()
    }

    pub fn projection(&self) -> Projection<'_, S> {
        self.list.projection()
    }

    pub fn surface(&self) -> Option<&V> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut V> {
        self.surface.as_mut()
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    /// Attaches `surface`, applies its policies and asks it to draw the current rows.
    ///
    /// The always-expanded policy only affects nodes built from now on; call [`Self::reload`] to
    /// apply it to the current tree.
    pub fn attach(&mut self, mut surface: V) -> Result<(), Error<S::Error>> {
        if self.surface.is_some() {
            awarn!("attach: a surface is already attached");
            return Err(Error::AlreadyAttached);
        }
        let always_expanded = surface.always_expanded();
        let nest_mode = surface.nest_mode();
        adebug!(always_expanded, ?nest_mode, "Controller::attach");
        self.list.update_options(|o| {
            o.always_expanded = always_expanded;
            o.toggle_mode = nest_mode;
        });
        surface.notify_changed();
        self.surface = Some(surface);
        Ok(())
    }

    /// Detaches and returns the current surface.
    pub fn detach(&mut self) -> Result<V, Error<S::Error>> {
        self.surface.take().ok_or(Error::NotAttached)
    }

    fn nest_mode(&self) -> NestMode {
        self.list.options().toggle_mode
    }

    fn mutate<R>(
        &mut self,
        f: impl FnOnce(&mut TreeList<S>) -> Result<R, S::Error>,
    ) -> Result<R, Error<S::Error>> {
        let Some(surface) = self.surface.as_mut() else {
            awarn!("mutation without an attached surface");
            return Err(Error::NotAttached);
        };
        let before = self.list.revision();
        let out = f(&mut self.list);
        // A failing `f` may still have changed rows.
        if self.list.revision() != before {
            surface.notify_changed();
        }
        out.map_err(Error::Source)
    }

    /// Runs several engine calls as one mutation.
    ///
    /// The surface is notified at most once, and also when `f` fails after changing the rows.
    pub fn batch<R>(
        &mut self,
        f: impl FnOnce(&mut TreeList<S>) -> Result<R, S::Error>,
    ) -> Result<R, Error<S::Error>> {
        self.mutate(f)
    }

    pub fn set_items(&mut self, items: Vec<S::Item>) -> Result<(), Error<S::Error>> {
        self.mutate(|l| l.set_items(items))
    }

    pub fn set_items_with_path(
        &mut self,
        items: Vec<S::Item>,
        path: &[S::Item],
    ) -> Result<(), Error<S::Error>> {
        self.mutate(|l| l.set_items_with_path(items, path))
    }

    pub fn reload(&mut self) -> Result<(), Error<S::Error>> {
        self.mutate(TreeList::reload)
    }

    /// Expands the row at `position` with the surface's nest mode.
    pub fn expand(&mut self, position: usize) -> Result<bool, Error<S::Error>> {
        let mode = self.nest_mode();
        self.mutate(|l| l.expand(position, mode))
    }

    pub fn expand_subtree(&mut self, position: usize) -> Result<bool, Error<S::Error>> {
        let mode = self.nest_mode();
        self.mutate(|l| l.expand_subtree(position, mode))
    }

    pub fn collapse(&mut self, position: usize) -> Result<bool, Error<S::Error>> {
        self.mutate(|l| Ok(l.collapse(position)))
    }

    pub fn toggle(&mut self, position: usize) -> Result<bool, Error<S::Error>> {
        self.mutate(|l| l.toggle(position))
    }

    pub fn expand_path_to(&mut self, target: &S::Item) -> Result<Option<Revealed>, Error<S::Error>> {
        self.mutate(|l| l.expand_path_to(target))
    }

    pub fn swap_siblings(
        &mut self,
        position: usize,
        a: usize,
        b: usize,
    ) -> Result<bool, Error<S::Error>> {
        self.mutate(|l| Ok(l.swap_siblings(position, a, b)))
    }

    pub fn add_item(
        &mut self,
        locator: ParentLocator<'_, S::Item>,
    ) -> Result<bool, Error<S::Error>> {
        self.mutate(|l| l.add_item(locator))
    }

    pub fn delete_item(&mut self, position: usize) -> Result<bool, Error<S::Error>> {
        self.mutate(|l| Ok(l.delete_item(position)))
    }

    pub fn restore_expansion_state(
        &mut self,
        state: &ExpansionState<S::Item>,
    ) -> Result<bool, Error<S::Error>> {
        self.mutate(|l| l.restore_expansion_state(state))
    }

    /// Renders the row at `position`, or returns `None` if it is out of range.
    pub fn render_at<R: Renderer<S::Item>>(
        &self,
        position: usize,
        renderer: &R,
        previous: Option<R::Visual>,
    ) -> Option<R::Visual> {
        let entry = self.list.entry_at(position)?;
        Some(renderer.render(entry.item, previous, entry.info))
    }

    pub fn capture_anchor(&self, position: usize) -> Option<ItemAnchor<S::Item>> {
        ItemAnchor::capture(&self.list, position)
    }

    /// Finds the anchored item again, expanding its ancestors if needed.
    pub fn reveal_anchor(
        &mut self,
        anchor: &ItemAnchor<S::Item>,
    ) -> Result<Option<usize>, Error<S::Error>> {
        self.mutate(|l| anchor.reveal(l))
    }
}

impl<S: DataSource + core::fmt::Debug, V: core::fmt::Debug> core::fmt::Debug for Controller<S, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("list", &self.list)
            .field("surface", &self.surface)
            .finish()
    }
}
