use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::builder::{Builder, Plan};
use crate::flatten::{FlatRow, flatten};
use crate::key::ItemIndexMap;
use crate::node::{NodeId, NodeRef, Tree};
use crate::projection::Projection;
use crate::{
    DataSource, ExpansionState, FlatEntry, ItemInfo, NestMode, ParentLocator, Revealed,
    TreeListOptions,
};

/// A headless tree-to-list synchronization engine.
///
/// This type is UI-agnostic:
/// - It owns a tree of nodes built lazily from a [`DataSource`].
/// - It keeps a flat, pre-order projection of the visible nodes that a list surface can render
///   row by row.
/// - Every mutation is addressed by a position in that projection (or by item), regenerates the
///   projection and fires `on_change` exactly once when it succeeds.
///
/// Rejected mutations (out-of-range positions, invalid ordinals) return `false` and leave the
/// tree untouched. Data source errors are returned as-is, also without any visible change.
pub struct TreeList<S: DataSource> {
    source: S,
    options: TreeListOptions<S>,
    tree: Tree<S::Item>,

    flat: Vec<FlatRow>,
    positions: ItemIndexMap<S::Item>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
    revision: Cell<u64>,
}

impl<S: DataSource> TreeList<S> {
    /// Creates an empty list. Call [`Self::set_items`] to populate it.
    pub fn new(source: S) -> Self {
        Self::with_options(source, TreeListOptions::new())
    }

    pub fn with_options(source: S, options: TreeListOptions<S>) -> Self {
        vdebug!(
            always_expanded = options.always_expanded,
            "TreeList::with_options"
        );
        Self {
            source,
            options,
            tree: Tree::new(),
            flat: Vec::new(),
            positions: ItemIndexMap::new(),
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
            revision: Cell::new(0),
        }
    }

    pub fn options(&self) -> &TreeListOptions<S> {
        &self.options
    }

    /// Replaces the options. The current tree is kept as is.
    pub fn set_options(&mut self, options: TreeListOptions<S>) {
        self.options = options;
        vtrace!(
            always_expanded = self.options.always_expanded,
            "TreeList::set_options"
        );
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut TreeListOptions<S>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&TreeList<S>) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the data source, e.g. to add children before calling
    /// [`Self::add_item`]. The tree is not re-synchronized automatically.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        self.revision.set(self.revision.get().wrapping_add(1));
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// A counter bumped by every successful mutation.
    ///
    /// Comparing two readings tells whether the flat sequence may have changed in between, even when
    /// `on_change` notifications were batched.
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Batches multiple mutations into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    fn reflatten(&mut self) {
        flatten(&self.tree, &mut self.flat);
        self.positions.clear();
        for (pos, row) in self.flat.iter().enumerate() {
            if let Some(item) = self.tree.get(row.node).and_then(|n| n.item.as_ref()) {
                self.positions.entry(item.clone()).or_insert(pos);
            }
        }
    }

    fn refresh(&mut self) {
        self.reflatten();
        self.notify();
    }

    /// Builds a fresh tree for `items`, the top-level items.
    pub fn set_items(&mut self, items: Vec<S::Item>) -> Result<(), S::Error> {
        self.set_items_with_path(items, &[])
    }

    /// Builds a fresh tree for `items` and pre-expands `path`, an ordered top-to-bottom list of
    /// items that must end up expanded. Siblings of the path stay collapsed.
    ///
    /// The synthetic root takes the data source's parent of the first item as its logical item.
    /// On error the previous tree is kept.
    pub fn set_items_with_path(
        &mut self,
        items: Vec<S::Item>,
        path: &[S::Item],
    ) -> Result<(), S::Error> {
        vdebug!(
            items = items.len(),
            path = path.len(),
            "TreeList::set_items_with_path"
        );
        let root_item = match items.first() {
            Some(first) => self.source.parent_of(first)?,
            None => None,
        };

        let root = self.tree.root();
        let children = Builder::new(&self.source, self.options.always_expanded).build_nodes(
            &mut self.tree,
            root,
            items,
            Plan::Path(path),
        )?;
        self.tree.set_children(root, children);
        if let Some(node) = self.tree.get_mut(root) {
            node.item = root_item;
            node.expandable = true;
        }

        self.refresh();
        Ok(())
    }

    /// Rebuilds the tree from the current top-level rows.
    ///
    /// Top-level edits made through [`Self::add_item`], [`Self::delete_item`] and
    /// [`Self::swap_siblings`] carry over. All branches are collapsed again (unless
    /// always-expanded). Pair it with [`Self::expansion_state`] to keep them open.
    pub fn reload(&mut self) -> Result<(), S::Error> {
        let items: Vec<S::Item> = self
            .tree
            .children(self.tree.root())
            .unwrap_or_default()
            .iter()
            .filter_map(|&id| self.tree.get(id)?.item.clone())
            .collect();
        self.set_items(items)
    }

    /// Number of rows in the flat sequence.
    pub fn count(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// A read-only view of the flat sequence.
    pub fn projection(&self) -> Projection<'_, S> {
        Projection::new(self)
    }

    pub fn node_at(&self, position: usize) -> Option<NodeId> {
        self.flat.get(position).map(|row| row.node)
    }

    pub fn item_at(&self, position: usize) -> Option<&S::Item> {
        let row = self.flat.get(position)?;
        self.tree.get(row.node)?.item.as_ref()
    }

    pub fn info_at(&self, position: usize) -> Option<ItemInfo> {
        let row = self.flat.get(position)?;
        self.info_for(row)
    }

    pub fn entry_at(&self, position: usize) -> Option<FlatEntry<'_, S::Item>> {
        let row = self.flat.get(position)?;
        let item = self.tree.get(row.node)?.item.as_ref()?;
        Some(FlatEntry {
            item,
            info: self.info_for(row)?,
        })
    }

    fn info_for(&self, row: &FlatRow) -> Option<ItemInfo> {
        let node = self.tree.get(row.node)?;
        Some(ItemInfo {
            level: row.level,
            index_in_level: row.index_in_level,
            level_size: row.level_size,
            is_expandable: node.expandable,
            is_expanded: node.is_expanded(),
        })
    }

    /// Iterates over the flat sequence in order.
    pub fn entries(&self) -> impl Iterator<Item = FlatEntry<'_, S::Item>> + '_ {
        (0..self.flat.len()).filter_map(|pos| self.entry_at(pos))
    }

    /// The first flat position showing `item`.
    pub fn position_of(&self, item: &S::Item) -> Option<usize> {
        self.positions.get(item).copied()
    }

    pub fn is_expanded(&self, position: usize) -> bool {
        self.node_at(position)
            .is_some_and(|id| self.tree.is_expanded(id))
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, S::Item>> {
        self.tree.get(id).map(|node| NodeRef { id, node })
    }

    /// The synthetic root. It is never part of the flat sequence.
    pub fn root(&self) -> NodeRef<'_, S::Item> {
        NodeRef {
            id: self.tree.root(),
            node: self.tree.root_node(),
        }
    }

    /// The logical item of the synthetic root (the parent of the top-level items), if any.
    pub fn root_item(&self) -> Option<&S::Item> {
        self.root().item()
    }

    /// Number of live nodes, including the synthetic root.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Expands the node at `position`. See [`Self::expand_node`].
    pub fn expand(&mut self, position: usize, mode: NestMode) -> Result<bool, S::Error> {
        let Some(id) = self.node_at(position) else {
            vwarn!(position, count = self.count(), "expand: position out of range");
            return Ok(false);
        };
        self.expand_node(id, mode)
    }

    /// Materializes the children of `id` (only one level, unless always-expanded).
    ///
    /// An already expanded node keeps its children. With [`NestMode::Exclusive`] every other
    /// branch along the path from `id` to the root is collapsed afterwards.
    ///
    /// Returns `false` for unknown or non-expandable nodes.
    pub fn expand_node(&mut self, id: NodeId, mode: NestMode) -> Result<bool, S::Error> {
        self.expand_with(id, mode, Plan::Lazy)
    }

    /// Expands the node at `position` and every expandable descendant.
    pub fn expand_subtree(&mut self, position: usize, mode: NestMode) -> Result<bool, S::Error> {
        let Some(id) = self.node_at(position) else {
            vwarn!(
                position,
                count = self.count(),
                "expand_subtree: position out of range"
            );
            return Ok(false);
        };
        self.expand_subtree_node(id, mode)
    }

    /// Rebuilds the children of `id` with every expandable descendant materialized.
    pub fn expand_subtree_node(&mut self, id: NodeId, mode: NestMode) -> Result<bool, S::Error> {
        self.expand_with(id, mode, Plan::Eager)
    }

    fn expand_with(
        &mut self,
        id: NodeId,
        mode: NestMode,
        plan: Plan<'_, S::Item>,
    ) -> Result<bool, S::Error> {
        vtrace!(?mode, "expand_with");
        if id == self.tree.root() {
            return Ok(false);
        }
        let Some(node) = self.tree.get(id) else {
            return Ok(false);
        };
        if !node.expandable {
            return Ok(false);
        }

        let rebuild = matches!(plan, Plan::Eager) || !node.is_expanded();
        if rebuild {
            Builder::new(&self.source, self.options.always_expanded).materialize(
                &mut self.tree,
                id,
                plan,
            )?;
        }
        if mode == NestMode::Exclusive {
            self.tree.collapse_path_siblings(id);
        }
        self.refresh();
        Ok(true)
    }

    /// Collapses the node at `position`. See [`Self::collapse_node`].
    pub fn collapse(&mut self, position: usize) -> bool {
        let Some(id) = self.node_at(position) else {
            vwarn!(position, count = self.count(), "collapse: position out of range");
            return false;
        };
        self.collapse_node(id)
    }

    /// Discards the materialized children of `id`. Its expandable flag is unaffected.
    ///
    /// Collapsing a collapsed node is a no-op that still reports success.
    pub fn collapse_node(&mut self, id: NodeId) -> bool {
        vtrace!("collapse_node");
        if id == self.tree.root() || self.tree.get(id).is_none() {
            return false;
        }
        self.tree.clear_children(id);
        self.refresh();
        true
    }

    /// Collapses the node at `position` if it is expanded, otherwise expands it with
    /// `options.toggle_mode`.
    pub fn toggle(&mut self, position: usize) -> Result<bool, S::Error> {
        let Some(id) = self.node_at(position) else {
            vwarn!(position, count = self.count(), "toggle: position out of range");
            return Ok(false);
        };
        if self.tree.is_expanded(id) {
            Ok(self.collapse_node(id))
        } else {
            self.expand_node(id, self.options.toggle_mode)
        }
    }

    /// Collapses every branch that does not lead to the node at `position`, at every ancestor
    /// level.
    pub fn collapse_path_siblings(&mut self, position: usize) -> bool {
        let Some(id) = self.node_at(position) else {
            vwarn!(
                position,
                count = self.count(),
                "collapse_path_siblings: position out of range"
            );
            return false;
        };
        self.tree.collapse_path_siblings(id);
        self.refresh();
        true
    }

    /// Expands every ancestor of `target` so that it becomes visible.
    ///
    /// Ancestors are resolved through [`DataSource::parent_of`] until an already visible one (or
    /// the root) is found, then opened one level at a time. Returns:
    /// - `Some(Revealed::Root)` if `target` is the root's logical item,
    /// - `Some(Revealed::Position(p))` with the flat position of `target`,
    /// - `None` if `target` cannot be reached from the current tree. Any expansion done by this
    ///   call is rolled back, as it is on error.
    pub fn expand_path_to(&mut self, target: &S::Item) -> Result<Option<Revealed>, S::Error> {
        let mut opened = Vec::new();
        let revealed = self.reveal(target, &mut opened)?;
        if !opened.is_empty() {
            self.notify();
        }
        Ok(revealed)
    }

    /// [`Self::expand_path_to`] without the notification. Nodes it materializes are recorded in
    /// `opened`; on `None` or error they are already rolled back and `opened` is empty.
    fn reveal(
        &mut self,
        target: &S::Item,
        opened: &mut Vec<NodeId>,
    ) -> Result<Option<Revealed>, S::Error> {
        if self.root_item() == Some(target) {
            return Ok(Some(Revealed::Root));
        }
        if let Some(pos) = self.position_of(target) {
            return Ok(Some(Revealed::Position(pos)));
        }

        let mut pending: Vec<S::Item> = Vec::new();
        let mut cursor = target.clone();
        let anchor = loop {
            if let Some(pos) = self.position_of(&cursor) {
                break self.flat[pos].node;
            }
            if self.root_item() == Some(&cursor) {
                break self.tree.root();
            }
            if pending.contains(&cursor) {
                vwarn!(depth = pending.len(), "expand_path_to: parent cycle");
                return Ok(None);
            }
            let parent = self.source.parent_of(&cursor)?;
            pending.push(cursor);
            match parent {
                Some(parent) => cursor = parent,
                None => break self.tree.root(),
            }
        };
        vdebug!(depth = pending.len(), "expand_path_to");

        let mut current = anchor;
        while let Some(next) = pending.pop() {
            if !self.tree.is_expanded(current) {
                let expandable = self.tree.get(current).is_some_and(|n| n.expandable);
                if !expandable {
                    vwarn!("expand_path_to: ancestor is not expandable");
                    self.roll_back(opened);
                    return Ok(None);
                }
                if let Err(err) = Builder::new(&self.source, self.options.always_expanded).materialize(
                    &mut self.tree,
                    current,
                    Plan::Lazy,
                ) {
                    self.roll_back(opened);
                    return Err(err);
                }
                opened.push(current);
                self.reflatten();
            }
            match self.position_of(&next) {
                Some(pos) => current = self.flat[pos].node,
                None => {
                    vwarn!("expand_path_to: item not found under its parent");
                    self.roll_back(opened);
                    return Ok(None);
                }
            }
        }

        Ok(self.position_of(target).map(Revealed::Position))
    }

    /// Collapses `opened` again, innermost first, and empties it.
    fn roll_back(&mut self, opened: &mut Vec<NodeId>) {
        while let Some(id) = opened.pop() {
            self.tree.clear_children(id);
        }
        self.reflatten();
    }

    /// Swaps two children, by ordinal, of the parent of the node at `position`.
    ///
    /// Returns `false` (and changes nothing) if `position` is out of range, the ordinals are equal
    /// or either ordinal is out of range.
    pub fn swap_siblings(&mut self, position: usize, a: usize, b: usize) -> bool {
        vtrace!(position, a, b, "swap_siblings");
        if a == b {
            vwarn!(a, "swap_siblings: ordinals are equal");
            return false;
        }
        let Some(id) = self.node_at(position) else {
            vwarn!(position, count = self.count(), "swap_siblings: position out of range");
            return false;
        };
        let Some(parent) = self.tree.get(id).and_then(|n| n.parent) else {
            return false;
        };
        let Some(children) = self.tree.get_mut(parent).and_then(|n| n.children.as_mut()) else {
            return false;
        };
        if a >= children.len() || b >= children.len() {
            vwarn!(
                a,
                b,
                len = children.len(),
                "swap_siblings: ordinal out of range"
            );
            return false;
        }
        children.swap(a, b);
        self.refresh();
        true
    }

    /// Re-synchronizes the children of the located parent from the data source and marks it
    /// expandable.
    ///
    /// Call it after adding items to the data source. The parent ends up expanded with fresh
    /// children (previously open branches below it are collapsed). With
    /// [`ParentLocator::Item`] a hidden parent is revealed first; if the re-synchronization then
    /// fails, that reveal is undone too.
    pub fn add_item(&mut self, locator: ParentLocator<'_, S::Item>) -> Result<bool, S::Error> {
        let mut opened = Vec::new();
        let parent = match locator {
            ParentLocator::Position(position) => match self.node_at(position) {
                Some(id) => id,
                None => {
                    vwarn!(position, "add_item: position out of range");
                    return Ok(false);
                }
            },
            ParentLocator::SiblingOf(position) => match self.node_at(position) {
                Some(id) => self
                    .tree
                    .get(id)
                    .and_then(|n| n.parent)
                    .unwrap_or(self.tree.root()),
                None => {
                    vwarn!(position, "add_item: position out of range");
                    return Ok(false);
                }
            },
            ParentLocator::Item(item) => match self.reveal(item, &mut opened)? {
                Some(Revealed::Root) => self.tree.root(),
                Some(Revealed::Position(pos)) => self.flat[pos].node,
                None => return Ok(false),
            },
            ParentLocator::Root => self.tree.root(),
        };
        let synced = self.resync(parent);
        if synced.is_err() && !opened.is_empty() {
            self.roll_back(&mut opened);
        }
        synced
    }

    fn resync(&mut self, parent: NodeId) -> Result<bool, S::Error> {
        vtrace!("resync");
        Builder::new(&self.source, self.options.always_expanded).materialize(
            &mut self.tree,
            parent,
            Plan::Lazy,
        )?;
        if let Some(node) = self.tree.get_mut(parent) {
            node.expandable = true;
        }
        self.refresh();
        Ok(true)
    }

    /// Removes the node at `position` (with its subtree) from its parent.
    ///
    /// When that empties the parent, the parent stops being expandable and collapses.
    pub fn delete_item(&mut self, position: usize) -> bool {
        vtrace!(position, "delete_item");
        let Some(id) = self.node_at(position) else {
            vwarn!(position, count = self.count(), "delete_item: position out of range");
            return false;
        };
        let Some(parent) = self.tree.get(id).and_then(|n| n.parent) else {
            return false;
        };
        let Some(parent_node) = self.tree.get_mut(parent) else {
            return false;
        };
        let Some(children) = parent_node.children.as_mut() else {
            return false;
        };
        let Some(at) = children.iter().position(|&c| c == id) else {
            return false;
        };
        children.remove(at);
        if children.is_empty() {
            parent_node.children = None;
            parent_node.expandable = false;
        }
        self.tree.free_subtree(id);
        self.refresh();
        true
    }

    /// Captures the items of all expanded nodes.
    pub fn expansion_state(&self) -> ExpansionState<S::Item> {
        ExpansionState {
            expanded: self.tree.expanded_items().into_iter().cloned().collect(),
        }
    }

    /// Re-opens the branches recorded in `state` that are reachable in the current tree.
    ///
    /// Items that are not visible by the time they are reached, or no longer expandable, are
    /// skipped. Returns whether anything was expanded; on error nothing is.
    pub fn restore_expansion_state(
        &mut self,
        state: &ExpansionState<S::Item>,
    ) -> Result<bool, S::Error> {
        let mut opened = Vec::new();
        for item in &state.expanded {
            let Some(id) = self.position_of(item).and_then(|pos| self.node_at(pos)) else {
                continue;
            };
            let ready = self
                .tree
                .get(id)
                .is_some_and(|n| n.expandable && !n.is_expanded());
            if !ready {
                continue;
            }
            let built = Builder::new(&self.source, self.options.always_expanded).materialize(
                &mut self.tree,
                id,
                Plan::Lazy,
            );
            if let Err(err) = built {
                self.roll_back(&mut opened);
                return Err(err);
            }
            opened.push(id);
            self.reflatten();
        }

        vdebug!(
            requested = state.expanded.len(),
            opened = opened.len(),
            "restore_expansion_state"
        );
        if opened.is_empty() {
            return Ok(false);
        }
        self.notify();
        Ok(true)
    }
}

impl<S: DataSource + core::fmt::Debug> core::fmt::Debug for TreeList<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeList")
            .field("source", &self.source)
            .field("options", &self.options)
            .field("count", &self.flat.len())
            .field("nodes", &self.tree.len())
            .finish_non_exhaustive()
    }
}
