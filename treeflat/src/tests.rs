use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// `1 [11, 12]`, `2` (leaf).
fn small() -> MemorySource<u32> {
    let mut s = MemorySource::new();
    s.push_top(1);
    s.push_child(Some(&1), 11);
    s.push_child(Some(&1), 12);
    s.push_top(2);
    s
}

/// ```text
/// 1 ── 11 ── 111
/// │     └─── 112
/// └─── 12 ── 121
/// 2 ── 21 ── 211
/// 3
/// ```
fn deep() -> MemorySource<u32> {
    let mut s = MemorySource::new();
    for top in [1, 2, 3] {
        s.push_top(top);
    }
    for (parent, child) in [
        (1, 11),
        (11, 111),
        (11, 112),
        (1, 12),
        (12, 121),
        (2, 21),
        (21, 211),
    ] {
        s.push_child(Some(&parent), child);
    }
    s
}

fn built<S: DataSource<Item = u32>>(source: S) -> TreeList<S> {
    let top = source.children_of(None).ok().flatten().unwrap_or_default();
    let mut list = TreeList::new(source);
    assert!(list.set_items(top).is_ok());
    list
}

fn rows<S: DataSource<Item = u32>>(list: &TreeList<S>) -> Vec<u32> {
    list.entries().map(|e| *e.item).collect()
}

fn pos<S: DataSource<Item = u32>>(list: &TreeList<S>, item: u32) -> usize {
    list.position_of(&item).unwrap()
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(&TreeList<MemorySource<u32>>) + Send + Sync) {
    let calls = Arc::new(AtomicUsize::new(0));
    let cb = {
        let calls = Arc::clone(&calls);
        move |_: &TreeList<MemorySource<u32>>| {
            calls.fetch_add(1, Ordering::Relaxed);
        }
    };
    (calls, cb)
}

/// Walks the tree through the public node API and checks it against the flat sequence.
fn check_consistency<S: DataSource<Item = u32>>(list: &TreeList<S>) {
    fn walk<S: DataSource<Item = u32>>(
        list: &TreeList<S>,
        id: NodeId,
        level: usize,
        out: &mut Vec<(NodeId, usize)>,
    ) {
        let node = list.node(id).unwrap();
        if let Some(children) = node.children() {
            for &child in children {
                out.push((child, level));
                walk(list, child, level + 1, out);
            }
        }
    }

    let mut expected = Vec::new();
    walk(list, list.root().id(), 0, &mut expected);
    assert_eq!(expected.len(), list.count());
    // Collapsed subtrees are released, so every live node is visible.
    assert_eq!(list.node_count(), list.count() + 1);

    for (p, &(id, level)) in expected.iter().enumerate() {
        assert_eq!(list.node_at(p), Some(id));
        let info = list.info_at(p).unwrap();
        assert_eq!(info.level, level);

        let node = list.node(id).unwrap();
        let parent = list.node(node.parent().unwrap()).unwrap();
        let siblings = parent.children().unwrap();
        assert_eq!(siblings.iter().filter(|&&c| c == id).count(), 1);
        assert_eq!(siblings[info.index_in_level], id);
        assert_eq!(info.level_size, siblings.len());
        assert_eq!(info.is_expandable, node.is_expandable());
        assert_eq!(info.is_expanded, node.is_expanded());
        if !node.is_expandable() {
            assert!(!node.is_expanded());
        }
    }
}

#[test]
fn fresh_tree_shows_top_level_only() {
    let list = built(small());
    assert_eq!(rows(&list), [1, 2]);
    assert!(!list.is_expanded(0));
    assert!(list.info_at(0).unwrap().is_expandable);
    assert!(!list.info_at(1).unwrap().is_expandable);
    check_consistency(&list);
}

#[test]
fn expand_then_toggle_back() {
    let mut list = built(small());
    assert_eq!(list.expand(0, NestMode::Concurrent), Ok(true));
    assert_eq!(rows(&list), [1, 11, 12, 2]);
    assert!(list.is_expanded(0));

    assert_eq!(list.toggle(0), Ok(true));
    assert_eq!(rows(&list), [1, 2]);
    assert!(list.root().children().is_some());
    check_consistency(&list);
}

#[test]
fn toggle_out_of_range_is_rejected() {
    let mut list = built(small());
    assert_eq!(list.toggle(2), Ok(false));
    assert_eq!(list.toggle(usize::MAX), Ok(false));
    assert_eq!(rows(&list), [1, 2]);
}

#[test]
fn expanding_a_leaf_is_rejected() {
    let mut list = built(small());
    assert_eq!(list.expand(1, NestMode::Concurrent), Ok(false));
    assert_eq!(list.toggle(1), Ok(false));
    assert!(!list.is_expanded(1));
    check_consistency(&list);
}

#[test]
fn info_reports_level_and_sibling_position() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    list.expand(1, NestMode::Concurrent).unwrap();
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 2, 3]);

    let info = list.info_at(3).unwrap();
    assert_eq!(info.level, 2);
    assert_eq!(info.index_in_level, 1);
    assert_eq!(info.level_size, 2);
    assert!(info.is_last_in_level());
    assert!(!info.is_expandable);

    let top = list.info_at(5).unwrap();
    assert_eq!(top.level, 0);
    assert_eq!(top.index_in_level, 1);
    assert_eq!(top.level_size, 3);
    assert!(!top.is_first_in_level());

    let entry = list.entry_at(1).unwrap();
    assert_eq!(*entry.item, 11);
    assert!(entry.info.is_expanded);
}

#[test]
fn expand_and_collapse_are_idempotent() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    list.expand(1, NestMode::Concurrent).unwrap();
    let before: Vec<_> = (0..list.count()).map(|p| list.node_at(p)).collect();

    // Already expanded: children (and their open branches) are kept.
    assert_eq!(list.expand(0, NestMode::Concurrent), Ok(true));
    let after: Vec<_> = (0..list.count()).map(|p| list.node_at(p)).collect();
    assert_eq!(before, after);

    let collapsed_at = pos(&list, 2);
    assert!(list.collapse(collapsed_at));
    let again: Vec<_> = (0..list.count()).map(|p| list.node_at(p)).collect();
    assert_eq!(before, again);
    check_consistency(&list);
}

#[test]
fn concurrent_expansion_keeps_other_branches_open() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    list.expand(pos(&list, 2), NestMode::Concurrent).unwrap();
    list.expand(pos(&list, 11), NestMode::Concurrent).unwrap();
    list.expand(pos(&list, 12), NestMode::Concurrent).unwrap();
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 121, 2, 21, 3]);
    check_consistency(&list);
}

#[test]
fn exclusive_expansion_collapses_branches_at_every_ancestor_level() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    list.expand(pos(&list, 2), NestMode::Concurrent).unwrap();
    list.expand(pos(&list, 11), NestMode::Concurrent).unwrap();
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 2, 21, 3]);

    assert_eq!(list.expand(pos(&list, 12), NestMode::Exclusive), Ok(true));
    assert_eq!(rows(&list), [1, 11, 12, 121, 2, 3]);
    assert!(!list.is_expanded(pos(&list, 11)));
    assert!(!list.is_expanded(pos(&list, 2)));
    check_consistency(&list);
}

#[test]
fn toggle_uses_configured_mode() {
    let source = deep();
    let top = source.top_level().to_vec();
    let options = TreeListOptions::new().with_toggle_mode(NestMode::Exclusive);
    let mut list = TreeList::with_options(source, options);
    list.set_items(top).unwrap();

    list.toggle(0).unwrap();
    list.toggle(pos(&list, 2)).unwrap();
    assert_eq!(rows(&list), [1, 2, 21, 3]);
}

#[test]
fn collapse_path_siblings_prunes_without_expanding() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    list.expand(pos(&list, 2), NestMode::Concurrent).unwrap();
    assert!(list.collapse_path_siblings(pos(&list, 21)));
    assert_eq!(rows(&list), [1, 2, 21, 3]);
    assert!(!list.collapse_path_siblings(99));
}

#[test]
fn expand_subtree_materializes_all_descendants() {
    let mut list = built(deep());
    assert_eq!(list.expand_subtree(0, NestMode::Concurrent), Ok(true));
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 121, 2, 3]);
    check_consistency(&list);
}

#[test]
fn expand_subtree_exclusive_prunes_siblings_once() {
    let mut list = built(deep());
    list.expand(pos(&list, 2), NestMode::Concurrent).unwrap();
    list.expand_subtree(0, NestMode::Exclusive).unwrap();
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 121, 2, 3]);
}

#[test]
fn always_expanded_materializes_everything_at_build_time() {
    let source = deep();
    let top = source.top_level().to_vec();
    let mut list =
        TreeList::with_options(source, TreeListOptions::new().with_always_expanded(true));
    list.set_items(top).unwrap();
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 121, 2, 21, 211, 3]);
    check_consistency(&list);
}

#[test]
fn set_items_with_path_expands_only_the_path() {
    let source = deep();
    let top = source.top_level().to_vec();
    let mut list = TreeList::new(source);
    list.set_items_with_path(top, &[1, 11]).unwrap();
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 2, 3]);
    assert!(list.is_expanded(pos(&list, 1)));
    assert!(list.is_expanded(pos(&list, 11)));
    assert!(!list.is_expanded(pos(&list, 12)));
    assert!(!list.is_expanded(pos(&list, 2)));
    check_consistency(&list);
}

#[test]
fn expand_path_to_reveals_a_hidden_item() {
    let mut list = built(small());
    assert_eq!(list.expand_path_to(&12), Ok(Some(Revealed::Position(2))));
    assert_eq!(rows(&list), [1, 11, 12, 2]);
    assert!(list.is_expanded(0));
    assert!(!list.is_expanded(3));
}

#[test]
fn expand_path_to_opens_several_levels() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    assert_eq!(list.expand_path_to(&211), Ok(Some(Revealed::Position(5))));
    assert_eq!(rows(&list), [1, 11, 12, 2, 21, 211, 3]);
    check_consistency(&list);
}

#[test]
fn expand_path_to_visible_item_changes_nothing() {
    let (calls, cb) = counter();
    let source = small();
    let top = source.top_level().to_vec();
    let mut list = TreeList::new(source);
    list.set_items(top).unwrap();
    list.set_on_change(Some(cb));

    assert_eq!(list.expand_path_to(&2), Ok(Some(Revealed::Position(1))));
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn expand_path_to_root_item_reports_root() {
    let mut source = MemorySource::with_root(100);
    source.push_top(1);
    source.push_child(Some(&1), 11);
    let mut list = built(source);
    assert_eq!(list.root_item(), Some(&100));
    assert_eq!(list.expand_path_to(&100), Ok(Some(Revealed::Root)));
    assert_eq!(
        list.expand_path_to(&11).unwrap().and_then(Revealed::position),
        Some(1)
    );
}

#[test]
fn expand_path_to_unknown_item_rolls_back() {
    let mut list = built(deep());
    // 999 claims 21 as parent, but 21's children do not include it.
    #[derive(Debug)]
    struct Lying(MemorySource<u32>);
    impl DataSource for Lying {
        type Item = u32;
        type Error = core::convert::Infallible;
        fn is_expandable(&self, item: &u32) -> Result<bool, Self::Error> {
            self.0.is_expandable(item)
        }
        fn children_of(&self, parent: Option<&u32>) -> Result<Option<Vec<u32>>, Self::Error> {
            self.0.children_of(parent)
        }
        fn parent_of(&self, item: &u32) -> Result<Option<u32>, Self::Error> {
            if *item == 999 {
                return Ok(Some(21));
            }
            self.0.parent_of(item)
        }
    }

    assert_eq!(list.expand_path_to(&999), Ok(None));
    assert_eq!(rows(&list), [1, 2, 3]);

    let mut lying = built(Lying(deep()));
    assert_eq!(lying.expand_path_to(&999), Ok(None));
    assert_eq!(rows(&lying), [1, 2, 3]);
    check_consistency(&lying);
}

#[test]
fn expand_path_to_detects_parent_cycles() {
    #[derive(Debug)]
    struct Cyclic;
    impl DataSource for Cyclic {
        type Item = u32;
        type Error = core::convert::Infallible;
        fn is_expandable(&self, _: &u32) -> Result<bool, Self::Error> {
            Ok(false)
        }
        fn children_of(&self, parent: Option<&u32>) -> Result<Option<Vec<u32>>, Self::Error> {
            Ok(parent.is_none().then(|| Vec::from([1])))
        }
        fn parent_of(&self, item: &u32) -> Result<Option<u32>, Self::Error> {
            Ok(match item {
                5 => Some(6),
                6 => Some(5),
                _ => None,
            })
        }
    }

    let mut list = built(Cyclic);
    assert_eq!(list.expand_path_to(&5), Ok(None));
    assert_eq!(rows(&list), [1]);
}

#[test]
fn swap_siblings_reorders_within_parent() {
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    assert_eq!(rows(&list), [1, 11, 12, 2, 3]);

    assert!(list.swap_siblings(1, 0, 1));
    assert_eq!(rows(&list), [1, 12, 11, 2, 3]);

    // Top-level rows swap among the root's children.
    assert!(list.swap_siblings(0, 0, 2));
    assert_eq!(rows(&list), [3, 2, 1, 12, 11]);
    check_consistency(&list);
}

#[test]
fn swap_siblings_rejects_invalid_ordinals() {
    let (calls, cb) = counter();
    let mut list = built(deep());
    list.expand(0, NestMode::Concurrent).unwrap();
    list.set_on_change(Some(cb));

    assert!(!list.swap_siblings(1, 1, 1));
    assert!(!list.swap_siblings(1, 0, 2));
    assert!(!list.swap_siblings(1, 5, 0));
    assert!(!list.swap_siblings(42, 0, 1));
    assert_eq!(rows(&list), [1, 11, 12, 2, 3]);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[test]
fn delete_item_clears_expandable_when_parent_empties() {
    let mut list = built(small());
    list.expand(0, NestMode::Concurrent).unwrap();

    assert!(list.delete_item(pos(&list, 11)));
    assert_eq!(rows(&list), [1, 12, 2]);
    assert!(list.info_at(0).unwrap().is_expandable);

    assert!(list.delete_item(pos(&list, 12)));
    assert_eq!(rows(&list), [1, 2]);
    let info = list.info_at(0).unwrap();
    assert!(!info.is_expandable);
    assert!(!info.is_expanded);
    check_consistency(&list);
}

#[test]
fn delete_item_releases_the_subtree() {
    let mut list = built(deep());
    list.expand_subtree(0, NestMode::Concurrent).unwrap();
    let nodes = list.node_count();
    assert!(list.delete_item(pos(&list, 11)));
    assert_eq!(list.node_count(), nodes - 3);
    assert_eq!(rows(&list), [1, 12, 121, 2, 3]);
    assert!(!list.delete_item(list.count()));
    check_consistency(&list);
}

#[test]
fn add_item_resyncs_parent_from_source() {
    let mut list = built(small());
    list.source_mut().push_child(Some(&2), 21);

    assert_eq!(list.add_item(ParentLocator::Position(1)), Ok(true));
    assert_eq!(rows(&list), [1, 2, 21]);
    let info = list.info_at(1).unwrap();
    assert!(info.is_expandable);
    assert!(info.is_expanded);
    check_consistency(&list);
}

#[test]
fn add_item_as_sibling_of_top_level_resyncs_root() {
    let mut list = built(small());
    list.source_mut().push_top(3);
    assert_eq!(list.add_item(ParentLocator::SiblingOf(1)), Ok(true));
    assert_eq!(rows(&list), [1, 2, 3]);

    list.source_mut().push_top(4);
    assert_eq!(list.add_item(ParentLocator::Root), Ok(true));
    assert_eq!(rows(&list), [1, 2, 3, 4]);
    assert_eq!(list.add_item(ParentLocator::SiblingOf(10)), Ok(false));
    assert_eq!(list.add_item(ParentLocator::Position(10)), Ok(false));
}

#[test]
fn add_item_by_item_reveals_parent_and_notifies_once() {
    let (calls, cb) = counter();
    let mut list = built(deep());
    list.set_on_change(Some(cb));
    list.source_mut().push_child(Some(&21), 212);

    assert_eq!(list.add_item(ParentLocator::Item(&21)), Ok(true));
    assert_eq!(rows(&list), [1, 2, 21, 211, 212, 3]);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    check_consistency(&list);
}

#[test]
fn add_item_after_deleting_all_top_level_rows() {
    let mut list = built(small());
    assert!(list.delete_item(1));
    assert!(list.delete_item(0));
    assert!(list.is_empty());
    assert!(!list.root().is_expanded());

    assert_eq!(list.add_item(ParentLocator::Root), Ok(true));
    assert_eq!(rows(&list), [1, 2]);
}

#[test]
fn on_change_fires_once_per_successful_mutation() {
    let (calls, cb) = counter();
    let source = deep();
    let top = source.top_level().to_vec();
    let mut list = TreeList::with_options(source, TreeListOptions::new().with_on_change(Some(cb)));

    list.set_items(top).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    list.expand_path_to(&211).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 2);

    list.toggle(0).unwrap();
    assert_eq!(calls.load(Ordering::Relaxed), 3);

    assert!(!list.delete_item(99));
    assert_eq!(list.toggle(99), Ok(false));
    assert_eq!(calls.load(Ordering::Relaxed), 3);

    list.batch_update(|l| {
        l.collapse(0);
        l.collapse(1);
    });
    assert_eq!(calls.load(Ordering::Relaxed), 4);
}

#[test]
fn revision_tracks_successful_mutations_only() {
    let mut list = built(small());
    let r0 = list.revision();
    assert_eq!(list.expand_path_to(&2), Ok(Some(Revealed::Position(1))));
    assert!(!list.swap_siblings(0, 0, 0));
    assert_eq!(list.revision(), r0);

    list.expand(0, NestMode::Concurrent).unwrap();
    assert_ne!(list.revision(), r0);
}

#[derive(Debug, PartialEq, Eq)]
struct SourceFailure(u32);

#[derive(Debug)]
struct Flaky {
    inner: MemorySource<u32>,
    fail_on: Option<u32>,
}

impl DataSource for Flaky {
    type Item = u32;
    type Error = SourceFailure;

    fn is_expandable(&self, item: &u32) -> Result<bool, SourceFailure> {
        if self.fail_on == Some(*item) {
            return Err(SourceFailure(*item));
        }
        Ok(self.inner.is_expandable(item).unwrap())
    }

    fn children_of(&self, parent: Option<&u32>) -> Result<Option<Vec<u32>>, SourceFailure> {
        Ok(self.inner.children_of(parent).unwrap())
    }

    fn parent_of(&self, item: &u32) -> Result<Option<u32>, SourceFailure> {
        Ok(self.inner.parent_of(item).unwrap())
    }
}

#[test]
fn source_error_leaves_tree_untouched() {
    let mut list = built(Flaky {
        inner: deep(),
        fail_on: None,
    });
    list.expand(0, NestMode::Concurrent).unwrap();
    list.source_mut().fail_on = Some(112);
    let before = rows(&list);
    let nodes = list.node_count();

    assert_eq!(
        list.expand(pos(&list, 11), NestMode::Concurrent),
        Err(SourceFailure(112))
    );
    assert_eq!(rows(&list), before);
    assert_eq!(list.node_count(), nodes);

    assert_eq!(
        list.expand_subtree(0, NestMode::Concurrent),
        Err(SourceFailure(112))
    );
    assert_eq!(rows(&list), before);
    assert_eq!(list.node_count(), nodes);
    check_consistency(&list);
}

#[test]
fn source_error_during_expand_path_to_rolls_back() {
    let mut list = built(Flaky {
        inner: deep(),
        fail_on: Some(211),
    });
    assert_eq!(list.expand_path_to(&211), Err(SourceFailure(211)));
    assert_eq!(rows(&list), [1, 2, 3]);
    check_consistency(&list);
}

#[test]
fn source_error_during_set_items_keeps_previous_tree() {
    let mut list = built(Flaky {
        inner: deep(),
        fail_on: None,
    });
    list.expand(0, NestMode::Concurrent).unwrap();
    list.source_mut().fail_on = Some(3);
    assert_eq!(list.reload(), Err(SourceFailure(3)));
    assert_eq!(rows(&list), [1, 11, 12, 2, 3]);
    check_consistency(&list);
}

#[test]
fn failed_resync_after_reveal_changes_nothing() {
    let mut source = deep();
    source.push_child(Some(&21), 212);
    let mut list = built(Flaky {
        inner: source,
        fail_on: Some(212),
    });
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = Arc::clone(&calls);
        list.set_on_change(Some(move |_: &TreeList<Flaky>| {
            calls.fetch_add(1, Ordering::Relaxed);
        }));
    }
    let revision = list.revision();
    let nodes = list.node_count();

    assert_eq!(
        list.add_item(ParentLocator::Item(&21)),
        Err(SourceFailure(212))
    );
    assert_eq!(rows(&list), [1, 2, 3]);
    assert_eq!(list.revision(), revision);
    assert_eq!(list.node_count(), nodes);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    check_consistency(&list);

    list.source_mut().fail_on = None;
    assert_eq!(list.add_item(ParentLocator::Item(&21)), Ok(true));
    assert_eq!(rows(&list), [1, 2, 21, 211, 212, 3]);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn reload_keeps_top_level_edits() {
    let mut list = built(small());
    list.source_mut().push_top(3);
    assert_eq!(list.add_item(ParentLocator::Root), Ok(true));
    assert!(list.delete_item(0));
    assert!(list.swap_siblings(0, 0, 1));
    assert_eq!(rows(&list), [3, 2]);

    list.reload().unwrap();
    assert_eq!(rows(&list), [3, 2]);
    check_consistency(&list);
}

#[test]
fn expansion_state_survives_reload() {
    let mut list = built(deep());
    list.expand_path_to(&111).unwrap();
    list.expand_path_to(&211).unwrap();
    let state = list.expansion_state();
    assert_eq!(state.expanded, [1, 11, 2, 21]);

    list.reload().unwrap();
    assert_eq!(rows(&list), [1, 2, 3]);

    assert_eq!(list.restore_expansion_state(&state), Ok(true));
    assert_eq!(rows(&list), [1, 11, 111, 112, 12, 2, 21, 211, 3]);
    assert_eq!(list.restore_expansion_state(&state), Ok(false));
    assert_eq!(
        list.restore_expansion_state(&ExpansionState::default()),
        Ok(false)
    );
}

#[test]
fn projection_exposes_rows_and_stable_ids() {
    let mut list = built(deep());
    let id_of_two = list.projection().item_id(1).unwrap();
    list.expand(0, NestMode::Concurrent).unwrap();

    let view = list.projection();
    assert_eq!(view.count(), 5);
    assert_eq!(view.item_at(3), Some(&2));
    assert_eq!(view.item_id(3), Some(id_of_two));
    assert_eq!(view.item_at(5), None);
    assert_eq!(view.info_at(1).map(|i| i.level), Some(1));
    let items: Vec<u32> = view.iter().map(|e| *e.item).collect();
    assert_eq!(items, [1, 11, 12, 2, 3]);
}

#[test]
fn memory_source_remove_drops_subtree() {
    let mut s = deep();
    assert!(s.remove(&11));
    assert!(!s.contains(&111));
    assert_eq!(s.children(&1), [12]);
    assert!(!s.remove(&11));
    assert_eq!(s.parent_of(&12), Ok(Some(1)));
}

fn random_source(rng: &mut Lcg, n: u32) -> MemorySource<u32> {
    let mut s = MemorySource::new();
    let mut ids: Vec<u32> = Vec::new();
    for id in 1..=n {
        if ids.is_empty() || rng.gen_range_usize(0, 5) == 0 {
            s.push_top(id);
        } else {
            let parent = ids[rng.gen_range_usize(0, ids.len())];
            let index = rng.gen_range_usize(0, 4);
            s.insert_child(Some(&parent), index, id);
        }
        ids.push(id);
    }
    s
}

fn expanded_nodes<S: DataSource<Item = u32>>(list: &TreeList<S>) -> Vec<NodeId> {
    (0..list.count())
        .filter(|&p| list.is_expanded(p))
        .filter_map(|p| list.node_at(p))
        .collect()
}

#[test]
fn randomized_mutations_keep_tree_and_projection_consistent() {
    let mut rng = Lcg::new(0x5eed_cafe);
    for _ in 0..40 {
        let n = rng.gen_range_usize(1, 60) as u32;
        let source = random_source(&mut rng, n);
        let mut list = built(source);
        check_consistency(&list);

        for _ in 0..80 {
            let count = list.count();
            let p = rng.gen_range_usize(0, count + 2);
            match rng.gen_range_usize(0, 8) {
                0 | 1 => {
                    let _ = list.toggle(p);
                }
                2 => {
                    let before = expanded_nodes(&list);
                    let _ = list.expand(p, NestMode::Concurrent);
                    let after = expanded_nodes(&list);
                    assert!(before.iter().all(|id| after.contains(id)));
                }
                3 => {
                    let Ok(true) = list.expand(p, NestMode::Exclusive) else {
                        continue;
                    };
                    let mut id = list.node_at(p).unwrap();
                    while let Some(parent) = list.node(id).unwrap().parent() {
                        let open = list
                            .node(parent)
                            .unwrap()
                            .children()
                            .unwrap()
                            .iter()
                            .filter(|&&c| list.node(c).unwrap().is_expanded())
                            .count();
                        assert!(open <= 1);
                        id = parent;
                    }
                }
                4 => {
                    let target = rng.gen_range_usize(1, n as usize + 1) as u32;
                    if let Ok(Some(Revealed::Position(at))) = list.expand_path_to(&target) {
                        assert_eq!(list.item_at(at), Some(&target));
                    }
                }
                5 => {
                    let a = rng.gen_range_usize(0, 4);
                    let b = rng.gen_range_usize(0, 4);
                    let parent = list.node_at(p).and_then(|id| list.node(id)?.parent());
                    let before = parent.map(|id| list.node(id).unwrap().children().unwrap().to_vec());
                    let swapped = list.swap_siblings(p, a, b);
                    let after = parent.map(|id| list.node(id).unwrap().children().unwrap().to_vec());
                    if swapped {
                        let (mut before, mut after) = (before.unwrap(), after.unwrap());
                        assert_eq!(before.len(), after.len());
                        assert_ne!(before, after);
                        before.sort();
                        after.sort();
                        assert_eq!(before, after);
                    } else {
                        assert_eq!(before, after);
                    }
                }
                6 => {
                    let parent = list.node_at(p).and_then(|id| list.node(id)?.parent());
                    let siblings = parent.and_then(|id| list.node(id)?.children().map(<[_]>::len));
                    if list.delete_item(p) {
                        let parent = list.node(parent.unwrap()).unwrap();
                        assert_eq!(siblings == Some(1), !parent.is_expandable());
                    }
                }
                _ => {
                    if rng.gen_bool() {
                        let _ = list.expand_subtree(p, NestMode::Concurrent);
                    } else {
                        let _ = list.collapse(p);
                    }
                }
            }
            check_consistency(&list);
        }
    }
}
