use alloc::vec::Vec;
use core::convert::Infallible;

use crate::ItemHandle;
use crate::key::ItemMap;

/// The collaborator that owns the actual hierarchy.
///
/// The engine never inspects item contents. It asks the data source whether an item has children,
/// what they are, and (for [`crate::TreeList::expand_path_to`]) what an item's parent is.
///
/// Calls are expected to be synchronous and cheap. An error aborts the operation that issued the
/// call and is returned to its caller; the tree is left as it was before the operation.
pub trait DataSource {
    type Item: ItemHandle;
    type Error;

    fn is_expandable(&self, item: &Self::Item) -> Result<bool, Self::Error>;

    /// Returns the children of `parent`, or of the top level when `parent` is `None`.
    ///
    /// `Ok(None)` for an expandable item materializes it with zero children.
    fn children_of(&self, parent: Option<&Self::Item>)
    -> Result<Option<Vec<Self::Item>>, Self::Error>;

    /// Returns the parent of `item`, or `None` for top-level items without a modeled parent.
    fn parent_of(&self, item: &Self::Item) -> Result<Option<Self::Item>, Self::Error> {
        let _ = item;
        Ok(None)
    }
}

impl<D: DataSource + ?Sized> DataSource for &D {
    type Item = D::Item;
    type Error = D::Error;

    fn is_expandable(&self, item: &Self::Item) -> Result<bool, Self::Error> {
        (**self).is_expandable(item)
    }

    fn children_of(
        &self,
        parent: Option<&Self::Item>,
    ) -> Result<Option<Vec<Self::Item>>, Self::Error> {
        (**self).children_of(parent)
    }

    fn parent_of(&self, item: &Self::Item) -> Result<Option<Self::Item>, Self::Error> {
        (**self).parent_of(item)
    }
}

/// A simple in-memory [`DataSource`] backed by child and parent maps.
///
/// Items are expandable when they currently have at least one child. An optional `root` item acts
/// as the logical parent of the top-level items.
#[derive(Clone, Debug)]
pub struct MemorySource<T> {
    root: Option<T>,
    top: Vec<T>,
    children: ItemMap<T, Vec<T>>,
    parents: ItemMap<T, T>,
}

impl<T: ItemHandle> Default for MemorySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ItemHandle> MemorySource<T> {
    pub fn new() -> Self {
        Self {
            root: None,
            top: Vec::new(),
            children: ItemMap::new(),
            parents: ItemMap::new(),
        }
    }

    /// Creates a source whose top-level items report `root` as their parent.
    pub fn with_root(root: T) -> Self {
        Self {
            root: Some(root),
            ..Self::new()
        }
    }

    pub fn root(&self) -> Option<&T> {
        self.root.as_ref()
    }

    pub fn top_level(&self) -> &[T] {
        &self.top
    }

    pub fn children(&self, item: &T) -> &[T] {
        self.children.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, item: &T) -> bool {
        self.top.contains(item) || self.parents.contains_key(item)
    }

    pub fn push_top(&mut self, item: T) {
        self.top.push(item);
    }

    /// Appends `item` to the children of `parent` (or to the top level when `parent` is `None`).
    pub fn push_child(&mut self, parent: Option<&T>, item: T) {
        match parent {
            None => self.top.push(item),
            Some(p) if self.root.as_ref() == Some(p) => self.top.push(item),
            Some(p) => {
                self.parents.insert(item.clone(), p.clone());
                self.children.entry(p.clone()).or_default().push(item);
            }
        }
    }

    /// Inserts `item` at `index` among the children of `parent`, clamping `index` to the end.
    pub fn insert_child(&mut self, parent: Option<&T>, index: usize, item: T) {
        let list = match parent {
            None => &mut self.top,
            Some(p) if self.root.as_ref() == Some(p) => &mut self.top,
            Some(p) => {
                self.parents.insert(item.clone(), p.clone());
                self.children.entry(p.clone()).or_default()
            }
        };
        let index = index.min(list.len());
        list.insert(index, item);
    }

    /// Removes `item` and its whole subtree. Returns `false` if the item is unknown.
    pub fn remove(&mut self, item: &T) -> bool {
        let siblings = match self.parents.get(item) {
            Some(p) => self.children.get_mut(p),
            None => Some(&mut self.top),
        };
        let Some(siblings) = siblings else {
            return false;
        };
        let Some(at) = siblings.iter().position(|c| c == item) else {
            return false;
        };
        siblings.remove(at);

        let mut pending = Vec::from([item.clone()]);
        while let Some(next) = pending.pop() {
            self.parents.remove(&next);
            if let Some(kids) = self.children.remove(&next) {
                pending.extend(kids);
            }
        }
        true
    }
}

impl<T: ItemHandle> DataSource for MemorySource<T> {
    type Item = T;
    type Error = Infallible;

    fn is_expandable(&self, item: &T) -> Result<bool, Infallible> {
        Ok(!self.children(item).is_empty())
    }

    fn children_of(&self, parent: Option<&T>) -> Result<Option<Vec<T>>, Infallible> {
        Ok(match parent {
            None => Some(self.top.clone()),
            Some(p) if self.root.as_ref() == Some(p) => Some(self.top.clone()),
            Some(p) => self.children.get(p).cloned(),
        })
    }

    fn parent_of(&self, item: &T) -> Result<Option<T>, Infallible> {
        Ok(match self.parents.get(item) {
            Some(p) => Some(p.clone()),
            None if self.top.contains(item) => self.root.clone(),
            None => None,
        })
    }
}
