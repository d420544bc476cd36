#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type ItemMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type ItemMap<K, V> = BTreeMap<K, V>;

/// Item → first flat position lookup, rebuilt after every flatten.
pub(crate) type ItemIndexMap<T> = ItemMap<T, usize>;

/// Bound for item handles stored in the tree.
///
/// Handles are compared for identity only. With `feature = "std"` this is `Clone + Hash + Eq`,
/// otherwise `Clone + Ord`.
#[cfg(feature = "std")]
pub trait ItemHandle: Clone + core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<T: Clone + core::hash::Hash + Eq> ItemHandle for T {}

#[cfg(not(feature = "std"))]
pub trait ItemHandle: Clone + Ord {}
#[cfg(not(feature = "std"))]
impl<T: Clone + Ord> ItemHandle for T {}
