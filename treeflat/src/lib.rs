//! A headless engine that keeps a lazily expanded tree and its flat, list-ready projection in sync.
//!
//! For display-surface utilities (attachment, rendering, anchoring), see the `treeflat-adapter`
//! crate.
//!
//! This crate focuses on the algorithms a tree view built on top of a virtualized list needs:
//! lazy child materialization, pre-order flattening, exclusive vs. concurrent expansion,
//! revealing a deeply nested item, and positional edits (toggle, swap, insert, delete) that keep
//! the tree and its projection consistent.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`DataSource`] answering "is this expandable", "what are its children", "what is its parent"
//! - a list surface that re-pulls `count`/rows after each change
//! - a renderer that turns one row ([`FlatEntry`]) into a visual
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod builder;
mod flatten;
mod key;
mod node;
mod options;
mod projection;
mod source;
mod state;
mod tree_list;
mod types;

#[cfg(test)]
mod tests;

pub use key::ItemHandle;
pub use node::{NodeId, NodeRef};
pub use options::{OnChangeCallback, TreeListOptions};
pub use projection::Projection;
pub use source::{DataSource, MemorySource};
pub use state::ExpansionState;
pub use tree_list::TreeList;
pub use types::{FlatEntry, ItemInfo, NestMode, ParentLocator, Revealed};
