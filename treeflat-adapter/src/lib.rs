//! Adapter utilities for the `treeflat` crate.
//!
//! The `treeflat` crate is UI-agnostic and only keeps the tree and its flat projection. This crate
//! provides small, framework-neutral pieces an adapter to a concrete list widget needs:
//!
//! - A [`Controller`] that binds a [`treeflat::TreeList`] to one display [`Surface`] at a time and
//!   tells it when to redraw
//! - A [`Renderer`] seam turning one row into a visual, with reuse of the previous visual
//! - Item anchoring (keep the selection or the first visible row across edits)
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod error;
mod surface;


pub use anchor::ItemAnchor;
pub use controller::Controller;
pub use error::Error;
pub use surface::{Renderer, Surface};
