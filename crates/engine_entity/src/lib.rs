//! # engine_entity
//!
//! Entity identity for the engine core — handles and the slot registry
//! they resolve against.
//!
//! This crate provides:
//!
//! - [`EntityHandle`] — a `{index, generation}` reference token that is
//!   safe to hold past the referenced entity's destruction.
//! - [`HandleRegistry`] — a generation-tagged slot array; the single
//!   source of truth for which handles are alive.
//!
//! Handles never dereference memory directly. Every access goes back
//! through the registry, and a destroyed slot's generation bump makes
//! all outstanding handles to it resolve to nothing in O(1).

pub mod handle;
pub mod registry;

pub use handle::EntityHandle;
pub use registry::HandleRegistry;
