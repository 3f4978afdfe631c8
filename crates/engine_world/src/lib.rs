//! # engine_world
//!
//! The entity manager — sole owner of the entity registry and the only
//! authority over entity and component lifetime.
//!
//! This crate provides:
//!
//! - [`World`] — creates and destroys entities, dispatches messages,
//!   drains the deferred-destroy queue, and drives prototype propagation.
//! - [`EntityDescription`] / [`EntityBuilder`] — two-phase construction:
//!   `create_entity` resolves dependency order and returns a token;
//!   `finish_entity` consumes it and fires `PostInit`.
//! - [`PropertyHolder`] — the uniform property access point over
//!   component fields and built-in entity attributes.
//! - Saved-entity records ([`SavedEntity`], [`SavedWorld`]) — the ordered
//!   `(component-type, {key: text})` persisted form.
//!
//! Everything here is single-threaded and cooperative: there is no
//! locking, and the only scheduling discipline is the unfinished-entity
//! window and the destroy queue drained once per tick.

pub mod description;
pub mod error;
pub mod holder;
pub mod prototype;
pub mod save;
pub mod world;

mod record;

#[cfg(test)]
pub(crate) mod testutil;

pub use description::{EntityBuilder, EntityDescription, EntityKind};
pub use error::WorldError;
pub use holder::{PropertyHolder, PropertyTarget};
pub use prototype::PrototypeLink;
pub use save::{SavedComponent, SavedEntity, SavedWorld};
pub use world::World;
