//! # engine_component
//!
//! The component model of the engine core — defines what a component is,
//! how a component type is registered, and how components talk to each
//! other without ever holding references to one another.
//!
//! This crate provides:
//!
//! - [`Component`] trait — lifecycle hooks and message handling for all
//!   ECS data/behaviour units.
//! - [`ComponentTypeId`] — deterministic string-derived type identifiers.
//! - [`ComponentSpec`] / [`ComponentRegistry`] — the static per-type table
//!   built at registration: factory, dependency list, property
//!   descriptors.
//! - [`Message`] / [`MessageResult`] — the typed, synchronous request
//!   dispatched to one or all entities.
//! - [`resolve_build_order`] — stable topological ordering of a requested
//!   component set by declared dependencies.

pub mod component;
pub mod context;
pub mod dependency;
pub mod message;
pub mod spec;

pub use component::{Component, ComponentTypeId};
pub use context::{MessageContext, WorldAccess};
pub use dependency::{resolve_build_order, DependencyError};
pub use message::{Message, MessageKind, MessageResult};
pub use spec::{ComponentRegistry, ComponentSpec, RegistryError};
