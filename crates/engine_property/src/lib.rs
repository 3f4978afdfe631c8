//! # engine_property
//!
//! The reflection layer — uniform, string-keyed, typed, access-controlled
//! access to component fields and entity attributes.
//!
//! This crate provides:
//!
//! - [`PropertyValue`] / [`PropertyType`] — the erased value carried through
//!   every generic access, with a canonical text form for serialisation and
//!   editors.
//! - [`PropertyAccess`] — the permission bitmask declared per property.
//! - [`AccessContext`] — who is asking (engine, init window, editor,
//!   script); checked against the bitmask on every read and write.
//! - [`PropertyDescriptor`] — one registered slot per component type and
//!   key, holding type-erased accessors built from statically typed ones.
//!
//! Serialisation, the editor, and the scripting host all consume this layer
//! instead of the concrete component types, so a property's
//! name/comment/type/access metadata is a hard contract.

pub mod access;
pub mod descriptor;
pub mod error;
pub mod value;

pub use access::{AccessContext, PropertyAccess};
pub use descriptor::PropertyDescriptor;
pub use error::PropertyError;
pub use value::{PropertyType, PropertyValue, ValueKind};
