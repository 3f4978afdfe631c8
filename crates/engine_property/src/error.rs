//! Reflection-layer error types.

use engine_entity::EntityHandle;

use crate::access::AccessContext;
use crate::value::PropertyType;

/// Errors produced by generic property access.
///
/// All of these recover locally: the operation that raised one is a no-op,
/// the caller gets the error back, and nothing else is affected.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// A typed access named a different type than the registered slot.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: PropertyType,
        found: PropertyType,
    },

    /// The caller's context lacks the flag the operation requires.
    #[error("access to '{key}' denied for {context} context")]
    AccessDenied { key: String, context: AccessContext },

    /// The canonical text form did not parse as the registered type.
    #[error("cannot parse '{text}' as {ty}")]
    Parse { ty: PropertyType, text: String },

    /// No property with the given key is registered on the target.
    #[error("no property named '{key}'")]
    UnknownProperty { key: String },

    /// The target entity no longer exists (or the handle is null).
    #[error("entity {0} does not exist")]
    StaleHandle(EntityHandle),

    /// The component holding the property is executing a handler right
    /// now; the access would alias its exclusive borrow.
    #[error("property '{key}' is busy in an in-flight dispatch")]
    Busy { key: String },

    /// A descriptor was applied to a component instance of the wrong
    /// concrete type. Indicates a registration bug, not a caller error.
    #[error("property '{key}' applied to a component of the wrong type")]
    WrongComponent { key: String },
}
