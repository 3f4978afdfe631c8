//! World-level error types.

use engine_component::DependencyError;
use engine_entity::EntityHandle;
use engine_property::PropertyError;

/// Errors raised by world operations.
///
/// `Validation` and `Dependency` abort only the single creation call that
/// raised them, rolling back nothing because nothing has been constructed
/// yet. `StaleHandle` and the wrapped property errors recover locally: the
/// operation is a no-op and the caller gets the error back.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Malformed entity description or wrong-kind argument.
    #[error("invalid entity description: {message}")]
    Validation { message: String },

    /// Cyclic or unsatisfiable component dependency.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// The handle does not resolve to a live entity.
    #[error("entity {0} does not exist")]
    StaleHandle(EntityHandle),

    /// A reflection-layer failure (type mismatch, denied access, parse
    /// failure, unknown key).
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// The entity has no component of the requested concrete type.
    #[error("entity {entity} has no component of the requested type")]
    MissingComponent { entity: EntityHandle },

    /// Saved-record encoding or decoding failed.
    #[error("serialisation error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl WorldError {
    /// Shorthand for a [`WorldError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        WorldError::Validation {
            message: message.into(),
        }
    }
}
