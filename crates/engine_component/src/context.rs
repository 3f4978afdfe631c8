//! Message-handler context — how components reach the rest of the world.
//!
//! Handlers never receive references to sibling components. They receive a
//! [`MessageContext`] that carries the owner's handle and a [`WorldAccess`]
//! view, so every sibling interaction goes back through the world's
//! registry and property layer. This is the indirection that lets
//! components be added, removed, or replaced at runtime without dangling
//! references.

use engine_entity::EntityHandle;
use engine_property::{PropertyError, PropertyValue, ValueKind};

use crate::message::{Message, MessageResult};

/// The slice of world behaviour visible from inside a message handler.
///
/// Implemented by the world; defined here so components do not depend on
/// the world crate. Property access through this trait runs in engine
/// context — components are trusted engine code, not tooling.
pub trait WorldAccess {
    /// Read a property (component field or entity attribute) by key.
    fn property_value(
        &self,
        entity: EntityHandle,
        key: &str,
    ) -> Result<PropertyValue, PropertyError>;

    /// Write a property by key.
    fn set_property_value(
        &self,
        entity: EntityHandle,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyError>;

    /// Synchronously dispatch a message to another entity.
    fn post(&self, entity: EntityHandle, message: &Message) -> MessageResult;

    /// Request deferred destruction of an entity.
    fn request_destroy(&self, entity: EntityHandle);
}

/// Context handed to [`crate::Component::handle_message`].
pub struct MessageContext<'a> {
    owner: EntityHandle,
    world: &'a dyn WorldAccess,
}

impl<'a> MessageContext<'a> {
    /// Build a context for one dispatch. Called by the world.
    #[must_use]
    pub fn new(owner: EntityHandle, world: &'a dyn WorldAccess) -> Self {
        Self { owner, world }
    }

    /// The entity this component is attached to.
    #[must_use]
    pub fn owner(&self) -> EntityHandle {
        self.owner
    }

    /// Read one of the owner's properties by key (any component or
    /// attribute of the owner, not just the handling component).
    pub fn property(&self, key: &str) -> Result<PropertyValue, PropertyError> {
        self.world.property_value(self.owner, key)
    }

    /// Typed convenience over [`MessageContext::property`].
    pub fn property_as<T: ValueKind>(&self, key: &str) -> Result<T, PropertyError> {
        self.property(key)?.get::<T>()
    }

    /// Write one of the owner's properties by key.
    pub fn set_property(&self, key: &str, value: PropertyValue) -> Result<(), PropertyError> {
        self.world.set_property_value(self.owner, key, value)
    }

    /// Read a property of another entity.
    pub fn property_of(
        &self,
        entity: EntityHandle,
        key: &str,
    ) -> Result<PropertyValue, PropertyError> {
        self.world.property_value(entity, key)
    }

    /// Write a property of another entity.
    pub fn set_property_of(
        &self,
        entity: EntityHandle,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        self.world.set_property_value(entity, key, value)
    }

    /// Dispatch a message to another entity and block on its result.
    pub fn post(&self, entity: EntityHandle, message: &Message) -> MessageResult {
        self.world.post(entity, message)
    }

    /// Enqueue an entity for deferred destruction.
    ///
    /// Destruction never happens inside a dispatch; the queue is drained
    /// once per tick, so a handler can request it for any entity —
    /// including its own owner — without pulling state out from under an
    /// in-flight handler.
    pub fn request_destroy(&self, entity: EntityHandle) {
        self.world.request_destroy(entity);
    }
}
