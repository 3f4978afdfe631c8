//! Entity descriptions and the two-phase construction token.

use engine_component::ComponentTypeId;
use engine_entity::EntityHandle;
use serde::{Deserialize, Serialize};

/// What kind of entity a description builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EntityKind {
    /// An ordinary entity.
    #[default]
    Normal,
    /// A template entity whose properties propagate to linked instances.
    Prototype,
    /// An ordinary entity that is never serialised.
    Transient,
}

/// A request to build an entity: name, kind, tag, and the component types
/// to attach.
///
/// The component list is validated and dependency-ordered by
/// [`crate::World::create_entity`]; declaration order here only breaks
/// ties between components with no dependency relation.
#[derive(Debug, Clone)]
pub struct EntityDescription {
    name: String,
    kind: EntityKind,
    tag: String,
    components: Vec<ComponentTypeId>,
}

impl EntityDescription {
    /// Start a description for an entity with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntityKind::Normal,
            tag: String::new(),
            components: Vec::new(),
        }
    }

    /// Set the entity kind.
    #[must_use]
    pub fn kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the free-form tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Request a component type.
    #[must_use]
    pub fn component(mut self, type_id: ComponentTypeId) -> Self {
        self.components.push(type_id);
        self
    }

    /// The requested name.
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.name
    }

    /// The requested kind.
    #[must_use]
    pub fn entity_kind(&self) -> EntityKind {
        self.kind
    }

    /// The requested tag.
    #[must_use]
    pub fn entity_tag(&self) -> &str {
        &self.tag
    }

    /// The requested component types, in declaration order.
    #[must_use]
    pub fn components(&self) -> &[ComponentTypeId] {
        &self.components
    }
}

/// Token for an entity that exists but has not finished construction.
///
/// Returned by [`crate::World::create_entity`]; consumed by
/// [`crate::World::finish_entity`], which fires `PostInit` and makes the
/// entity visible to broadcasts. Between the two calls the caller may set
/// `INIT`-flagged properties through the property layer. The two phases
/// are visible in the type system instead of relying on caller
/// discipline.
#[must_use = "an unfinished entity is invisible to broadcasts until finish_entity is called"]
#[derive(Debug)]
pub struct EntityBuilder {
    pub(crate) handle: EntityHandle,
}

impl EntityBuilder {
    /// The handle of the entity under construction, for setting initial
    /// properties.
    #[must_use]
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }
}
