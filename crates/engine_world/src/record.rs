//! Registry-owned entity records.
//!
//! Only the world touches these. Component instances and the mutable
//! per-entity state live behind `RefCell` so message dispatch can run
//! against a shared world reference: the handler borrows its own
//! component mutably while reaching siblings through fresh borrows.
//! Single-threaded by design; a borrow conflict means reentrancy and is
//! surfaced as an error at the dispatch boundary, never a panic.

use std::cell::RefCell;
use std::collections::HashSet;

use engine_component::{Component, ComponentTypeId};

use crate::description::EntityKind;
use crate::prototype::PrototypeLink;

/// One attached component instance.
pub(crate) struct ComponentCell {
    pub(crate) type_id: ComponentTypeId,
    pub(crate) component: RefCell<Box<dyn Component>>,
}

/// Mutable per-entity state, kept apart from the component list so it can
/// be updated through a shared world reference.
#[derive(Debug, Default)]
pub(crate) struct EntityState {
    pub(crate) name: String,
    pub(crate) tag: String,
    /// Construction is finished; `PostInit` has fired.
    pub(crate) finished: bool,
    /// Back-link to a prototype, when this entity is an instance.
    pub(crate) link: Option<PrototypeLink>,
    /// Keys this prototype propagates. Always a subset of the
    /// prototype's own property keys. Empty for non-prototypes.
    pub(crate) shared: HashSet<String>,
    /// Live instances linked to this prototype. Empty for
    /// non-prototypes; pruned lazily when instances die.
    pub(crate) instances: Vec<engine_entity::EntityHandle>,
}

/// The registry record for one entity.
pub(crate) struct EntityRecord {
    pub(crate) kind: EntityKind,
    /// Components in build (dependency) order. Structural changes go
    /// through `&mut World`; dispatch only ever iterates.
    pub(crate) components: Vec<ComponentCell>,
    pub(crate) state: RefCell<EntityState>,
}

impl EntityRecord {
    /// Find the cell for a component type.
    pub(crate) fn cell(&self, type_id: ComponentTypeId) -> Option<&ComponentCell> {
        self.components.iter().find(|c| c.type_id == type_id)
    }

    /// Component type ids in build order.
    pub(crate) fn component_types(&self) -> Vec<ComponentTypeId> {
        self.components.iter().map(|c| c.type_id).collect()
    }
}
