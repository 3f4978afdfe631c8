//! The [`World`] — entity lifecycle, message dispatch, and the deferred
//! destroy queue.
//!
//! The world is the single source of truth. Handles are read-only views;
//! every access re-queries the registry. Creation is two-phase
//! (`create_entity` → set initial properties → `finish_entity`), and
//! destruction is deferred to a queue drained once per tick, so a message
//! handler never sees a sibling or a target vanish mid-call.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;

use tracing::{debug, warn};

use engine_component::{
    resolve_build_order, Component, ComponentRegistry, ComponentTypeId, DependencyError, Message,
    MessageContext, MessageKind, MessageResult, WorldAccess,
};
use engine_entity::{EntityHandle, HandleRegistry};
use engine_property::{AccessContext, PropertyError, PropertyValue};

use crate::description::{EntityBuilder, EntityDescription, EntityKind};
use crate::error::WorldError;
use crate::record::{ComponentCell, EntityRecord, EntityState};

/// The entity manager.
///
/// Owns the entity registry and the component type registry. All ECS
/// operations run on one logical update thread; nothing here locks.
pub struct World {
    registry: ComponentRegistry,
    pub(crate) entities: HandleRegistry<EntityRecord>,
    destroy_queue: RefCell<Vec<EntityHandle>>,
}

impl World {
    /// Create a world over a populated component type registry.
    ///
    /// The registry is passed in explicitly — there is no global manager
    /// — and is read-only from here on.
    #[must_use]
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            entities: HandleRegistry::new(),
            destroy_queue: RefCell::new(Vec::new()),
        }
    }

    /// The component type registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Returns `true` if the handle resolves to a live entity.
    #[must_use]
    pub fn exists(&self, handle: EntityHandle) -> bool {
        self.entities.contains(handle)
    }

    /// Number of live entities (finished or not).
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Snapshot of all live entity handles.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityHandle> {
        self.entities.handles()
    }

    /// Whether the entity has finished construction.
    pub fn is_finished(&self, handle: EntityHandle) -> Result<bool, WorldError> {
        Ok(self.record(handle)?.state.borrow().finished)
    }

    /// The entity's name.
    pub fn name(&self, handle: EntityHandle) -> Result<String, WorldError> {
        Ok(self.record(handle)?.state.borrow().name.clone())
    }

    /// The entity's free-form tag.
    pub fn tag(&self, handle: EntityHandle) -> Result<String, WorldError> {
        Ok(self.record(handle)?.state.borrow().tag.clone())
    }

    /// The entity's kind.
    pub fn kind(&self, handle: EntityHandle) -> Result<EntityKind, WorldError> {
        Ok(self.record(handle)?.kind)
    }

    /// The entity's component types, in build order.
    pub fn component_types(
        &self,
        handle: EntityHandle,
    ) -> Result<Vec<ComponentTypeId>, WorldError> {
        Ok(self.record(handle)?.component_types())
    }

    // -- Entity lifecycle --

    /// Build an entity from a description.
    ///
    /// Resolves the dependency order, constructs every component through
    /// its registered factory, and runs `init` hooks in that order. All
    /// validation and dependency failures surface before the first
    /// component is constructed, so a failed call leaves no trace.
    ///
    /// The returned token keeps the entity in its construction window:
    /// `INIT`-flagged properties are settable until
    /// [`World::finish_entity`] consumes the token.
    pub fn create_entity(
        &mut self,
        description: &EntityDescription,
    ) -> Result<EntityBuilder, WorldError> {
        let order = resolve_build_order(&self.registry, description.components()).map_err(
            |err| match err {
                DependencyError::Duplicate(_) | DependencyError::Unknown(_) => {
                    WorldError::validation(err.to_string())
                }
                other => WorldError::Dependency(other),
            },
        )?;

        let mut components = Vec::with_capacity(order.len());
        for &type_id in &order {
            let spec = self
                .registry
                .get(type_id)
                .ok_or(DependencyError::Unknown(type_id))?;
            components.push(ComponentCell {
                type_id,
                component: RefCell::new(spec.create()),
            });
        }

        // A fresh prototype shares everything it exposes.
        let shared = if description.entity_kind() == EntityKind::Prototype {
            self.serializable_keys(&order)
        } else {
            HashSet::new()
        };

        let handle = self.entities.insert(EntityRecord {
            kind: description.entity_kind(),
            components,
            state: RefCell::new(EntityState {
                name: description.entity_name().to_string(),
                tag: description.entity_tag().to_string(),
                finished: false,
                link: None,
                shared,
                instances: Vec::new(),
            }),
        });

        if let Some(record) = self.entities.get(handle) {
            for cell in &record.components {
                cell.component.borrow_mut().init();
            }
        }

        debug!(entity = %handle, name = description.entity_name(), "entity created");
        Ok(EntityBuilder { handle })
    }

    /// Finish an entity's construction: close the `INIT` window and fire
    /// `PostInit`. From here the entity is live and visible to
    /// broadcasts.
    pub fn finish_entity(&self, builder: EntityBuilder) -> EntityHandle {
        let handle = builder.handle;
        let Some(record) = self.entities.get(handle) else {
            // Destroyed while under construction; nothing left to finish.
            return handle;
        };
        record.state.borrow_mut().finished = true;
        self.post_message(handle, &Message::new(MessageKind::PostInit));
        debug!(entity = %handle, "entity finished");
        handle
    }

    /// Request destruction of an entity.
    ///
    /// Never destroys immediately: the entity is queued and torn down by
    /// the next [`World::process_destroy_queue`], so in-flight dispatch
    /// can never observe a sibling vanishing. A stale handle is a warned
    /// no-op.
    pub fn destroy_entity(&self, handle: EntityHandle) {
        if !self.entities.contains(handle) {
            warn!(entity = %handle, "destroy requested for a dead entity");
            return;
        }
        let mut queue = self.destroy_queue.borrow_mut();
        if !queue.contains(&handle) {
            queue.push(handle);
        }
    }

    /// Drain the destroy queue.
    ///
    /// Called once per tick, at a point where no dispatch is in flight.
    /// Each queued entity gets `Destroy`, then its components are cleaned
    /// in reverse build order, then the registry slot is freed — from
    /// that moment every outstanding handle to it is permanently stale.
    ///
    /// Destruction requested by a `Destroy` handler lands in the queue
    /// for the *next* drain. Calling this with an empty queue is a no-op.
    pub fn process_destroy_queue(&mut self) {
        let queued: Vec<EntityHandle> = self.destroy_queue.borrow_mut().drain(..).collect();
        for handle in queued {
            let Some(record) = self.entities.get(handle) else {
                continue;
            };
            let kind = record.kind;
            let (link_prototype, instances) = {
                let state = record.state.borrow();
                (
                    state.link.as_ref().map(|l| l.prototype),
                    state.instances.clone(),
                )
            };

            self.post_message(handle, &Message::new(MessageKind::Destroy));

            // A dying prototype silently unlinks its instances; they keep
            // their last values.
            if kind == EntityKind::Prototype {
                for instance in instances {
                    if let Some(rec) = self.entities.get(instance) {
                        rec.state.borrow_mut().link = None;
                    }
                }
            }
            // A dying instance disappears from its prototype's list.
            if let Some(prototype) = link_prototype {
                if let Some(rec) = self.entities.get(prototype) {
                    rec.state.borrow_mut().instances.retain(|&i| i != handle);
                }
            }

            if let Some(record) = self.entities.remove(handle) {
                for cell in record.components.iter().rev() {
                    cell.component.borrow_mut().clean();
                }
            }
            debug!(entity = %handle, "entity destroyed");
        }
    }

    // -- Message dispatch --

    /// Dispatch a message to one entity.
    ///
    /// A stale or null handle yields `Ignored` with no side effects. The
    /// entity's components handle the message in build order; a handler
    /// failure is contained here and combined in as `Error` — it never
    /// unwinds through the dispatch loop.
    pub fn post_message(&self, handle: EntityHandle, message: &Message) -> MessageResult {
        let Some(record) = self.entities.get(handle) else {
            return MessageResult::Ignored;
        };
        self.dispatch(handle, record, message)
    }

    /// Dispatch a message to every live, finished entity.
    ///
    /// Iterates a snapshot taken before the first handler runs, so the
    /// broadcast is never affected by what handlers do to the world
    /// mid-iteration.
    pub fn broadcast_message(&self, message: &Message) -> MessageResult {
        let mut result = MessageResult::Ignored;
        for handle in self.entities.handles() {
            let Some(record) = self.entities.get(handle) else {
                continue;
            };
            if !record.state.borrow().finished {
                continue;
            }
            result = result.combine(self.dispatch(handle, record, message));
        }
        result
    }

    fn dispatch(
        &self,
        handle: EntityHandle,
        record: &EntityRecord,
        message: &Message,
    ) -> MessageResult {
        let mut result = MessageResult::Ignored;
        for cell in &record.components {
            match cell.component.try_borrow_mut() {
                Ok(mut component) => {
                    let ctx = MessageContext::new(handle, self);
                    result = result.combine(component.handle_message(&ctx, message));
                }
                Err(_) => {
                    // Reentrant dispatch into a component that is already
                    // handling a message.
                    warn!(
                        entity = %handle,
                        component = %self.registry.name_of(cell.type_id),
                        "reentrant message dispatch refused"
                    );
                    result = result.combine(MessageResult::Error);
                }
            }
        }
        result
    }

    // -- Typed component access --

    /// Borrow a component of the entity by concrete type.
    pub fn component<C: Component>(&self, handle: EntityHandle) -> Result<Ref<'_, C>, WorldError> {
        let record = self.record(handle)?;
        for cell in &record.components {
            let Ok(borrow) = cell.component.try_borrow() else {
                continue;
            };
            if let Ok(typed) = Ref::filter_map(borrow, |c| c.downcast_ref::<C>()) {
                return Ok(typed);
            }
        }
        Err(WorldError::MissingComponent { entity: handle })
    }

    /// Exclusively borrow a component of the entity by concrete type.
    pub fn component_mut<C: Component>(
        &self,
        handle: EntityHandle,
    ) -> Result<RefMut<'_, C>, WorldError> {
        let record = self.record(handle)?;
        for cell in &record.components {
            let Ok(borrow) = cell.component.try_borrow_mut() else {
                continue;
            };
            if let Ok(typed) = RefMut::filter_map(borrow, |c| c.downcast_mut::<C>()) {
                return Ok(typed);
            }
        }
        Err(WorldError::MissingComponent { entity: handle })
    }

    // -- Runtime component add/remove --

    /// Attach a component to a live entity.
    ///
    /// The type's declared dependencies must already be present; the new
    /// component goes to the end of the build order (which keeps the
    /// order a valid topological one) and is initialised immediately.
    pub fn add_component(
        &mut self,
        handle: EntityHandle,
        type_id: ComponentTypeId,
    ) -> Result<(), WorldError> {
        let (instance, dependencies, name) = {
            let spec = self.registry.get(type_id).ok_or_else(|| {
                WorldError::validation(format!("unknown component type {type_id}"))
            })?;
            (spec.create(), spec.dependencies().to_vec(), spec.name())
        };

        let record = self.record(handle)?;
        if record.cell(type_id).is_some() {
            return Err(WorldError::validation(format!(
                "entity already has component '{name}'"
            )));
        }
        for dep in &dependencies {
            if record.cell(*dep).is_none() {
                return Err(WorldError::Dependency(DependencyError::Unsatisfied {
                    component: name.to_string(),
                    requires: self.registry.name_of(*dep),
                }));
            }
        }

        let record = self
            .entities
            .get_mut(handle)
            .ok_or(WorldError::StaleHandle(handle))?;
        record.components.push(ComponentCell {
            type_id,
            component: RefCell::new(instance),
        });
        if let Some(cell) = record.components.last() {
            cell.component.borrow_mut().init();
        }
        debug!(entity = %handle, component = name, "component added");
        Ok(())
    }

    /// Detach a component from a live entity.
    ///
    /// Refused while another present component declares a dependency on
    /// it. The component is cleaned before it is dropped. On a prototype,
    /// shared keys that belonged to the removed component stop being
    /// shared.
    pub fn remove_component(
        &mut self,
        handle: EntityHandle,
        type_id: ComponentTypeId,
    ) -> Result<(), WorldError> {
        let name = self.registry.name_of(type_id);
        let record = self.record(handle)?;
        if record.cell(type_id).is_none() {
            return Err(WorldError::validation(format!(
                "entity has no component '{name}'"
            )));
        }
        for cell in &record.components {
            if cell.type_id == type_id {
                continue;
            }
            if let Some(spec) = self.registry.get(cell.type_id) {
                if spec.dependencies().contains(&type_id) {
                    return Err(WorldError::validation(format!(
                        "component '{name}' is required by '{}'",
                        spec.name()
                    )));
                }
            }
        }

        let removed_keys: Vec<String> = self
            .registry
            .get(type_id)
            .map(|spec| {
                spec.properties()
                    .iter()
                    .map(|p| p.key().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let record = self
            .entities
            .get_mut(handle)
            .ok_or(WorldError::StaleHandle(handle))?;
        if let Some(index) = record.components.iter().position(|c| c.type_id == type_id) {
            let cell = record.components.remove(index);
            cell.component.borrow_mut().clean();
        }
        let mut state = record.state.borrow_mut();
        for key in &removed_keys {
            state.shared.remove(key);
        }
        drop(state);
        debug!(entity = %handle, component = name, "component removed");
        Ok(())
    }

    // -- Internal plumbing --

    pub(crate) fn record(&self, handle: EntityHandle) -> Result<&EntityRecord, WorldError> {
        self.entities
            .get(handle)
            .ok_or(WorldError::StaleHandle(handle))
    }

    /// All non-transient property keys exposed by a component set.
    pub(crate) fn serializable_keys(&self, types: &[ComponentTypeId]) -> HashSet<String> {
        let mut keys = HashSet::new();
        for &type_id in types {
            if let Some(spec) = self.registry.get(type_id) {
                for descriptor in spec.properties() {
                    if !descriptor
                        .access()
                        .contains(engine_property::PropertyAccess::TRANSIENT)
                    {
                        keys.insert(descriptor.key().to_string());
                    }
                }
            }
        }
        keys
    }
}

impl WorldAccess for World {
    fn property_value(
        &self,
        entity: EntityHandle,
        key: &str,
    ) -> Result<PropertyValue, PropertyError> {
        self.read_property(entity, key)
    }

    fn set_property_value(
        &self,
        entity: EntityHandle,
        key: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyError> {
        self.write_property(entity, key, value, AccessContext::Engine)
    }

    fn post(&self, entity: EntityHandle, message: &Message) -> MessageResult {
        self.post_message(entity, message)
    }

    fn request_destroy(&self, entity: EntityHandle) {
        self.destroy_entity(entity);
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("component_types", &self.registry.len())
            .field("destroy_queue", &self.destroy_queue.borrow().len())
            .finish()
    }
}
