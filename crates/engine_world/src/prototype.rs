//! Prototype linking — template entities propagating property values to
//! live instances.
//!
//! A prototype shares a subset of its property keys. Instantiating it
//! clones its component list and values into a new entity with a
//! back-link; from then on, [`World::update_prototype_instances`] pushes
//! every currently-shared value into each instance key that has not been
//! overridden. Overrides are per-instance, per-key; unlinking freezes the
//! current values and is irreversible for the session.

use std::collections::HashSet;

use tracing::warn;

use engine_entity::EntityHandle;
use engine_property::AccessContext;

use crate::description::{EntityDescription, EntityKind};
use crate::error::WorldError;
use crate::holder::PropertyTarget;
use crate::world::World;

/// An instance's back-link to its prototype.
#[derive(Debug, Clone)]
pub struct PrototypeLink {
    /// The prototype this entity was instantiated from.
    pub prototype: EntityHandle,
    /// Keys this instance has overridden; propagation skips them.
    pub overridden: HashSet<String>,
}

impl World {
    /// Clone a prototype into a new, linked instance.
    ///
    /// The instance gets the prototype's component list, property values,
    /// name, and tag; its override set starts empty (everything shared).
    /// The instance is finished before it is returned.
    pub fn instantiate_prototype(
        &mut self,
        prototype: EntityHandle,
    ) -> Result<EntityHandle, WorldError> {
        let (mut description, types) = {
            let record = self.record(prototype)?;
            if record.kind != EntityKind::Prototype {
                return Err(WorldError::validation(format!(
                    "entity {prototype} is not a prototype"
                )));
            }
            let state = record.state.borrow();
            (
                EntityDescription::new(state.name.clone()).tag(state.tag.clone()),
                record.component_types(),
            )
        };
        for &type_id in &types {
            description = description.component(type_id);
        }

        let builder = self.create_entity(&description)?;
        let instance = builder.handle();
        self.copy_component_values(prototype, instance, &types)?;

        if let Some(record) = self.entities.get(instance) {
            record.state.borrow_mut().link = Some(PrototypeLink {
                prototype,
                overridden: HashSet::new(),
            });
        }
        if let Some(record) = self.entities.get(prototype) {
            record.state.borrow_mut().instances.push(instance);
        }

        Ok(self.finish_entity(builder))
    }

    /// Push the prototype's shared property values into its instances.
    ///
    /// Called whenever a prototype property changes. Only keys currently
    /// marked shared move, and only into instances that have not
    /// overridden them. Dead instances are pruned from the list as a side
    /// effect.
    pub fn update_prototype_instances(&self, prototype: EntityHandle) -> Result<(), WorldError> {
        let record = self.record(prototype)?;
        if record.kind != EntityKind::Prototype {
            return Err(WorldError::validation(format!(
                "entity {prototype} is not a prototype"
            )));
        }
        let (shared, instances) = {
            let state = record.state.borrow();
            (
                state.shared.iter().cloned().collect::<Vec<_>>(),
                state.instances.clone(),
            )
        };

        let mut live = Vec::with_capacity(instances.len());
        for instance in instances {
            let Some(instance_record) = self.entities.get(instance) else {
                continue;
            };
            live.push(instance);
            let overridden = {
                let state = instance_record.state.borrow();
                match state.link.as_ref() {
                    Some(link) => link.overridden.clone(),
                    // Unlinked while listed; drop it below.
                    None => continue,
                }
            };
            for key in &shared {
                if overridden.contains(key) {
                    continue;
                }
                let value = match self.read_property(prototype, key) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!(prototype = %prototype, %key, %err, "shared key unreadable, skipped");
                        continue;
                    }
                };
                if let Err(err) =
                    self.write_property(instance, key, value, AccessContext::Engine)
                {
                    warn!(instance = %instance, %key, %err, "propagation write failed, skipped");
                }
            }
        }
        // Keep only instances that still exist and are still linked here.
        record.state.borrow_mut().instances = live
            .into_iter()
            .filter(|&i| {
                self.entities.get(i).is_some_and(|r| {
                    r.state
                        .borrow()
                        .link
                        .as_ref()
                        .is_some_and(|l| l.prototype == prototype)
                })
            })
            .collect();
        Ok(())
    }

    /// Sever an instance's link to its prototype.
    ///
    /// Current values freeze in place; the link cannot be re-established
    /// this session. Fails if the entity is not linked.
    pub fn unlink_entity_from_prototype(&self, handle: EntityHandle) -> Result<(), WorldError> {
        let record = self.record(handle)?;
        let link = record.state.borrow_mut().link.take();
        let Some(link) = link else {
            return Err(WorldError::validation(format!(
                "entity {handle} is not linked to a prototype"
            )));
        };
        if let Some(prototype) = self.entities.get(link.prototype) {
            prototype
                .state
                .borrow_mut()
                .instances
                .retain(|&i| i != handle);
        }
        Ok(())
    }

    /// Mark a prototype property key as shared or not.
    ///
    /// Only component property keys of the prototype itself can be shared
    /// — the shared set stays a subset of the prototype's property keys.
    pub fn set_property_shared(
        &self,
        prototype: EntityHandle,
        key: &str,
        shared: bool,
    ) -> Result<(), WorldError> {
        let record = self.record(prototype)?;
        if record.kind != EntityKind::Prototype {
            return Err(WorldError::validation(format!(
                "entity {prototype} is not a prototype"
            )));
        }
        let holder = self.property(prototype, key)?;
        if !matches!(holder.target(), PropertyTarget::Component(_)) {
            return Err(WorldError::validation(format!(
                "attribute '{key}' cannot be shared"
            )));
        }
        let mut state = record.state.borrow_mut();
        if shared {
            state.shared.insert(key.to_string());
        } else {
            state.shared.remove(key);
        }
        Ok(())
    }

    /// The prototype's shared keys, sorted.
    pub fn shared_properties(&self, prototype: EntityHandle) -> Result<Vec<String>, WorldError> {
        let record = self.record(prototype)?;
        let mut keys: Vec<String> = record.state.borrow().shared.iter().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Mark an instance property key as overridden, detaching it from
    /// propagation.
    pub fn mark_property_overridden(
        &self,
        handle: EntityHandle,
        key: &str,
    ) -> Result<(), WorldError> {
        // Resolving the key validates it exists on this entity.
        let _ = self.property(handle, key)?;
        let record = self.record(handle)?;
        let mut state = record.state.borrow_mut();
        match state.link.as_mut() {
            Some(link) => {
                link.overridden.insert(key.to_string());
                Ok(())
            }
            None => Err(WorldError::validation(format!(
                "entity {handle} is not linked to a prototype"
            ))),
        }
    }

    /// Re-attach an overridden instance key to propagation.
    ///
    /// The value catches up on the next
    /// [`World::update_prototype_instances`].
    pub fn clear_property_override(
        &self,
        handle: EntityHandle,
        key: &str,
    ) -> Result<(), WorldError> {
        let record = self.record(handle)?;
        let mut state = record.state.borrow_mut();
        match state.link.as_mut() {
            Some(link) => {
                link.overridden.remove(key);
                Ok(())
            }
            None => Err(WorldError::validation(format!(
                "entity {handle} is not linked to a prototype"
            ))),
        }
    }

    /// The instance's overridden keys, sorted.
    pub fn overridden_properties(&self, handle: EntityHandle) -> Result<Vec<String>, WorldError> {
        let record = self.record(handle)?;
        let state = record.state.borrow();
        let mut keys: Vec<String> = state
            .link
            .as_ref()
            .map(|l| l.overridden.iter().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    /// The prototype an entity is linked to, if any.
    pub fn prototype_of(&self, handle: EntityHandle) -> Result<Option<EntityHandle>, WorldError> {
        let record = self.record(handle)?;
        Ok(record.state.borrow().link.as_ref().map(|l| l.prototype))
    }

    /// Live instances linked to a prototype.
    pub fn instances_of(&self, prototype: EntityHandle) -> Result<Vec<EntityHandle>, WorldError> {
        let record = self.record(prototype)?;
        Ok(record
            .state
            .borrow()
            .instances
            .iter()
            .copied()
            .filter(|&i| self.entities.contains(i))
            .collect())
    }

    /// Clone an entity: components, values, link state, override set.
    ///
    /// Duplicating a prototype instance yields a new instance linked to
    /// the same prototype with an identical override set. Duplicating a
    /// prototype yields a new prototype with the same shared set and no
    /// instances.
    pub fn duplicate_entity(&mut self, handle: EntityHandle) -> Result<EntityHandle, WorldError> {
        let (mut description, types, link, shared, kind) = {
            let record = self.record(handle)?;
            let state = record.state.borrow();
            (
                EntityDescription::new(state.name.clone())
                    .kind(record.kind)
                    .tag(state.tag.clone()),
                record.component_types(),
                state.link.clone(),
                state.shared.clone(),
                record.kind,
            )
        };
        for &type_id in &types {
            description = description.component(type_id);
        }

        let builder = self.create_entity(&description)?;
        let duplicate = builder.handle();
        self.copy_component_values(handle, duplicate, &types)?;

        if let Some(link) = link {
            if let Some(record) = self.entities.get(duplicate) {
                record.state.borrow_mut().link = Some(link.clone());
            }
            if let Some(prototype) = self.entities.get(link.prototype) {
                prototype.state.borrow_mut().instances.push(duplicate);
            }
        }
        if kind == EntityKind::Prototype {
            if let Some(record) = self.entities.get(duplicate) {
                record.state.borrow_mut().shared = shared;
            }
        }

        Ok(self.finish_entity(builder))
    }

    /// Copy every property value of the listed component types from one
    /// entity to another, descriptor by descriptor. Engine-internal: no
    /// flag checks, no override marking.
    fn copy_component_values(
        &self,
        from: EntityHandle,
        to: EntityHandle,
        types: &[engine_component::ComponentTypeId],
    ) -> Result<(), WorldError> {
        let from_record = self.record(from)?;
        let to_record = self.record(to)?;
        for &type_id in types {
            let (Some(from_cell), Some(to_cell)) =
                (from_record.cell(type_id), to_record.cell(type_id))
            else {
                continue;
            };
            let Some(spec) = self.registry().get(type_id) else {
                continue;
            };
            for descriptor in spec.properties() {
                let value = {
                    let borrow = from_cell.component.try_borrow().map_err(|_| {
                        engine_property::PropertyError::Busy {
                            key: descriptor.key().to_string(),
                        }
                    })?;
                    let component: &dyn engine_component::Component = &**borrow;
                    descriptor.get(component)?
                };
                let mut borrow = to_cell.component.try_borrow_mut().map_err(|_| {
                    engine_property::PropertyError::Busy {
                        key: descriptor.key().to_string(),
                    }
                })?;
                let component: &mut dyn engine_component::Component = &mut **borrow;
                descriptor.set(component, value)?;
            }
        }
        Ok(())
    }
}
