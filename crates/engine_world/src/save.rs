//! Saved-entity records — the persisted form of the registry.
//!
//! An entity serialises as an ordered list of `(component-type,
//! {property-key: text-value})` records plus its attributes and link
//! state. Values use the canonical property text form; `TRANSIENT`
//! properties and `Transient`-kind entities never appear. Loading applies
//! `INIT`-flagged values inside the construction window, in the same
//! dependency order used for live construction, before the entity
//! finishes.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use engine_entity::EntityHandle;
use engine_property::{AccessContext, PropertyAccess, PropertyValue};

use crate::description::{EntityDescription, EntityKind};
use crate::error::WorldError;
use crate::holder::PropertyTarget;
use crate::prototype::PrototypeLink;
use crate::world::World;

/// One component's saved properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedComponent {
    /// The registered component type name.
    pub component: String,
    /// Property key → canonical text value. Sorted for stable output.
    pub properties: BTreeMap<String, String>,
}

/// One entity's saved record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEntity {
    /// The packed entity id at save time. Only used to resolve links
    /// between records in the same save; fresh handles are allocated on
    /// load.
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub tag: String,
    pub kind: EntityKind,
    /// Saved id of the linked prototype, if this entity was an instance.
    #[serde(default)]
    pub prototype: Option<u64>,
    /// Overridden keys, if this entity was an instance.
    #[serde(default)]
    pub overridden: Vec<String>,
    /// Shared keys, if this entity is a prototype.
    #[serde(default)]
    pub shared: Vec<String>,
    /// Components in build order.
    pub components: Vec<SavedComponent>,
}

/// A whole world's saved records. Prototypes come first so links resolve
/// in one forward pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedWorld {
    pub entities: Vec<SavedEntity>,
}

impl SavedWorld {
    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Decode from JSON.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl World {
    /// Serialise one entity.
    ///
    /// `Transient`-kind entities are refused; `TRANSIENT` properties are
    /// skipped.
    pub fn save_entity(&self, handle: EntityHandle) -> Result<SavedEntity, WorldError> {
        let record = self.record(handle)?;
        if record.kind == EntityKind::Transient {
            return Err(WorldError::validation(format!(
                "transient entity {handle} is never serialised"
            )));
        }

        let mut components = Vec::with_capacity(record.components.len());
        for cell in &record.components {
            let Some(spec) = self.registry().get(cell.type_id) else {
                continue;
            };
            let mut properties = BTreeMap::new();
            for descriptor in spec.properties() {
                if descriptor.access().contains(PropertyAccess::TRANSIENT) {
                    continue;
                }
                let value = self.read_target(
                    handle,
                    record,
                    PropertyTarget::Component(cell.type_id),
                    descriptor.key(),
                )?;
                properties.insert(descriptor.key().to_string(), value.to_text());
            }
            components.push(SavedComponent {
                component: spec.name().to_string(),
                properties,
            });
        }

        let state = record.state.borrow();
        let mut overridden: Vec<String> = state
            .link
            .as_ref()
            .map(|l| l.overridden.iter().cloned().collect())
            .unwrap_or_default();
        overridden.sort();
        let mut shared: Vec<String> = state.shared.iter().cloned().collect();
        shared.sort();

        Ok(SavedEntity {
            id: handle.id(),
            name: state.name.clone(),
            tag: state.tag.clone(),
            kind: record.kind,
            prototype: state.link.as_ref().map(|l| l.prototype.id()),
            overridden,
            shared,
            components,
        })
    }

    /// Rebuild an entity from a saved record.
    ///
    /// `remap` translates saved prototype ids to live handles; a link
    /// whose prototype is not in the map is dropped with a warning (the
    /// entity keeps its values, unlinked). The entity goes through the
    /// normal two-phase construction: `INIT`-flagged values are applied
    /// inside the construction window, everything else after, then the
    /// entity finishes and `PostInit` fires.
    pub fn load_entity(
        &mut self,
        saved: &SavedEntity,
        remap: &HashMap<u64, EntityHandle>,
    ) -> Result<EntityHandle, WorldError> {
        let mut description = EntityDescription::new(saved.name.clone())
            .kind(saved.kind)
            .tag(saved.tag.clone());
        for component in &saved.components {
            let spec = self
                .registry()
                .get_by_name(&component.component)
                .ok_or_else(|| {
                    WorldError::validation(format!(
                        "unknown component type '{}'",
                        component.component
                    ))
                })?;
            description = description.component(spec.type_id());
        }

        let builder = self.create_entity(&description)?;
        let handle = builder.handle();
        self.apply_saved_properties(handle, saved, true)?;
        self.apply_saved_properties(handle, saved, false)?;

        if let Some(prototype_id) = saved.prototype {
            match remap.get(&prototype_id) {
                Some(&prototype) if self.exists(prototype) => {
                    if let Some(record) = self.entities.get(handle) {
                        record.state.borrow_mut().link = Some(PrototypeLink {
                            prototype,
                            overridden: saved.overridden.iter().cloned().collect(),
                        });
                    }
                    if let Some(record) = self.entities.get(prototype) {
                        record.state.borrow_mut().instances.push(handle);
                    }
                }
                _ => {
                    warn!(entity = %handle, prototype_id, "saved prototype missing, loading unlinked");
                }
            }
        }

        if saved.kind == EntityKind::Prototype {
            let universe = self.serializable_keys(&self.component_types(handle)?);
            let shared: HashSet<String> = saved
                .shared
                .iter()
                .filter(|key| universe.contains(*key))
                .cloned()
                .collect();
            if let Some(record) = self.entities.get(handle) {
                record.state.borrow_mut().shared = shared;
            }
        }

        Ok(self.finish_entity(builder))
    }

    /// Serialise every live, finished, non-transient entity. Prototypes
    /// are emitted first so [`World::load_world`] resolves links in one
    /// pass.
    pub fn save_world(&self) -> Result<SavedWorld, WorldError> {
        let mut prototypes = Vec::new();
        let mut others = Vec::new();
        for handle in self.entities() {
            let record = self.record(handle)?;
            if record.kind == EntityKind::Transient || !record.state.borrow().finished {
                continue;
            }
            let saved = self.save_entity(handle)?;
            if record.kind == EntityKind::Prototype {
                prototypes.push(saved);
            } else {
                others.push(saved);
            }
        }
        prototypes.extend(others);
        Ok(SavedWorld {
            entities: prototypes,
        })
    }

    /// Rebuild a saved world's entities, prototypes first.
    ///
    /// Returns the new handles in load order.
    pub fn load_world(&mut self, saved: &SavedWorld) -> Result<Vec<EntityHandle>, WorldError> {
        let mut remap = HashMap::new();
        let mut handles = Vec::with_capacity(saved.entities.len());
        for pass_prototypes in [true, false] {
            for entity in &saved.entities {
                if (entity.kind == EntityKind::Prototype) != pass_prototypes {
                    continue;
                }
                let handle = self.load_entity(entity, &remap)?;
                remap.insert(entity.id, handle);
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    /// Apply one of the two load passes: the `INIT` pass inside the
    /// construction window, then the general pass for everything else.
    fn apply_saved_properties(
        &self,
        handle: EntityHandle,
        saved: &SavedEntity,
        init_pass: bool,
    ) -> Result<(), WorldError> {
        let record = self.record(handle)?;
        // Walk the world's build order, not the saved order.
        for cell in &record.components {
            let Some(spec) = self.registry().get(cell.type_id) else {
                continue;
            };
            let Some(saved_component) = saved
                .components
                .iter()
                .find(|c| c.component == spec.name())
            else {
                continue;
            };
            for (key, text) in &saved_component.properties {
                let Some(descriptor) = spec.find_property(key) else {
                    warn!(entity = %handle, %key, "saved property no longer registered, skipped");
                    continue;
                };
                if descriptor.access().contains(PropertyAccess::INIT) != init_pass {
                    continue;
                }
                let value = PropertyValue::from_text(descriptor.ty(), text)
                    .map_err(WorldError::Property)?;
                let ctx = if init_pass {
                    AccessContext::Init
                } else {
                    AccessContext::Engine
                };
                self.write_target(
                    handle,
                    record,
                    PropertyTarget::Component(cell.type_id),
                    descriptor.key(),
                    value,
                    ctx,
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::testutil::{self, BODY, SPRITE, TRANSFORM};

    use super::*;

    fn set_editor(world: &World, handle: EntityHandle, key: &str, value: PropertyValue) {
        world
            .property(handle, key)
            .unwrap()
            .set(world, value, AccessContext::Editor)
            .unwrap();
    }

    fn spawn_decorated(world: &mut World) -> EntityHandle {
        let builder = world
            .create_entity(
                &EntityDescription::new("crate")
                    .tag("props")
                    .component(TRANSFORM)
                    .component(SPRITE),
            )
            .unwrap();
        let handle = builder.handle();
        world
            .property(handle, "Texture")
            .unwrap()
            .set(
                world,
                PropertyValue::Str("tiles/crate.png".to_string()),
                AccessContext::Init,
            )
            .unwrap();
        let handle = world.finish_entity(builder);
        set_editor(world, handle, "Position", PropertyValue::Vec2(Vec2::new(3.0, 4.0)));
        set_editor(world, handle, "Angle", PropertyValue::Float(0.5));
        set_editor(world, handle, "Visible", PropertyValue::Bool(true));
        handle
    }

    #[test]
    fn test_saved_record_shape() {
        let mut world = testutil::world();
        let handle = spawn_decorated(&mut world);
        // Transient state must not leak into the record.
        world
            .write_property(handle, "Frames", PropertyValue::Int(120), AccessContext::Engine)
            .unwrap();

        let saved = world.save_entity(handle).unwrap();
        assert_eq!(saved.name, "crate");
        assert_eq!(saved.tag, "props");
        assert_eq!(saved.kind, EntityKind::Normal);
        assert_eq!(saved.id, handle.id());
        assert_eq!(saved.components.len(), 2);
        assert_eq!(saved.components[0].component, "Transform");
        assert_eq!(saved.components[1].component, "Sprite");
        assert!(!saved.components[1].properties.contains_key("Frames"));
        assert_eq!(
            saved.components[1].properties.get("Texture"),
            Some(&"tiles/crate.png".to_string())
        );
    }

    #[test]
    fn test_entity_roundtrip_preserves_editable_values() {
        let mut world = testutil::world();
        let handle = spawn_decorated(&mut world);
        let saved = world.save_entity(handle).unwrap();

        let mut fresh = testutil::world();
        let loaded = fresh.load_entity(&saved, &HashMap::new()).unwrap();

        for key in ["Position", "Angle", "Texture", "Size", "Visible"] {
            assert_eq!(
                fresh.read_property(loaded, key).unwrap(),
                world.read_property(handle, key).unwrap(),
                "property {key} did not round-trip"
            );
        }
        assert_eq!(fresh.name(loaded).unwrap(), "crate");
        assert_eq!(fresh.tag(loaded).unwrap(), "props");
        assert!(fresh.is_finished(loaded).unwrap());
    }

    #[test]
    fn test_transient_entity_refused_and_skipped() {
        let mut world = testutil::world();
        let builder = world
            .create_entity(
                &EntityDescription::new("fx")
                    .kind(EntityKind::Transient)
                    .component(TRANSFORM),
            )
            .unwrap();
        let transient = world.finish_entity(builder);
        assert!(matches!(
            world.save_entity(transient),
            Err(WorldError::Validation { .. })
        ));

        let builder = world
            .create_entity(&EntityDescription::new("keep").component(TRANSFORM))
            .unwrap();
        world.finish_entity(builder);

        let saved = world.save_world().unwrap();
        assert_eq!(saved.entities.len(), 1);
        assert_eq!(saved.entities[0].name, "keep");
    }

    #[test]
    fn test_unknown_component_type_fails_load() {
        let mut world = testutil::world();
        let saved = SavedEntity {
            id: 1,
            name: "ghost".to_string(),
            tag: String::new(),
            kind: EntityKind::Normal,
            prototype: None,
            overridden: Vec::new(),
            shared: Vec::new(),
            components: vec![SavedComponent {
                component: "Ghost".to_string(),
                properties: BTreeMap::new(),
            }],
        };
        assert!(matches!(
            world.load_entity(&saved, &HashMap::new()),
            Err(WorldError::Validation { .. })
        ));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_world_roundtrip_relinks_prototypes() {
        let mut world = testutil::world();
        let builder = world
            .create_entity(
                &EntityDescription::new("template")
                    .kind(EntityKind::Prototype)
                    .component(TRANSFORM)
                    .component(SPRITE),
            )
            .unwrap();
        let prototype = world.finish_entity(builder);
        set_editor(&world, prototype, "Angle", PropertyValue::Float(1.5));
        let instance = world.instantiate_prototype(prototype).unwrap();
        set_editor(&world, instance, "Visible", PropertyValue::Bool(true));

        let saved = world.save_world().unwrap();
        // Prototypes first, so one forward pass can relink.
        assert_eq!(saved.entities[0].kind, EntityKind::Prototype);

        let mut fresh = testutil::world();
        let handles = fresh.load_world(&saved).unwrap();
        assert_eq!(handles.len(), 2);
        let (new_prototype, new_instance) = (handles[0], handles[1]);

        assert_eq!(fresh.kind(new_prototype).unwrap(), EntityKind::Prototype);
        assert_eq!(
            fresh.prototype_of(new_instance).unwrap(),
            Some(new_prototype)
        );
        assert_eq!(
            fresh.overridden_properties(new_instance).unwrap(),
            vec!["Visible".to_string()]
        );
        assert_eq!(
            fresh.instances_of(new_prototype).unwrap(),
            vec![new_instance]
        );

        // Propagation still works across the round trip.
        set_editor(&fresh, new_prototype, "Angle", PropertyValue::Float(2.5));
        fresh.update_prototype_instances(new_prototype).unwrap();
        assert_eq!(
            fresh.read_property(new_instance, "Angle").unwrap(),
            PropertyValue::Float(2.5)
        );
    }

    #[test]
    fn test_missing_prototype_loads_unlinked() {
        let mut world = testutil::world();
        let builder = world
            .create_entity(
                &EntityDescription::new("template")
                    .kind(EntityKind::Prototype)
                    .component(TRANSFORM),
            )
            .unwrap();
        let prototype = world.finish_entity(builder);
        let instance = world.instantiate_prototype(prototype).unwrap();

        let saved = world.save_entity(instance).unwrap();
        let mut fresh = testutil::world();
        // Empty remap: the prototype is not part of this load.
        let loaded = fresh.load_entity(&saved, &HashMap::new()).unwrap();
        assert_eq!(fresh.prototype_of(loaded).unwrap(), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut world = testutil::world();
        let builder = world
            .create_entity(
                &EntityDescription::new("mover")
                    .component(TRANSFORM)
                    .component(BODY),
            )
            .unwrap();
        let handle = world.finish_entity(builder);
        set_editor(&world, handle, "Velocity", PropertyValue::Vec2(Vec2::new(1.0, -1.0)));

        let saved = world.save_world().unwrap();
        let text = saved.to_json().unwrap();
        let reparsed = SavedWorld::from_json(&text).unwrap();

        let mut fresh = testutil::world();
        let handles = fresh.load_world(&reparsed).unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(
            fresh.read_property(handles[0], "Velocity").unwrap(),
            PropertyValue::Vec2(Vec2::new(1.0, -1.0))
        );
    }
}
