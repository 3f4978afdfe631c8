//! The uniform property access surface.
//!
//! A [`PropertyHolder`] is the one thing serialization, the editor, and
//! scripting see: owner, key, type, access flags, comment. It carries no
//! references into the world — every `get`/`set` re-queries the registry,
//! so a holder kept across an entity's destruction degrades to a
//! [`PropertyError::StaleHandle`] instead of dangling.
//!
//! Built-in entity attributes (`Id`, `Name`, `Tag`, `Prototype`) are
//! exposed through the same surface as component properties, so generic
//! widgets handle both without a special case.

use tracing::warn;

use engine_component::{Component, ComponentTypeId};
use engine_entity::EntityHandle;
use engine_property::{
    AccessContext, PropertyAccess, PropertyError, PropertyType, PropertyValue, ValueKind,
};

use crate::error::WorldError;
use crate::record::EntityRecord;
use crate::world::World;

/// Where a property lives on its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyTarget {
    /// A built-in entity attribute.
    Attribute,
    /// A field of the given component type.
    Component(ComponentTypeId),
}

/// The built-in attribute key for the entity id.
pub const ATTR_ID: &str = "Id";
/// The built-in attribute key for the entity name.
pub const ATTR_NAME: &str = "Name";
/// The built-in attribute key for the entity tag.
pub const ATTR_TAG: &str = "Tag";
/// The built-in attribute key for the prototype back-link.
pub const ATTR_PROTOTYPE: &str = "Prototype";

struct AttributeSpec {
    key: &'static str,
    ty: PropertyType,
    access: PropertyAccess,
    comment: &'static str,
}

const READ_ONLY: PropertyAccess = PropertyAccess::EDIT_READ.union(PropertyAccess::SCRIPT_READ);

const ATTRIBUTES: [AttributeSpec; 4] = [
    AttributeSpec {
        key: ATTR_ID,
        ty: PropertyType::Handle,
        access: READ_ONLY,
        comment: "Stable entity identifier",
    },
    AttributeSpec {
        key: ATTR_NAME,
        ty: PropertyType::Str,
        access: PropertyAccess::FULL,
        comment: "Entity name",
    },
    AttributeSpec {
        key: ATTR_TAG,
        ty: PropertyType::Str,
        access: PropertyAccess::FULL,
        comment: "Free-form tag",
    },
    AttributeSpec {
        key: ATTR_PROTOTYPE,
        ty: PropertyType::Handle,
        access: READ_ONLY,
        comment: "Linked prototype, null when unlinked",
    },
];

/// A property access point: metadata plus the coordinates to reach the
/// value. Plain data — editors build widgets from the metadata alone.
#[derive(Debug, Clone)]
pub struct PropertyHolder {
    owner: EntityHandle,
    target: PropertyTarget,
    key: &'static str,
    ty: PropertyType,
    access: PropertyAccess,
    comment: &'static str,
}

impl PropertyHolder {
    /// The entity this property belongs to.
    #[must_use]
    pub fn owner(&self) -> EntityHandle {
        self.owner
    }

    /// Where the property lives.
    #[must_use]
    pub fn target(&self) -> PropertyTarget {
        self.target
    }

    /// The property key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// The registered value type.
    #[must_use]
    pub fn ty(&self) -> PropertyType {
        self.ty
    }

    /// The declared access flags.
    #[must_use]
    pub fn access(&self) -> PropertyAccess {
        self.access
    }

    /// The editor-facing comment.
    #[must_use]
    pub fn comment(&self) -> &'static str {
        self.comment
    }

    /// Read the value.
    ///
    /// Checks the caller's read permission, then re-queries the registry;
    /// a destroyed owner yields [`PropertyError::StaleHandle`].
    pub fn get(&self, world: &World, ctx: AccessContext) -> Result<PropertyValue, PropertyError> {
        if !ctx.can_read(self.access) {
            warn!(key = self.key, %ctx, "property read denied");
            return Err(PropertyError::AccessDenied {
                key: self.key.to_string(),
                context: ctx,
            });
        }
        let record = world.record_for_property(self.owner)?;
        world.read_target(self.owner, record, self.target, self.key)
    }

    /// Read the value as a concrete type.
    pub fn get_as<T: ValueKind>(&self, world: &World, ctx: AccessContext) -> Result<T, PropertyError> {
        self.get(world, ctx)?.get::<T>()
    }

    /// Write the value.
    ///
    /// Permission, type, and construction-window checks all apply; a
    /// refused write is a no-op plus a logged warning, never a crash.
    pub fn set(
        &self,
        world: &World,
        value: PropertyValue,
        ctx: AccessContext,
    ) -> Result<(), PropertyError> {
        let record = world.record_for_property(self.owner)?;
        world.write_target(self.owner, record, self.target, self.key, value, ctx)
    }

    /// Read the canonical text form.
    pub fn value_text(&self, world: &World, ctx: AccessContext) -> Result<String, PropertyError> {
        Ok(self.get(world, ctx)?.to_text())
    }

    /// Parse the canonical text form and write it.
    pub fn set_from_text(
        &self,
        world: &World,
        text: &str,
        ctx: AccessContext,
    ) -> Result<(), PropertyError> {
        let value = PropertyValue::from_text(self.ty, text)?;
        self.set(world, value, ctx)
    }
}

impl World {
    /// Look up a property access point by key.
    ///
    /// Built-in attributes take precedence; component properties are
    /// searched in build order, first match wins.
    pub fn property(
        &self,
        handle: EntityHandle,
        key: &str,
    ) -> Result<PropertyHolder, WorldError> {
        let record = self.record(handle)?;
        self.resolve_holder(handle, record, key)
            .ok_or_else(|| WorldError::Property(PropertyError::UnknownProperty {
                key: key.to_string(),
            }))
    }

    /// Enumerate every property of an entity: built-in attributes first,
    /// then each component's properties in build order.
    pub fn properties(&self, handle: EntityHandle) -> Result<Vec<PropertyHolder>, WorldError> {
        let record = self.record(handle)?;
        let mut holders = Vec::new();
        for attr in &ATTRIBUTES {
            holders.push(PropertyHolder {
                owner: handle,
                target: PropertyTarget::Attribute,
                key: attr.key,
                ty: attr.ty,
                access: attr.access,
                comment: attr.comment,
            });
        }
        for cell in &record.components {
            if let Some(spec) = self.registry().get(cell.type_id) {
                for descriptor in spec.properties() {
                    holders.push(PropertyHolder {
                        owner: handle,
                        target: PropertyTarget::Component(cell.type_id),
                        key: descriptor.key(),
                        ty: descriptor.ty(),
                        access: descriptor.access(),
                        comment: descriptor.comment(),
                    });
                }
            }
        }
        Ok(holders)
    }

    /// Key-searched read, engine context. Backs [`engine_component::WorldAccess`].
    pub(crate) fn read_property(
        &self,
        handle: EntityHandle,
        key: &str,
    ) -> Result<PropertyValue, PropertyError> {
        let record = self.record_for_property(handle)?;
        let holder = self
            .resolve_holder(handle, record, key)
            .ok_or_else(|| PropertyError::UnknownProperty {
                key: key.to_string(),
            })?;
        self.read_target(handle, record, holder.target, holder.key)
    }

    /// Key-searched write. Backs [`engine_component::WorldAccess`] and the
    /// deserializer.
    pub(crate) fn write_property(
        &self,
        handle: EntityHandle,
        key: &str,
        value: PropertyValue,
        ctx: AccessContext,
    ) -> Result<(), PropertyError> {
        let record = self.record_for_property(handle)?;
        let holder = self
            .resolve_holder(handle, record, key)
            .ok_or_else(|| PropertyError::UnknownProperty {
                key: key.to_string(),
            })?;
        self.write_target(handle, record, holder.target, holder.key, value, ctx)
    }

    pub(crate) fn record_for_property(
        &self,
        handle: EntityHandle,
    ) -> Result<&EntityRecord, PropertyError> {
        self.entities.get(handle).ok_or_else(|| {
            warn!(entity = %handle, "property access through a stale handle");
            PropertyError::StaleHandle(handle)
        })
    }

    fn resolve_holder(
        &self,
        handle: EntityHandle,
        record: &EntityRecord,
        key: &str,
    ) -> Option<PropertyHolder> {
        if let Some(attr) = ATTRIBUTES.iter().find(|a| a.key == key) {
            return Some(PropertyHolder {
                owner: handle,
                target: PropertyTarget::Attribute,
                key: attr.key,
                ty: attr.ty,
                access: attr.access,
                comment: attr.comment,
            });
        }
        for cell in &record.components {
            let Some(spec) = self.registry().get(cell.type_id) else {
                continue;
            };
            if let Some(descriptor) = spec.find_property(key) {
                return Some(PropertyHolder {
                    owner: handle,
                    target: PropertyTarget::Component(cell.type_id),
                    key: descriptor.key(),
                    ty: descriptor.ty(),
                    access: descriptor.access(),
                    comment: descriptor.comment(),
                });
            }
        }
        None
    }

    /// Read a property at known coordinates. No permission check — the
    /// callers above have already done it (or are the engine).
    pub(crate) fn read_target(
        &self,
        handle: EntityHandle,
        record: &EntityRecord,
        target: PropertyTarget,
        key: &str,
    ) -> Result<PropertyValue, PropertyError> {
        match target {
            PropertyTarget::Attribute => {
                let state = record.state.borrow();
                match key {
                    ATTR_ID => Ok(PropertyValue::Handle(handle)),
                    ATTR_NAME => Ok(PropertyValue::Str(state.name.clone())),
                    ATTR_TAG => Ok(PropertyValue::Str(state.tag.clone())),
                    ATTR_PROTOTYPE => Ok(PropertyValue::Handle(
                        state
                            .link
                            .as_ref()
                            .map_or(EntityHandle::NULL, |l| l.prototype),
                    )),
                    _ => Err(PropertyError::UnknownProperty {
                        key: key.to_string(),
                    }),
                }
            }
            PropertyTarget::Component(type_id) => {
                let cell = record
                    .cell(type_id)
                    .ok_or_else(|| PropertyError::UnknownProperty {
                        key: key.to_string(),
                    })?;
                let spec = self.registry().get(type_id).ok_or_else(|| {
                    PropertyError::UnknownProperty {
                        key: key.to_string(),
                    }
                })?;
                let descriptor =
                    spec.find_property(key)
                        .ok_or_else(|| PropertyError::UnknownProperty {
                            key: key.to_string(),
                        })?;
                let borrow = cell
                    .component
                    .try_borrow()
                    .map_err(|_| PropertyError::Busy {
                        key: key.to_string(),
                    })?;
                let component: &dyn Component = &**borrow;
                descriptor.get(component)
            }
        }
    }

    /// Write a property at known coordinates, enforcing access flags, the
    /// construction window, and instance override marking.
    pub(crate) fn write_target(
        &self,
        handle: EntityHandle,
        record: &EntityRecord,
        target: PropertyTarget,
        key: &str,
        value: PropertyValue,
        ctx: AccessContext,
    ) -> Result<(), PropertyError> {
        let access = self.target_access(target, key)?;
        if !ctx.can_write(access) {
            warn!(entity = %handle, key, %ctx, "property write denied");
            return Err(PropertyError::AccessDenied {
                key: key.to_string(),
                context: ctx,
            });
        }
        if ctx == AccessContext::Init && record.state.borrow().finished {
            warn!(entity = %handle, key, "init-only write after construction finished");
            return Err(PropertyError::AccessDenied {
                key: key.to_string(),
                context: ctx,
            });
        }

        match target {
            PropertyTarget::Attribute => {
                match key {
                    ATTR_NAME => {
                        let name = value.get::<String>()?;
                        record.state.borrow_mut().name = name;
                    }
                    ATTR_TAG => {
                        let tag = value.get::<String>()?;
                        record.state.borrow_mut().tag = tag;
                    }
                    _ => {
                        // Id and the prototype link are never writable
                        // through the property surface, engine included.
                        warn!(entity = %handle, key, "write to read-only attribute refused");
                        return Err(PropertyError::AccessDenied {
                            key: key.to_string(),
                            context: ctx,
                        });
                    }
                }
            }
            PropertyTarget::Component(type_id) => {
                let cell = record
                    .cell(type_id)
                    .ok_or_else(|| PropertyError::UnknownProperty {
                        key: key.to_string(),
                    })?;
                let spec = self.registry().get(type_id).ok_or_else(|| {
                    PropertyError::UnknownProperty {
                        key: key.to_string(),
                    }
                })?;
                let descriptor =
                    spec.find_property(key)
                        .ok_or_else(|| PropertyError::UnknownProperty {
                            key: key.to_string(),
                        })?;
                let mut borrow =
                    cell.component
                        .try_borrow_mut()
                        .map_err(|_| PropertyError::Busy {
                            key: key.to_string(),
                        })?;
                let component: &mut dyn Component = &mut **borrow;
                descriptor.set(component, value)?;
            }
        }

        // An editor or script write onto a linked instance overrides the
        // key: propagation stops touching it. Engine writes (including
        // the propagation itself) leave the flag alone.
        if matches!(ctx, AccessContext::Editor | AccessContext::Script) {
            let mut state = record.state.borrow_mut();
            if let Some(link) = state.link.as_mut() {
                link.overridden.insert(key.to_string());
            }
        }
        Ok(())
    }

    fn target_access(
        &self,
        target: PropertyTarget,
        key: &str,
    ) -> Result<PropertyAccess, PropertyError> {
        match target {
            PropertyTarget::Attribute => ATTRIBUTES
                .iter()
                .find(|a| a.key == key)
                .map(|a| a.access)
                .ok_or_else(|| PropertyError::UnknownProperty {
                    key: key.to_string(),
                }),
            PropertyTarget::Component(type_id) => self
                .registry()
                .get(type_id)
                .and_then(|spec| spec.find_property(key))
                .map(|d| d.access())
                .ok_or_else(|| PropertyError::UnknownProperty {
                    key: key.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::description::EntityDescription;
    use crate::error::WorldError;
    use crate::testutil::{self, SPRITE, TRANSFORM};

    use super::*;

    fn spawn(world: &mut World) -> EntityHandle {
        let builder = world
            .create_entity(
                &EntityDescription::new("widget")
                    .tag("ui")
                    .component(TRANSFORM)
                    .component(SPRITE),
            )
            .unwrap();
        world.finish_entity(builder)
    }

    #[test]
    fn test_enumeration_order_attributes_then_components() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let holders = world.properties(handle).unwrap();
        let keys: Vec<&str> = holders.iter().map(|h| h.key()).collect();
        assert_eq!(
            keys,
            vec![
                "Id", "Name", "Tag", "Prototype", // attributes
                "Position", "Angle", // Transform, build order
                "Texture", "Size", "Visible", "Frames", // Sprite
            ]
        );
    }

    #[test]
    fn test_attribute_reads() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let id = world.property(handle, ATTR_ID).unwrap();
        assert_eq!(
            id.get(&world, AccessContext::Editor).unwrap(),
            PropertyValue::Handle(handle)
        );
        let name = world.property(handle, ATTR_NAME).unwrap();
        assert_eq!(
            name.get(&world, AccessContext::Script).unwrap(),
            PropertyValue::Str("widget".to_string())
        );
        let prototype = world.property(handle, ATTR_PROTOTYPE).unwrap();
        assert_eq!(
            prototype.get(&world, AccessContext::Editor).unwrap(),
            PropertyValue::Handle(EntityHandle::NULL)
        );
    }

    #[test]
    fn test_attribute_name_write() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        world
            .property(handle, ATTR_NAME)
            .unwrap()
            .set(
                &world,
                PropertyValue::Str("renamed".to_string()),
                AccessContext::Editor,
            )
            .unwrap();
        assert_eq!(world.name(handle).unwrap(), "renamed");
    }

    #[test]
    fn test_read_only_attribute_write_refused_even_for_engine() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let err = world
            .write_property(
                handle,
                ATTR_ID,
                PropertyValue::Handle(EntityHandle::NULL),
                AccessContext::Engine,
            )
            .unwrap_err();
        assert!(matches!(err, PropertyError::AccessDenied { .. }));
    }

    #[test]
    fn test_script_read_of_editor_only_property_denied() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        // Frames carries EDIT_READ only.
        let frames = world.property(handle, "Frames").unwrap();
        assert!(frames.get(&world, AccessContext::Editor).is_ok());
        assert!(matches!(
            frames.get(&world, AccessContext::Script),
            Err(PropertyError::AccessDenied { .. })
        ));
    }

    #[test]
    fn test_write_without_flag_is_denied_noop() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let frames = world.property(handle, "Frames").unwrap();
        let err = frames
            .set(&world, PropertyValue::Int(99), AccessContext::Editor)
            .unwrap_err();
        assert!(matches!(err, PropertyError::AccessDenied { .. }));
        // Engine read confirms the value never moved.
        assert_eq!(
            world.read_property(handle, "Frames").unwrap(),
            PropertyValue::Int(0)
        );
    }

    #[test]
    fn test_init_window_closes_at_finish() {
        let mut world = testutil::world();
        let builder = world
            .create_entity(&EntityDescription::new("e").component(TRANSFORM))
            .unwrap();
        let handle = builder.handle();
        let position = world.property(handle, "Position").unwrap();
        position
            .set(
                &world,
                PropertyValue::Vec2(Vec2::new(1.0, 1.0)),
                AccessContext::Init,
            )
            .unwrap();
        world.finish_entity(builder);

        let err = position
            .set(
                &world,
                PropertyValue::Vec2(Vec2::new(2.0, 2.0)),
                AccessContext::Init,
            )
            .unwrap_err();
        assert!(matches!(err, PropertyError::AccessDenied { .. }));
        assert_eq!(
            world.read_property(handle, "Position").unwrap(),
            PropertyValue::Vec2(Vec2::new(1.0, 1.0))
        );
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let position = world.property(handle, "Position").unwrap();
        let err = position
            .set(&world, PropertyValue::Int(5), AccessContext::Editor)
            .unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { .. }));
    }

    #[test]
    fn test_text_roundtrip_through_holder() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let position = world.property(handle, "Position").unwrap();
        position
            .set_from_text(&world, "3 -1.5", AccessContext::Editor)
            .unwrap();
        assert_eq!(
            position.value_text(&world, AccessContext::Editor).unwrap(),
            "3 -1.5"
        );
        assert!(position
            .set_from_text(&world, "junk", AccessContext::Editor)
            .is_err());
    }

    #[test]
    fn test_stale_holder_degrades_to_error() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        let position = world.property(handle, "Position").unwrap();
        world.destroy_entity(handle);
        world.process_destroy_queue();
        assert!(matches!(
            position.get(&world, AccessContext::Editor),
            Err(PropertyError::StaleHandle(_))
        ));
        assert!(matches!(
            position.set(
                &world,
                PropertyValue::Vec2(Vec2::ZERO),
                AccessContext::Editor
            ),
            Err(PropertyError::StaleHandle(_))
        ));
    }

    #[test]
    fn test_unknown_key_reported() {
        let mut world = testutil::world();
        let handle = spawn(&mut world);
        assert!(matches!(
            world.property(handle, "Nope"),
            Err(WorldError::Property(PropertyError::UnknownProperty { .. }))
        ));
    }
}
