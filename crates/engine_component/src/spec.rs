//! Component type registration — the static per-type table.
//!
//! A [`ComponentSpec`] is built once per component type and registered
//! with the [`ComponentRegistry`]: factory, declared dependencies, and
//! the property descriptor table. Everything the world needs to build,
//! introspect, and tear down instances of a type lives here; there is no
//! runtime type introspection anywhere else.

use std::collections::HashMap;

use engine_property::PropertyDescriptor;

use crate::component::{Component, ComponentTypeId};

/// Errors raised while registering component types.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A spec with the same name (and therefore the same id) is already
    /// registered.
    #[error("component type '{0}' is already registered")]
    Duplicate(String),
}

/// The static registration record for one component type.
///
/// Built with the same builder shape the rest of the engine uses:
///
/// ```rust
/// use engine_component::{Component, ComponentSpec, ComponentTypeId};
/// use engine_property::{PropertyAccess, PropertyDescriptor};
///
/// #[derive(Default)]
/// struct Health { current: f32 }
/// impl Component for Health {}
///
/// let spec = ComponentSpec::new::<Health>("Health")
///     .dependency(ComponentTypeId::from_name("Transform"))
///     .property(PropertyDescriptor::new::<Health, f32>(
///         "Current",
///         PropertyAccess::FULL,
///         "Current hit points",
///         |h| h.current,
///         |h, v| h.current = v,
///     ));
/// assert_eq!(spec.type_id(), ComponentTypeId::from_name("Health"));
/// ```
pub struct ComponentSpec {
    name: &'static str,
    type_id: ComponentTypeId,
    factory: Box<dyn Fn() -> Box<dyn Component>>,
    dependencies: Vec<ComponentTypeId>,
    properties: Vec<PropertyDescriptor>,
}

impl ComponentSpec {
    /// Start a spec for component type `C`, named `name`.
    ///
    /// The type id is derived from the name; instances are created through
    /// `C::default()`.
    #[must_use]
    pub fn new<C: Component + Default>(name: &'static str) -> Self {
        Self {
            name,
            type_id: ComponentTypeId::from_name(name),
            factory: Box::new(|| Box::new(C::default())),
            dependencies: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Declare that this type requires another component type on the same
    /// entity, constructed and initialised first.
    #[must_use]
    pub fn dependency(mut self, type_id: ComponentTypeId) -> Self {
        self.dependencies.push(type_id);
        self
    }

    /// Register a property slot.
    #[must_use]
    pub fn property(mut self, descriptor: PropertyDescriptor) -> Self {
        self.properties.push(descriptor);
        self
    }

    /// The component type's registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The component type's id.
    #[must_use]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Declared dependencies, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[ComponentTypeId] {
        &self.dependencies
    }

    /// The property descriptor table, in registration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Find a property descriptor by key.
    #[must_use]
    pub fn find_property(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.key() == key)
    }

    /// Construct a fresh instance of the component.
    #[must_use]
    pub fn create(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("dependencies", &self.dependencies)
            .field("properties", &self.properties.len())
            .finish()
    }
}

/// Registry of all component types known to a world.
///
/// Populated at startup, read-only afterwards; passed explicitly into the
/// world rather than living in a global.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    specs: HashMap<ComponentTypeId, ComponentSpec>,
    by_name: HashMap<&'static str, ComponentTypeId>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type.
    pub fn register(&mut self, spec: ComponentSpec) -> Result<(), RegistryError> {
        if self.specs.contains_key(&spec.type_id()) {
            return Err(RegistryError::Duplicate(spec.name().to_string()));
        }
        self.by_name.insert(spec.name(), spec.type_id());
        self.specs.insert(spec.type_id(), spec);
        Ok(())
    }

    /// Look up a spec by type id.
    #[must_use]
    pub fn get(&self, type_id: ComponentTypeId) -> Option<&ComponentSpec> {
        self.specs.get(&type_id)
    }

    /// Look up a spec by registered name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ComponentSpec> {
        self.by_name.get(name).and_then(|id| self.specs.get(id))
    }

    /// The registered name for a type id, when known.
    ///
    /// Falls back to the hex id for unregistered ids so error messages
    /// always have something to show.
    #[must_use]
    pub fn name_of(&self, type_id: ComponentTypeId) -> String {
        match self.get(type_id) {
            Some(spec) => spec.name().to_string(),
            None => type_id.to_string(),
        }
    }

    /// Iterate all registered specs.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentSpec> {
        self.specs.values()
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use engine_property::{PropertyAccess, PropertyType, PropertyValue};

    use super::*;

    #[derive(Default)]
    struct Health {
        current: f32,
    }
    impl Component for Health {}

    fn health_spec() -> ComponentSpec {
        ComponentSpec::new::<Health>("Health").property(
            engine_property::PropertyDescriptor::new::<Health, f32>(
                "Current",
                PropertyAccess::FULL,
                "Current hit points",
                |h| h.current,
                |h, v| h.current = v,
            ),
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register(health_spec()).unwrap();
        let by_id = registry.get(ComponentTypeId::from_name("Health")).unwrap();
        assert_eq!(by_id.name(), "Health");
        let by_name = registry.get_by_name("Health").unwrap();
        assert_eq!(by_name.type_id(), by_id.type_id());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ComponentRegistry::new();
        registry.register(health_spec()).unwrap();
        assert!(matches!(
            registry.register(health_spec()),
            Err(RegistryError::Duplicate(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_factory_builds_default_instance() {
        let spec = health_spec();
        let instance = spec.create();
        let prop = spec.find_property("Current").unwrap();
        assert_eq!(prop.ty(), PropertyType::Float);
        let value = prop.get(instance.downcast_ref::<Health>().unwrap()).unwrap();
        assert_eq!(value, PropertyValue::Float(0.0));
    }

    #[test]
    fn test_name_of_unregistered_id_renders_hex() {
        let registry = ComponentRegistry::new();
        let id = ComponentTypeId::from_name("Ghost");
        assert!(registry.name_of(id).starts_with("0x"));
    }
}
