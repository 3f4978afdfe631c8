//! # engine_defaults
//!
//! Stock components shipped with the engine core. Nothing here is
//! special-cased by the world — these register through the same
//! [`engine_component::ComponentSpec`] path as game components, and the
//! renderer and physics wrapper reach them exclusively through the
//! property layer.

pub mod body;
pub mod sprite;
pub mod transform;

pub use body::Body;
pub use sprite::Sprite;
pub use transform::Transform;

use engine_component::{ComponentRegistry, ComponentTypeId, RegistryError};

/// Type id of [`Transform`].
pub const TRANSFORM: ComponentTypeId = ComponentTypeId::from_name("Transform");
/// Type id of [`Sprite`].
pub const SPRITE: ComponentTypeId = ComponentTypeId::from_name("Sprite");
/// Type id of [`Body`].
pub const BODY: ComponentTypeId = ComponentTypeId::from_name("Body");

/// Register all stock components.
pub fn register_defaults(registry: &mut ComponentRegistry) -> Result<(), RegistryError> {
    registry.register(transform::spec())?;
    registry.register(sprite::spec())?;
    registry.register(body::spec())?;
    Ok(())
}
