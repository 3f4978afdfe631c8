//! 2D transform component.
//!
//! [`Transform`] is the primary spatial component — nearly every visible
//! entity carries one, and Sprite and Body both depend on it.

use glam::Vec2;

use engine_component::{Component, ComponentSpec};
use engine_property::{PropertyAccess, PropertyDescriptor};

/// Position, rotation, and scale in 2D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World-space position.
    pub position: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    /// Per-axis scale factor.
    pub scale: Vec2,
}

impl Transform {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        angle: 0.0,
        scale: Vec2::ONE,
    };

    /// Create a transform at the given position with default
    /// rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {}

/// The registration record for [`Transform`].
#[must_use]
pub fn spec() -> ComponentSpec {
    ComponentSpec::new::<Transform>("Transform")
        .property(PropertyDescriptor::new::<Transform, Vec2>(
            "Position",
            PropertyAccess::FULL.union(PropertyAccess::INIT),
            "World-space position",
            |t| t.position,
            |t, v| t.position = v,
        ))
        .property(PropertyDescriptor::new::<Transform, f32>(
            "Angle",
            PropertyAccess::FULL.union(PropertyAccess::INIT),
            "Rotation in radians",
            |t| t.angle,
            |t, v| t.angle = v,
        ))
        .property(PropertyDescriptor::new::<Transform, Vec2>(
            "Scale",
            PropertyAccess::FULL,
            "Per-axis scale factor",
            |t| t.scale,
            |t, v| t.scale = v,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_default() {
        let t = Transform::default();
        assert_eq!(t, Transform::IDENTITY);
        assert_eq!(t.scale, Vec2::ONE);
    }

    #[test]
    fn test_from_position() {
        let t = Transform::from_position(Vec2::new(3.0, 4.0));
        assert_eq!(t.position, Vec2::new(3.0, 4.0));
        assert_eq!(t.angle, 0.0);
    }

    #[test]
    fn test_spec_exposes_properties() {
        let spec = spec();
        assert_eq!(spec.name(), "Transform");
        assert!(spec.dependencies().is_empty());
        assert!(spec.find_property("Position").is_some());
        assert!(spec.find_property("Scale").is_some());
    }
}
