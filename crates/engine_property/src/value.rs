//! Erased property values and their canonical text form.
//!
//! Every generic property access moves a [`PropertyValue`] across the
//! reflection boundary. The variant set is deliberately small — the handful
//! of types components actually expose — and each variant has a canonical
//! text rendering used by serialisation and generic editor widgets.

use engine_entity::EntityHandle;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PropertyError;

/// The runtime type tag of a property slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    Vec2,
    Str,
    Handle,
}

impl PropertyType {
    /// Human-readable type name, as shown by editors and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PropertyType::Bool => "bool",
            PropertyType::Int => "int",
            PropertyType::Float => "float",
            PropertyType::Vec2 => "vec2",
            PropertyType::Str => "string",
            PropertyType::Handle => "handle",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A type-erased property value.
///
/// Construction from and extraction to concrete Rust types goes through
/// [`ValueKind`]; extraction with the wrong type reports
/// [`PropertyError::TypeMismatch`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Str(String),
    Handle(EntityHandle),
}

impl PropertyValue {
    /// The type tag of this value.
    #[must_use]
    pub const fn ty(&self) -> PropertyType {
        match self {
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Vec2(_) => PropertyType::Vec2,
            PropertyValue::Str(_) => PropertyType::Str,
            PropertyValue::Handle(_) => PropertyType::Handle,
        }
    }

    /// Extract the value as a concrete type.
    ///
    /// Fails with [`PropertyError::TypeMismatch`] when `T` does not match
    /// the stored variant.
    pub fn get<T: ValueKind>(&self) -> Result<T, PropertyError> {
        T::from_value(self).ok_or(PropertyError::TypeMismatch {
            expected: T::TYPE,
            found: self.ty(),
        })
    }

    /// Render the canonical text form.
    ///
    /// The text form round-trips through [`PropertyValue::from_text`] for
    /// every variant and is what the saved-entity records store.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Float(x) => x.to_string(),
            PropertyValue::Vec2(v) => format!("{} {}", v.x, v.y),
            PropertyValue::Str(s) => s.clone(),
            PropertyValue::Handle(h) => h.id().to_string(),
        }
    }

    /// Parse the canonical text form of the given type.
    pub fn from_text(ty: PropertyType, text: &str) -> Result<Self, PropertyError> {
        let parse_err = || PropertyError::Parse {
            ty,
            text: text.to_string(),
        };
        match ty {
            PropertyType::Bool => match text {
                "true" => Ok(PropertyValue::Bool(true)),
                "false" => Ok(PropertyValue::Bool(false)),
                _ => Err(parse_err()),
            },
            PropertyType::Int => text
                .parse::<i32>()
                .map(PropertyValue::Int)
                .map_err(|_| parse_err()),
            PropertyType::Float => text
                .parse::<f32>()
                .map(PropertyValue::Float)
                .map_err(|_| parse_err()),
            PropertyType::Vec2 => {
                let mut parts = text.split_whitespace();
                let x = parts.next().and_then(|p| p.parse::<f32>().ok());
                let y = parts.next().and_then(|p| p.parse::<f32>().ok());
                match (x, y, parts.next()) {
                    (Some(x), Some(y), None) => Ok(PropertyValue::Vec2(Vec2::new(x, y))),
                    _ => Err(parse_err()),
                }
            }
            PropertyType::Str => Ok(PropertyValue::Str(text.to_string())),
            PropertyType::Handle => text
                .parse::<u64>()
                .map(|id| PropertyValue::Handle(EntityHandle::from_id(id)))
                .map_err(|_| parse_err()),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// A Rust type that maps onto exactly one [`PropertyValue`] variant.
///
/// Implemented for the closed set of property types; registration and
/// typed access are generic over it.
pub trait ValueKind: Sized {
    /// The variant this type maps to.
    const TYPE: PropertyType;

    /// Extract from an erased value; `None` on variant mismatch.
    fn from_value(value: &PropertyValue) -> Option<Self>;

    /// Wrap into an erased value.
    fn into_value(self) -> PropertyValue;
}

impl ValueKind for bool {
    const TYPE: PropertyType = PropertyType::Bool;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Bool(self)
    }
}

impl ValueKind for i32 {
    const TYPE: PropertyType = PropertyType::Int;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Int(self)
    }
}

impl ValueKind for f32 {
    const TYPE: PropertyType = PropertyType::Float;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Float(self)
    }
}

impl ValueKind for Vec2 {
    const TYPE: PropertyType = PropertyType::Vec2;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Vec2(self)
    }
}

impl ValueKind for String {
    const TYPE: PropertyType = PropertyType::Str;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Str(self)
    }
}

impl ValueKind for EntityHandle {
    const TYPE: PropertyType = PropertyType::Handle;

    fn from_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Handle(h) => Some(*h),
            _ => None,
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Handle(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_extraction() {
        let v = PropertyValue::Int(7);
        assert_eq!(v.get::<i32>().unwrap(), 7);
    }

    #[test]
    fn test_typed_extraction_mismatch() {
        let v = PropertyValue::Int(7);
        let err = v.get::<f32>().unwrap_err();
        match err {
            PropertyError::TypeMismatch { expected, found } => {
                assert_eq!(expected, PropertyType::Float);
                assert_eq!(found, PropertyType::Int);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_text_roundtrip_bool() {
        let v = PropertyValue::Bool(true);
        assert_eq!(
            PropertyValue::from_text(PropertyType::Bool, &v.to_text()).unwrap(),
            v
        );
    }

    #[test]
    fn test_text_roundtrip_vec2() {
        let v = PropertyValue::Vec2(Vec2::new(1.5, -2.25));
        assert_eq!(
            PropertyValue::from_text(PropertyType::Vec2, &v.to_text()).unwrap(),
            v
        );
    }

    #[test]
    fn test_text_roundtrip_handle() {
        let v = PropertyValue::Handle(EntityHandle::from_raw(3, 2));
        assert_eq!(
            PropertyValue::from_text(PropertyType::Handle, &v.to_text()).unwrap(),
            v
        );
    }

    #[test]
    fn test_text_roundtrip_float() {
        let v = PropertyValue::Float(0.125);
        assert_eq!(
            PropertyValue::from_text(PropertyType::Float, &v.to_text()).unwrap(),
            v
        );
    }

    #[test]
    fn test_parse_failure() {
        let err = PropertyValue::from_text(PropertyType::Int, "not-a-number").unwrap_err();
        assert!(matches!(err, PropertyError::Parse { .. }));
    }

    #[test]
    fn test_vec2_rejects_trailing_junk() {
        assert!(PropertyValue::from_text(PropertyType::Vec2, "1 2 3").is_err());
        assert!(PropertyValue::from_text(PropertyType::Vec2, "1").is_err());
    }

    #[test]
    fn test_string_text_is_identity() {
        let v = PropertyValue::Str("tiles/grass.png".to_string());
        assert_eq!(v.to_text(), "tiles/grass.png");
        assert_eq!(
            PropertyValue::from_text(PropertyType::Str, "tiles/grass.png").unwrap(),
            v
        );
    }
}
