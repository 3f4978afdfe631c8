//! Property descriptors — the per-type registration table entries.
//!
//! A [`PropertyDescriptor`] is one string-keyed, typed slot registered for
//! a component type. The accessors are stored type-erased over `dyn Any`
//! but are built by a statically typed constructor, so a descriptor can
//! only be created from accessors that match its declared type.

use std::any::Any;

use crate::access::PropertyAccess;
use crate::error::PropertyError;
use crate::value::{PropertyType, PropertyValue, ValueKind};

type Getter = Box<dyn Fn(&dyn Any) -> Option<PropertyValue>>;
type Setter = Box<dyn Fn(&mut dyn Any, PropertyValue) -> Result<(), PropertyError>>;

/// One registered property slot: key, type tag, access flags, editor
/// comment, and the erased accessors.
///
/// Registered once per *component type*, at type-registration time. The
/// same descriptor serves every instance of the component.
pub struct PropertyDescriptor {
    key: &'static str,
    ty: PropertyType,
    access: PropertyAccess,
    comment: &'static str,
    getter: Getter,
    setter: Setter,
}

impl PropertyDescriptor {
    /// Build a descriptor from statically typed accessors.
    ///
    /// `C` is the concrete component type, `T` the property's Rust type.
    /// The type tag is derived from `T`, so declaration and accessors can
    /// never disagree.
    #[must_use]
    pub fn new<C, T>(
        key: &'static str,
        access: PropertyAccess,
        comment: &'static str,
        get: fn(&C) -> T,
        set: fn(&mut C, T),
    ) -> Self
    where
        C: Any,
        T: ValueKind + 'static,
    {
        Self {
            key,
            ty: T::TYPE,
            access,
            comment,
            getter: Box::new(move |target: &dyn Any| {
                target.downcast_ref::<C>().map(|c| get(c).into_value())
            }),
            setter: Box::new(move |target: &mut dyn Any, value: PropertyValue| {
                let found = value.ty();
                let typed = T::from_value(&value).ok_or(PropertyError::TypeMismatch {
                    expected: T::TYPE,
                    found,
                })?;
                let component =
                    target
                        .downcast_mut::<C>()
                        .ok_or_else(|| PropertyError::WrongComponent {
                            key: key.to_string(),
                        })?;
                set(component, typed);
                Ok(())
            }),
        }
    }

    /// The property key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// The registered type tag.
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

    /// Read the property from a component instance.
    pub fn get(&self, target: &dyn Any) -> Result<PropertyValue, PropertyError> {
        (self.getter)(target).ok_or_else(|| PropertyError::WrongComponent {
            key: self.key.to_string(),
        })
    }

    /// Write the property on a component instance.
    ///
    /// The runtime type of `value` is checked against the registered type;
    /// mismatches fail with [`PropertyError::TypeMismatch`] without
    /// touching the component.
    pub fn set(&self, target: &mut dyn Any, value: PropertyValue) -> Result<(), PropertyError> {
        (self.setter)(target, value)
    }
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("key", &self.key)
            .field("ty", &self.ty)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}
