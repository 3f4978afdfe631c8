//! Simple kinematic body.
//!
//! Integrates the sibling Transform's position from its own velocity on
//! every `Update`. The write goes through the property layer — the body
//! never touches the Transform instance directly, so either component can
//! be replaced at runtime.

use glam::Vec2;

use engine_component::{
    Component, ComponentSpec, Message, MessageContext, MessageKind, MessageResult,
};
use engine_property::{PropertyAccess, PropertyDescriptor, ValueKind};

use crate::TRANSFORM;

/// Linear motion state. Requires [`crate::Transform`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Body {
    /// Linear velocity in world units per second.
    pub velocity: Vec2,
    /// Mass in kilograms. Zero means immovable to the physics wrapper.
    pub mass: f32,
}

impl Component for Body {
    fn handle_message(&mut self, ctx: &MessageContext<'_>, message: &Message) -> MessageResult {
        match message.kind {
            MessageKind::Update => {
                let Some(dt) = message.get_param::<f32>(0) else {
                    return MessageResult::Error;
                };
                if self.velocity == Vec2::ZERO {
                    return MessageResult::Ok;
                }
                let Ok(position) = ctx.property_as::<Vec2>("Position") else {
                    return MessageResult::Error;
                };
                let next = position + self.velocity * dt;
                match ctx.set_property("Position", next.into_value()) {
                    Ok(()) => MessageResult::Ok,
                    Err(_) => MessageResult::Error,
                }
            }
            _ => MessageResult::Ignored,
        }
    }
}

/// The registration record for [`Body`].
#[must_use]
pub fn spec() -> ComponentSpec {
    ComponentSpec::new::<Body>("Body")
        .dependency(TRANSFORM)
        .property(PropertyDescriptor::new::<Body, Vec2>(
            "Velocity",
            PropertyAccess::FULL.union(PropertyAccess::INIT),
            "Linear velocity, world units per second",
            |b| b.velocity,
            |b, v| b.velocity = v,
        ))
        .property(PropertyDescriptor::new::<Body, f32>(
            "Mass",
            PropertyAccess::FULL.union(PropertyAccess::INIT),
            "Mass in kilograms",
            |b| b.mass,
            |b, v| b.mass = v,
        ))
}
