//! Shared fixtures for the world tests: a small component set exercising
//! dependencies, every property type, and sibling access through the
//! message context.

use std::cell::RefCell;

use glam::Vec2;

use engine_component::{
    Component, ComponentRegistry, ComponentSpec, ComponentTypeId, Message, MessageContext,
    MessageKind, MessageResult,
};
use engine_property::{PropertyAccess, PropertyDescriptor, ValueKind};

use crate::world::World;

thread_local! {
    static LIFECYCLE_LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn log(entry: &str) {
    LIFECYCLE_LOG.with(|l| l.borrow_mut().push(entry.to_string()));
}

/// Take everything logged by lifecycle hooks since the last drain.
pub fn drain_log() -> Vec<String> {
    LIFECYCLE_LOG.with(|l| l.borrow_mut().drain(..).collect())
}

pub const TRANSFORM: ComponentTypeId = ComponentTypeId::from_name("Transform");
pub const SPRITE: ComponentTypeId = ComponentTypeId::from_name("Sprite");
pub const BODY: ComponentTypeId = ComponentTypeId::from_name("Body");

#[derive(Default)]
pub struct Transform {
    pub position: Vec2,
    pub angle: f32,
}

impl Component for Transform {
    fn init(&mut self) {
        log("Transform:init");
    }

    fn clean(&mut self) {
        log("Transform:clean");
    }
}

#[derive(Default)]
pub struct Sprite {
    pub texture: String,
    pub size: Vec2,
    pub visible: bool,
    pub frames: i32,
    /// What the Init-message handler observed in the sibling Transform.
    pub seen_position: Option<Vec2>,
}

impl Component for Sprite {
    fn init(&mut self) {
        log("Sprite:init");
    }

    fn clean(&mut self) {
        log("Sprite:clean");
    }

    fn handle_message(&mut self, ctx: &MessageContext<'_>, message: &Message) -> MessageResult {
        match message.kind {
            MessageKind::Init => match ctx.property_as::<Vec2>("Position") {
                Ok(position) => {
                    self.seen_position = Some(position);
                    MessageResult::Ok
                }
                Err(_) => MessageResult::Error,
            },
            _ => MessageResult::Ignored,
        }
    }
}

#[derive(Default)]
pub struct Body {
    pub velocity: Vec2,
    pub mass: f32,
}

impl Component for Body {
    fn init(&mut self) {
        log("Body:init");
    }

    fn clean(&mut self) {
        log("Body:clean");
    }

    fn handle_message(&mut self, ctx: &MessageContext<'_>, message: &Message) -> MessageResult {
        match message.kind {
            MessageKind::Update => {
                let Some(dt) = message.get_param::<f32>(0) else {
                    return MessageResult::Error;
                };
                // Integrate position through the property layer; no
                // direct sibling reference.
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

/// Registry with Transform, Sprite (needs Transform), and Body (needs
/// Transform).
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register(
            ComponentSpec::new::<Transform>("Transform")
                .property(PropertyDescriptor::new::<Transform, Vec2>(
                    "Position",
                    PropertyAccess::FULL.union(PropertyAccess::INIT),
                    "World position",
                    |t| t.position,
                    |t, v| t.position = v,
                ))
                .property(PropertyDescriptor::new::<Transform, f32>(
                    "Angle",
                    PropertyAccess::FULL,
                    "Rotation in radians",
                    |t| t.angle,
                    |t, v| t.angle = v,
                )),
        )
        .unwrap();
    registry
        .register(
            ComponentSpec::new::<Sprite>("Sprite")
                .dependency(TRANSFORM)
                .property(PropertyDescriptor::new::<Sprite, String>(
                    "Texture",
                    PropertyAccess::INIT
                        .union(PropertyAccess::EDIT_READ)
                        .union(PropertyAccess::EDIT_WRITE),
                    "Texture resource path",
                    |s| s.texture.clone(),
                    |s, v| s.texture = v,
                ))
                .property(PropertyDescriptor::new::<Sprite, Vec2>(
                    "Size",
                    PropertyAccess::FULL,
                    "Render size",
                    |s| s.size,
                    |s, v| s.size = v,
                ))
                .property(PropertyDescriptor::new::<Sprite, bool>(
                    "Visible",
                    PropertyAccess::FULL,
                    "Drawn this frame",
                    |s| s.visible,
                    |s, v| s.visible = v,
                ))
                .property(PropertyDescriptor::new::<Sprite, i32>(
                    "Frames",
                    PropertyAccess::EDIT_READ.union(PropertyAccess::TRANSIENT),
                    "Frames rendered since load",
                    |s| s.frames,
                    |s, v| s.frames = v,
                )),
        )
        .unwrap();
    registry
        .register(
            ComponentSpec::new::<Body>("Body")
                .dependency(TRANSFORM)
                .property(PropertyDescriptor::new::<Body, Vec2>(
                    "Velocity",
                    PropertyAccess::FULL,
                    "Linear velocity",
                    |b| b.velocity,
                    |b, v| b.velocity = v,
                ))
                .property(PropertyDescriptor::new::<Body, f32>(
                    "Mass",
                    PropertyAccess::FULL,
                    "Mass in kilograms",
                    |b| b.mass,
                    |b, v| b.mass = v,
                )),
        )
        .unwrap();
    registry
}

/// A world over the fixture registry, with the lifecycle log cleared.
pub fn world() -> World {
    let world = World::new(registry());
    drain_log();
    world
}
