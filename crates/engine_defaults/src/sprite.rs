//! Sprite component.
//!
//! Holds what the renderer needs to draw the entity. The renderer reads
//! these properties each frame through the property layer; the texture is
//! a resource path resolved by the loading pipeline.

use glam::Vec2;

use engine_component::{Component, ComponentSpec, Message, MessageContext, MessageKind, MessageResult};
use engine_property::{PropertyAccess, PropertyDescriptor};

use crate::TRANSFORM;

/// A drawable 2D image attached to an entity. Requires [`crate::Transform`].
#[derive(Debug, Clone, Default)]
pub struct Sprite {
    /// Texture resource path.
    pub texture: String,
    /// Render size in world units.
    pub size: Vec2,
    /// Whether the sprite is drawn at all.
    pub visible: bool,
    /// Frames this sprite has been live. Never serialised.
    pub frames: i32,
}

impl Component for Sprite {
    fn init(&mut self) {
        self.visible = true;
    }

    fn handle_message(&mut self, _ctx: &MessageContext<'_>, message: &Message) -> MessageResult {
        match message.kind {
            MessageKind::Update => {
                self.frames = self.frames.saturating_add(1);
                MessageResult::Ok
            }
            _ => MessageResult::Ignored,
        }
    }
}

/// The registration record for [`Sprite`].
#[must_use]
pub fn spec() -> ComponentSpec {
    ComponentSpec::new::<Sprite>("Sprite")
        .dependency(TRANSFORM)
        .property(PropertyDescriptor::new::<Sprite, String>(
            "Texture",
            PropertyAccess::INIT
                .union(PropertyAccess::EDIT_READ)
                .union(PropertyAccess::EDIT_WRITE)
                .union(PropertyAccess::SCRIPT_READ),
            "Texture resource path",
            |s| s.texture.clone(),
            |s, v| s.texture = v,
        ))
        .property(PropertyDescriptor::new::<Sprite, Vec2>(
            "Size",
            PropertyAccess::FULL.union(PropertyAccess::INIT),
            "Render size in world units",
            |s| s.size,
            |s, v| s.size = v,
        ))
        .property(PropertyDescriptor::new::<Sprite, bool>(
            "Visible",
            PropertyAccess::FULL,
            "Whether the sprite is drawn",
            |s| s.visible,
            |s, v| s.visible = v,
        ))
        .property(PropertyDescriptor::new::<Sprite, i32>(
            "Frames",
            PropertyAccess::EDIT_READ.union(PropertyAccess::TRANSIENT),
            "Frames since load, diagnostic",
            |s| s.frames,
            |s, v| s.frames = v,
        ))
}
