//! The built-in demo scene.
//!
//! One prototype with two linked instances (to show propagation) and an
//! independent moving body. Everything goes through the public
//! description/property surface — the same path a loaded scene takes.

use anyhow::Result;
use glam::Vec2;
use tracing::info;

use engine_defaults::{BODY, SPRITE, TRANSFORM};
use engine_property::{AccessContext, PropertyValue};
use engine_world::{EntityDescription, EntityKind, World};

/// Populate the demo scene.
pub fn build_demo_scene(world: &mut World) -> Result<()> {
    // A crate prototype; its instances follow its texture and size.
    let builder = world.create_entity(
        &EntityDescription::new("crate")
            .kind(EntityKind::Prototype)
            .tag("props")
            .component(TRANSFORM)
            .component(SPRITE),
    )?;
    let handle = builder.handle();
    world
        .property(handle, "Texture")?
        .set(
            world,
            PropertyValue::Str("tiles/crate.png".to_string()),
            AccessContext::Init,
        )?;
    world.property(handle, "Size")?.set(
        world,
        PropertyValue::Vec2(Vec2::new(32.0, 32.0)),
        AccessContext::Init,
    )?;
    let prototype = world.finish_entity(builder);

    for (index, position) in [Vec2::new(-40.0, 0.0), Vec2::new(40.0, 0.0)]
        .into_iter()
        .enumerate()
    {
        let instance = world.instantiate_prototype(prototype)?;
        world.property(instance, "Position")?.set(
            world,
            PropertyValue::Vec2(position),
            AccessContext::Editor,
        )?;
        info!(instance = %instance, index, "crate instance placed");
    }

    // An independent mover exercising the Body → Transform property path.
    let builder = world.create_entity(
        &EntityDescription::new("mover")
            .tag("actors")
            .component(TRANSFORM)
            .component(BODY),
    )?;
    let handle = builder.handle();
    world.property(handle, "Velocity")?.set(
        world,
        PropertyValue::Vec2(Vec2::new(10.0, 0.0)),
        AccessContext::Init,
    )?;
    world.finish_entity(builder);

    Ok(())
}
