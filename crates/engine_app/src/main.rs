//! # engine_app — demo driver
//!
//! Builds a world over the stock components, populates a small scene (or
//! loads one from disk), and runs the fixed-timestep tick loop.
//!
//! ## Startup sequence
//!
//! 1. Initialise structured logging (`RUST_LOG` controls the filter).
//! 2. Register the stock components and create the world.
//! 3. Load `--scene` if given, otherwise build the demo scene.
//! 4. Enter the tick loop: broadcast `Update`, drain the destroy queue.
//! 5. On exit, optionally save the world to `--save`.

mod scene;
mod tick;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engine_component::ComponentRegistry;
use engine_world::{SavedWorld, World};
use tick::{TickConfig, TickLoop};

#[derive(Debug, Parser)]
#[command(about = "Entity-component runtime demo")]
struct Args {
    /// Target ticks per second.
    #[arg(long, default_value_t = 60.0)]
    tick_rate: f64,

    /// Number of ticks to run (0 = run until interrupted).
    #[arg(long, default_value_t = 300)]
    max_ticks: u64,

    /// Load this saved scene instead of the built-in demo scene.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Save the world to this path after the loop ends.
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    info!("engine core starting");

    let mut registry = ComponentRegistry::new();
    engine_defaults::register_defaults(&mut registry)?;
    let mut world = World::new(registry);

    match &args.scene {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scene {}", path.display()))?;
            let saved = SavedWorld::from_json(&text)?;
            let handles = world.load_world(&saved)?;
            info!(entities = handles.len(), "scene loaded");
        }
        None => {
            scene::build_demo_scene(&mut world)?;
            info!(entities = world.entity_count(), "demo scene built");
        }
    }

    let config = TickConfig {
        tick_rate: args.tick_rate,
        max_ticks: args.max_ticks,
    };
    let mut tick_loop = TickLoop::new(config, world);
    tick_loop.run();

    if let Some(path) = &args.save {
        let saved = tick_loop.world().save_world()?;
        std::fs::write(path, saved.to_json()?)
            .with_context(|| format!("writing scene {}", path.display()))?;
        info!(path = %path.display(), "world saved");
    }

    info!("engine core shut down");
    Ok(())
}
