//! Fixed-timestep tick loop.
//!
//! Each tick: broadcast `Update` with the fixed delta, then drain the
//! destroy queue — the one point in the frame where entities actually
//! die.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use engine_component::{Message, MessageKind};
use engine_world::World;

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The tick loop state.
#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    world: World,
}

impl TickLoop {
    /// Create a tick loop over a populated world.
    #[must_use]
    pub fn new(config: TickConfig, world: World) -> Self {
        Self {
            tick_id: 0,
            config,
            world,
        }
    }

    /// The current tick counter.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    /// The world being ticked.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world between ticks.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Run one tick: update broadcast, then the destroy queue.
    pub fn step(&mut self, dt: f32) {
        self.world
            .broadcast_message(&Message::new(MessageKind::Update).param(dt));
        self.world.process_destroy_queue();
        self.tick_id += 1;
        debug!(tick = self.tick_id, "tick complete");
    }

    /// Run the loop at the configured rate until `max_ticks` is reached.
    pub fn run(&mut self) {
        let dt = 1.0 / self.config.tick_rate;
        let period = Duration::from_secs_f64(dt);
        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "tick loop starting"
        );

        loop {
            let started = Instant::now();
            self.step(dt as f32);
            if self.config.max_ticks != 0 && self.tick_id >= self.config.max_ticks {
                break;
            }
            let elapsed = started.elapsed();
            if elapsed < period {
                std::thread::sleep(period - elapsed);
            }
        }

        info!(ticks = self.tick_id, "tick loop finished");
    }
}
