//! Per-tick behavior of creatures, trees and fruit.
//!
//! Each system owns no entity state of its own: it snapshots its components
//! from the [`EntityRegistry`], mutates copies, and writes them back. Cross
//! system collaborators are declared once through a [`SystemRoster`] instead
//! of being looked up at runtime.

pub mod creature;
pub mod fruit;
pub mod tree;

use crate::config::AppConfig;
use crate::registry::EntityRegistry;
use crate::world::SimulationWorld;

pub use creature::{CreatureSystem, Decision};
pub use fruit::FruitSystem;
pub use tree::TreeSystem;

/// Everything a system may touch during one update.
pub struct SystemContext<'a> {
    pub registry: &'a mut EntityRegistry,
    pub world: &'a mut SimulationWorld,
    pub config: &'a AppConfig,
}

/// Which systems take part in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemRoster {
    pub creatures: bool,
    pub trees: bool,
    pub fruit: bool,
}

impl Default for SystemRoster {
    fn default() -> Self {
        Self::full()
    }
}

impl SystemRoster {
    pub fn full() -> Self {
        Self {
            creatures: true,
            trees: true,
            fruit: true,
        }
    }
}

pub trait System {
    fn name(&self) -> &'static str;

    /// Called once with the final roster, before the first update.
    fn initialize(&mut self, _roster: &SystemRoster) {}

    fn update(&mut self, ctx: &mut SystemContext<'_>, delta_time: f32);
}
