//! # Orchard Core
//!
//! The deterministic simulation engine behind Orchard: creatures wander a
//! rectangular world, forage fruit from trees, mate, and evolve through a
//! small diploid genome, while trees compete for space and reseed through
//! fallen fruit.
//!
//! ## Architecture
//!
//! - **Entity registry**: `hecs`-backed component storage with stable ids
//!   and release hooks that free physics handles on destroy
//! - **Physics space**: circle areas and bodies over a spatial-hash broadphase,
//!   with typed overlap queries through the collision registry
//! - **Systems**: creature, tree and fruit state machines updated in a fixed
//!   order by [`simulation::Simulation`]
//! - **Deterministic simulation**: one seeded `ChaCha8Rng` drives every draw
//!
//! ## Example
//!
//! ```
//! use orchard_core::config::AppConfig;
//! use orchard_core::simulation::Simulation;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(42);
//! config.world.initial_creatures = 20;
//! config.world.initial_trees = 10;
//!
//! let mut sim = Simulation::new(config).unwrap();
//! sim.populate().unwrap();
//! let events = sim.run(60);
//! assert_eq!(sim.tick(), 60);
//! # let _ = events;
//! ```

/// Overlap queries resolved to typed entities
pub mod collision;
/// Configuration management for simulation parameters
pub mod config;
/// Synchronous event delivery
pub mod events;
/// Mutation, crossover and deleterious mortality
pub mod genetics;
/// Spawning creatures, trees and fruit
pub mod lifecycle;
/// Performance metrics and structured logging
pub mod metrics;
/// Circle areas and bodies
pub mod physics;
/// First-generation genomes
pub mod population;
/// Entity and component storage
pub mod registry;
/// Sexual and asexual reproduction strategies
pub mod reproduction;
/// Tick orchestration
pub mod simulation;
/// Spatial hashing broadphase
pub mod spatial_hash;
/// Population summaries
pub mod stats;
/// Creature, tree and fruit systems
pub mod systems;
/// Bounds, clock and random source
pub mod world;

pub use simulation::Simulation;
