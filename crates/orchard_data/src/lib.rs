//! # Orchard Data
//!
//! Plain serializable records shared by every Orchard crate: entity ids,
//! components, genomes, simulation events and the persisted tree distribution.
//!
//! Nothing in here draws random numbers or touches the physics space; the
//! behavior lives in `orchard_core`.

pub mod data;

pub use data::components::{
    AreaPhysicsComponent, CreatureComponent, DeathCause, FruitComponent, TreeComponent,
    FRUIT_SLOTS,
};
pub use data::distribution::{TreeDistribution, TreeRecord};
pub use data::entity::{EntityId, EntityType, Rid, TypedCollision};
pub use data::event::SimEvent;
pub use data::genotype::{
    trait_names, BoolExpression, BoolTrait, DeleteriousTrait, FloatExpression, FloatTrait,
    GeneticTrait, Genome,
};
pub use glam::Vec2;
