//! Core data structures for the Orchard simulation.

pub mod components;
pub mod distribution;
pub mod entity;
pub mod event;
pub mod genotype;
