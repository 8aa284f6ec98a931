//! # Orchard
//!
//! Headless front end for the Orchard ecosystem simulation. The engine lives
//! in `orchard_core`; this crate wires configuration, persistence and
//! reporting together for the `orchard` binary and the integration tests.

pub mod app;

pub use orchard_core as core;
pub use orchard_data as data;
pub use orchard_io as io;
