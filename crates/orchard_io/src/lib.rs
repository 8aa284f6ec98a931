//! # Orchard IO
//!
//! Persistence for the Orchard simulation.
//!
//! Tree distributions are saved and loaded as JSON through [`distribution`];
//! the same helpers serialize event logs for the binary.

pub mod distribution;
pub mod error;
pub mod serialization;

pub use error::{IoError, Result};
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, write_json_file};
