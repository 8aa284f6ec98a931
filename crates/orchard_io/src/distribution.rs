//! Tree distribution files.
//!
//! A distribution is the position, angle and age of every tree at capture
//! time, stored as pretty JSON so it can be edited by hand.

use crate::error::{IoError, Result};
use crate::serialization::{read_json_file, write_json_file};
use chrono::Local;
use orchard_data::TreeDistribution;
use std::path::{Path, PathBuf};

/// `tree_distribution_<yyyyMMdd_HHmmss>.json` inside `dir`.
pub fn default_distribution_path<P: AsRef<Path>>(dir: P) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.as_ref().join(format!("tree_distribution_{stamp}.json"))
}

pub fn save<P: AsRef<Path>>(distribution: &TreeDistribution, path: P) -> Result<()> {
    let path = path.as_ref();
    write_json_file(distribution, path).map_err(|e| e.with_context("saving tree distribution"))?;
    tracing::info!(trees = distribution.trees.len(), path = %path.display(), "Tree distribution saved");
    Ok(())
}

/// Reads a distribution, refusing files without any tree.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TreeDistribution> {
    let path = path.as_ref();
    let distribution: TreeDistribution =
        read_json_file(path).map_err(|e| e.with_context("loading tree distribution"))?;
    if distribution.trees.is_empty() {
        return Err(IoError::InvalidDistribution(format!(
            "{} contains no trees",
            path.display()
        )));
    }
    if let Some(bad) = distribution
        .trees
        .iter()
        .find(|t| !(t.position.is_finite() && t.angle.is_finite() && t.age.is_finite() && t.age >= 0.0))
    {
        return Err(IoError::InvalidDistribution(format!("bad tree record {bad:?}")));
    }
    tracing::info!(trees = distribution.trees.len(), path = %path.display(), "Tree distribution loaded");
    Ok(distribution)
}
