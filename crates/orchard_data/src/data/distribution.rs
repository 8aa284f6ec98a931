use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Snapshot of where trees stand, used to seed worlds reproducibly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeDistribution {
    pub trees: Vec<TreeRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub position: Vec2,
    pub angle: f32,
    pub age: f32,
}

impl TreeDistribution {
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
