use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a simulated entity.
///
/// Ids are handed out by the registry starting at 1 and are never reused.
/// `EntityId::INVALID` (0) marks an empty reference, e.g. an unused fruit slot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub const INVALID: Self = Self(0);

    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a shape owned by the physics space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rid(pub u64);

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rid:{}", self.0)
    }
}

/// Kind of entity a physics shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Creature,
    Tree,
    Fruit,
}

/// One resolved hit of a shape-overlap query. Recomputed every tick, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedCollision {
    pub entity_type: EntityType,
    pub entity_id: EntityId,
    pub position: Vec2,
}

impl TypedCollision {
    #[inline]
    #[must_use]
    pub fn distance_squared_to(&self, point: Vec2) -> f32 {
        self.position.distance_squared(point)
    }
}
