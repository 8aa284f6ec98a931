use super::components::DeathCause;
use super::entity::EntityId;
use serde::{Deserialize, Serialize};

/// State transitions published to observers such as a visual layer.
///
/// Durations are already divided by the simulation time scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SimEvent {
    CreatureBirth {
        id: EntityId,
        parent: EntityId,
        mate: Option<EntityId>,
    },
    CreatureDeath {
        id: EntityId,
        cause: DeathCause,
    },
    CreatureEat {
        creature: EntityId,
        tree: EntityId,
        duration: f32,
    },
    TreePlanted {
        id: EntityId,
    },
    TreeDeath {
        id: EntityId,
    },
    FruitCreated {
        id: EntityId,
    },
    FruitRipened {
        id: EntityId,
    },
    FruitDetached {
        id: EntityId,
    },
    FruitDecayed {
        id: EntityId,
    },
}

impl SimEvent {
    /// Entity the event is about.
    #[must_use]
    pub fn subject(&self) -> EntityId {
        match self {
            Self::CreatureBirth { id, .. }
            | Self::CreatureDeath { id, .. }
            | Self::TreePlanted { id }
            | Self::TreeDeath { id }
            | Self::FruitCreated { id }
            | Self::FruitRipened { id }
            | Self::FruitDetached { id }
            | Self::FruitDecayed { id } => *id,
            Self::CreatureEat { creature, .. } => *creature,
        }
    }

    /// Short stable name, used for metrics counters.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreatureBirth { .. } => "creature_birth",
            Self::CreatureDeath { .. } => "creature_death",
            Self::CreatureEat { .. } => "creature_eat",
            Self::TreePlanted { .. } => "tree_planted",
            Self::TreeDeath { .. } => "tree_death",
            Self::FruitCreated { .. } => "fruit_created",
            Self::FruitRipened { .. } => "fruit_ripened",
            Self::FruitDetached { .. } => "fruit_detached",
            Self::FruitDecayed { .. } => "fruit_decayed",
        }
    }
}
