use super::entity::{EntityId, Rid};
use super::genotype::{trait_names, Genome};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Capacity of the fruit-attachment array on a tree. Configs may use fewer.
pub const FRUIT_SLOTS: usize = 4;

/// Why a creature died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Aging,
    DeleteriousMutation,
    AntagonisticPleiotropy,
}

/// Simulation state of one creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureComponent {
    pub entity_id: EntityId,
    pub genome: Arc<Genome>,
    pub current_destination: Option<Vec2>,
    pub age: f32,
    pub energy: f32,
    pub hunger_threshold: f32,
    /// Energy eaten but not yet absorbed.
    pub digesting: f32,
    pub eating_time_left: f32,
    pub mating_time_left: f32,
    pub alive: bool,
}

impl CreatureComponent {
    #[must_use]
    pub fn new(genome: Genome, initial_energy: f32, hunger_threshold: f32) -> Self {
        Self {
            entity_id: EntityId::INVALID,
            genome: Arc::new(genome),
            current_destination: None,
            age: 0.0,
            energy: initial_energy,
            hunger_threshold,
            digesting: 0.0,
            eating_time_left: 0.0,
            mating_time_left: 0.0,
            alive: true,
        }
    }

    #[must_use]
    pub fn max_speed(&self) -> f32 {
        self.genome
            .expressed_f32(trait_names::MAX_SPEED)
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn awareness_radius(&self) -> f32 {
        self.genome
            .expressed_f32(trait_names::AWARENESS_RADIUS)
            .unwrap_or(0.0)
    }

    #[must_use]
    pub fn max_age(&self) -> Option<f32> {
        self.genome.expressed_f32(trait_names::MAX_AGE)
    }

    #[must_use]
    pub fn max_reproduction_age(&self) -> Option<f32> {
        self.genome.expressed_f32(trait_names::MAX_REPRODUCTION_AGE)
    }

    #[must_use]
    pub fn has_antagonistic_pleiotropy(&self) -> bool {
        self.genome
            .expressed_bool(trait_names::ANTAGONISTIC_PLEIOTROPY_SPEED)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn is_mature(&self, maturation_time: f32) -> bool {
        self.age >= maturation_time
    }
}

/// Simulation state of one tree. Position lives in the tree's `AreaPhysicsComponent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeComponent {
    pub entity_id: EntityId,
    pub angle: f32,
    pub age: f32,
    pub time_since_last_spawn: f32,
    pub time_since_death_check: f32,
    pub time_since_fruit_check: f32,
    pub has_fruit: bool,
    pub attached_fruits: [EntityId; FRUIT_SLOTS],
    pub alive: bool,
}

impl Default for TreeComponent {
    fn default() -> Self {
        Self {
            entity_id: EntityId::INVALID,
            angle: 0.0,
            age: 0.0,
            time_since_last_spawn: 0.0,
            time_since_death_check: 0.0,
            time_since_fruit_check: 0.0,
            has_fruit: false,
            attached_fruits: [EntityId::INVALID; FRUIT_SLOTS],
            alive: true,
        }
    }
}

impl TreeComponent {
    #[must_use]
    pub fn with_age(age: f32) -> Self {
        Self {
            age,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_mature(&self, maturation_time: f32) -> bool {
        self.age >= maturation_time
    }

    /// Indices of unused slots among the first `slot_count`.
    pub fn empty_slots(&self, slot_count: usize) -> impl Iterator<Item = usize> + '_ {
        self.attached_fruits
            .iter()
            .take(slot_count.min(FRUIT_SLOTS))
            .enumerate()
            .filter(|(_, id)| !id.is_valid())
            .map(|(i, _)| i)
    }

    /// Clears the slot holding `fruit`, if any. Returns whether a slot was cleared.
    pub fn release_fruit(&mut self, fruit: EntityId) -> bool {
        match self.attached_fruits.iter_mut().find(|id| **id == fruit) {
            Some(slot) => {
                *slot = EntityId::INVALID;
                true
            }
            None => false,
        }
    }

    pub fn attached(&self) -> impl Iterator<Item = (usize, EntityId)> + '_ {
        self.attached_fruits
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, id)| id.is_valid())
    }
}

/// One fruit, growing on a tree slot or lying on the ground.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FruitComponent {
    pub entity_id: EntityId,
    pub parent_tree_id: EntityId,
    pub slot_index: usize,
    /// 0.0 to 1.0; ripe at 1.0.
    pub growth_progress: f32,
    pub is_attached: bool,
    pub detached_time: f32,
    pub body: Rid,
}

impl FruitComponent {
    #[must_use]
    pub fn new(parent_tree_id: EntityId, slot_index: usize, body: Rid) -> Self {
        Self {
            entity_id: EntityId::INVALID,
            parent_tree_id,
            slot_index,
            growth_progress: 0.0,
            is_attached: true,
            detached_time: 0.0,
            body,
        }
    }

    #[must_use]
    pub fn is_ripe(&self) -> bool {
        self.growth_progress >= 1.0
    }
}

/// Physics presence of a creature or tree: a body area plus an optional awareness sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaPhysicsComponent {
    pub entity_id: EntityId,
    pub body: Rid,
    pub awareness: Option<Rid>,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl AreaPhysicsComponent {
    #[must_use]
    pub fn new(body: Rid, awareness: Option<Rid>, position: Vec2) -> Self {
        Self {
            entity_id: EntityId::INVALID,
            body,
            awareness,
            position,
            velocity: Vec2::ZERO,
        }
    }
}
