use crate::registry::EntityRegistry;
use orchard_data::{CreatureComponent, FruitComponent, TreeComponent};
use serde::{Deserialize, Serialize};

/// Population snapshot for periodic reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub tick: u64,
    pub creatures: usize,
    pub mature_trees: usize,
    pub saplings: usize,
    pub hanging_fruit: usize,
    pub fallen_fruit: usize,
    pub mean_energy: f32,
    pub mean_speed: f32,
    pub mean_awareness: f32,
    pub mean_age: f32,
}

impl PopulationStats {
    pub fn collect(registry: &EntityRegistry, tick: u64, tree_maturation_time: f32) -> Self {
        let creatures = registry.components::<CreatureComponent>();
        let trees = registry.components::<TreeComponent>();
        let fruit = registry.components::<FruitComponent>();

        let mean = |f: &dyn Fn(&CreatureComponent) -> f32| {
            if creatures.is_empty() {
                0.0
            } else {
                creatures.iter().map(f).sum::<f32>() / creatures.len() as f32
            }
        };
        let mature_trees = trees
            .iter()
            .filter(|t| t.is_mature(tree_maturation_time))
            .count();
        let hanging_fruit = fruit.iter().filter(|f| f.is_attached).count();

        Self {
            tick,
            creatures: creatures.len(),
            mature_trees,
            saplings: trees.len() - mature_trees,
            hanging_fruit,
            fallen_fruit: fruit.len() - hanging_fruit,
            mean_energy: mean(&|c| c.energy),
            mean_speed: mean(&|c| c.max_speed()),
            mean_awareness: mean(&|c| c.awareness_radius()),
            mean_age: mean(&|c| c.age),
        }
    }
}
