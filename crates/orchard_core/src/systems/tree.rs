//! Tree aging, competition, seeding and fruiting.

use super::{System, SystemContext, SystemRoster};
use crate::lifecycle;
use crate::physics::TREE_LAYER;
use crate::registry::RegistryError;
use glam::Vec2;
use orchard_data::{AreaPhysicsComponent, EntityId, EntityType, SimEvent, TreeComponent};

#[derive(Debug, Default)]
pub struct TreeSystem {
    fruiting_enabled: bool,
}

impl TreeSystem {
    pub fn new() -> Self {
        Self {
            fruiting_enabled: true,
        }
    }

    /// Plants `count` mature trees at uniform random positions inside the bounds.
    pub fn create_initial_trees(
        &self,
        ctx: &mut SystemContext<'_>,
        count: usize,
    ) -> Result<Vec<EntityId>, RegistryError> {
        let maturation_time = ctx.config.tree.maturation_time;
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let position = ctx.world.bounds.random_point(&mut ctx.world.rng);
            let tree = TreeComponent {
                angle: ctx.world.random_angle(),
                ..TreeComponent::with_age(maturation_time)
            };
            ids.push(lifecycle::plant_tree(ctx, tree, position)?);
        }
        tracing::info!(count = ids.len(), "Initial trees planted");
        Ok(ids)
    }

    /// Rolls the competition death check for one tree.
    fn should_die(
        &self,
        ctx: &mut SystemContext<'_>,
        tree: &TreeComponent,
        physics: &AreaPhysicsComponent,
    ) -> bool {
        let t = &ctx.config.tree;
        let mature = tree.is_mature(t.maturation_time);

        if !mature && self.crowded_by_mature_tree(ctx, physics) {
            tracing::debug!(tree = %tree.entity_id, "Sapling shaded out by a mature tree");
            return true;
        }

        let neighbors = self.neighbor_count(ctx, tree.entity_id, physics);
        let (base, per_neighbor) = if mature {
            (t.mature_death_probability_base, t.mature_death_probability_per_neighbor)
        } else {
            (t.sapling_death_probability_base, t.sapling_death_probability_per_neighbor)
        };
        let probability = base + per_neighbor * neighbors as f32;
        ctx.world.chance() < probability
    }

    /// Trees whose bodies reach into the competition radius.
    fn neighbor_count(&self, ctx: &SystemContext<'_>, id: EntityId, physics: &AreaPhysicsComponent) -> usize {
        ctx.world
            .detector()
            .overlapping_in_radius(
                physics.position,
                ctx.config.tree.competition_radius,
                TREE_LAYER,
                &[physics.body],
            )
            .iter()
            .filter(|hit| hit.entity_type == EntityType::Tree && hit.entity_id != id)
            .count()
    }

    fn crowded_by_mature_tree(&self, ctx: &SystemContext<'_>, physics: &AreaPhysicsComponent) -> bool {
        let t = &ctx.config.tree;
        ctx.world
            .detector()
            .overlapping_in_radius(physics.position, t.minimum_tree_distance, TREE_LAYER, &[physics.body])
            .iter()
            .filter(|hit| hit.entity_type == EntityType::Tree)
            .any(|hit| {
                ctx.registry
                    .try_get_component::<TreeComponent>(hit.entity_id)
                    .is_some_and(|other| other.alive && other.is_mature(t.maturation_time))
            })
    }

    fn grow_fruit(&self, ctx: &mut SystemContext<'_>, tree: &mut TreeComponent, position: Vec2) {
        let config = ctx.config;
        let empty: Vec<usize> = tree.empty_slots(config.tree.fruit_slots).collect();
        for slot in empty {
            if ctx.world.chance() >= config.tree.fruit_spawn_probability {
                continue;
            }
            match lifecycle::spawn_fruit(ctx, tree.entity_id, slot, position) {
                Ok(fruit) => tree.attached_fruits[slot] = fruit,
                Err(err) => tracing::error!(tree = %tree.entity_id, slot, %err, "Failed to spawn fruit"),
            }
        }
    }
}

impl System for TreeSystem {
    fn name(&self) -> &'static str {
        "trees"
    }

    fn initialize(&mut self, roster: &SystemRoster) {
        self.fruiting_enabled = roster.fruit;
        if !roster.fruit {
            tracing::info!("No fruit system; trees will not bear fruit");
        }
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, dt: f32) {
        let config = ctx.config;
        let t = &config.tree;
        let mut seedlings = Vec::new();

        for mut tree in ctx.registry.components::<TreeComponent>() {
            let id = tree.entity_id;
            if !tree.alive {
                tracing::error!(tree = %id, destroyed = ctx.registry.was_destroyed(id), "Dead tree left in the registry; skipping");
                continue;
            }
            let Some(physics) = ctx.registry.try_get_component::<AreaPhysicsComponent>(id) else {
                tracing::warn!(tree = %id, "Tree has no physics component; skipping");
                continue;
            };

            tree.age += dt;
            tree.time_since_death_check += dt;
            if tree.time_since_death_check >= t.death_check_interval {
                tree.time_since_death_check = 0.0;
                if self.should_die(ctx, &tree, &physics) {
                    ctx.world.events.publish(SimEvent::TreeDeath { id });
                    ctx.registry.destroy_entity(id, ctx.world);
                    continue;
                }
            }

            if tree.is_mature(t.maturation_time) {
                tree.time_since_last_spawn += dt;
                if tree.time_since_last_spawn >= t.spawn_interval {
                    tree.time_since_last_spawn = 0.0;
                    if t.direct_seeding {
                        let angle = ctx.world.random_angle();
                        let distance = ctx.world.range(t.min_spawn_radius, t.max_spawn_radius);
                        let spot = physics.position + Vec2::from_angle(angle) * distance;
                        if ctx.world.is_within_bounds(spot) {
                            seedlings.push(spot);
                        }
                    }
                }

                if self.fruiting_enabled {
                    tree.time_since_fruit_check += dt;
                    if tree.time_since_fruit_check >= config.tree.fruit_check_interval {
                        tree.time_since_fruit_check = 0.0;
                        self.grow_fruit(ctx, &mut tree, physics.position);
                    }
                }
            }

            if let Err(err) = ctx.registry.update_component(tree) {
                tracing::error!(tree = %id, %err, "Failed to write back tree");
            }
        }

        for spot in seedlings {
            let tree = TreeComponent {
                angle: ctx.world.random_angle(),
                ..TreeComponent::default()
            };
            if let Err(err) = lifecycle::plant_tree(ctx, tree, spot) {
                tracing::error!(%err, "Failed to plant seedling");
            }
        }
    }
}
