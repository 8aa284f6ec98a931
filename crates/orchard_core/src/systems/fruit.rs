//! Fruit growth on trees, falling, and decay into saplings.

use super::{System, SystemContext, SystemRoster};
use crate::lifecycle;
use crate::physics::BodyMode;
use crate::registry::EntityRegistry;
use glam::Vec2;
use orchard_data::{EntityId, FruitComponent, SimEvent, TreeComponent};

#[derive(Debug, Default)]
pub struct FruitSystem {
    enabled: bool,
}

impl FruitSystem {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn update_attached(&self, ctx: &mut SystemContext<'_>, mut fruit: FruitComponent, dt: f32) {
        let config = ctx.config;
        let Some(mut tree) = ctx
            .registry
            .try_get_component::<TreeComponent>(fruit.parent_tree_id)
        else {
            tracing::debug!(fruit = %fruit.entity_id, tree = %fruit.parent_tree_id, "Parent tree gone; fruit falls");
            detach(ctx, &mut fruit, None);
            write_back(ctx.registry, fruit);
            return;
        };

        if !fruit.is_ripe() {
            fruit.growth_progress += dt / config.fruit.growth_time;
            if fruit.is_ripe() {
                fruit.growth_progress = 1.0;
                tree.has_fruit = true;
                write_back(ctx.registry, tree);
                ctx.world
                    .events
                    .publish(SimEvent::FruitRipened { id: fruit.entity_id });
            }
        } else if ctx.world.chance() < config.fruit.ripe_fall_probability_per_second * dt {
            detach(ctx, &mut fruit, Some(tree));
        }
        write_back(ctx.registry, fruit);
    }

    fn update_detached(&self, ctx: &mut SystemContext<'_>, mut fruit: FruitComponent, dt: f32) {
        let config = ctx.config;
        fruit.detached_time += dt;
        if fruit.detached_time < config.fruit.decay_time {
            write_back(ctx.registry, fruit);
            return;
        }

        let id = fruit.entity_id;
        let resting = ctx
            .world
            .space
            .position(fruit.body)
            .filter(|p| ctx.world.is_within_bounds(*p));
        match resting {
            Some(position) => {
                let tree = TreeComponent {
                    angle: ctx.world.random_angle(),
                    ..TreeComponent::default()
                };
                if let Err(err) = lifecycle::plant_tree(ctx, tree, position) {
                    tracing::error!(fruit = %id, %err, "Failed to plant sapling from fruit");
                }
            }
            None => tracing::debug!(fruit = %id, "Fruit decayed outside the world; no sapling"),
        }
        ctx.registry.destroy_entity(id, ctx.world);
        ctx.world.events.publish(SimEvent::FruitDecayed { id });
    }
}

impl System for FruitSystem {
    fn name(&self) -> &'static str {
        "fruit"
    }

    fn initialize(&mut self, roster: &SystemRoster) {
        self.enabled = roster.trees;
        if !roster.trees {
            tracing::error!("Fruit system requires a tree system; fruit is disabled");
        }
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, dt: f32) {
        if !self.enabled {
            return;
        }
        for fruit in ctx.registry.components::<FruitComponent>() {
            if fruit.is_attached {
                self.update_attached(ctx, fruit, dt);
            } else {
                self.update_detached(ctx, fruit, dt);
            }
        }
    }
}

/// Drops `fruit` from its tree: frees the slot and hands the body to physics.
fn detach(ctx: &mut SystemContext<'_>, fruit: &mut FruitComponent, tree: Option<TreeComponent>) {
    let impulse_limit = ctx.config.fruit.detach_impulse;
    fruit.is_attached = false;
    fruit.detached_time = 0.0;

    if let Some(mut tree) = tree {
        tree.release_fruit(fruit.entity_id);
        tree.has_fruit = has_ripe_fruit(ctx.registry, &tree);
        write_back(ctx.registry, tree);
    }

    let impulse = Vec2::new(
        ctx.world.range(-impulse_limit, impulse_limit),
        ctx.world.range(-impulse_limit, impulse_limit),
    );
    let space = &mut ctx.world.space;
    space.body_set_mode(fruit.body, BodyMode::Rigid);
    space.body_apply_central_impulse(fruit.body, impulse);
    ctx.world
        .events
        .publish(SimEvent::FruitDetached { id: fruit.entity_id });
}

/// Whether any fruit still hanging on `tree` is ripe.
pub fn has_ripe_fruit(registry: &EntityRegistry, tree: &TreeComponent) -> bool {
    tree.attached().any(|(_, id)| {
        registry
            .try_get_component::<FruitComponent>(id)
            .is_some_and(|f| f.is_attached && f.is_ripe())
    })
}

/// Removes the first ripe fruit hanging on `tree_id` and refreshes the
/// tree's `has_fruit` flag. Returns the eaten fruit, if there was one.
pub fn consume_ripe_fruit(ctx: &mut SystemContext<'_>, tree_id: EntityId) -> Option<EntityId> {
    let mut tree = ctx.registry.try_get_component::<TreeComponent>(tree_id)?;
    let eaten = tree.attached().map(|(_, id)| id).find(|id| {
        ctx.registry
            .try_get_component::<FruitComponent>(*id)
            .is_some_and(|f| f.is_attached && f.is_ripe())
    });
    if let Some(fruit) = eaten {
        tree.release_fruit(fruit);
        ctx.registry.destroy_entity(fruit, ctx.world);
    }
    tree.has_fruit = has_ripe_fruit(ctx.registry, &tree);
    write_back(ctx.registry, tree);
    eaten
}

fn write_back<T: crate::registry::Component>(registry: &mut EntityRegistry, component: T) {
    let id = component.entity_id();
    if let Err(err) = registry.update_component(component) {
        tracing::error!(entity = %id, component = T::NAME, %err, "Write-back failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::world::SimulationWorld;

    fn setup() -> (AppConfig, EntityRegistry, SimulationWorld) {
        let mut config = AppConfig::default();
        config.world.seed = Some(5);
        let world = SimulationWorld::new(&config);
        (config, EntityRegistry::new(), world)
    }

    #[test]
    fn test_inert_without_trees() {
        let mut system = FruitSystem::new();
        system.initialize(&SystemRoster {
            creatures: true,
            trees: false,
            fruit: true,
        });
        assert!(!system.is_enabled());
    }

    #[test]
    fn test_consume_clears_slot_and_flag() {
        let (config, mut registry, mut world) = setup();
        let mut ctx = SystemContext {
            registry: &mut registry,
            world: &mut world,
            config: &config,
        };
        let position = Vec2::new(10.0, 10.0);
        let tree_id = lifecycle::plant_tree(&mut ctx, TreeComponent::with_age(30.0), position).unwrap();
        let fruit_id = lifecycle::spawn_fruit(&mut ctx, tree_id, 0, position).unwrap();

        let mut fruit = ctx.registry.get_component::<FruitComponent>(fruit_id).unwrap();
        fruit.growth_progress = 1.0;
        ctx.registry.update_component(fruit).unwrap();
        let mut tree = ctx.registry.get_component::<TreeComponent>(tree_id).unwrap();
        tree.attached_fruits[0] = fruit_id;
        tree.has_fruit = true;
        ctx.registry.update_component(tree).unwrap();

        assert_eq!(consume_ripe_fruit(&mut ctx, tree_id), Some(fruit_id));
        let tree = registry.get_component::<TreeComponent>(tree_id).unwrap();
        assert!(!tree.has_fruit);
        assert!(!tree.attached_fruits[0].is_valid());
        assert!(!registry.is_alive(fruit_id));
    }

    #[test]
    fn test_unripe_fruit_is_not_eaten() {
        let (config, mut registry, mut world) = setup();
        let mut ctx = SystemContext {
            registry: &mut registry,
            world: &mut world,
            config: &config,
        };
        let position = Vec2::new(10.0, 10.0);
        let tree_id = lifecycle::plant_tree(&mut ctx, TreeComponent::with_age(30.0), position).unwrap();
        let fruit_id = lifecycle::spawn_fruit(&mut ctx, tree_id, 1, position).unwrap();
        let mut tree = ctx.registry.get_component::<TreeComponent>(tree_id).unwrap();
        tree.attached_fruits[1] = fruit_id;
        ctx.registry.update_component(tree).unwrap();

        assert_eq!(consume_ripe_fruit(&mut ctx, tree_id), None);
        assert!(registry.is_alive(fruit_id));
    }
}
