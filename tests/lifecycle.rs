#[macro_use]
mod common;

use common::{mature_tree, CreatureBuilder, SimulationBuilder};
use orchard_lib::core::lifecycle;
use orchard_lib::core::registry::RegistryError;
use orchard_lib::data::{
    AreaPhysicsComponent, CreatureComponent, EntityId, EntityType, FruitComponent, SimEvent, Vec2,
};
use proptest::prelude::*;
use std::collections::HashSet;

#[test]
fn test_ids_are_unique_and_increasing() {
    let mut sim = SimulationBuilder::new()
        .with_seed(21)
        .with_config(|c| c.creature.initial_energy = 3.0)
        .populated(30, 12)
        .build();
    let events = sim.run(1200);

    let created: Vec<EntityId> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::CreatureBirth { id, .. }
            | SimEvent::TreePlanted { id }
            | SimEvent::FruitCreated { id } => Some(*id),
            _ => None,
        })
        .collect();
    assert!(created.len() > 12);
    assert!(created.windows(2).all(|w| w[0] < w[1]), "ids are handed out in order");
    let unique: HashSet<_> = created.iter().collect();
    assert_eq!(unique.len(), created.len());

    let alive: Vec<_> = sim
        .registry
        .components::<AreaPhysicsComponent>()
        .into_iter()
        .map(|p| p.entity_id)
        .collect();
    for id in alive {
        assert!(id.is_valid());
        assert!(id.value() <= sim.registry.created_count());
        assert!(!sim.registry.was_destroyed(id));
    }
}

#[test]
fn test_destroy_releases_shapes_and_lookups() {
    let mut sim = SimulationBuilder::new().build();
    let creature = sim
        .spawn_creature(CreatureBuilder::new().build(), Vec2::new(5.0, 5.0))
        .unwrap();
    let tree = mature_tree(&mut sim, Vec2::new(20.0, 20.0));
    let fruit = lifecycle::spawn_fruit(&mut sim.context(), tree, 0, Vec2::new(20.0, 20.0)).unwrap();
    assert_eq!(sim.world.space.len(), 4);
    assert_eq!(sim.world.collisions.len(), 3);

    let physics = sim.registry.get_component::<AreaPhysicsComponent>(creature).unwrap();
    assert_eq!(
        sim.world.collisions.try_get_entity_info(physics.body),
        Some((EntityType::Creature, creature))
    );

    let mut ctx = sim.context();
    assert!(ctx.registry.destroy_entity(creature, ctx.world));
    assert!(!ctx.registry.destroy_entity(creature, ctx.world), "second destroy is a no-op");
    assert!(ctx.registry.destroy_entity(fruit, ctx.world));

    assert_destroyed!(sim, creature);
    assert_destroyed!(sim, fruit);
    assert_alive!(sim, tree);
    assert!(sim.registry.try_get_component::<CreatureComponent>(creature).is_none());
    assert!(sim.registry.try_get_component::<FruitComponent>(fruit).is_none());
    assert!(matches!(
        sim.registry.get_component::<CreatureComponent>(creature),
        Err(RegistryError::NoSuchEntity(id)) if id == creature
    ));
    assert_eq!(sim.world.space.len(), 1);
    assert_eq!(sim.world.collisions.len(), 1);
    assert!(!sim.world.space.contains(physics.body));
    assert!(sim.world.collisions.try_get_entity_info(physics.body).is_none());
}

#[test]
fn test_population_churn_leaves_no_orphan_shapes() {
    let mut sim = SimulationBuilder::new()
        .with_seed(8)
        .populated(50, 20)
        .build();
    sim.run(1800);

    let creatures = sim.registry.count::<CreatureComponent>();
    let areas = sim.registry.count::<AreaPhysicsComponent>();
    let fruit = sim.registry.count::<FruitComponent>();
    // Creatures own a body and a sensor, trees a body, fruit a rigid body.
    assert_eq!(sim.world.space.len(), areas + creatures + fruit);
    assert_eq!(sim.world.collisions.len(), areas + fruit);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_spawned_creatures_get_fresh_ids(count in 1usize..40) {
        let mut sim = SimulationBuilder::new().build();
        let mut ids = Vec::new();
        for i in 0..count {
            let position = Vec2::new(i as f32, 1.0);
            ids.push(sim.spawn_creature(CreatureBuilder::new().build(), position).unwrap());
        }
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(sim.registry.count::<CreatureComponent>(), count);
        prop_assert_eq!(sim.world.space.len(), 2 * count);
    }
}
