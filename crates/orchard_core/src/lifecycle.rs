//! Placing new entities in the world.
//!
//! Every spawn creates the entity, its physics shapes, the collision
//! registry entries and its components in one go, so a half-built entity
//! never becomes visible to the systems. A spawn that fails part way
//! releases everything it allocated.

use crate::physics::{Shape, AWARENESS_LAYER, BODY_LAYER, FRUIT_LAYER, TREE_LAYER};
use crate::registry::{EntityRegistry, RegistryError};
use crate::systems::SystemContext;
use glam::Vec2;
use orchard_data::{
    AreaPhysicsComponent, CreatureComponent, EntityId, EntityType, FruitComponent, Rid,
    SimEvent, TreeComponent,
};
use std::f32::consts::TAU;

/// Registers `creature` at `position` with a body and an awareness sensor.
pub fn spawn_creature(
    ctx: &mut SystemContext<'_>,
    creature: CreatureComponent,
    position: Vec2,
) -> Result<EntityId, RegistryError> {
    let id = ctx.registry.create_entity();
    let space = &mut ctx.world.space;
    let body = space.area_create(
        Shape::Circle {
            radius: ctx.config.creature.body_radius,
        },
        position,
        BODY_LAYER,
        0,
    );
    let awareness = space.area_create(
        Shape::Circle {
            radius: creature.awareness_radius(),
        },
        position,
        AWARENESS_LAYER,
        BODY_LAYER,
    );
    ctx.world.collisions.register_body(body, EntityType::Creature, id);

    finish_entity(ctx, id, &[body, awareness], |registry| {
        registry.add_component(id, AreaPhysicsComponent::new(body, Some(awareness), position))?;
        registry.add_component(id, creature)
    })?;
    tracing::debug!(entity = %id, x = position.x, z = position.y, "Creature spawned");
    Ok(id)
}

/// Registers `tree` as a static body at `position` and fires `TreePlanted`.
pub fn plant_tree(
    ctx: &mut SystemContext<'_>,
    tree: TreeComponent,
    position: Vec2,
) -> Result<EntityId, RegistryError> {
    let id = ctx.registry.create_entity();
    let body = ctx.world.space.area_create(
        Shape::Circle {
            radius: ctx.config.tree.body_radius,
        },
        position,
        BODY_LAYER | TREE_LAYER,
        0,
    );
    ctx.world.collisions.register_body(body, EntityType::Tree, id);

    finish_entity(ctx, id, &[body], |registry| {
        registry.add_component(id, AreaPhysicsComponent::new(body, None, position))?;
        registry.add_component(id, tree)
    })?;
    ctx.world.events.publish(SimEvent::TreePlanted { id });
    Ok(id)
}

/// Runs `attach` on a freshly created entity. On failure the entity, its
/// shapes and their collision entries are released before the error is returned.
fn finish_entity<F>(
    ctx: &mut SystemContext<'_>,
    id: EntityId,
    rids: &[Rid],
    attach: F,
) -> Result<(), RegistryError>
where
    F: FnOnce(&mut EntityRegistry) -> Result<(), RegistryError>,
{
    if let Err(err) = attach(&mut *ctx.registry) {
        tracing::error!(entity = %id, %err, "Spawn failed; releasing its shapes");
        ctx.registry.destroy_entity(id, ctx.world);
        for &rid in rids {
            ctx.world.space.free(rid);
            ctx.world.collisions.unregister_body(rid);
        }
        return Err(err);
    }
    Ok(())
}

/// Where fruit in `slot` hangs on a tree at `tree_position`.
pub fn slot_position(tree_position: Vec2, slot: usize, slot_count: usize, canopy_radius: f32) -> Vec2 {
    let angle = TAU * slot as f32 / slot_count.max(1) as f32;
    tree_position + Vec2::from_angle(angle) * canopy_radius
}

/// Hangs a fresh fruit on `slot` of `tree`. The caller records the returned
/// id in the tree's slot array.
pub fn spawn_fruit(
    ctx: &mut SystemContext<'_>,
    tree: EntityId,
    slot: usize,
    tree_position: Vec2,
) -> Result<EntityId, RegistryError> {
    let fruit_config = &ctx.config.fruit;
    let position = slot_position(
        tree_position,
        slot,
        ctx.config.tree.fruit_slots,
        fruit_config.canopy_radius,
    );

    let id = ctx.registry.create_entity();
    let body = ctx.world.space.body_create(
        Shape::Circle {
            radius: fruit_config.body_radius,
        },
        position,
        FRUIT_LAYER,
        fruit_config.linear_damping,
    );
    ctx.world.collisions.register_body(body, EntityType::Fruit, id);
    finish_entity(ctx, id, &[body], |registry| {
        registry.add_component(id, FruitComponent::new(tree, slot, body))
    })?;
    ctx.world.events.publish(SimEvent::FruitCreated { id });
    Ok(id)
}
