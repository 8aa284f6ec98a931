//! Creature behavior: death checks, then exactly one of busy, mating,
//! foraging or wandering per tick.

use super::fruit::consume_ripe_fruit;
use super::{System, SystemContext, SystemRoster};
use crate::collision::nearest;
use crate::config::{AppConfig, CreatureConfig};
use crate::genetics::GenomeLogic;
use crate::lifecycle;
use crate::population;
use crate::registry::RegistryError;
use crate::reproduction::{strategy_for, ReproductionStrategy};
use glam::Vec2;
use orchard_data::{
    AreaPhysicsComponent, CreatureComponent, DeathCause, EntityId, EntityType, SimEvent,
    TreeComponent, TypedCollision,
};

/// Branch a creature took during its last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Died(DeathCause),
    Busy,
    Mated,
    SeekingMate,
    Eating,
    Foraging,
    Wandering,
}

impl Decision {
    /// Whether the creature was steered this tick.
    pub fn moved(self) -> bool {
        matches!(self, Self::SeekingMate | Self::Foraging | Self::Wandering)
    }
}

#[derive(Debug)]
pub struct CreatureSystem {
    strategy: Box<dyn ReproductionStrategy>,
    foraging_enabled: bool,
    decisions: Vec<(EntityId, Decision)>,
}

impl CreatureSystem {
    pub fn new(strategy: Box<dyn ReproductionStrategy>) -> Self {
        Self {
            strategy,
            foraging_enabled: true,
            decisions: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(strategy_for(config))
    }

    /// Decisions of the last update, in update order.
    pub fn last_decisions(&self) -> &[(EntityId, Decision)] {
        &self.decisions
    }

    /// Spawns the founders at uniform random positions inside the bounds.
    pub fn create_initial_population(
        &self,
        ctx: &mut SystemContext<'_>,
        count: usize,
    ) -> Result<Vec<EntityId>, RegistryError> {
        let config = ctx.config;
        let creature_config = &config.creature;
        let genomes = population::initial_genomes(count, config);
        let mut ids = Vec::with_capacity(genomes.len());
        for genome in genomes {
            let position = ctx.world.bounds.random_point(&mut ctx.world.rng);
            let creature = CreatureComponent::new(
                genome,
                creature_config.initial_energy,
                creature_config.hunger_threshold,
            );
            ids.push(lifecycle::spawn_creature(ctx, creature, position)?);
        }
        tracing::info!(count = ids.len(), "Initial creature population created");
        Ok(ids)
    }

    fn step_creature(
        &self,
        ctx: &mut SystemContext<'_>,
        mut creature: CreatureComponent,
        mut physics: AreaPhysicsComponent,
        dt: f32,
    ) -> Decision {
        let config = ctx.config;
        let c = &config.creature;
        let id = creature.entity_id;
        creature.age += dt;

        if let Some(cause) = death_cause(ctx, &creature, dt) {
            creature.alive = false;
            tracing::debug!(entity = %id, ?cause, age = creature.age, "Creature died");
            ctx.world.events.publish(SimEvent::CreatureDeath { id, cause });
            ctx.registry.destroy_entity(id, ctx.world);
            return Decision::Died(cause);
        }

        if process_busy(&mut creature, c, dt) {
            physics.velocity = Vec2::ZERO;
            commit(ctx, creature, physics);
            return Decision::Busy;
        }

        let nearby = match physics.awareness {
            Some(awareness) => ctx
                .world
                .detector()
                .overlapping_with_area(awareness, &[physics.body]),
            None => Vec::new(),
        };

        if is_open_to_mating(&creature, c) {
            if !self.strategy.requires_mate() {
                self.reproduce_alone(ctx, creature, physics);
                return Decision::Mated;
            }
            if let Some((target, mate)) = find_mate(ctx, id, physics.position, &nearby) {
                if target.distance_squared_to(physics.position) < c.mate_distance * c.mate_distance {
                    physics.velocity = Vec2::ZERO;
                    self.mate(ctx, creature, physics, mate);
                    return Decision::Mated;
                }
                creature.current_destination = Some(target.position);
                move_toward(ctx, &mut creature, &mut physics, dt);
                commit(ctx, creature, physics);
                return Decision::SeekingMate;
            }
        }

        if self.foraging_enabled && creature.energy < creature.hunger_threshold {
            if let Some(tree) = nearest_fruiting_tree(ctx, physics.position, &nearby) {
                let in_reach =
                    tree.distance_squared_to(physics.position) < c.eat_distance * c.eat_distance;
                if in_reach && creature.eating_time_left <= 0.0 {
                    physics.velocity = Vec2::ZERO;
                    eat(ctx, &mut creature, tree.entity_id);
                    commit(ctx, creature, physics);
                    return Decision::Eating;
                }
                creature.current_destination = Some(tree.position);
                move_toward(ctx, &mut creature, &mut physics, dt);
                commit(ctx, creature, physics);
                return Decision::Foraging;
            }
        }

        let arrived = creature
            .current_destination
            .map_or(true, |d| d.distance_squared(physics.position) < c.eat_distance * c.eat_distance);
        if arrived {
            let destination = ctx.world.random_destination(
                physics.position,
                c.step_max_length,
                c.wander_max_attempts,
            );
            creature.current_destination = Some(destination);
        }
        move_toward(ctx, &mut creature, &mut physics, dt);
        commit(ctx, creature, physics);
        Decision::Wandering
    }

    fn mate(
        &self,
        ctx: &mut SystemContext<'_>,
        mut creature: CreatureComponent,
        physics: AreaPhysicsComponent,
        mut mate: CreatureComponent,
    ) {
        let config = ctx.config;
        let c = &config.creature;
        let half_cost = c.reproduction_energy_cost / 2.0;
        creature.energy -= half_cost;
        mate.energy -= half_cost;
        creature.mating_time_left += c.reproduction_duration;
        mate.mating_time_left += c.reproduction_duration;

        let mate_position = ctx
            .registry
            .try_get_component::<AreaPhysicsComponent>(mate.entity_id)
            .map_or(physics.position, |p| p.position);
        let child = self
            .strategy
            .reproduce(&creature.genome, Some(&mate.genome), &mut ctx.world.rng);
        let parent = creature.entity_id;
        let mate_id = mate.entity_id;
        let birthplace = (physics.position + mate_position) * 0.5;

        commit(ctx, creature, physics);
        if let Err(err) = ctx.registry.update_component(mate) {
            tracing::error!(entity = %mate_id, %err, "Failed to write back mate");
        }
        spawn_offspring(ctx, child, birthplace, parent, Some(mate_id));
    }

    fn reproduce_alone(
        &self,
        ctx: &mut SystemContext<'_>,
        mut creature: CreatureComponent,
        mut physics: AreaPhysicsComponent,
    ) {
        let config = ctx.config;
        let c = &config.creature;
        creature.energy -= c.reproduction_energy_cost;
        creature.mating_time_left += c.reproduction_duration;
        physics.velocity = Vec2::ZERO;

        let child = self
            .strategy
            .reproduce(&creature.genome, None, &mut ctx.world.rng);
        let parent = creature.entity_id;
        let position = physics.position;
        commit(ctx, creature, physics);
        spawn_offspring(ctx, child, position, parent, None);
    }
}

impl System for CreatureSystem {
    fn name(&self) -> &'static str {
        "creatures"
    }

    fn initialize(&mut self, roster: &SystemRoster) {
        self.foraging_enabled = roster.trees;
        if !roster.trees {
            tracing::error!("Creature system has no tree system; foraging is disabled");
        }
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, dt: f32) {
        self.decisions.clear();
        for stale in ctx.registry.components::<CreatureComponent>() {
            let id = stale.entity_id;
            if !stale.alive {
                tracing::error!(entity = %id, "Dead creature left in the registry; skipping");
                continue;
            }
            // Re-read: a mate may have been written earlier this tick.
            let Some(creature) = ctx.registry.try_get_component::<CreatureComponent>(id) else {
                continue;
            };
            let Some(physics) = ctx.registry.try_get_component::<AreaPhysicsComponent>(id) else {
                tracing::warn!(entity = %id, "Creature has no physics component; skipping");
                continue;
            };
            let decision = self.step_creature(ctx, creature, physics, dt);
            self.decisions.push((id, decision));
        }
    }
}

fn death_cause(
    ctx: &mut SystemContext<'_>,
    creature: &CreatureComponent,
    dt: f32,
) -> Option<DeathCause> {
    let config = ctx.config;
    let c = &config.creature;
    if creature.energy < 0.0 {
        return Some(DeathCause::Starvation);
    }
    if creature.max_age().is_some_and(|max| creature.age > max) {
        return Some(DeathCause::Aging);
    }
    if creature
        .genome
        .deleterious_death(creature.age, dt, &mut ctx.world.rng)
    {
        return Some(DeathCause::DeleteriousMutation);
    }
    if creature.has_antagonistic_pleiotropy() && creature.is_mature(c.maturation_time) {
        let per_step = 1.0 - (1.0 - c.antagonistic_pleiotropy_death_rate).powf(dt);
        if ctx.world.chance() < per_step {
            return Some(DeathCause::AntagonisticPleiotropy);
        }
    }
    None
}

/// Digests, then reports whether the creature sits this tick out.
fn process_busy(creature: &mut CreatureComponent, c: &CreatureConfig, dt: f32) -> bool {
    if creature.digesting > 0.0 {
        let absorbed = creature.digesting.min(c.digestion_rate * dt);
        creature.digesting -= absorbed;
        creature.energy += absorbed;
    }
    if !creature.is_mature(c.maturation_time) {
        return true;
    }
    if creature.eating_time_left > 0.0 {
        creature.eating_time_left = (creature.eating_time_left - dt).max(0.0);
        return true;
    }
    if creature.mating_time_left > 0.0 {
        creature.mating_time_left = (creature.mating_time_left - dt).max(0.0);
        return true;
    }
    false
}

pub fn is_open_to_mating(creature: &CreatureComponent, c: &CreatureConfig) -> bool {
    creature.alive
        && creature.energy >= c.reproduction_energy_threshold
        && creature.mating_time_left <= 0.0
        && creature
            .max_reproduction_age()
            .map_or(true, |limit| creature.age <= limit)
}

fn find_mate(
    ctx: &SystemContext<'_>,
    seeker: EntityId,
    position: Vec2,
    nearby: &[TypedCollision],
) -> Option<(TypedCollision, CreatureComponent)> {
    let c = &ctx.config.creature;
    let candidates: Vec<(TypedCollision, CreatureComponent)> = nearby
        .iter()
        .filter(|hit| hit.entity_type == EntityType::Creature && hit.entity_id != seeker)
        .filter_map(|hit| {
            ctx.registry
                .try_get_component::<CreatureComponent>(hit.entity_id)
                .filter(|mate| is_open_to_mating(mate, c))
                .map(|mate| (*hit, mate))
        })
        .collect();
    let best = nearest(position, candidates.iter().map(|(hit, _)| hit))?.entity_id;
    candidates.into_iter().find(|(hit, _)| hit.entity_id == best)
}

fn nearest_fruiting_tree(
    ctx: &SystemContext<'_>,
    position: Vec2,
    nearby: &[TypedCollision],
) -> Option<TypedCollision> {
    let fruiting: Vec<TypedCollision> = nearby
        .iter()
        .filter(|hit| hit.entity_type == EntityType::Tree)
        .filter(|hit| {
            ctx.registry
                .try_get_component::<TreeComponent>(hit.entity_id)
                .is_some_and(|tree| tree.has_fruit)
        })
        .copied()
        .collect();
    nearest(position, &fruiting).copied()
}

fn eat(ctx: &mut SystemContext<'_>, creature: &mut CreatureComponent, tree: EntityId) {
    let config = ctx.config;
    let c = &config.creature;
    let gain = ctx
        .world
        .range(c.min_energy_gain_from_food, c.max_energy_gain_from_food);
    creature.digesting += gain;
    creature.eating_time_left = c.eat_duration;
    let fruit = consume_ripe_fruit(ctx, tree);
    tracing::debug!(creature = %creature.entity_id, tree = %tree, ?fruit, gain, "Creature eats");
    ctx.world.events.publish(SimEvent::CreatureEat {
        creature: creature.entity_id,
        tree,
        duration: c.eat_duration / ctx.world.time_scale,
    });
}

/// Steers toward the current destination and pays for the movement.
fn move_toward(
    ctx: &mut SystemContext<'_>,
    creature: &mut CreatureComponent,
    physics: &mut AreaPhysicsComponent,
    dt: f32,
) {
    let config = ctx.config;
    let c = &config.creature;
    let Some(destination) = creature.current_destination else {
        return;
    };
    let base_speed = creature.max_speed();
    let max_speed = if creature.has_antagonistic_pleiotropy() {
        base_speed * c.antagonistic_pleiotropy_speed_factor
    } else {
        base_speed
    };

    let desired = (destination - physics.position).normalize_or_zero() * max_speed;
    let change = (desired - physics.velocity).clamp_length_max(c.max_acceleration_factor * max_speed);
    physics.velocity = (physics.velocity + change).clamp_length_max(max_speed);
    physics.position += physics.velocity * dt;

    ctx.world.space.set_position(physics.body, physics.position);
    if let Some(awareness) = physics.awareness {
        ctx.world.space.set_position(awareness, physics.position);
    }

    let norm_speed = base_speed / c.reference_speed;
    let norm_awareness = creature.awareness_radius() / c.reference_awareness_radius;
    creature.energy -= (c.base_energy_spend
        + c.global_energy_spend_adjustment_factor * (norm_speed * norm_speed + norm_awareness))
        * dt;
}

fn commit(ctx: &mut SystemContext<'_>, creature: CreatureComponent, physics: AreaPhysicsComponent) {
    let id = creature.entity_id;
    if let Err(err) = ctx
        .registry
        .update_component(creature)
        .and_then(|()| ctx.registry.update_component(physics))
    {
        tracing::error!(entity = %id, %err, "Failed to write back creature");
    }
}

fn spawn_offspring(
    ctx: &mut SystemContext<'_>,
    child: CreatureComponent,
    position: Vec2,
    parent: EntityId,
    mate: Option<EntityId>,
) {
    match lifecycle::spawn_creature(ctx, child, position) {
        Ok(id) => {
            tracing::debug!(entity = %id, parent = %parent, ?mate, "Creature born");
            ctx.world
                .events
                .publish(SimEvent::CreatureBirth { id, parent, mate });
        }
        Err(err) => tracing::error!(parent = %parent, %err, "Failed to spawn offspring"),
    }
}
