//! Tick orchestration.
//!
//! A [`Simulation`] owns the registry, the world and the enabled systems and
//! advances them in a fixed order: creatures, trees, fruit, then one physics
//! step. Events published during the tick are returned by [`Simulation::step`]
//! after every subscriber has seen them.

use crate::config::AppConfig;
use crate::lifecycle;
use crate::metrics::Metrics;
use crate::registry::EntityRegistry;
use crate::stats::PopulationStats;
use crate::systems::{
    CreatureSystem, FruitSystem, System, SystemContext, SystemRoster, TreeSystem,
};
use crate::world::SimulationWorld;
use anyhow::{bail, Context, Result};
use glam::Vec2;
use orchard_data::{
    AreaPhysicsComponent, CreatureComponent, EntityId, SimEvent, TreeComponent,
    TreeDistribution, TreeRecord,
};
use std::time::Instant;

#[derive(Debug)]
pub struct Simulation {
    config: AppConfig,
    pub registry: EntityRegistry,
    pub world: SimulationWorld,
    creatures: Option<CreatureSystem>,
    trees: Option<TreeSystem>,
    fruit: Option<FruitSystem>,
    tick: u64,
    metrics: Metrics,
}

impl Simulation {
    /// Builds an empty world with every system enabled.
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_roster(config, SystemRoster::full())
    }

    pub fn with_roster(config: AppConfig, roster: SystemRoster) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let world = SimulationWorld::new(&config);

        let mut creatures = roster
            .creatures
            .then(|| CreatureSystem::from_config(&config));
        let mut trees = roster.trees.then(TreeSystem::new);
        let mut fruit = roster.fruit.then(FruitSystem::new);
        if let Some(s) = creatures.as_mut() {
            s.initialize(&roster);
        }
        if let Some(s) = trees.as_mut() {
            s.initialize(&roster);
        }
        if let Some(s) = fruit.as_mut() {
            s.initialize(&roster);
        }

        tracing::info!(
            fingerprint = %config.fingerprint(),
            seed = ?config.world.seed,
            ?roster,
            "Simulation created"
        );
        Ok(Self {
            config,
            registry: EntityRegistry::new(),
            world,
            creatures,
            trees,
            fruit,
            tick: 0,
            metrics: Metrics::new(),
        })
    }

    /// Spawns the initial creatures and trees from the configuration.
    pub fn populate(&mut self) -> Result<()> {
        self.populate_creatures()?;
        self.populate_trees()?;
        Ok(())
    }

    pub fn populate_creatures(&mut self) -> Result<Vec<EntityId>> {
        let count = self.config.world.initial_creatures;
        let mut ctx = SystemContext {
            registry: &mut self.registry,
            world: &mut self.world,
            config: &self.config,
        };
        match &self.creatures {
            Some(creatures) => Ok(creatures.create_initial_population(&mut ctx, count)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn populate_trees(&mut self) -> Result<Vec<EntityId>> {
        let count = self.config.world.initial_trees;
        let mut ctx = SystemContext {
            registry: &mut self.registry,
            world: &mut self.world,
            config: &self.config,
        };
        match &self.trees {
            Some(trees) => Ok(trees.create_initial_trees(&mut ctx, count)?),
            None => Ok(Vec::new()),
        }
    }

    /// Advances the simulation by one physics step and returns its events.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let started = Instant::now();
        let dt = self.world.delta_time();
        {
            let mut ctx = SystemContext {
                registry: &mut self.registry,
                world: &mut self.world,
                config: &self.config,
            };
            if let Some(system) = self.creatures.as_mut() {
                system.update(&mut ctx, dt);
            }
            if let Some(system) = self.trees.as_mut() {
                system.update(&mut ctx, dt);
            }
            if let Some(system) = self.fruit.as_mut() {
                system.update(&mut ctx, dt);
            }
        }
        self.world.space.step(dt);
        self.tick += 1;

        let events = self.world.events.drain();
        for event in &events {
            self.metrics.record_event(event);
        }
        self.metrics.record_tick(
            started.elapsed(),
            self.registry.count::<CreatureComponent>(),
            self.registry.count::<TreeComponent>(),
        );
        events
    }

    /// Runs `ticks` steps and returns every event in order.
    pub fn run(&mut self, ticks: u64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.step());
        }
        events
    }

    /// Registers a listener that sees every event as it is published.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&SimEvent) + 'static,
    {
        self.world.events.subscribe(handler);
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Live tuning. The change is applied only if the result validates.
    /// Structural settings such as the seed or bounds only take effect on a
    /// new simulation.
    pub fn update_config<F>(&mut self, modifier: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut next = self.config.clone();
        modifier(&mut next);
        next.validate().context("rejected configuration update")?;
        tracing::debug!(fingerprint = %next.fingerprint(), "Configuration updated");
        self.config = next;
        Ok(())
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.tick as f32 * self.world.delta_time()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn creature_system(&self) -> Option<&CreatureSystem> {
        self.creatures.as_ref()
    }

    pub fn stats(&self) -> PopulationStats {
        PopulationStats::collect(&self.registry, self.tick, self.config.tree.maturation_time)
    }

    /// Context for driving lifecycle helpers or a single system by hand.
    pub fn context(&mut self) -> SystemContext<'_> {
        SystemContext {
            registry: &mut self.registry,
            world: &mut self.world,
            config: &self.config,
        }
    }

    pub fn spawn_creature(&mut self, creature: CreatureComponent, position: Vec2) -> Result<EntityId> {
        let id = lifecycle::spawn_creature(&mut self.context(), creature, position)?;
        Ok(id)
    }

    pub fn plant_tree(&mut self, tree: TreeComponent, position: Vec2) -> Result<EntityId> {
        let id = lifecycle::plant_tree(&mut self.context(), tree, position)?;
        Ok(id)
    }

    /// Position of any entity with a physics presence.
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.registry
            .try_get_component::<AreaPhysicsComponent>(id)
            .map(|p| p.position)
    }

    /// Every live tree's position, angle and age, ordered by entity id.
    pub fn capture_tree_distribution(&self) -> TreeDistribution {
        let trees = self
            .registry
            .components::<TreeComponent>()
            .into_iter()
            .filter_map(|tree| {
                self.position_of(tree.entity_id).map(|position| TreeRecord {
                    position,
                    angle: tree.angle,
                    age: tree.age,
                })
            })
            .collect();
        TreeDistribution { trees }
    }

    /// Plants every tree of `distribution`. Refuses to mix with existing trees.
    pub fn load_tree_distribution(&mut self, distribution: &TreeDistribution) -> Result<usize> {
        let existing = self.registry.count::<TreeComponent>();
        if existing > 0 {
            bail!("cannot load a tree distribution into a world with {existing} trees");
        }
        let mut ctx = self.context();
        let mut planted = 0;
        for record in &distribution.trees {
            if !ctx.world.is_within_bounds(record.position) {
                tracing::warn!(
                    x = record.position.x,
                    z = record.position.y,
                    "Skipping out-of-bounds tree record"
                );
                continue;
            }
            let tree = TreeComponent {
                angle: record.angle,
                ..TreeComponent::with_age(record.age)
            };
            lifecycle::plant_tree(&mut ctx, tree, record.position)?;
            planted += 1;
        }
        tracing::info!(planted, total = distribution.trees.len(), "Tree distribution loaded");
        Ok(planted)
    }
}
