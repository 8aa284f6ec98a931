#[macro_use]
pub mod macros;

use orchard_lib::core::config::AppConfig;
use orchard_lib::core::lifecycle;
use orchard_lib::core::systems::SystemRoster;
use orchard_lib::core::Simulation;
use orchard_lib::data::{
    trait_names, BoolExpression, BoolTrait, CreatureComponent, DeleteriousTrait, EntityId,
    FloatExpression, FloatTrait, FruitComponent, GeneticTrait, Genome, TreeComponent, Vec2,
};

#[allow(dead_code)]
pub struct SimulationBuilder {
    config: AppConfig,
    roster: SystemRoster,
    populate: bool,
}

#[allow(dead_code)]
impl SimulationBuilder {
    /// Seeded, empty world with every system enabled.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(42);
        config.world.initial_creatures = 0;
        config.world.initial_trees = 0;
        Self {
            config,
            roster: SystemRoster::full(),
            populate: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_roster(mut self, roster: SystemRoster) -> Self {
        self.roster = roster;
        self
    }

    /// Trees and fruit never die or fall by chance.
    pub fn without_hazards(self) -> Self {
        self.with_config(|c| {
            c.tree.sapling_death_probability_base = 0.0;
            c.tree.sapling_death_probability_per_neighbor = 0.0;
            c.tree.mature_death_probability_base = 0.0;
            c.tree.mature_death_probability_per_neighbor = 0.0;
            c.fruit.ripe_fall_probability_per_second = 0.0;
        })
    }

    /// Spawns `creatures` and `trees` through the regular population path on build.
    pub fn populated(mut self, creatures: usize, trees: usize) -> Self {
        self.config.world.initial_creatures = creatures;
        self.config.world.initial_trees = trees;
        self.populate = true;
        self
    }

    /// Skips populating, even if counts were configured.
    pub fn empty_world(mut self) -> Self {
        self.populate = false;
        self
    }

    pub fn build(self) -> Simulation {
        let mut sim = Simulation::with_roster(self.config, self.roster)
            .expect("Failed to create simulation in test builder");
        if self.populate {
            sim.populate().expect("Failed to populate simulation");
        }
        sim
    }
}

#[allow(dead_code)]
pub struct CreatureBuilder {
    speed: f32,
    awareness: f32,
    max_age: f32,
    max_reproduction_age: Option<f32>,
    pleiotropy: bool,
    deleterious: Option<(f32, f32)>,
    energy: f32,
    age: f32,
}

#[allow(dead_code)]
impl CreatureBuilder {
    /// A mature creature with reference traits and little energy.
    pub fn new() -> Self {
        Self {
            speed: 5.0,
            awareness: 5.0,
            max_age: 20.0,
            max_reproduction_age: None,
            pleiotropy: false,
            deleterious: None,
            energy: 1.0,
            age: 5.0,
        }
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn awareness(mut self, radius: f32) -> Self {
        self.awareness = radius;
        self
    }

    pub fn max_age(mut self, max_age: f32) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_reproduction_age(mut self, limit: f32) -> Self {
        self.max_reproduction_age = Some(limit);
        self
    }

    pub fn pleiotropy(mut self) -> Self {
        self.pleiotropy = true;
        self
    }

    /// Carries one expressed deleterious mutation.
    pub fn deleterious(mut self, activation_age: f32, mortality_rate_per_second: f32) -> Self {
        self.deleterious = Some((activation_age, mortality_rate_per_second));
        self
    }

    pub fn energy(mut self, energy: f32) -> Self {
        self.energy = energy;
        self
    }

    pub fn age(mut self, age: f32) -> Self {
        self.age = age;
        self
    }

    pub fn build(self) -> CreatureComponent {
        let float = |name: &str, value: f32| {
            GeneticTrait::Float(FloatTrait::new(
                name,
                vec![value, value],
                FloatExpression::AverageCodominant,
                1.0,
            ))
        };
        let mut genome = Genome::new()
            .with(float(trait_names::MAX_SPEED, self.speed))
            .with(float(trait_names::AWARENESS_RADIUS, self.awareness))
            .with(float(trait_names::MAX_AGE, self.max_age));
        if let Some(limit) = self.max_reproduction_age {
            genome.insert(float(trait_names::MAX_REPRODUCTION_AGE, limit));
        }
        if self.pleiotropy {
            genome.insert(GeneticTrait::Bool(BoolTrait::new(
                trait_names::ANTAGONISTIC_PLEIOTROPY_SPEED,
                vec![true, false],
                BoolExpression::Dominant,
                false,
            )));
        }
        if let Some((activation_age, rate)) = self.deleterious {
            genome.insert(GeneticTrait::Deleterious(DeleteriousTrait::new(
                [true, false],
                activation_age,
                rate,
            )));
        }

        let mut creature = CreatureComponent::new(genome, self.energy, 4.0);
        creature.age = self.age;
        creature
    }
}

/// Plants a mature tree at `position`.
#[allow(dead_code)]
pub fn mature_tree(sim: &mut Simulation, position: Vec2) -> EntityId {
    let age = sim.config().tree.maturation_time + 10.0;
    sim.plant_tree(TreeComponent::with_age(age), position)
        .expect("Failed to plant tree")
}

/// Hangs a ripe fruit on `slot` of `tree` and raises the tree's fruit flag.
#[allow(dead_code)]
pub fn hang_ripe_fruit(sim: &mut Simulation, tree: EntityId, slot: usize) -> EntityId {
    let position = sim.position_of(tree).expect("Tree has no position");
    let fruit_id = lifecycle::spawn_fruit(&mut sim.context(), tree, slot, position)
        .expect("Failed to spawn fruit");

    let mut fruit = sim
        .registry
        .get_component::<FruitComponent>(fruit_id)
        .unwrap();
    fruit.growth_progress = 1.0;
    sim.registry.update_component(fruit).unwrap();

    let mut tree_component = sim.registry.get_component::<TreeComponent>(tree).unwrap();
    tree_component.attached_fruits[slot] = fruit_id;
    tree_component.has_fruit = true;
    sim.registry.update_component(tree_component).unwrap();
    fruit_id
}
