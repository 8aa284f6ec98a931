//! Configuration management for simulation parameters.
//!
//! Every tunable of the orchard simulation lives in one of the sections of
//! [`AppConfig`], which maps one-to-one onto a `config.toml` file.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing keys fall back)
//! 3. Command line flags of the `orchard` binary (seed, tick count)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 50.0
//! height = 50.0
//! seed = 42
//!
//! [creature]
//! hunger_threshold = 4.0
//!
//! [evolution]
//! reproduction = "Asexual"
//! mutation_probability = 0.1
//! ```

use serde::{Deserialize, Serialize};

/// World-level configuration: dimensions, clock and initial population.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub seed: Option<u64>,
    pub physics_steps_per_sim_second: u32,
    /// Multiplier applied to durations published in events.
    pub time_scale: f32,
    pub initial_creatures: usize,
    pub initial_trees: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            seed: None,
            physics_steps_per_sim_second: 60,
            time_scale: 1.0,
            initial_creatures: 100,
            initial_trees: 30,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn delta_time(&self) -> f32 {
        1.0 / self.physics_steps_per_sim_second as f32
    }
}

/// Physics space tuning.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Upper bound on hits returned by one shape query.
    pub max_query_results: usize,
    /// Edge length of a broadphase cell.
    pub cell_size: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_query_results: 32,
            cell_size: 5.0,
        }
    }
}

/// Creature behavior and energy economics.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CreatureConfig {
    pub step_max_length: f32,
    pub max_acceleration_factor: f32,
    pub eat_distance: f32,
    pub mate_distance: f32,
    pub eat_duration: f32,
    pub maturation_time: f32,
    pub base_energy_spend: f32,
    pub global_energy_spend_adjustment_factor: f32,
    pub min_energy_gain_from_food: f32,
    pub max_energy_gain_from_food: f32,
    /// Energy moved from `digesting` into `energy` per simulated second.
    pub digestion_rate: f32,
    pub reproduction_energy_threshold: f32,
    pub reproduction_energy_cost: f32,
    pub hunger_threshold: f32,
    pub reproduction_duration: f32,
    pub initial_energy: f32,
    pub reference_speed: f32,
    pub reference_awareness_radius: f32,
    pub reference_max_age: f32,
    /// Per-second hazard for mature carriers of the pleiotropy trait.
    pub antagonistic_pleiotropy_death_rate: f32,
    pub antagonistic_pleiotropy_speed_factor: f32,
    pub body_radius: f32,
    pub wander_max_attempts: u32,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            step_max_length: 10.0,
            max_acceleration_factor: 0.1,
            eat_distance: 2.0,
            mate_distance: 2.0,
            eat_duration: 1.5,
            maturation_time: 2.0,
            base_energy_spend: 0.1,
            global_energy_spend_adjustment_factor: 0.2,
            min_energy_gain_from_food: 0.5,
            max_energy_gain_from_food: 1.5,
            digestion_rate: 3.0,
            reproduction_energy_threshold: 2.0,
            reproduction_energy_cost: 1.0,
            hunger_threshold: 4.0,
            reproduction_duration: 1.0,
            initial_energy: 1.0,
            reference_speed: 5.0,
            reference_awareness_radius: 5.0,
            reference_max_age: 20.0,
            antagonistic_pleiotropy_death_rate: 0.03,
            antagonistic_pleiotropy_speed_factor: 2.0,
            body_radius: 0.25,
            wander_max_attempts: 100,
        }
    }
}

/// Which reproduction strategy creatures use.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReproductionMode {
    #[default]
    Sexual,
    Asexual,
}

/// Genome layout of the first generation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialPopulation {
    AllDefaults,
    FlatMaxAgeDistribution,
    #[default]
    SpeedAndAwarenessDiploid,
}

/// Genetics parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub reproduction: ReproductionMode,
    pub initial_population: InitialPopulation,
    pub mutation_probability: f32,
    pub mutation_increment: f32,
    pub deleterious_mutation_rate: f32,
    /// Upper bound of the mortality rate drawn for a new deleterious trait.
    pub max_deleterious_mortality_rate: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            reproduction: ReproductionMode::Sexual,
            initial_population: InitialPopulation::SpeedAndAwarenessDiploid,
            mutation_probability: 0.1,
            mutation_increment: 1.0,
            deleterious_mutation_rate: 0.0,
            max_deleterious_mortality_rate: 0.1,
        }
    }
}

/// Tree growth, competition and fruiting.
///
/// Death probabilities are per death check, which runs every
/// `death_check_interval` seconds.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TreeConfig {
    pub max_spawn_radius: f32,
    pub min_spawn_radius: f32,
    pub competition_radius: f32,
    pub minimum_tree_distance: f32,
    pub maturation_time: f32,
    pub spawn_interval: f32,
    pub death_check_interval: f32,
    pub sapling_death_probability_base: f32,
    pub sapling_death_probability_per_neighbor: f32,
    pub mature_death_probability_base: f32,
    pub mature_death_probability_per_neighbor: f32,
    /// Plant saplings around mature trees on every spawn interval.
    pub direct_seeding: bool,
    pub fruit_slots: usize,
    pub fruit_check_interval: f32,
    /// Odds per empty slot and fruit check.
    pub fruit_spawn_probability: f32,
    pub body_radius: f32,
    /// JSON tree distribution to seed the world from instead of random trees.
    pub distribution_path: Option<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_spawn_radius: 8.0,
            min_spawn_radius: 2.0,
            competition_radius: 6.0,
            minimum_tree_distance: 2.0,
            maturation_time: 20.0,
            spawn_interval: 3.0,
            death_check_interval: 1.0,
            sapling_death_probability_base: 0.006,
            sapling_death_probability_per_neighbor: 0.06,
            mature_death_probability_base: 0.006,
            mature_death_probability_per_neighbor: 0.012,
            direct_seeding: false,
            fruit_slots: 3,
            fruit_check_interval: 1.0,
            fruit_spawn_probability: 0.2,
            body_radius: 1.0,
            distribution_path: None,
        }
    }
}

/// Fruit growth, fall and decay.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FruitConfig {
    pub growth_time: f32,
    pub ripe_fall_probability_per_second: f32,
    pub decay_time: f32,
    /// Half-width of the random lateral impulse applied on detach.
    pub detach_impulse: f32,
    pub body_radius: f32,
    pub linear_damping: f32,
    /// Distance of attachment points from the trunk.
    pub canopy_radius: f32,
}

impl Default for FruitConfig {
    fn default() -> Self {
        Self {
            growth_time: 4.0,
            ripe_fall_probability_per_second: 0.1,
            decay_time: 5.0,
            detach_impulse: 0.5,
            body_radius: 0.2,
            linear_damping: 2.0,
            canopy_radius: 0.8,
        }
    }
}

/// Root configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub creature: CreatureConfig,
    pub evolution: EvolutionConfig,
    pub tree: TreeConfig,
    pub fruit: FruitConfig,
}

fn probability(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World
        anyhow::ensure!(self.world.width > 0.0, "World width must be positive");
        anyhow::ensure!(self.world.height > 0.0, "World height must be positive");
        anyhow::ensure!(
            self.world.width <= 10_000.0 && self.world.height <= 10_000.0,
            "World too large (max 10000 per side)"
        );
        anyhow::ensure!(
            self.world.physics_steps_per_sim_second > 0,
            "Physics steps per sim second must be positive"
        );
        anyhow::ensure!(self.world.time_scale > 0.0, "Time scale must be positive");
        anyhow::ensure!(
            self.world.initial_creatures <= 100_000,
            "Initial creature count too large (max 100000)"
        );

        // Physics
        anyhow::ensure!(
            self.physics.max_query_results > 0,
            "Max query results must be positive"
        );
        anyhow::ensure!(self.physics.cell_size > 0.0, "Cell size must be positive");

        // Creatures
        let c = &self.creature;
        anyhow::ensure!(c.step_max_length > 0.0, "Step max length must be positive");
        anyhow::ensure!(
            c.max_acceleration_factor > 0.0 && c.max_acceleration_factor <= 1.0,
            "Max acceleration factor must be in (0.0, 1.0]"
        );
        anyhow::ensure!(c.eat_distance > 0.0, "Eat distance must be positive");
        anyhow::ensure!(c.mate_distance > 0.0, "Mate distance must be positive");
        anyhow::ensure!(c.eat_duration >= 0.0, "Eat duration must be non-negative");
        anyhow::ensure!(
            c.maturation_time >= 0.0,
            "Maturation time must be non-negative"
        );
        anyhow::ensure!(
            c.base_energy_spend >= 0.0 && c.global_energy_spend_adjustment_factor >= 0.0,
            "Energy spend parameters must be non-negative"
        );
        anyhow::ensure!(
            c.min_energy_gain_from_food >= 0.0
                && c.min_energy_gain_from_food <= c.max_energy_gain_from_food,
            "Energy gain range must satisfy 0 <= min <= max"
        );
        anyhow::ensure!(c.digestion_rate > 0.0, "Digestion rate must be positive");
        anyhow::ensure!(
            c.reproduction_energy_cost >= 0.0,
            "Reproduction energy cost must be non-negative"
        );
        anyhow::ensure!(
            c.reproduction_duration >= 0.0,
            "Reproduction duration must be non-negative"
        );
        anyhow::ensure!(
            c.reference_speed > 0.0 && c.reference_awareness_radius > 0.0,
            "Reference speed and awareness radius must be positive"
        );
        anyhow::ensure!(
            probability(c.antagonistic_pleiotropy_death_rate),
            "Antagonistic pleiotropy death rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(c.body_radius > 0.0, "Creature body radius must be positive");
        anyhow::ensure!(
            c.wander_max_attempts > 0,
            "Wander max attempts must be positive"
        );

        // Evolution
        let e = &self.evolution;
        anyhow::ensure!(
            probability(e.mutation_probability),
            "Mutation probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            e.mutation_increment >= 0.0,
            "Mutation increment must be non-negative"
        );
        anyhow::ensure!(
            probability(e.deleterious_mutation_rate),
            "Deleterious mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            probability(e.max_deleterious_mortality_rate),
            "Max deleterious mortality rate must be in [0.0, 1.0]"
        );

        // Trees
        let t = &self.tree;
        anyhow::ensure!(
            t.min_spawn_radius >= 0.0 && t.min_spawn_radius <= t.max_spawn_radius,
            "Tree spawn radii must satisfy 0 <= min <= max"
        );
        anyhow::ensure!(
            t.competition_radius >= 0.0 && t.minimum_tree_distance >= 0.0,
            "Tree spacing radii must be non-negative"
        );
        anyhow::ensure!(t.spawn_interval > 0.0, "Tree spawn interval must be positive");
        anyhow::ensure!(
            t.death_check_interval > 0.0,
            "Tree death check interval must be positive"
        );
        anyhow::ensure!(
            t.sapling_death_probability_base >= 0.0
                && t.sapling_death_probability_per_neighbor >= 0.0
                && t.mature_death_probability_base >= 0.0
                && t.mature_death_probability_per_neighbor >= 0.0,
            "Tree death probabilities must be non-negative"
        );
        anyhow::ensure!(
            t.fruit_slots <= orchard_data::FRUIT_SLOTS,
            "Fruit slots too large (max {})",
            orchard_data::FRUIT_SLOTS
        );
        anyhow::ensure!(
            t.fruit_check_interval > 0.0,
            "Fruit check interval must be positive"
        );
        anyhow::ensure!(
            probability(t.fruit_spawn_probability),
            "Fruit spawn probability must be in [0.0, 1.0]"
        );
        anyhow::ensure!(t.body_radius > 0.0, "Tree body radius must be positive");

        // Fruit
        let f = &self.fruit;
        anyhow::ensure!(f.growth_time > 0.0, "Fruit growth time must be positive");
        anyhow::ensure!(
            f.ripe_fall_probability_per_second >= 0.0,
            "Fruit fall probability must be non-negative"
        );
        anyhow::ensure!(f.decay_time >= 0.0, "Fruit decay time must be non-negative");
        anyhow::ensure!(
            f.detach_impulse >= 0.0 && f.linear_damping >= 0.0,
            "Fruit impulse and damping must be non-negative"
        );
        anyhow::ensure!(f.body_radius > 0.0, "Fruit body radius must be positive");

        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys fall back to defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SHA-256 over every behavior-affecting section, for tagging runs and saved files.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(format!("{:?}", self.creature).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.tree).as_bytes());
        hasher.update(format!("{:?}", self.fruit).as_bytes());
        hex::encode(hasher.finalize())
    }
}
