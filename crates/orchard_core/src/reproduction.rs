use crate::config::{AppConfig, ReproductionMode};
use crate::genetics::{GenomeLogic, MutationParams};
use orchard_data::{CreatureComponent, Genome};
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// How a creature produces offspring.
///
/// Implementations return an unregistered component with reset age, energy
/// and timers; the caller places it in the world.
pub trait ReproductionStrategy: fmt::Debug {
    /// Whether offspring need a second parent.
    fn requires_mate(&self) -> bool;

    fn reproduce(
        &self,
        parent: &Genome,
        mate: Option<&Genome>,
        rng: &mut ChaCha8Rng,
    ) -> CreatureComponent;
}

/// Newborn settings common to both strategies.
#[derive(Debug, Clone, Copy)]
pub struct Offspring {
    pub mutation: MutationParams,
    pub initial_energy: f32,
    pub hunger_threshold: f32,
}

impl Offspring {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            mutation: MutationParams::from_config(config),
            initial_energy: config.creature.initial_energy,
            hunger_threshold: config.creature.hunger_threshold,
        }
    }

    fn newborn(&self, mut genome: Genome, rng: &mut ChaCha8Rng) -> CreatureComponent {
        genome.mutate(&self.mutation, rng);
        CreatureComponent::new(genome, self.initial_energy, self.hunger_threshold)
    }
}

#[derive(Debug, Clone)]
pub struct SexualReproduction {
    pub offspring: Offspring,
}

impl ReproductionStrategy for SexualReproduction {
    fn requires_mate(&self) -> bool {
        true
    }

    fn reproduce(
        &self,
        parent: &Genome,
        mate: Option<&Genome>,
        rng: &mut ChaCha8Rng,
    ) -> CreatureComponent {
        let genome = match mate {
            Some(mate) => parent.crossover(mate, rng),
            None => {
                tracing::warn!("Sexual reproduction without a mate; cloning the parent");
                parent.clone()
            }
        };
        self.offspring.newborn(genome, rng)
    }
}

#[derive(Debug, Clone)]
pub struct AsexualReproduction {
    pub offspring: Offspring,
}

impl ReproductionStrategy for AsexualReproduction {
    fn requires_mate(&self) -> bool {
        false
    }

    fn reproduce(
        &self,
        parent: &Genome,
        _mate: Option<&Genome>,
        rng: &mut ChaCha8Rng,
    ) -> CreatureComponent {
        self.offspring.newborn(parent.clone(), rng)
    }
}

pub fn strategy_for(config: &AppConfig) -> Box<dyn ReproductionStrategy> {
    let offspring = Offspring::from_config(config);
    match config.evolution.reproduction {
        ReproductionMode::Sexual => Box::new(SexualReproduction { offspring }),
        ReproductionMode::Asexual => Box::new(AsexualReproduction { offspring }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchard_data::{trait_names, FloatExpression, FloatTrait, GeneticTrait};
    use rand::SeedableRng;

    fn genome(speed: f32) -> Genome {
        Genome::new().with(GeneticTrait::Float(FloatTrait::new(
            trait_names::MAX_SPEED,
            vec![speed, speed],
            FloatExpression::AverageCodominant,
            1.0,
        )))
    }

    fn quiet_config(mode: ReproductionMode) -> AppConfig {
        let mut config = AppConfig::default();
        config.evolution.reproduction = mode;
        config.evolution.mutation_probability = 0.0;
        config
    }

    #[test]
    fn test_newborn_is_reset() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = quiet_config(ReproductionMode::Sexual);
        let strategy = strategy_for(&config);
        assert!(strategy.requires_mate());

        let child = strategy.reproduce(&genome(4.0), Some(&genome(6.0)), &mut rng);
        assert!(child.alive);
        assert_eq!(child.age, 0.0);
        assert_eq!(child.energy, config.creature.initial_energy);
        assert_eq!(child.hunger_threshold, config.creature.hunger_threshold);
        assert_eq!(child.eating_time_left, 0.0);
        assert_eq!(child.mating_time_left, 0.0);
        assert_eq!(child.max_speed(), 5.0);
    }

    #[test]
    fn test_asexual_copies_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let strategy = strategy_for(&quiet_config(ReproductionMode::Asexual));
        assert!(!strategy.requires_mate());

        let parent = genome(7.0);
        let child = strategy.reproduce(&parent, None, &mut rng);
        assert_eq!(*child.genome, parent);
    }
}
