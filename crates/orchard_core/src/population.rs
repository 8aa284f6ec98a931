//! First-generation genomes.

use crate::config::{AppConfig, InitialPopulation};
use orchard_data::{trait_names, FloatExpression, FloatTrait, GeneticTrait, Genome};

fn float_trait(name: &str, alleles: Vec<f32>, increment: f32) -> GeneticTrait {
    GeneticTrait::Float(FloatTrait::new(
        name,
        alleles,
        FloatExpression::AverageCodominant,
        increment,
    ))
}

/// Genomes for `count` founders, following `config.evolution.initial_population`.
pub fn initial_genomes(count: usize, config: &AppConfig) -> Vec<Genome> {
    let c = &config.creature;
    let increment = config.evolution.mutation_increment;
    (0..count)
        .map(|i| match config.evolution.initial_population {
            InitialPopulation::AllDefaults => Genome::new()
                .with(float_trait(trait_names::MAX_SPEED, vec![c.reference_speed], increment))
                .with(float_trait(
                    trait_names::AWARENESS_RADIUS,
                    vec![c.reference_awareness_radius],
                    increment,
                ))
                .with(float_trait(trait_names::MAX_AGE, vec![c.reference_max_age], increment)),
            InitialPopulation::FlatMaxAgeDistribution => Genome::new()
                .with(float_trait(trait_names::MAX_SPEED, vec![c.reference_speed], increment))
                .with(float_trait(
                    trait_names::AWARENESS_RADIUS,
                    vec![c.reference_awareness_radius],
                    increment,
                ))
                .with(float_trait(
                    trait_names::MAX_AGE,
                    vec![2.0 * (i + 1) as f32],
                    increment,
                )),
            InitialPopulation::SpeedAndAwarenessDiploid => Genome::new()
                .with(float_trait(
                    trait_names::MAX_SPEED,
                    vec![c.reference_speed; 2],
                    increment,
                ))
                .with(float_trait(
                    trait_names::AWARENESS_RADIUS,
                    vec![c.reference_awareness_radius; 2],
                    increment,
                ))
                .with(float_trait(trait_names::MAX_AGE, vec![c.reference_max_age], increment)),
        })
        .collect()
}
