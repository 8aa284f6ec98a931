use orchard_lib::core::config::AppConfig;
use orchard_lib::core::genetics::{GenomeLogic, MutationParams};
use orchard_lib::core::world::SimulationWorld;
use orchard_lib::data::{trait_names, FloatExpression, FloatTrait, GeneticTrait, Genome};
use proptest::prelude::*;

fn seeded_world(seed: u64) -> SimulationWorld {
    let mut config = AppConfig::default();
    config.world.seed = Some(seed);
    SimulationWorld::new(&config)
}

fn speed_genome(alleles: Vec<f32>) -> Genome {
    Genome::new().with(GeneticTrait::Float(FloatTrait::new(
        trait_names::MAX_SPEED,
        alleles,
        FloatExpression::AverageCodominant,
        1.0,
    )))
}

proptest! {
    #[test]
    fn test_child_alleles_come_from_a_parent(
        seed in any::<u64>(),
        mom in prop::collection::vec(0.0f32..20.0, 1..4),
        dad in prop::collection::vec(0.0f32..20.0, 1..4),
    ) {
        let mut world = seeded_world(seed);
        let child = speed_genome(mom.clone()).crossover(&speed_genome(dad.clone()), &mut world.rng);

        let alleles = &child.float_trait(trait_names::MAX_SPEED).unwrap().alleles;
        prop_assert_eq!(alleles.len(), mom.len().max(dad.len()));
        for allele in alleles {
            prop_assert!(mom.contains(allele) || dad.contains(allele));
        }
    }

    #[test]
    fn test_mutation_never_goes_negative(
        seed in any::<u64>(),
        alleles in prop::collection::vec(0.0f32..3.0, 1..4),
        rounds in 1usize..30,
    ) {
        let mut world = seeded_world(seed);
        let params = MutationParams {
            probability: 0.5,
            ..MutationParams::none()
        };
        let mut genome = speed_genome(alleles);
        for _ in 0..rounds {
            genome.mutate(&params, &mut world.rng);
        }
        let mutated = &genome.float_trait(trait_names::MAX_SPEED).unwrap().alleles;
        prop_assert!(mutated.iter().all(|a| *a >= 0.0));
        prop_assert_eq!(genome.len(), 1);
    }
}
