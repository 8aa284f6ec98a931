//! Genome behavior: mutation, sexual crossover and deleterious mortality.
//!
//! The genome types themselves live in `orchard_data`; this module adds the
//! randomized operations through the [`GenomeLogic`] extension trait.

use crate::config::AppConfig;
use orchard_data::{
    BoolExpression, BoolTrait, DeleteriousTrait, FloatExpression, FloatTrait, GeneticTrait,
    Genome,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Mutation model shared by every reproduction strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationParams {
    pub probability: f32,
    pub deleterious_rate: f32,
    /// New deleterious traits activate uniformly in `[0, reference_max_age)`.
    pub reference_max_age: f32,
    pub max_deleterious_mortality_rate: f32,
}

impl MutationParams {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            probability: config.evolution.mutation_probability,
            deleterious_rate: config.evolution.deleterious_mutation_rate,
            reference_max_age: config.creature.reference_max_age,
            max_deleterious_mortality_rate: config.evolution.max_deleterious_mortality_rate,
        }
    }

    /// No mutation at all.
    pub fn none() -> Self {
        Self {
            probability: 0.0,
            deleterious_rate: 0.0,
            reference_max_age: 0.0,
            max_deleterious_mortality_rate: 0.0,
        }
    }
}

pub trait GenomeLogic {
    /// Point mutations in place, plus the occasional brand new deleterious trait.
    fn mutate<R: Rng>(&mut self, params: &MutationParams, rng: &mut R);

    /// Child genome of `self` and `other`, before mutation.
    fn crossover<R: Rng>(&self, other: &Genome, rng: &mut R) -> Genome;

    /// Rolls every active deleterious trait for one step of `delta_time`.
    fn deleterious_death<R: Rng>(&self, age: f32, delta_time: f32, rng: &mut R) -> bool;
}

fn roll<R: Rng>(rng: &mut R, probability: f32) -> bool {
    probability > 0.0 && rng.gen::<f32>() < probability
}

/// Alleles alternately drawn from each parent, starting with a random one.
fn inherit<T: Copy, R: Rng>(a: &[T], b: &[T], rng: &mut R) -> Vec<T> {
    let count = a.len().max(b.len());
    let mut from_a = rng.gen_bool(0.5);
    let mut alleles = Vec::with_capacity(count);
    for _ in 0..count {
        let (first, second) = if from_a { (a, b) } else { (b, a) };
        if let Some(&allele) = first.choose(rng).or_else(|| second.choose(rng)) {
            alleles.push(allele);
        }
        from_a = !from_a;
    }
    alleles
}

fn rethrow_float<R: Rng>(expression: FloatExpression, alleles: usize, rng: &mut R) -> FloatExpression {
    match expression {
        FloatExpression::RandomCodominant { .. } if alleles > 0 => FloatExpression::RandomCodominant {
            pick: rng.gen_range(0..alleles),
        },
        other => other,
    }
}

fn rethrow_bool<R: Rng>(expression: BoolExpression, alleles: usize, rng: &mut R) -> BoolExpression {
    match expression {
        BoolExpression::RandomCodominant { .. } if alleles > 0 => BoolExpression::RandomCodominant {
            pick: rng.gen_range(0..alleles),
        },
        other => other,
    }
}

impl GenomeLogic for Genome {
    fn mutate<R: Rng>(&mut self, params: &MutationParams, rng: &mut R) {
        for genetic_trait in self.iter_mut() {
            match genetic_trait {
                GeneticTrait::Float(t) => {
                    for allele in t.alleles.iter_mut() {
                        if roll(rng, params.probability) {
                            let step = if rng.gen_bool(0.5) {
                                t.mutation_increment
                            } else {
                                -t.mutation_increment
                            };
                            *allele = (*allele + step).max(0.0);
                        }
                    }
                }
                GeneticTrait::Bool(t) if t.mutable => {
                    for allele in t.alleles.iter_mut() {
                        if roll(rng, params.probability) {
                            *allele = !*allele;
                        }
                    }
                }
                GeneticTrait::Bool(_) => {}
                GeneticTrait::Deleterious(t) => {
                    for allele in t.alleles.iter_mut() {
                        if roll(rng, params.deleterious_rate) {
                            *allele = !*allele;
                        }
                    }
                }
            }
        }

        if roll(rng, params.deleterious_rate) {
            let activation_age = rng.gen::<f32>() * params.reference_max_age;
            let mortality = rng.gen::<f32>() * params.max_deleterious_mortality_rate;
            let fresh = DeleteriousTrait::new([true, false], activation_age, mortality);
            tracing::debug!(name = %fresh.name, "New deleterious mutation");
            self.insert(GeneticTrait::Deleterious(fresh));
        }
    }

    fn crossover<R: Rng>(&self, other: &Genome, rng: &mut R) -> Genome {
        let mut child = Genome::new();
        let mut deleterious: BTreeMap<String, [bool; 2]> = BTreeMap::new();

        for (name, mine) in self.iter() {
            match (mine, other.get(name)) {
                (GeneticTrait::Float(a), Some(GeneticTrait::Float(b))) => {
                    let alleles = inherit(&a.alleles, &b.alleles, rng);
                    let expression = rethrow_float(a.expression, alleles.len(), rng);
                    child.insert(GeneticTrait::Float(FloatTrait::new(
                        name,
                        alleles,
                        expression,
                        a.mutation_increment,
                    )));
                }
                (GeneticTrait::Bool(a), Some(GeneticTrait::Bool(b))) => {
                    let alleles = inherit(&a.alleles, &b.alleles, rng);
                    let expression = rethrow_bool(a.expression, alleles.len(), rng);
                    child.insert(GeneticTrait::Bool(BoolTrait::new(
                        name, alleles, expression, a.mutable,
                    )));
                }
                (GeneticTrait::Deleterious(a), Some(GeneticTrait::Deleterious(b))) => {
                    let from_a = *a.alleles.choose(rng).unwrap_or(&false);
                    let from_b = *b.alleles.choose(rng).unwrap_or(&false);
                    deleterious.insert(name.to_string(), [from_a, from_b]);
                }
                (GeneticTrait::Deleterious(a), None) => {
                    let from_a = *a.alleles.choose(rng).unwrap_or(&false);
                    deleterious.insert(name.to_string(), [from_a, false]);
                }
                _ => {}
            }
        }
        for (name, theirs) in other.iter() {
            if let GeneticTrait::Deleterious(b) = theirs {
                if !self.contains(name) {
                    let from_b = *b.alleles.choose(rng).unwrap_or(&false);
                    deleterious.insert(name.to_string(), [from_b, false]);
                }
            }
        }

        for (name, alleles) in deleterious {
            let template = match (self.get(&name), other.get(&name)) {
                (Some(GeneticTrait::Deleterious(t)), _) | (_, Some(GeneticTrait::Deleterious(t))) => t,
                _ => continue,
            };
            child.insert(GeneticTrait::Deleterious(DeleteriousTrait {
                name,
                alleles,
                activation_age: template.activation_age,
                mortality_rate_per_second: template.mortality_rate_per_second,
            }));
        }
        child
    }

    fn deleterious_death<R: Rng>(&self, age: f32, delta_time: f32, rng: &mut R) -> bool {
        self.deleterious_traits()
            .filter(|d| d.expressed() && age >= d.activation_age)
            .any(|d| rng.gen::<f32>() < d.mortality_per_step(delta_time))
    }
}
