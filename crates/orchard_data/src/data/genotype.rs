use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait names the creature systems look up at decision time.
pub mod trait_names {
    pub const MAX_SPEED: &str = "MaxSpeed";
    pub const AWARENESS_RADIUS: &str = "AwarenessRadius";
    pub const MAX_AGE: &str = "MaxAge";
    pub const MAX_REPRODUCTION_AGE: &str = "MaxReproductionAge";
    pub const ANTAGONISTIC_PLEIOTROPY_SPEED: &str = "Antagonistic Pleiotropy Speed";
}

/// How the alleles of a float trait combine into the expressed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatExpression {
    HighDominant,
    LowDominant,
    AverageCodominant,
    /// One allele, chosen when the trait was built, is expressed.
    RandomCodominant { pick: usize },
}

/// How the alleles of a bool trait combine into the expressed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolExpression {
    Dominant,
    Recessive,
    RandomCodominant { pick: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatTrait {
    pub name: String,
    pub alleles: Vec<f32>,
    pub expression: FloatExpression,
    pub mutation_increment: f32,
}

impl FloatTrait {
    pub fn new(
        name: impl Into<String>,
        alleles: Vec<f32>,
        expression: FloatExpression,
        mutation_increment: f32,
    ) -> Self {
        Self {
            name: name.into(),
            alleles,
            expression,
            mutation_increment,
        }
    }

    /// Expressed value; 0.0 for a trait without alleles.
    #[must_use]
    pub fn expressed(&self) -> f32 {
        if self.alleles.is_empty() {
            return 0.0;
        }
        match self.expression {
            FloatExpression::HighDominant => {
                self.alleles.iter().copied().fold(f32::MIN, f32::max)
            }
            FloatExpression::LowDominant => self.alleles.iter().copied().fold(f32::MAX, f32::min),
            FloatExpression::AverageCodominant => {
                self.alleles.iter().sum::<f32>() / self.alleles.len() as f32
            }
            FloatExpression::RandomCodominant { pick } => {
                self.alleles[pick.min(self.alleles.len() - 1)]
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolTrait {
    pub name: String,
    pub alleles: Vec<bool>,
    pub expression: BoolExpression,
    /// Whether point mutations may flip the alleles.
    pub mutable: bool,
}

impl BoolTrait {
    pub fn new(
        name: impl Into<String>,
        alleles: Vec<bool>,
        expression: BoolExpression,
        mutable: bool,
    ) -> Self {
        Self {
            name: name.into(),
            alleles,
            expression,
            mutable,
        }
    }

    #[must_use]
    pub fn expressed(&self) -> bool {
        if self.alleles.is_empty() {
            return false;
        }
        match self.expression {
            BoolExpression::Dominant => self.alleles.iter().any(|&a| a),
            BoolExpression::Recessive => self.alleles.iter().all(|&a| a),
            BoolExpression::RandomCodominant { pick } => {
                self.alleles[pick.min(self.alleles.len() - 1)]
            }
        }
    }
}

/// Diploid, dominant late-acting mutation. Once expressed and older than
/// `activation_age`, the carrier dies at `mortality_rate_per_second`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteriousTrait {
    pub name: String,
    pub alleles: [bool; 2],
    pub activation_age: f32,
    pub mortality_rate_per_second: f32,
}

impl DeleteriousTrait {
    pub fn new(alleles: [bool; 2], activation_age: f32, mortality_rate_per_second: f32) -> Self {
        Self {
            name: format!("{activation_age:.3}_{mortality_rate_per_second:.4}"),
            alleles,
            activation_age,
            mortality_rate_per_second,
        }
    }

    #[must_use]
    pub fn expressed(&self) -> bool {
        self.alleles[0] || self.alleles[1]
    }

    /// Probability of dying within one step of `delta_time` seconds.
    #[must_use]
    pub fn mortality_per_step(&self, delta_time: f32) -> f32 {
        1.0 - (1.0 - self.mortality_rate_per_second).powf(delta_time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeneticTrait {
    Float(FloatTrait),
    Bool(BoolTrait),
    Deleterious(DeleteriousTrait),
}

impl GeneticTrait {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Float(t) => &t.name,
            Self::Bool(t) => &t.name,
            Self::Deleterious(t) => &t.name,
        }
    }
}

/// Named traits of one creature.
///
/// Backed by a `BTreeMap` so that iteration order, and therefore the order in
/// which crossover and mutation consume random numbers, is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    traits: BTreeMap<String, GeneticTrait>,
}

impl Genome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a trait, replacing any trait with the same name.
    pub fn insert(&mut self, genetic_trait: GeneticTrait) {
        self.traits
            .insert(genetic_trait.name().to_string(), genetic_trait);
    }

    #[must_use]
    pub fn with(mut self, genetic_trait: GeneticTrait) -> Self {
        self.insert(genetic_trait);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GeneticTrait> {
        self.traits.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut GeneticTrait> {
        self.traits.get_mut(name)
    }

    #[must_use]
    pub fn float_trait(&self, name: &str) -> Option<&FloatTrait> {
        match self.traits.get(name) {
            Some(GeneticTrait::Float(t)) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn bool_trait(&self, name: &str) -> Option<&BoolTrait> {
        match self.traits.get(name) {
            Some(GeneticTrait::Bool(t)) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn expressed_f32(&self, name: &str) -> Option<f32> {
        self.float_trait(name).map(FloatTrait::expressed)
    }

    #[must_use]
    pub fn expressed_bool(&self, name: &str) -> Option<bool> {
        self.bool_trait(name).map(BoolTrait::expressed)
    }

    pub fn deleterious_traits(&self) -> impl Iterator<Item = &DeleteriousTrait> {
        self.traits.values().filter_map(|t| match t {
            GeneticTrait::Deleterious(d) => Some(d),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneticTrait)> {
        self.traits.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GeneticTrait> {
        self.traits.values_mut()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed(expression: FloatExpression) -> FloatTrait {
        FloatTrait::new(trait_names::MAX_SPEED, vec![2.0, 6.0], expression, 1.0)
    }

    #[test]
    fn test_float_expression_mechanisms() {
        assert_eq!(speed(FloatExpression::HighDominant).expressed(), 6.0);
        assert_eq!(speed(FloatExpression::LowDominant).expressed(), 2.0);
        assert_eq!(speed(FloatExpression::AverageCodominant).expressed(), 4.0);
        assert_eq!(
            speed(FloatExpression::RandomCodominant { pick: 1 }).expressed(),
            6.0
        );
    }

    #[test]
    fn test_bool_expression_mechanisms() {
        let het = |e| BoolTrait::new("Flag", vec![true, false], e, true);
        assert!(het(BoolExpression::Dominant).expressed());
        assert!(!het(BoolExpression::Recessive).expressed());
        assert!(!het(BoolExpression::RandomCodominant { pick: 1 }).expressed());
    }

    #[test]
    fn test_lookup_is_typed() {
        let genome = Genome::new()
            .with(GeneticTrait::Float(speed(FloatExpression::HighDominant)))
            .with(GeneticTrait::Bool(BoolTrait::new(
                trait_names::ANTAGONISTIC_PLEIOTROPY_SPEED,
                vec![true],
                BoolExpression::Dominant,
                false,
            )));

        assert_eq!(genome.expressed_f32(trait_names::MAX_SPEED), Some(6.0));
        assert_eq!(
            genome.expressed_f32(trait_names::ANTAGONISTIC_PLEIOTROPY_SPEED),
            None
        );
        assert_eq!(
            genome.expressed_bool(trait_names::ANTAGONISTIC_PLEIOTROPY_SPEED),
            Some(true)
        );
        assert_eq!(genome.expressed_f32(trait_names::MAX_AGE), None);
    }

    #[test]
    fn test_deleterious_mortality_per_step() {
        let d = DeleteriousTrait::new([true, false], 3.0, 0.5);
        assert!(d.expressed());
        let p = d.mortality_per_step(1.0 / 60.0);
        assert!(p > 0.0 && p < 0.02);
        assert!((d.mortality_per_step(1.0) - 0.5).abs() < 1e-6);
    }
}
