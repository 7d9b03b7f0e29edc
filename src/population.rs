use serde::Serialize;
use tracing::debug;

use crate::classifier::HousingClassifier;
use crate::error::{SimResult, SimulationError};
use crate::model::{Individual, PopulationAggregate};
use crate::rng::{RngManager, HOUSING_STREAM, SAMPLING_STREAM};
use crate::sampler::{AttributeSampler, IncomeRange, SamplingWeights};

/// Everything produced by one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct Population {
    pub individuals: Vec<Individual>,
    pub aggregate: PopulationAggregate,
}

impl Population {
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

pub struct PopulationGenerator {
    sampler: AttributeSampler,
    classifier: HousingClassifier,
}

impl PopulationGenerator {
    pub fn new(weights: &SamplingWeights, income: IncomeRange) -> SimResult<Self> {
        Ok(Self {
            sampler: AttributeSampler::new(weights, income)?,
            classifier: HousingClassifier::new(),
        })
    }

    /// Samples and classifies `count` individuals. Attribute draws use the
    /// sampling stream and tie-breaks use the housing stream of `rng`.
    pub fn generate(&self, count: usize, rng: &mut RngManager) -> SimResult<Population> {
        if count < 1 {
            return Err(SimulationError::InvalidCount(count));
        }

        let mut individuals = Vec::with_capacity(count);
        let mut aggregate = PopulationAggregate::new();
        for _ in 0..count {
            let mut individual = self.sampler.sample(&mut rng.stream(SAMPLING_STREAM));
            let category = self
                .classifier
                .classify(&mut individual, &mut rng.stream(HOUSING_STREAM));
            aggregate.record(category);
            individuals.push(individual);
        }

        debug!(count, seed = rng.seed(), "population generated");
        Ok(Population {
            individuals,
            aggregate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HousingCategory;

    fn generator(min: u64, max: u64) -> PopulationGenerator {
        PopulationGenerator::new(&SamplingWeights::default(), IncomeRange { min, max }).unwrap()
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = generator(0, 10)
            .generate(0, &mut RngManager::new(1))
            .unwrap_err();
        assert_eq!(err, SimulationError::InvalidCount(0));
    }

    #[test]
    fn counts_match_population_size() {
        let population = generator(0, 200_000)
            .generate(1_000, &mut RngManager::new(4))
            .unwrap();
        assert_eq!(population.len(), 1_000);
        assert_eq!(population.aggregate.total(), 1_000);
        assert_eq!(
            population.aggregate,
            PopulationAggregate::from_individuals(&population.individuals)
        );
    }

    #[test]
    fn absent_categories_still_reported() {
        let population = generator(50_000, 60_000)
            .generate(25, &mut RngManager::new(8))
            .unwrap();
        assert_eq!(population.aggregate.iter().count(), 6);
        assert_eq!(
            population.aggregate.count(HousingCategory::StandardApartment),
            25
        );
        assert_eq!(population.aggregate.count(HousingCategory::House), 0);
    }

    #[test]
    fn same_seed_reproduces_population() {
        let gen = generator(0, 300_000);
        let a = gen.generate(200, &mut RngManager::new(77)).unwrap();
        let b = gen.generate(200, &mut RngManager::new(77)).unwrap();
        assert_eq!(a.individuals, b.individuals);
        assert_eq!(a.aggregate, b.aggregate);
    }
}
