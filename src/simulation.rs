use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::capacity::{report_capacity, CapacityLimits, CapacityReport};
use crate::error::{SimResult, SimulationError};
use crate::model::{Individual, PopulationAggregate};
use crate::population::{Population, PopulationGenerator};
use crate::resources::{
    aggregate_breakdown, aggregate_total, AggregationMode, ResourceBreakdown, ResourceTable,
    ResourceUsage,
};
use crate::rng::RngManager;
use crate::sampler::{IncomeRange, SamplingWeights};
use crate::scenario::{Scenario, ScenarioParams};

/// Samples `count` individuals and classifies their housing.
///
/// Every argument is checked before the first draw, so an error never comes
/// with a partial population. With `seed` set the result is reproducible.
#[allow(clippy::too_many_arguments)]
pub fn generate_population(
    count: usize,
    education_weights: &[f64],
    employment_weights: &[f64],
    income_min: u64,
    income_max: u64,
    social_status_weights: &[f64],
    relatives_abroad_weight: f64,
    seed: Option<u64>,
) -> SimResult<(Vec<Individual>, PopulationAggregate)> {
    if count < 1 {
        return Err(SimulationError::InvalidCount(count));
    }
    let income = IncomeRange::new(income_min, income_max)?;
    let weights = SamplingWeights {
        education: education_weights.to_vec(),
        employment: employment_weights.to_vec(),
        social_status: social_status_weights.to_vec(),
        relatives_abroad: relatives_abroad_weight,
    };
    let generator = PopulationGenerator::new(&weights, income)?;
    let mut rng = RngManager::from_optional_seed(seed);
    let population = generator.generate(count, &mut rng)?;
    Ok((population.individuals, population.aggregate))
}

/// Total usage of `individuals` under the default profile table.
pub fn aggregate_resources_total(individuals: &[Individual]) -> ResourceUsage {
    aggregate_total(individuals, &ResourceTable::default())
}

pub fn aggregate_resources_total_with(
    individuals: &[Individual],
    table: &ResourceTable,
) -> ResourceUsage {
    aggregate_total(individuals, table)
}

/// Per-category usage of `individuals` under the default profile table.
pub fn aggregate_resources_breakdown(individuals: &[Individual]) -> ResourceBreakdown {
    aggregate_breakdown(individuals, &ResourceTable::default())
}

pub fn aggregate_resources_breakdown_with(
    individuals: &[Individual],
    table: &ResourceTable,
) -> ResourceBreakdown {
    aggregate_breakdown(individuals, table)
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub count: usize,
    pub resource_profile: String,
    pub aggregation: AggregationMode,
    pub housing: PopulationAggregate,
    pub usage: ResourceUsage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ResourceBreakdown>,
    pub capacity: CapacityReport,
}

pub struct SimulationRun {
    pub population: Population,
    pub report: RunReport,
}

/// One configured batch: sampling inputs, a resource table and limits.
pub struct Simulation {
    name: String,
    params: ScenarioParams,
    table: ResourceTable,
}

impl Simulation {
    pub fn new(
        name: impl Into<String>,
        params: ScenarioParams,
        table: ResourceTable,
    ) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            name: name.into(),
            params,
            table,
        })
    }

    /// Uses the scenario's parameters and resolves its profile by name.
    pub fn from_scenario(scenario: &Scenario) -> SimResult<Self> {
        Self::new(
            scenario.name.clone(),
            scenario.params.clone(),
            scenario.resource_table()?,
        )
    }

    /// Resolves `params.resource_profile` against the built-in presets.
    pub fn from_params(name: impl Into<String>, params: ScenarioParams) -> SimResult<Self> {
        let table = ResourceTable::preset(&params.resource_profile)?;
        Self::new(name, params, table)
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    pub fn limits(&self) -> &CapacityLimits {
        &self.params.limits
    }

    pub fn run(&self) -> SimResult<SimulationRun> {
        let params = &self.params;
        let generator = PopulationGenerator::new(&params.weights, params.income)?;
        let mut rng = RngManager::from_optional_seed(params.seed);
        let population = generator.generate(params.count, &mut rng)?;

        let (usage, breakdown) = match params.aggregation {
            AggregationMode::Total => (aggregate_total(&population.individuals, &self.table), None),
            AggregationMode::Breakdown => {
                let breakdown = aggregate_breakdown(&population.individuals, &self.table);
                (breakdown.total(), Some(breakdown))
            }
        };
        debug!(
            water = usage.water,
            electricity = usage.electricity,
            land = usage.land,
            "resource usage aggregated"
        );

        let capacity = report_capacity(&usage, &params.limits);
        for resource in capacity.critical() {
            warn!(%resource, "remaining capacity is critical");
        }
        info!(
            scenario = %self.name,
            count = params.count,
            seed = rng.seed(),
            "simulation run complete"
        );

        let report = RunReport {
            scenario: self.name.clone(),
            generated_at: Utc::now(),
            seed: rng.seed(),
            count: params.count,
            resource_profile: params.resource_profile.clone(),
            aggregation: params.aggregation,
            housing: population.aggregate.clone(),
            usage,
            breakdown,
            capacity,
        };
        Ok(SimulationRun { population, report })
    }
}
