pub mod capacity;
pub mod classifier;
pub mod error;
pub mod model;
pub mod population;
pub mod resources;
pub mod rng;
pub mod sampler;
pub mod scenario;
pub mod simulation;
pub mod web;

pub use capacity::{report_capacity, CapacityLimits, CapacityReport, CapacityStatus};
pub use error::{SimResult, SimulationError};
pub use model::{HousingCategory, Individual, PopulationAggregate};
pub use resources::{ResourceBreakdown, ResourceTable, ResourceUsage};
pub use scenario::{Scenario, ScenarioLoader, ScenarioParams};
pub use simulation::{
    aggregate_resources_breakdown, aggregate_resources_breakdown_with, aggregate_resources_total,
    aggregate_resources_total_with, generate_population, RunReport, Simulation, SimulationRun,
};
