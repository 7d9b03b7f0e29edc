use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::model::{HousingCategory, Individual, PopulationAggregate};

/// Name of the built-in table used when a run does not pick one.
pub const DEFAULT_PROFILE: &str = "ostrava";

/// Daily per-resident consumption for one housing category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    /// Litres.
    pub water: f64,
    /// kWh.
    pub electricity: f64,
    /// Square metres.
    pub land: f64,
}

impl ResourceProfile {
    pub const fn new(water: f64, electricity: f64, land: f64) -> Self {
        Self {
            water,
            electricity,
            land,
        }
    }

    pub fn scaled(&self, units: u64) -> ResourceUsage {
        let n = units as f64;
        ResourceUsage {
            water: self.water * n,
            electricity: self.electricity * n,
            land: self.land * n,
        }
    }

    fn is_valid(&self) -> bool {
        [self.water, self.electricity, self.land]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Summed consumption of water, electricity and land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub water: f64,
    pub electricity: f64,
    pub land: f64,
}

impl ResourceUsage {
    pub const fn new(water: f64, electricity: f64, land: f64) -> Self {
        Self {
            water,
            electricity,
            land,
        }
    }
}

impl Add for ResourceUsage {
    type Output = ResourceUsage;

    fn add(self, rhs: ResourceUsage) -> ResourceUsage {
        ResourceUsage {
            water: self.water + rhs.water,
            electricity: self.electricity + rhs.electricity,
            land: self.land + rhs.land,
        }
    }
}

impl AddAssign for ResourceUsage {
    fn add_assign(&mut self, rhs: ResourceUsage) {
        *self = *self + rhs;
    }
}

impl AddAssign<ResourceProfile> for ResourceUsage {
    fn add_assign(&mut self, rhs: ResourceProfile) {
        self.water += rhs.water;
        self.electricity += rhs.electricity;
        self.land += rhs.land;
    }
}

impl Sum for ResourceUsage {
    fn sum<I: Iterator<Item = ResourceUsage>>(iter: I) -> Self {
        iter.fold(ResourceUsage::default(), Add::add)
    }
}

/// Consumption profile for every housing category. `Undefined` always costs
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<HousingCategory, ResourceProfile>",
    into = "BTreeMap<HousingCategory, ResourceProfile>"
)]
pub struct ResourceTable {
    profiles: BTreeMap<HousingCategory, ResourceProfile>,
}

impl From<ResourceTable> for BTreeMap<HousingCategory, ResourceProfile> {
    fn from(table: ResourceTable) -> Self {
        table.profiles
    }
}

impl TryFrom<BTreeMap<HousingCategory, ResourceProfile>> for ResourceTable {
    type Error = SimulationError;

    fn try_from(profiles: BTreeMap<HousingCategory, ResourceProfile>) -> SimResult<Self> {
        Self::new(profiles)
    }
}

impl ResourceTable {
    /// Builds a table from explicit profiles. Every category except
    /// `Undefined` must be present; `Undefined` must be absent or all zero.
    pub fn new(mut profiles: BTreeMap<HousingCategory, ResourceProfile>) -> SimResult<Self> {
        for category in HousingCategory::ALL {
            if category == HousingCategory::Undefined {
                continue;
            }
            match profiles.get(&category) {
                None => {
                    return Err(SimulationError::InvalidProfile(format!(
                        "missing entry for {category}"
                    )))
                }
                Some(profile) if !profile.is_valid() => {
                    return Err(SimulationError::InvalidProfile(format!(
                        "{category} has a negative or non-finite rate"
                    )))
                }
                Some(_) => {}
            }
        }
        let undefined = profiles
            .entry(HousingCategory::Undefined)
            .or_insert_with(ResourceProfile::default);
        if *undefined != ResourceProfile::default() {
            return Err(SimulationError::InvalidProfile(
                "Undefined must not consume resources".into(),
            ));
        }
        Ok(Self { profiles })
    }

    /// Per-resident daily needs used for the Ostrava migration study.
    pub fn ostrava() -> Self {
        let profiles = [
            (
                HousingCategory::LuxuryApartment,
                ResourceProfile::new(125.0, 20.0, 134.0),
            ),
            (HousingCategory::House, ResourceProfile::new(100.0, 16.0, 120.0)),
            (
                HousingCategory::StandardApartment,
                ResourceProfile::new(95.0, 14.0, 32.0),
            ),
            (
                HousingCategory::SharedHousing,
                ResourceProfile::new(60.0, 12.0, 16.0),
            ),
            (
                HousingCategory::PublicHousing,
                ResourceProfile::new(40.0, 10.0, 12.0),
            ),
            (HousingCategory::Undefined, ResourceProfile::default()),
        ];
        Self {
            profiles: profiles.into_iter().collect(),
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &[DEFAULT_PROFILE]
    }

    pub fn preset(name: &str) -> SimResult<Self> {
        match name {
            DEFAULT_PROFILE => Ok(Self::ostrava()),
            other => Err(SimulationError::UnknownProfile(other.to_string())),
        }
    }

    pub fn profile(&self, category: HousingCategory) -> ResourceProfile {
        self.profiles.get(&category).copied().unwrap_or_default()
    }
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::ostrava()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    #[default]
    Total,
    Breakdown,
}

/// Usage split by housing category. All six categories are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceBreakdown {
    by_category: BTreeMap<HousingCategory, ResourceUsage>,
}

impl Default for ResourceBreakdown {
    fn default() -> Self {
        Self {
            by_category: HousingCategory::ALL
                .iter()
                .map(|c| (*c, ResourceUsage::default()))
                .collect(),
        }
    }
}

impl ResourceBreakdown {
    pub fn get(&self, category: HousingCategory) -> ResourceUsage {
        self.by_category.get(&category).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HousingCategory, ResourceUsage)> + '_ {
        self.by_category.iter().map(|(c, u)| (*c, *u))
    }

    pub fn total(&self) -> ResourceUsage {
        self.by_category.values().copied().sum()
    }
}

/// Sums consumption over every individual. Unclassified individuals count as
/// `Undefined`.
pub fn aggregate_total(individuals: &[Individual], table: &ResourceTable) -> ResourceUsage {
    let mut usage = ResourceUsage::default();
    for individual in individuals {
        usage += table.profile(category_of(individual));
    }
    usage
}

/// Same as [`aggregate_total`], computed from head counts.
pub fn aggregate_counts(aggregate: &PopulationAggregate, table: &ResourceTable) -> ResourceUsage {
    aggregate
        .iter()
        .map(|(category, count)| table.profile(category).scaled(count))
        .sum()
}

pub fn aggregate_breakdown(individuals: &[Individual], table: &ResourceTable) -> ResourceBreakdown {
    let mut breakdown = ResourceBreakdown::default();
    for individual in individuals {
        let category = category_of(individual);
        *breakdown.by_category.entry(category).or_default() += table.profile(category);
    }
    breakdown
}

fn category_of(individual: &Individual) -> HousingCategory {
    individual.housing().unwrap_or(HousingCategory::Undefined)
}
