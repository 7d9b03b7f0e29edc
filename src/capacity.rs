use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::resources::ResourceUsage;

const HEALTHY_ABOVE_PERCENT: f64 = 50.0;
const WARNING_ABOVE_PERCENT: f64 = 25.0;

fn default_max_water() -> f64 {
    875_765.0
}

fn default_max_electricity() -> f64 {
    66.45 * 1e6
}

fn default_max_land() -> f64 {
    30.0 * 1e6
}

/// Regional maximum availability: litres, kWh and square metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityLimits {
    #[serde(default = "default_max_water")]
    pub water: f64,
    #[serde(default = "default_max_electricity")]
    pub electricity: f64,
    #[serde(default = "default_max_land")]
    pub land: f64,
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self {
            water: default_max_water(),
            electricity: default_max_electricity(),
            land: default_max_land(),
        }
    }
}

impl CapacityLimits {
    pub fn validate(&self) -> SimResult<()> {
        for (resource, value) in self.entries() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::InvalidLimits(format!(
                    "{resource} capacity must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    fn entries(&self) -> [(Resource, f64); 3] {
        [
            (Resource::Water, self.water),
            (Resource::Electricity, self.electricity),
            (Resource::Land, self.land),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Water,
    Electricity,
    Land,
}

impl Resource {
    pub fn unit(self) -> &'static str {
        match self {
            Resource::Water => "L",
            Resource::Electricity => "kWh",
            Resource::Land => "sqm",
        }
    }

    fn used(self, usage: &ResourceUsage) -> f64 {
        match self {
            Resource::Water => usage.water,
            Resource::Electricity => usage.electricity,
            Resource::Land => usage.land,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Water => "water",
            Resource::Electricity => "electricity",
            Resource::Land => "land",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityStatus {
    Healthy,
    Warning,
    Critical,
}

impl CapacityStatus {
    pub fn from_percent(percent_remaining: f64) -> Self {
        if percent_remaining > HEALTHY_ABOVE_PERCENT {
            CapacityStatus::Healthy
        } else if percent_remaining > WARNING_ABOVE_PERCENT {
            CapacityStatus::Warning
        } else {
            CapacityStatus::Critical
        }
    }
}

impl fmt::Display for CapacityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CapacityStatus::Healthy => "healthy",
            CapacityStatus::Warning => "warning",
            CapacityStatus::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub used: f64,
    pub capacity: f64,
    pub remaining: f64,
    pub percent_remaining: f64,
    pub status: CapacityStatus,
}

impl ResourceStatus {
    fn evaluate(used: f64, capacity: f64) -> Self {
        let (remaining, percent_remaining) = if capacity > 0.0 {
            let remaining = (capacity - used).max(0.0);
            (remaining, (remaining / capacity * 100.0).max(0.0))
        } else {
            (0.0, 0.0)
        };
        Self {
            used,
            capacity,
            remaining,
            percent_remaining,
            status: CapacityStatus::from_percent(percent_remaining),
        }
    }
}

/// Remaining capacity for each resource, keyed by resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityReport {
    resources: BTreeMap<Resource, ResourceStatus>,
}

impl CapacityReport {
    pub fn get(&self, resource: Resource) -> Option<&ResourceStatus> {
        self.resources.get(&resource)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, &ResourceStatus)> + '_ {
        self.resources.iter().map(|(r, s)| (*r, s))
    }

    pub fn critical(&self) -> impl Iterator<Item = Resource> + '_ {
        self.iter()
            .filter(|(_, s)| s.status == CapacityStatus::Critical)
            .map(|(r, _)| r)
    }
}

/// Compares usage against capacity. Remaining amounts never go below zero.
pub fn report_capacity(usage: &ResourceUsage, limits: &CapacityLimits) -> CapacityReport {
    let resources = limits
        .entries()
        .into_iter()
        .map(|(resource, capacity)| {
            (
                resource,
                ResourceStatus::evaluate(resource.used(usage), capacity),
            )
        })
        .collect();
    CapacityReport { resources }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overuse_clamps_to_zero() {
        let usage = ResourceUsage::new(10_000_000.0, 0.0, 0.0);
        let report = report_capacity(&usage, &CapacityLimits::default());
        let water = report.get(Resource::Water).unwrap();
        assert_eq!(water.remaining, 0.0);
        assert_eq!(water.percent_remaining, 0.0);
        assert_eq!(water.status, CapacityStatus::Critical);
        assert_eq!(water.used, 10_000_000.0);
    }

    #[test]
    fn unused_resources_are_healthy() {
        let report = report_capacity(&ResourceUsage::default(), &CapacityLimits::default());
        for (_, status) in report.iter() {
            assert_eq!(status.percent_remaining, 100.0);
            assert_eq!(status.status, CapacityStatus::Healthy);
        }
        assert_eq!(report.critical().count(), 0);
    }

    #[test]
    fn status_tier_boundaries() {
        assert_eq!(CapacityStatus::from_percent(50.1), CapacityStatus::Healthy);
        assert_eq!(CapacityStatus::from_percent(50.0), CapacityStatus::Warning);
        assert_eq!(CapacityStatus::from_percent(25.1), CapacityStatus::Warning);
        assert_eq!(CapacityStatus::from_percent(25.0), CapacityStatus::Critical);
        assert_eq!(CapacityStatus::from_percent(0.0), CapacityStatus::Critical);
    }

    #[test]
    fn percent_is_share_of_capacity_left() {
        let limits = CapacityLimits {
            water: 1_000.0,
            electricity: 1_000.0,
            land: 1_000.0,
        };
        let usage = ResourceUsage::new(250.0, 600.0, 900.0);
        let report = report_capacity(&usage, &limits);
        let water = report.get(Resource::Water).unwrap();
        assert_eq!(water.remaining, 750.0);
        assert_eq!(water.percent_remaining, 75.0);
        assert_eq!(water.status, CapacityStatus::Healthy);
        assert_eq!(
            report.get(Resource::Electricity).unwrap().status,
            CapacityStatus::Warning
        );
        assert_eq!(
            report.critical().collect::<Vec<_>>(),
            vec![Resource::Land]
        );
    }

    #[test]
    fn report_serializes_by_resource_name() {
        let report = report_capacity(&ResourceUsage::default(), &CapacityLimits::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["water"]["status"], "healthy");
        assert_eq!(json["land"]["remaining"], 30_000_000.0);
    }

    #[test]
    fn non_positive_limits_are_rejected() {
        let limits = CapacityLimits {
            land: 0.0,
            ..CapacityLimits::default()
        };
        assert!(matches!(
            limits.validate(),
            Err(SimulationError::InvalidLimits(_))
        ));
        assert!(CapacityLimits::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_reports_critical_without_dividing() {
        let limits = CapacityLimits {
            water: 0.0,
            ..CapacityLimits::default()
        };
        let report = report_capacity(&ResourceUsage::default(), &limits);
        let water = report.get(Resource::Water).unwrap();
        assert_eq!(water.percent_remaining, 0.0);
        assert_eq!(water.status, CapacityStatus::Critical);
    }
}
