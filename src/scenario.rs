use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityLimits;
use crate::error::{SimResult, SimulationError};
use crate::resources::{AggregationMode, ResourceTable, DEFAULT_PROFILE};
use crate::sampler::{IncomeRange, SamplingWeights};

fn default_count() -> usize {
    10_000
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

/// Inputs for a single batch. Omitted fields fall back to the Ostrava study
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub income: IncomeRange,
    #[serde(default)]
    pub weights: SamplingWeights,
    #[serde(default = "default_profile")]
    pub resource_profile: String,
    #[serde(default)]
    pub aggregation: AggregationMode,
    #[serde(default)]
    pub limits: CapacityLimits,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            count: default_count(),
            seed: None,
            income: IncomeRange::default(),
            weights: SamplingWeights::default(),
            resource_profile: default_profile(),
            aggregation: AggregationMode::default(),
            limits: CapacityLimits::default(),
        }
    }
}

impl ScenarioParams {
    /// Checks every input so a run never starts with a bad configuration.
    pub fn validate(&self) -> SimResult<()> {
        if self.count < 1 {
            return Err(SimulationError::InvalidCount(self.count));
        }
        self.income.validate()?;
        self.weights.validate()?;
        self.limits.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub params: ScenarioParams,
    /// Extra named tables, looked up before the built-in presets.
    #[serde(default)]
    pub resource_profiles: BTreeMap<String, ResourceTable>,
}

impl Scenario {
    pub fn resolve_profile(&self, name: &str) -> SimResult<ResourceTable> {
        match self.resource_profiles.get(name) {
            Some(table) => Ok(table.clone()),
            None => ResourceTable::preset(name),
        }
    }

    pub fn resource_table(&self) -> SimResult<ResourceTable> {
        self.resolve_profile(&self.params.resource_profile)
    }

    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = ResourceTable::preset_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        for name in self.resource_profiles.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Command-line overrides layered on top of a loaded scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub count: Option<usize>,
    pub seed: Option<u64>,
    pub income_min: Option<u64>,
    pub income_max: Option<u64>,
    pub resource_profile: Option<String>,
    pub breakdown: bool,
}

impl ScenarioOverrides {
    /// Applies the overrides and re-validates the result, including the
    /// selected resource profile.
    pub fn apply(self, scenario: &mut Scenario) -> SimResult<()> {
        let params = &mut scenario.params;
        if let Some(count) = self.count {
            params.count = count;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }
        if let Some(min) = self.income_min {
            params.income.min = min;
        }
        if let Some(max) = self.income_max {
            params.income.max = max;
        }
        if let Some(profile) = self.resource_profile {
            params.resource_profile = profile;
        }
        if self.breakdown {
            params.aggregation = AggregationMode::Breakdown;
        }
        scenario.params.validate()?;
        scenario.resource_table()?;
        Ok(())
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .params
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        scenario
            .resource_table()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HousingCategory;

    #[test]
    fn minimal_scenario_takes_study_defaults() {
        let scenario: Scenario = serde_yaml::from_str("name: bare").unwrap();
        assert_eq!(scenario.params, ScenarioParams::default());
        assert_eq!(scenario.params.income, IncomeRange::new(18_000, 100_000).unwrap());
        assert!(scenario.params.validate().is_ok());
    }

    #[test]
    fn custom_profiles_are_resolvable_by_name() {
        let yaml = r#"
name: custom
resource_profile: frugal
resource_profiles:
  frugal:
    LuxuryApartment: { water: 10, electricity: 1, land: 10 }
    House: { water: 10, electricity: 1, land: 10 }
    StandardApartment: { water: 10, electricity: 1, land: 10 }
    SharedHousing: { water: 10, electricity: 1, land: 10 }
    PublicHousing: { water: 10, electricity: 1, land: 10 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let table = scenario.resource_table().unwrap();
        assert_eq!(table.profile(HousingCategory::House).water, 10.0);
        assert_eq!(scenario.profile_names(), vec!["ostrava", "frugal"]);
        assert!(scenario.resolve_profile("ostrava").is_ok());
        assert!(scenario.resolve_profile("missing").is_err());
    }

    #[test]
    fn overrides_replace_scenario_values() {
        let mut scenario: Scenario = serde_yaml::from_str("name: cli").unwrap();
        ScenarioOverrides {
            count: Some(12),
            seed: Some(3),
            income_max: Some(250_000),
            breakdown: true,
            ..ScenarioOverrides::default()
        }
        .apply(&mut scenario)
        .unwrap();
        assert_eq!(scenario.params.count, 12);
        assert_eq!(scenario.params.seed, Some(3));
        assert_eq!(scenario.params.income.max, 250_000);
        assert_eq!(scenario.params.aggregation, AggregationMode::Breakdown);
    }

    #[test]
    fn overrides_are_validated() {
        let mut scenario: Scenario = serde_yaml::from_str("name: cli").unwrap();
        let zero = ScenarioOverrides {
            count: Some(0),
            ..ScenarioOverrides::default()
        };
        assert_eq!(
            zero.apply(&mut scenario),
            Err(SimulationError::InvalidCount(0))
        );

        let mut scenario: Scenario = serde_yaml::from_str("name: cli").unwrap();
        let inverted = ScenarioOverrides {
            income_min: Some(200_000),
            ..ScenarioOverrides::default()
        };
        assert_eq!(
            inverted.apply(&mut scenario),
            Err(SimulationError::InvalidRange {
                min: 200_000,
                max: 100_000
            })
        );

        let mut scenario: Scenario = serde_yaml::from_str("name: cli").unwrap();
        let unknown = ScenarioOverrides {
            resource_profile: Some("nowhere".into()),
            ..ScenarioOverrides::default()
        };
        assert_eq!(
            unknown.apply(&mut scenario),
            Err(SimulationError::UnknownProfile("nowhere".into()))
        );
    }

    #[test]
    fn loader_rejects_inverted_income() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bad.yaml"),
            "name: bad\nincome: { min: 5, max: 1 }\n",
        )
        .unwrap();
        let err = ScenarioLoader::new(dir.path()).load("bad.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("income range is empty"));
    }

    #[test]
    fn loader_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScenarioLoader::new(dir.path()).load("nope.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario file"));
    }
}
