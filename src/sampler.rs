use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::model::{
    AgeBracket, Education, Employment, Gender, Individual, RelativesAbroad, SocialStatus,
};

/// Age band weights as published. They sum to 1.013; `WeightedIndex`
/// normalizes them so the ratios are kept.
pub const AGE_WEIGHTS: [f64; 5] = [0.48, 0.333, 0.194, 0.099, 0.087];
pub const GENDER_WEIGHTS: [f64; 2] = [0.496, 0.504];

fn default_education() -> Vec<f64> {
    vec![0.02, 0.04, 0.24, 0.70]
}

fn default_employment() -> Vec<f64> {
    vec![0.9, 0.1]
}

fn default_social_status() -> Vec<f64> {
    vec![0.5, 0.5]
}

fn default_relatives_abroad() -> f64 {
    0.5
}

fn default_income_min() -> u64 {
    18_000
}

fn default_income_max() -> u64 {
    100_000
}

/// Caller-supplied weights. Vectors follow the declaration order of the
/// matching enum and do not need to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingWeights {
    #[serde(default = "default_education")]
    pub education: Vec<f64>,
    #[serde(default = "default_employment")]
    pub employment: Vec<f64>,
    #[serde(default = "default_social_status")]
    pub social_status: Vec<f64>,
    /// Probability of having relatives abroad, in `[0, 1]`.
    #[serde(default = "default_relatives_abroad")]
    pub relatives_abroad: f64,
}

impl Default for SamplingWeights {
    fn default() -> Self {
        Self {
            education: default_education(),
            employment: default_employment(),
            social_status: default_social_status(),
            relatives_abroad: default_relatives_abroad(),
        }
    }
}

impl SamplingWeights {
    pub fn validate(&self) -> SimResult<()> {
        check_weights("education", &self.education, Education::ALL.len())?;
        check_weights("employment", &self.employment, Employment::ALL.len())?;
        check_weights(
            "social status",
            &self.social_status,
            SocialStatus::ALL.len(),
        )?;
        let p = self.relatives_abroad;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(SimulationError::InvalidWeights {
                attribute: "relatives abroad",
                reason: format!("probability {p} is outside [0, 1]"),
            });
        }
        Ok(())
    }
}

/// Inclusive income bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRange {
    #[serde(default = "default_income_min")]
    pub min: u64,
    #[serde(default = "default_income_max")]
    pub max: u64,
}

impl Default for IncomeRange {
    fn default() -> Self {
        Self {
            min: default_income_min(),
            max: default_income_max(),
        }
    }
}

impl IncomeRange {
    pub fn new(min: u64, max: u64) -> SimResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.min > self.max {
            return Err(SimulationError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

fn check_weights(attribute: &'static str, weights: &[f64], arity: usize) -> SimResult<()> {
    if weights.len() != arity {
        return Err(SimulationError::InvalidWeights {
            attribute,
            reason: format!("expected {arity} weights, got {}", weights.len()),
        });
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(SimulationError::InvalidWeights {
            attribute,
            reason: format!("weight {bad} is negative or not finite"),
        });
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() {
        return Err(SimulationError::InvalidWeights {
            attribute,
            reason: "weights sum to a non-finite total".into(),
        });
    }
    if total <= 0.0 {
        return Err(SimulationError::InvalidWeights {
            attribute,
            reason: "weights must not all be zero".into(),
        });
    }
    Ok(())
}

fn weighted(attribute: &'static str, weights: &[f64]) -> SimResult<WeightedIndex<f64>> {
    WeightedIndex::new(weights).map_err(|err| SimulationError::InvalidWeights {
        attribute,
        reason: err.to_string(),
    })
}

/// Draws one individual's attributes per call. Construction validates every
/// table, so sampling itself cannot fail.
#[derive(Debug, Clone)]
pub struct AttributeSampler {
    age: WeightedIndex<f64>,
    gender: WeightedIndex<f64>,
    education: WeightedIndex<f64>,
    employment: WeightedIndex<f64>,
    social_status: WeightedIndex<f64>,
    relatives_abroad: WeightedIndex<f64>,
    income: Uniform<u64>,
}

impl AttributeSampler {
    pub fn new(weights: &SamplingWeights, income: IncomeRange) -> SimResult<Self> {
        weights.validate()?;
        income.validate()?;
        let p = weights.relatives_abroad;
        Ok(Self {
            age: weighted("age", &AGE_WEIGHTS)?,
            gender: weighted("gender", &GENDER_WEIGHTS)?,
            education: weighted("education", &weights.education)?,
            employment: weighted("employment", &weights.employment)?,
            social_status: weighted("social status", &weights.social_status)?,
            relatives_abroad: weighted("relatives abroad", &[p, 1.0 - p])?,
            income: Uniform::new_inclusive(income.min, income.max),
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Individual {
        let age = AgeBracket::ALL[self.age.sample(rng)];
        let gender = Gender::ALL[self.gender.sample(rng)];
        let education = Education::ALL[self.education.sample(rng)];
        let employment = Employment::ALL[self.employment.sample(rng)];
        let income = self.income.sample(rng);
        let social_status = SocialStatus::ALL[self.social_status.sample(rng)];
        let relatives_abroad = RelativesAbroad::ALL[self.relatives_abroad.sample(rng)];
        Individual::new(
            age,
            gender,
            education,
            employment,
            income,
            social_status,
            relatives_abroad,
        )
    }
}
