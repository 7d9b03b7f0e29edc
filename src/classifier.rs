//! Housing assignment by ordered rules.
//!
//! Rules are checked top to bottom and the first match wins. Only income and
//! social status take part; the other sampled attributes are ignored.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{HousingCategory, Individual, SocialStatus};

/// Incomes strictly above this qualify for luxury housing.
pub const HIGH_INCOME_THRESHOLD: u64 = 100_000;
/// Lowest income that still affords a standard apartment.
pub const LOW_INCOME_THRESHOLD: u64 = 18_000;

const HIGH_INCOME_CHOICES: [HousingCategory; 2] =
    [HousingCategory::LuxuryApartment, HousingCategory::House];
const LOW_INCOME_SINGLE_CHOICES: [HousingCategory; 2] =
    [HousingCategory::SharedHousing, HousingCategory::PublicHousing];

#[derive(Debug, Clone, Copy, Default)]
pub struct HousingClassifier;

impl HousingClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Picks a category from income and social status. `rng` is only drawn
    /// from when a rule offers two outcomes.
    pub fn category_for<R: Rng + ?Sized>(
        &self,
        income: u64,
        social_status: SocialStatus,
        rng: &mut R,
    ) -> HousingCategory {
        if income > HIGH_INCOME_THRESHOLD {
            pick(&HIGH_INCOME_CHOICES, rng)
        } else if (LOW_INCOME_THRESHOLD..=HIGH_INCOME_THRESHOLD).contains(&income) {
            HousingCategory::StandardApartment
        } else if income < LOW_INCOME_THRESHOLD && social_status == SocialStatus::Single {
            pick(&LOW_INCOME_SINGLE_CHOICES, rng)
        } else if social_status == SocialStatus::Family && income >= LOW_INCOME_THRESHOLD {
            // Shadowed by the two income rules above. Kept in place so the
            // rule order stays as published.
            HousingCategory::House
        } else if income < LOW_INCOME_THRESHOLD && social_status == SocialStatus::Family {
            HousingCategory::PublicHousing
        } else {
            HousingCategory::Undefined
        }
    }

    /// Classifies `individual` and stores the result on it. An individual
    /// that already has a category keeps it.
    pub fn classify<R: Rng + ?Sized>(
        &self,
        individual: &mut Individual,
        rng: &mut R,
    ) -> HousingCategory {
        if let Some(existing) = individual.housing() {
            return existing;
        }
        let category = self.category_for(individual.income(), individual.social_status(), rng);
        individual.assign_housing(category);
        category
    }
}

fn pick<R: Rng + ?Sized>(choices: &[HousingCategory; 2], rng: &mut R) -> HousingCategory {
    choices
        .choose(rng)
        .copied()
        .unwrap_or(HousingCategory::Undefined)
}
