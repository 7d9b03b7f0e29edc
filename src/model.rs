use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "15-24")]
    From15To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55+")]
    Over55,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::From15To24,
        AgeBracket::From25To34,
        AgeBracket::From35To44,
        AgeBracket::From45To54,
        AgeBracket::Over55,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Education {
    NoEducation,
    Primary,
    Secondary,
    Higher,
}

impl Education {
    pub const ALL: [Education; 4] = [
        Education::NoEducation,
        Education::Primary,
        Education::Secondary,
        Education::Higher,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Employment {
    Employed,
    Unemployed,
}

impl Employment {
    pub const ALL: [Employment; 2] = [Employment::Employed, Employment::Unemployed];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialStatus {
    Single,
    Family,
}

impl SocialStatus {
    pub const ALL: [SocialStatus; 2] = [SocialStatus::Single, SocialStatus::Family];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativesAbroad {
    Yes,
    No,
}

impl RelativesAbroad {
    pub const ALL: [RelativesAbroad; 2] = [RelativesAbroad::Yes, RelativesAbroad::No];
}

/// Housing outcome assigned to every individual. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HousingCategory {
    LuxuryApartment,
    House,
    StandardApartment,
    SharedHousing,
    PublicHousing,
    Undefined,
}

impl HousingCategory {
    pub const ALL: [HousingCategory; 6] = [
        HousingCategory::LuxuryApartment,
        HousingCategory::House,
        HousingCategory::StandardApartment,
        HousingCategory::SharedHousing,
        HousingCategory::PublicHousing,
        HousingCategory::Undefined,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HousingCategory::LuxuryApartment => "Luxury Apartment",
            HousingCategory::House => "House",
            HousingCategory::StandardApartment => "Standard Apartment",
            HousingCategory::SharedHousing => "Shared Housing",
            HousingCategory::PublicHousing => "Public Housing",
            HousingCategory::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for HousingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One sampled person. Attributes are fixed at construction; the housing
/// category is set exactly once by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Individual {
    age: AgeBracket,
    gender: Gender,
    education: Education,
    employment: Employment,
    income: u64,
    social_status: SocialStatus,
    relatives_abroad: RelativesAbroad,
    housing: Option<HousingCategory>,
}

impl Individual {
    pub fn new(
        age: AgeBracket,
        gender: Gender,
        education: Education,
        employment: Employment,
        income: u64,
        social_status: SocialStatus,
        relatives_abroad: RelativesAbroad,
    ) -> Self {
        Self {
            age,
            gender,
            education,
            employment,
            income,
            social_status,
            relatives_abroad,
            housing: None,
        }
    }

    pub fn age(&self) -> AgeBracket {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn education(&self) -> Education {
        self.education
    }

    pub fn employment(&self) -> Employment {
        self.employment
    }

    pub fn income(&self) -> u64 {
        self.income
    }

    pub fn social_status(&self) -> SocialStatus {
        self.social_status
    }

    pub fn relatives_abroad(&self) -> RelativesAbroad {
        self.relatives_abroad
    }

    /// `None` until the individual has been classified.
    pub fn housing(&self) -> Option<HousingCategory> {
        self.housing
    }

    /// Records the housing category. Returns `false` and leaves the existing
    /// category untouched if one was already assigned.
    pub(crate) fn assign_housing(&mut self, category: HousingCategory) -> bool {
        if self.housing.is_some() {
            return false;
        }
        self.housing = Some(category);
        true
    }
}

/// Head count per housing category. All six categories are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PopulationAggregate {
    counts: BTreeMap<HousingCategory, u64>,
}

impl Default for PopulationAggregate {
    fn default() -> Self {
        Self {
            counts: HousingCategory::ALL.iter().map(|c| (*c, 0)).collect(),
        }
    }
}

impl PopulationAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_individuals<'a>(individuals: impl IntoIterator<Item = &'a Individual>) -> Self {
        let mut aggregate = Self::new();
        for individual in individuals {
            aggregate.record(individual.housing().unwrap_or(HousingCategory::Undefined));
        }
        aggregate
    }

    pub fn record(&mut self, category: HousingCategory) {
        *self.counts.entry(category).or_insert(0) += 1;
    }

    pub fn count(&self, category: HousingCategory) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HousingCategory, u64)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}
