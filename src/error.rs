use thiserror::Error;

/// Configuration errors raised before any sampling happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("income range is empty: min {min} is greater than max {max}")]
    InvalidRange { min: u64, max: u64 },
    #[error("population count must be at least 1, got {0}")]
    InvalidCount(usize),
    #[error("invalid {attribute} weights: {reason}")]
    InvalidWeights {
        attribute: &'static str,
        reason: String,
    },
    #[error("unknown resource profile '{0}'")]
    UnknownProfile(String),
    #[error("invalid resource profile: {0}")]
    InvalidProfile(String),
    #[error("invalid capacity limits: {0}")]
    InvalidLimits(String),
}

pub type SimResult<T> = Result<T, SimulationError>;
