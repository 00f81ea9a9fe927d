//! Error taxonomy for table construction and simulation runs.

use std::fmt;

/// Invalid input domain. Raised before any simulation work starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    LevelOutOfRange {
        field: &'static str,
        level: u32,
        min: u32,
        max: u32,
    },
    TargetNotAboveStart {
        start: u32,
        target: u32,
    },
    ZeroTrialCount,
    ZeroEquipmentTier,
    InvalidPenalty(f64),
    LevelNotInTable(u32),
    EmptyBatch,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelOutOfRange {
                field,
                level,
                min,
                max,
            } => write!(f, "{field} {level} is outside the supported range {min}..={max}"),
            Self::TargetNotAboveStart { start, target } => {
                write!(f, "target level {target} must be above start level {start}")
            }
            Self::ZeroTrialCount => write!(f, "trial count must be positive"),
            Self::ZeroEquipmentTier => write!(f, "equipment tier must be positive"),
            Self::InvalidPenalty(value) => {
                write!(f, "penalty must be a finite non-negative number, got {value}")
            }
            Self::LevelNotInTable(level) => write!(f, "no table entry for level {level}"),
            Self::EmptyBatch => write!(f, "cannot summarize an empty outcome batch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Configuration(ConfigError),
    /// A built row whose probabilities do not sum to 1.
    InvariantViolation { level: u32, sum: f64 },
    WorkerPool(String),
    /// OS entropy was unavailable for an unseeded run.
    Entropy(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "configuration error: {err}"),
            Self::InvariantViolation { level, sum } => write!(
                f,
                "probabilities for level {level} sum to {sum}, expected 1.0"
            ),
            Self::WorkerPool(msg) => write!(f, "failed to build worker pool: {msg}"),
            Self::Entropy(msg) => write!(f, "failed to draw a random seed: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err)
    }
}

impl SimulationError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
