//! Simulation request: the full parameter set, its defaults, validation and file loading.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::enhance::{build_table, TableOptions, BASE_LEVEL, MAX_LEVEL};
use crate::error::{ConfigError, SimulationError};
use crate::parallel::WorkerPool;
use crate::report::{ScenarioSummary, SimulationReport};
use crate::simulation::{
    entropy_seed, run_monte_carlo_with_progress, summarize, Journey, OutcomeBatch,
};

pub const DEFAULT_START_LEVEL: u32 = 15;
pub const DEFAULT_TARGET_LEVEL: u32 = 22;
pub const DEFAULT_EQUIPMENT_TIER: u32 = 250;
pub const DEFAULT_PENALTY: f64 = 5000.0;
pub const DEFAULT_TRIAL_COUNT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationRequest {
    pub start_level: u32,
    pub target_level: u32,
    pub equipment_tier: u32,
    pub penalty: f64,
    pub trial_count: usize,
    pub discount_cost: bool,
    pub boost_15_16: bool,
    pub reduce_destroy: bool,
    pub protect_below_18: bool,
    /// When None a seed is drawn from OS entropy and reported back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            start_level: DEFAULT_START_LEVEL,
            target_level: DEFAULT_TARGET_LEVEL,
            equipment_tier: DEFAULT_EQUIPMENT_TIER,
            penalty: DEFAULT_PENALTY,
            trial_count: DEFAULT_TRIAL_COUNT,
            discount_cost: false,
            boost_15_16: false,
            reduce_destroy: false,
            protect_below_18: false,
            seed: None,
        }
    }
}

/// Report plus the raw batch it was computed from.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub report: SimulationReport,
    pub outcomes: OutcomeBatch,
}

impl SimulationRequest {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_level < BASE_LEVEL || self.start_level >= MAX_LEVEL {
            return Err(ConfigError::LevelOutOfRange {
                field: "start_level",
                level: self.start_level,
                min: BASE_LEVEL,
                max: MAX_LEVEL - 1,
            });
        }
        if self.target_level <= self.start_level {
            return Err(ConfigError::TargetNotAboveStart {
                start: self.start_level,
                target: self.target_level,
            });
        }
        if self.target_level > MAX_LEVEL {
            return Err(ConfigError::LevelOutOfRange {
                field: "target_level",
                level: self.target_level,
                min: self.start_level + 1,
                max: MAX_LEVEL,
            });
        }
        if self.equipment_tier == 0 {
            return Err(ConfigError::ZeroEquipmentTier);
        }
        if !self.penalty.is_finite() || self.penalty < 0.0 {
            return Err(ConfigError::InvalidPenalty(self.penalty));
        }
        if self.trial_count == 0 {
            return Err(ConfigError::ZeroTrialCount);
        }
        Ok(())
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            equipment_tier: self.equipment_tier,
            discount_cost: self.discount_cost,
            boost_15_16: self.boost_15_16,
            reduce_destroy: self.reduce_destroy,
        }
    }

    pub fn journey(&self) -> Journey {
        Journey {
            start_level: self.start_level,
            target_level: self.target_level,
            penalty: self.penalty,
            protect_below_18: self.protect_below_18,
        }
    }

    /// The requested seed, or a fresh one from OS entropy.
    pub fn resolve_seed(&self) -> Result<u64, SimulationError> {
        match self.seed {
            Some(seed) => Ok(seed),
            None => entropy_seed().map_err(|err| SimulationError::Entropy(err.to_string())),
        }
    }

    /// Validate, build the table, run the batch on `pool` and summarize.
    pub fn execute<F>(&self, pool: &WorkerPool, on_progress: F) -> Result<SimulationRun, SimulationError>
    where
        F: FnMut(usize, usize) + Send,
    {
        self.validate()?;
        let seed = self.resolve_seed()?;
        let table = build_table(&self.table_options())?;
        let outcomes = run_monte_carlo_with_progress(
            &self.journey(),
            &table,
            self.trial_count,
            seed,
            pool,
            on_progress,
        )?;
        let summary = summarize(&outcomes)?;
        Ok(SimulationRun {
            report: SimulationReport {
                status: "ok",
                scenario: ScenarioSummary::from_request(self),
                seed,
                summary,
                table: table.entries().to_vec(),
            },
            outcomes,
        })
    }

    /// [execute](Self::execute) on the default pool without progress reporting.
    pub fn simulate(&self) -> Result<SimulationReport, SimulationError> {
        Ok(self.execute(&WorkerPool::default(), |_, _| {})?.report)
    }
}

#[derive(Debug)]
pub enum ScenarioError {
    Read(std::io::Error),
    Parse(serde_yaml::Error),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read scenario file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse scenario file: {err}"),
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Parse a scenario from YAML or JSON text. Missing fields take their defaults.
pub fn parse_scenario(raw: &str) -> Result<SimulationRequest, ScenarioError> {
    serde_yaml::from_str(raw).map_err(ScenarioError::Parse)
}

pub fn load_scenario(path: impl AsRef<Path>) -> Result<SimulationRequest, ScenarioError> {
    let raw = fs::read_to_string(path).map_err(ScenarioError::Read)?;
    parse_scenario(&raw)
}
