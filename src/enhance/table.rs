//! Per-level success / maintain / destroy odds and attempt costs.
//!
//! The base rates are a calibrated lookup, one row per level from [BASE_LEVEL] to
//! [MAX_LEVEL] - 1. Modifiers redistribute probability mass within a row; every built
//! row is checked against the sum-to-one invariant before the table is handed out.

use serde::{Deserialize, Serialize};

use crate::enhance::cost::attempt_cost;
use crate::error::{ConfigError, SimulationError};

/// Lowest level in the table and the reset target after a destruction.
pub const BASE_LEVEL: u32 = 15;
/// Highest attainable level. The last table row is `MAX_LEVEL - 1`.
pub const MAX_LEVEL: u32 = 30;
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Share of destroy probability kept by the reduced-destruction modifier.
pub const REDUCED_DESTROY_FACTOR: f64 = 0.7;

/// (success, maintain, destroy) for levels 15..=29.
pub const BASE_RATES: [(f64, f64, f64); (MAX_LEVEL - BASE_LEVEL) as usize] = [
    (0.30, 0.679, 0.021),
    (0.30, 0.679, 0.021),
    (0.15, 0.782, 0.068),
    (0.15, 0.782, 0.068),
    (0.15, 0.765, 0.085),
    (0.30, 0.595, 0.105),
    (0.15, 0.7225, 0.1275),
    (0.15, 0.68, 0.17),
    (0.10, 0.72, 0.18),
    (0.10, 0.72, 0.18),
    (0.10, 0.72, 0.18),
    (0.07, 0.744, 0.186),
    (0.05, 0.76, 0.19),
    (0.03, 0.776, 0.194),
    (0.01, 0.792, 0.198),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub level: u32,
    pub success_prob: f64,
    pub maintain_prob: f64,
    pub destroy_prob: f64,
    /// Millions of currency, paid on every attempt.
    pub attempt_cost: u64,
}

impl LevelEntry {
    pub fn odds(&self) -> Odds {
        Odds {
            success: self.success_prob,
            maintain: self.maintain_prob,
            destroy: self.destroy_prob,
        }
    }

    pub fn probability_sum(&self) -> f64 {
        self.success_prob + self.maintain_prob + self.destroy_prob
    }
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Maintain,
    Destroy,
}

/// Effective probabilities used for one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Odds {
    pub success: f64,
    pub maintain: f64,
    pub destroy: f64,
}

impl Odds {
    /// Map a uniform roll in `[0, 1)` onto an outcome.
    #[inline]
    pub fn classify(&self, roll: f64) -> AttemptOutcome {
        if roll < self.success {
            AttemptOutcome::Success
        } else if roll < self.success + self.maintain {
            AttemptOutcome::Maintain
        } else {
            AttemptOutcome::Destroy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub equipment_tier: u32,
    pub discount_cost: bool,
    pub boost_15_16: bool,
    pub reduce_destroy: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            equipment_tier: 250,
            discount_cost: false,
            boost_15_16: false,
            reduce_destroy: false,
        }
    }
}

/// Immutable table for one simulation request, indexed by `level - BASE_LEVEL`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityTable {
    entries: Vec<LevelEntry>,
}

impl ProbabilityTable {
    /// Build from explicit rows. Rows must be contiguous starting at [BASE_LEVEL].
    pub fn from_entries(entries: Vec<LevelEntry>) -> Result<Self, SimulationError> {
        for (offset, entry) in entries.iter().enumerate() {
            let expected = BASE_LEVEL + offset as u32;
            if entry.level != expected {
                return Err(ConfigError::LevelNotInTable(expected).into());
            }
            check_invariant(entry)?;
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LevelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest level a journey through this table can reach.
    pub fn reachable_level(&self) -> u32 {
        BASE_LEVEL + self.entries.len() as u32
    }

    pub fn entry(&self, level: u32) -> Result<&LevelEntry, SimulationError> {
        level
            .checked_sub(BASE_LEVEL)
            .and_then(|offset| self.entries.get(offset as usize))
            .ok_or(SimulationError::Configuration(ConfigError::LevelNotInTable(level)))
    }
}

pub fn build_table(options: &TableOptions) -> Result<ProbabilityTable, SimulationError> {
    if options.equipment_tier == 0 {
        return Err(ConfigError::ZeroEquipmentTier.into());
    }

    let mut entries: Vec<LevelEntry> = BASE_RATES
        .iter()
        .enumerate()
        .map(|(offset, &(success, maintain, destroy))| {
            let level = BASE_LEVEL + offset as u32;
            LevelEntry {
                level,
                success_prob: success,
                maintain_prob: maintain,
                destroy_prob: destroy,
                attempt_cost: attempt_cost(level, options.equipment_tier, options.discount_cost),
            }
        })
        .collect();

    if options.reduce_destroy {
        for entry in &mut entries {
            apply_reduced_destroy(entry);
        }
    }

    if options.boost_15_16 {
        if let Some(lowest) = entries.first_mut() {
            apply_guaranteed_success(lowest);
        }
    }

    ProbabilityTable::from_entries(entries)
}

/// Keep 70% of the destroy mass and move the rest into maintain.
pub fn apply_reduced_destroy(entry: &mut LevelEntry) {
    let destroy = entry.destroy_prob;
    entry.destroy_prob = destroy * REDUCED_DESTROY_FACTOR;
    entry.maintain_prob += destroy * (1.0 - REDUCED_DESTROY_FACTOR);
}

pub fn apply_guaranteed_success(entry: &mut LevelEntry) {
    entry.success_prob = 1.0;
    entry.maintain_prob = 0.0;
    entry.destroy_prob = 0.0;
}

fn check_invariant(entry: &LevelEntry) -> Result<(), SimulationError> {
    let sum = entry.probability_sum();
    let in_range = [entry.success_prob, entry.maintain_prob, entry.destroy_prob]
        .iter()
        .all(|p| (0.0..=1.0).contains(p));
    if !in_range || (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(SimulationError::InvariantViolation {
            level: entry.level,
            sum,
        });
    }
    Ok(())
}
