//! Percentile reduction of an outcome batch.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimulationError};
use crate::simulation::trial::TrialOutcome;

pub const REPORTED_PERCENTILES: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileSummary {
    pub percentiles: [f64; 5],
    /// Total cost at each entry of `percentiles`.
    pub cost: [f64; 5],
    /// Destruction count at each entry of `percentiles`.
    pub destructions: [f64; 5],
    pub cost_mean: f64,
    pub destructions_mean: f64,
    pub trials: usize,
}

/// Percentile `p` (0..=100) of ascending `sorted` values, interpolating linearly between
/// neighbouring order statistics at rank `p / 100 * (n - 1)`.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn quantiles(mut values: Vec<f64>) -> ([f64; 5], f64) {
    values.sort_by(f64::total_cmp);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mut out = [0.0; 5];
    for (slot, p) in out.iter_mut().zip(REPORTED_PERCENTILES) {
        *slot = percentile(&values, p).unwrap_or(0.0);
    }
    (out, mean)
}

pub fn summarize(batch: &[TrialOutcome]) -> Result<QuantileSummary, SimulationError> {
    if batch.is_empty() {
        return Err(ConfigError::EmptyBatch.into());
    }
    let (cost, cost_mean) = quantiles(batch.iter().map(|o| o.total_cost).collect());
    let (destructions, destructions_mean) =
        quantiles(batch.iter().map(|o| o.destruction_count as f64).collect());
    Ok(QuantileSummary {
        percentiles: REPORTED_PERCENTILES,
        cost,
        destructions,
        cost_mean,
        destructions_mean,
        trials: batch.len(),
    })
}
