//! Output contract for callers: the JSON report, a plain text rendering and CSV exports.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;

use crate::enhance::LevelEntry;
use crate::scenario::SimulationRequest;
use crate::simulation::{QuantileSummary, TrialOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub start_level: u32,
    pub target_level: u32,
    pub equipment_tier: u32,
    pub penalty: f64,
    pub trial_count: usize,
    pub discount_cost: bool,
    pub boost_15_16: bool,
    pub reduce_destroy: bool,
    pub protect_below_18: bool,
}

impl ScenarioSummary {
    pub fn from_request(request: &SimulationRequest) -> Self {
        Self {
            start_level: request.start_level,
            target_level: request.target_level,
            equipment_tier: request.equipment_tier,
            penalty: request.penalty,
            trial_count: request.trial_count,
            discount_cost: request.discount_cost,
            boost_15_16: request.boost_15_16,
            reduce_destroy: request.reduce_destroy,
            protect_below_18: request.protect_below_18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub status: &'static str,
    pub scenario: ScenarioSummary,
    /// Seed that reproduces this batch.
    pub seed: u64,
    pub summary: QuantileSummary,
    pub table: Vec<LevelEntry>,
}

const PERCENTILE_LABELS: [&str; 5] = ["best", "top 25%", "median", "top 75%", "worst"];

/// Tab-separated summary: one row per percentile plus the mean.
pub fn render_summary_text(summary: &QuantileSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "percentile\ttotal_cost_m\tdestructions");
    for ((label, cost), destructions) in PERCENTILE_LABELS
        .iter()
        .zip(summary.cost)
        .zip(summary.destructions)
    {
        let _ = writeln!(out, "{label}\t{cost:.0}\t{destructions:.1}");
    }
    let _ = writeln!(
        out,
        "mean\t{:.0}\t{:.1}",
        summary.cost_mean, summary.destructions_mean
    );
    out
}

/// Tab-separated table with "15 -> 16" transitions and percentages.
pub fn render_table_text(entries: &[LevelEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "level\tsuccess\tmaintain\tdestroy\tcost_m");
    for entry in entries {
        let _ = writeln!(
            out,
            "{} -> {}\t{:.2}%\t{:.2}%\t{:.2}%\t{}",
            entry.level,
            entry.level + 1,
            entry.success_prob * 100.0,
            entry.maintain_prob * 100.0,
            entry.destroy_prob * 100.0,
            entry.attempt_cost
        );
    }
    out
}

pub fn render_report_text(report: &SimulationReport) -> String {
    let mut out = String::new();
    let scenario = &report.scenario;
    let _ = writeln!(
        out,
        "levels {} -> {}, tier {}, {} trials, seed {}",
        scenario.start_level,
        scenario.target_level,
        scenario.equipment_tier,
        scenario.trial_count,
        report.seed
    );
    out.push_str(&render_summary_text(&report.summary));
    out.push('\n');
    out.push_str(&render_table_text(&report.table));
    out
}

pub fn write_table_csv<W: io::Write>(entries: &[LevelEntry], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct OutcomeRow {
    trial: usize,
    total_cost: f64,
    destruction_count: u32,
}

pub fn write_outcomes_csv<W: io::Write>(
    outcomes: &[TrialOutcome],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (trial, outcome) in outcomes.iter().enumerate() {
        csv_writer.serialize(OutcomeRow {
            trial,
            total_cost: outcome.total_cost,
            destruction_count: outcome.destruction_count,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
