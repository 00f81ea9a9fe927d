//! One enhancement journey from a start level to a target level.
//!
//! Every attempt pays the row's cost. Success moves up one level, maintain stays, destroy
//! pays the penalty and drops back to [BASE_LEVEL], not to the journey's start level.

use serde::{Deserialize, Serialize};

use crate::enhance::{AttemptOutcome, LevelEntry, Odds, ProbabilityTable, BASE_LEVEL};
use crate::error::{ConfigError, SimulationError};
use crate::simulation::rng::Rng;

/// Levels below this one cannot be destroyed while protection is on.
pub const PROTECTION_CEILING: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub start_level: u32,
    pub target_level: u32,
    /// Added to the total cost on every destruction.
    pub penalty: f64,
    pub protect_below_18: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub total_cost: f64,
    pub destruction_count: u32,
}

impl TrialOutcome {
    pub const ZERO: Self = Self {
        total_cost: 0.0,
        destruction_count: 0,
    };
}

/// Odds for one attempt at `level`. With protection below 18 the destroy mass is folded
/// into maintain; the table row itself is left alone.
pub fn effective_odds(entry: &LevelEntry, level: u32, protect_below_18: bool) -> Odds {
    let odds = entry.odds();
    if protect_below_18 && level < PROTECTION_CEILING {
        Odds {
            success: odds.success,
            maintain: odds.maintain + odds.destroy,
            destroy: 0.0,
        }
    } else {
        odds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    #[default]
    Off,
    Events,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptEvent {
    pub attempt: u64,
    pub level: u32,
    pub roll: f64,
    pub outcome: AttemptOutcome,
    pub level_after: u32,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    enabled: bool,
    events: Vec<AttemptEvent>,
}

impl TraceCollector {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    pub fn from_mode(mode: TraceMode) -> Self {
        Self::new(mode == TraceMode::Events)
    }

    pub fn record(&mut self, event: AttemptEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[AttemptEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<AttemptEvent> {
        self.events
    }
}

pub fn serialize_events_json(events: &[AttemptEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(events)
}

/// Runs journeys over a validated table. Cheap to copy; share one per batch.
#[derive(Debug, Clone, Copy)]
pub struct TrialRunner<'a> {
    table: &'a ProbabilityTable,
    journey: Journey,
}

impl<'a> TrialRunner<'a> {
    /// Checks up front that every level the journey can visit has a table row.
    pub fn new(table: &'a ProbabilityTable, journey: Journey) -> Result<Self, SimulationError> {
        if !journey.penalty.is_finite() || journey.penalty < 0.0 {
            return Err(ConfigError::InvalidPenalty(journey.penalty).into());
        }
        if journey.start_level < journey.target_level {
            table.entry(journey.start_level)?;
            if journey.target_level > table.reachable_level() {
                return Err(ConfigError::LevelNotInTable(journey.target_level - 1).into());
            }
        }
        Ok(Self { table, journey })
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn run(&self, rng: &mut Rng) -> TrialOutcome {
        self.walk(rng, None)
    }

    pub fn run_traced(&self, rng: &mut Rng, trace: &mut TraceCollector) -> TrialOutcome {
        self.walk(rng, Some(trace))
    }

    fn walk(&self, rng: &mut Rng, mut trace: Option<&mut TraceCollector>) -> TrialOutcome {
        let Journey {
            start_level,
            target_level,
            penalty,
            protect_below_18,
        } = self.journey;
        let entries = self.table.entries();

        let mut level = start_level;
        let mut total_cost = 0.0;
        let mut destruction_count = 0u32;
        let mut attempt = 0u64;

        while level < target_level {
            // Rows are contiguous from BASE_LEVEL; `new` checked start and target - 1.
            let entry = &entries[(level - BASE_LEVEL) as usize];
            total_cost += entry.attempt_cost as f64;
            attempt += 1;

            let odds = effective_odds(entry, level, protect_below_18);
            let roll = rng.next_f64();
            let outcome = odds.classify(roll);
            let level_before = level;
            match outcome {
                AttemptOutcome::Success => level += 1,
                AttemptOutcome::Maintain => {}
                AttemptOutcome::Destroy => {
                    total_cost += penalty;
                    destruction_count += 1;
                    level = BASE_LEVEL;
                }
            }

            if let Some(trace) = trace.as_deref_mut() {
                trace.record(AttemptEvent {
                    attempt,
                    level: level_before,
                    roll,
                    outcome,
                    level_after: level,
                    total_cost,
                });
            }
        }

        TrialOutcome {
            total_cost,
            destruction_count,
        }
    }
}

/// One-off trial. Prefer [TrialRunner] when running many trials over one table.
pub fn run_trial(
    table: &ProbabilityTable,
    journey: &Journey,
    rng: &mut Rng,
) -> Result<TrialOutcome, SimulationError> {
    Ok(TrialRunner::new(table, *journey)?.run(rng))
}
