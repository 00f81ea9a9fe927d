use rayon::prelude::*;

use crate::enhance::ProbabilityTable;
use crate::error::{ConfigError, SimulationError};
use crate::parallel::{batch_ranges, WorkerPool};
use crate::simulation::rng::Rng;
use crate::simulation::trial::{Journey, TrialOutcome, TrialRunner};

/// Outcomes of one batch, ordered by trial index.
pub type OutcomeBatch = Vec<TrialOutcome>;

/// Number of progress callbacks for [run_monte_carlo_with_progress].
pub const PROGRESS_BATCH_COUNT: usize = 40;

/// Run `trial_count` independent journeys on the calling thread.
pub fn run_monte_carlo(
    journey: &Journey,
    table: &ProbabilityTable,
    trial_count: usize,
    seed: u64,
) -> Result<OutcomeBatch, SimulationError> {
    run_monte_carlo_with_parallelism(journey, table, trial_count, seed, false)
}

/// Like [run_monte_carlo] but spreads trials across the current Rayon pool. Each trial
/// draws from its own stream, so the batch is identical to the sequential one.
pub fn run_monte_carlo_parallel(
    journey: &Journey,
    table: &ProbabilityTable,
    trial_count: usize,
    seed: u64,
) -> Result<OutcomeBatch, SimulationError> {
    run_monte_carlo_with_parallelism(journey, table, trial_count, seed, true)
}

fn run_monte_carlo_with_parallelism(
    journey: &Journey,
    table: &ProbabilityTable,
    trial_count: usize,
    seed: u64,
    parallel: bool,
) -> Result<OutcomeBatch, SimulationError> {
    let runner = prepare(journey, table, trial_count)?;
    Ok(run_range(&runner, seed, 0, trial_count, parallel))
}

/// Parallel run in [PROGRESS_BATCH_COUNT] chunks on `pool`, calling `on_progress(done, total)`
/// after each chunk.
pub fn run_monte_carlo_with_progress<F>(
    journey: &Journey,
    table: &ProbabilityTable,
    trial_count: usize,
    seed: u64,
    pool: &WorkerPool,
    mut on_progress: F,
) -> Result<OutcomeBatch, SimulationError>
where
    F: FnMut(usize, usize) + Send,
{
    let runner = prepare(journey, table, trial_count)?;
    pool.install(|| {
        let mut outcomes = Vec::with_capacity(trial_count);
        for (start, end) in batch_ranges(trial_count, PROGRESS_BATCH_COUNT) {
            outcomes.extend(run_range(&runner, seed, start, end, true));
            on_progress(end, trial_count);
        }
        outcomes
    })
}

fn prepare<'a>(
    journey: &Journey,
    table: &'a ProbabilityTable,
    trial_count: usize,
) -> Result<TrialRunner<'a>, SimulationError> {
    if trial_count == 0 {
        return Err(ConfigError::ZeroTrialCount.into());
    }
    TrialRunner::new(table, *journey)
}

fn run_range(
    runner: &TrialRunner<'_>,
    seed: u64,
    start: usize,
    end: usize,
    parallel: bool,
) -> OutcomeBatch {
    let run_one = |index: usize| runner.run(&mut Rng::for_trial(seed, index as u64));
    if parallel {
        (start..end).into_par_iter().map(run_one).collect()
    } else {
        (start..end).map(run_one).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::{build_table, TableOptions};

    fn journey() -> Journey {
        Journey {
            start_level: 17,
            target_level: 21,
            penalty: 5000.0,
            protect_below_18: true,
        }
    }

    #[test]
    fn zero_trials_is_a_configuration_error() {
        let table = build_table(&TableOptions::default()).unwrap();
        let err = run_monte_carlo(&journey(), &table, 0, 1).unwrap_err();
        assert_eq!(err, SimulationError::Configuration(ConfigError::ZeroTrialCount));
    }

    #[test]
    fn batch_has_requested_length() {
        let table = build_table(&TableOptions::default()).unwrap();
        let batch = run_monte_carlo(&journey(), &table, 250, 3).unwrap();
        assert_eq!(batch.len(), 250);
        assert!(batch.iter().all(|o| o.total_cost > 0.0));
    }

    #[test]
    fn sequential_parallel_and_chunked_runs_match() {
        let table = build_table(&TableOptions::default()).unwrap();
        let seq = run_monte_carlo(&journey(), &table, 500, 77).unwrap();
        let par = run_monte_carlo_parallel(&journey(), &table, 500, 77).unwrap();
        let mut calls = Vec::new();
        let chunked = run_monte_carlo_with_progress(
            &journey(),
            &table,
            500,
            77,
            &WorkerPool::with_workers(2),
            |done, total| calls.push((done, total)),
        )
        .unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq, chunked);
        assert_eq!(calls.len(), PROGRESS_BATCH_COUNT);
        assert_eq!(calls.last(), Some(&(500, 500)));
    }

    #[test]
    fn different_seeds_give_different_batches() {
        let table = build_table(&TableOptions::default()).unwrap();
        let a = run_monte_carlo(&journey(), &table, 100, 1).unwrap();
        let b = run_monte_carlo(&journey(), &table, 100, 2).unwrap();
        assert_ne!(a, b);
    }
}
