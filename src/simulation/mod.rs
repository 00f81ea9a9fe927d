pub mod monte_carlo;
pub mod rng;
pub mod stats;
pub mod trial;

pub use monte_carlo::{
    run_monte_carlo, run_monte_carlo_parallel, run_monte_carlo_with_progress, OutcomeBatch,
    PROGRESS_BATCH_COUNT,
};
pub use rng::{entropy_seed, stream_seed, Rng};
pub use stats::{percentile, summarize, QuantileSummary, REPORTED_PERCENTILES};
pub use trial::{
    effective_odds, run_trial, serialize_events_json, AttemptEvent, Journey, TraceCollector,
    TraceMode, TrialOutcome, TrialRunner, PROTECTION_CEILING,
};
