pub mod cost;
pub mod table;

pub use cost::{attempt_cost, compute_cost, cost_divisor};
pub use table::{
    apply_guaranteed_success, apply_reduced_destroy, build_table, AttemptOutcome, LevelEntry,
    Odds, ProbabilityTable, TableOptions, BASE_LEVEL, BASE_RATES, MAX_LEVEL,
    PROBABILITY_TOLERANCE,
};
