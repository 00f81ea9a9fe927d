//! Monte Carlo estimator for star enhancement: how much an item costs, and how often it is
//! destroyed, on the way from a start level to a target level.
//!
//! [enhance] builds the per-level odds and cost table, [simulation] runs journeys over it and
//! summarizes the batch, [scenario] ties the two together behind a single request type.

pub mod cli;
pub mod enhance;
pub mod error;
pub mod parallel;
pub mod report;
pub mod scenario;
pub mod simulation;

pub use error::{ConfigError, SimulationError};
pub use scenario::{SimulationRequest, SimulationRun};
