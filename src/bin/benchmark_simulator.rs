//! Run the trial benchmark and optionally append one line to a log file for trend tracking.
//!
//! Usage:
//!   cargo run --release --bin benchmark_simulator
//!   cargo run --release --bin benchmark_simulator -- --log
//!
//! --log  Append one row to benchmark_log.csv (date, trials_per_sec, attempts_per_sec, attempts_per_trial).

use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use starforce::enhance::{build_table, TableOptions};
use starforce::simulation::{Journey, Rng, TraceCollector, TrialRunner};

const LOG_PATH: &str = "benchmark_log.csv";

fn main() -> ExitCode {
    let log = std::env::args().any(|a| a == "--log");

    let table = match build_table(&TableOptions {
        equipment_tier: 200,
        ..TableOptions::default()
    }) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("failed to build table: {err}");
            return ExitCode::FAILURE;
        }
    };
    let journey = Journey {
        start_level: 17,
        target_level: 22,
        penalty: 5000.0,
        protect_below_18: true,
    };
    let runner = match TrialRunner::new(&table, journey) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("invalid journey: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Run for at least this long or this many trials
    const MIN_DURATION_MS: u128 = 2000;
    const MIN_TRIALS: u64 = 500;

    let start = Instant::now();
    let mut trials: u64 = 0;
    while start.elapsed().as_millis() < MIN_DURATION_MS || trials < MIN_TRIALS {
        let _ = runner.run(&mut Rng::for_trial(7, trials));
        trials += 1;
    }
    let elapsed_secs = start.elapsed().as_secs_f64();

    // Attempt count per trial, sampled separately so the timed loop stays untraced.
    let sample = 200u64;
    let mut attempts = 0usize;
    for i in 0..sample {
        let mut trace = TraceCollector::new(true);
        runner.run_traced(&mut Rng::for_trial(7, i), &mut trace);
        attempts += trace.events().len();
    }
    let attempts_per_trial = attempts as f64 / sample as f64;

    let trials_per_sec = trials as f64 / elapsed_secs;
    let attempts_per_sec = trials_per_sec * attempts_per_trial;

    println!(
        "Simulator benchmark ({} -> {}, tier 200):",
        journey.start_level, journey.target_level
    );
    println!("  Trials:         {}", trials);
    println!("  Duration:       {:.2} s", elapsed_secs);
    println!("  Trials/s:       {:.2}", trials_per_sec);
    println!("  Attempts/s:     {:.2}", attempts_per_sec);
    println!("  Attempts/trial: {:.2}", attempts_per_trial);

    if log {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!(
            "{},{:.4},{:.4},{:.4}\n",
            date, trials_per_sec, attempts_per_sec, attempts_per_trial
        );
        if let Err(err) = append_log_line(&line) {
            eprintln!("failed to append {LOG_PATH}: {err}");
            return ExitCode::FAILURE;
        }
        println!("Appended to {}", LOG_PATH);
    }
    ExitCode::SUCCESS
}

fn append_log_line(line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(LOG_PATH)?;
    if file.metadata().map(|m| m.len() == 0).unwrap_or(true) {
        file.write_all(b"date,trials_per_sec,attempts_per_sec,attempts_per_trial\n")?;
    }
    file.write_all(line.as_bytes())?;
    file.flush()
}
