//! Run one Monte Carlo batch sequentially and once in parallel, then print timings and speedup.
//!
//! Usage: cargo run --release --bin benchmark_parallel_speedup

use std::process::ExitCode;
use std::time::Instant;

use starforce::enhance::{build_table, TableOptions};
use starforce::simulation::{run_monte_carlo, run_monte_carlo_parallel, Journey};

fn main() -> ExitCode {
    let seed = 12345u64;
    let trials = 200_000;
    let journey = Journey {
        start_level: 15,
        target_level: 22,
        penalty: 5000.0,
        protect_below_18: false,
    };

    let table = match build_table(&TableOptions::default()) {
        Ok(table) => table,
        Err(err) => {
            eprintln!("failed to build table: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Monte Carlo: {} trials ({} -> {}, seed={})",
        trials, journey.start_level, journey.target_level, seed
    );
    println!();

    let t0 = Instant::now();
    let results_seq = match run_monte_carlo(&journey, &table, trials, seed) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("sequential run failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let elapsed_seq = t0.elapsed();
    let seq_ms = elapsed_seq.as_secs_f64() * 1000.0;
    println!("Sequential:  {:.2} ms  ({:.1} trials/s)", seq_ms, trials as f64 / elapsed_seq.as_secs_f64());

    let t0 = Instant::now();
    let results_par = match run_monte_carlo_parallel(&journey, &table, trials, seed) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("parallel run failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let elapsed_par = t0.elapsed();
    let par_ms = elapsed_par.as_secs_f64() * 1000.0;
    println!("Parallel:    {:.2} ms  ({:.1} trials/s)", par_ms, trials as f64 / elapsed_par.as_secs_f64());

    println!();
    println!("Speedup:     {:.2}x faster (parallel vs sequential)", seq_ms / par_ms);

    if results_seq != results_par {
        eprintln!("sequential and parallel batches differ");
        return ExitCode::FAILURE;
    }
    println!("(Results match sequential vs parallel)");
    ExitCode::SUCCESS
}
