use std::env;
use std::fmt;
use std::fs::File;
use std::io;

use serde::Serialize;

use crate::enhance::build_table;
use crate::error::SimulationError;
use crate::parallel::pool::WORKERS_ENV_VAR;
use crate::parallel::WorkerPool;
use crate::report::{render_report_text, render_table_text, write_outcomes_csv, write_table_csv};
use crate::scenario::{load_scenario, ScenarioError, SimulationRequest};
use crate::simulation::{AttemptEvent, Rng, TraceCollector, TraceMode, TrialOutcome, TrialRunner};

const USAGE: &str = "usage: starforce <simulate|table|trace> [--config <path>] [--start <n>] [--target <n>] \
[--tier <n>] [--penalty <x>] [--trials <n>] [--seed <n>] [--workers <n>] [--[no-]discount-cost] \
[--[no-]boost-15-16] [--[no-]reduce-destroy] [--[no-]protect-below-18] [--format <json|text>] \
[--outcomes-csv <path>] [--progress] [--csv]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Table,
    Trace,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("table") => Some(Command::Table),
        Some("trace") => Some(Command::Trace),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CliOptions {
    pub request: SimulationRequest,
    pub workers: Option<usize>,
    pub format: OutputFormat,
    pub outcomes_csv: Option<String>,
    pub progress: bool,
    pub csv: bool,
}

#[derive(Debug)]
pub enum CliError {
    Usage(String),
    Scenario(ScenarioError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::Scenario(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_value<T: std::str::FromStr>(name: &str, raw: Option<&String>) -> Result<T, CliError> {
    let Some(raw) = raw else {
        return Err(CliError::Usage(format!("missing value for {name}")));
    };
    raw.parse::<T>()
        .map_err(|_| CliError::Usage(format!("invalid {name} '{raw}'")))
}

/// Parse everything after the command word. `--config` is applied first so that
/// individual flags override the file regardless of order.
pub fn parse_options(args: &[String]) -> Result<CliOptions, CliError> {
    let rest = args.get(2..).unwrap_or_default();
    let mut options = CliOptions::default();

    if let Some(pos) = rest.iter().position(|arg| arg == "--config") {
        let path: String = parse_value("--config", rest.get(pos + 1))?;
        options.request = load_scenario(&path).map_err(CliError::Scenario)?;
    }

    let mut i = 0;
    while i < rest.len() {
        let flag = rest[i].as_str();
        let value = rest.get(i + 1);
        let request = &mut options.request;
        let mut takes_value = true;
        match flag {
            "--config" => {}
            "--start" => request.start_level = parse_value(flag, value)?,
            "--target" => request.target_level = parse_value(flag, value)?,
            "--tier" => request.equipment_tier = parse_value(flag, value)?,
            "--penalty" => request.penalty = parse_value(flag, value)?,
            "--trials" => request.trial_count = parse_value(flag, value)?,
            "--seed" => request.seed = Some(parse_value(flag, value)?),
            "--workers" => options.workers = Some(parse_value(flag, value)?),
            "--outcomes-csv" => options.outcomes_csv = Some(parse_value(flag, value)?),
            "--format" => {
                options.format = match value.map(String::as_str) {
                    Some("json") => OutputFormat::Json,
                    Some("text") => OutputFormat::Text,
                    _ => return Err(CliError::Usage("--format expects json or text".to_string())),
                }
            }
            _ => {
                takes_value = false;
                apply_switch(&mut options, flag)?;
            }
        }
        i += if takes_value { 2 } else { 1 };
    }

    if options.workers.is_none() {
        if let Ok(raw) = env::var(WORKERS_ENV_VAR) {
            options.workers = Some(parse_value(WORKERS_ENV_VAR, Some(&raw))?);
        }
    }
    Ok(options)
}

fn apply_switch(options: &mut CliOptions, flag: &str) -> Result<(), CliError> {
    let (name, on) = match flag.strip_prefix("--no-") {
        Some(name) => (name, false),
        None => (flag.trim_start_matches("--"), true),
    };
    let request = &mut options.request;
    match name {
        "discount-cost" => request.discount_cost = on,
        "boost-15-16" => request.boost_15_16 = on,
        "reduce-destroy" => request.reduce_destroy = on,
        "protect-below-18" => request.protect_below_18 = on,
        "progress" if on => options.progress = true,
        "csv" if on => options.csv = true,
        _ => return Err(CliError::Usage(format!("unknown option '{flag}'"))),
    }
    Ok(())
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let options = match parse_options(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{USAGE}");
            return 2;
        }
    };
    let result = match command {
        Command::Simulate => handle_simulate(&options),
        Command::Table => handle_table(&options),
        Command::Trace => handle_trace(&options),
    };
    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{}", err.message);
            err.exit_code
        }
    }
}

struct Failure {
    message: String,
    exit_code: i32,
}

impl From<SimulationError> for Failure {
    fn from(err: SimulationError) -> Self {
        let exit_code = if err.is_configuration() { 2 } else { 1 };
        Self {
            message: err.to_string(),
            exit_code,
        }
    }
}

fn failure(context: &str, err: impl fmt::Display) -> Failure {
    Failure {
        message: format!("{context}: {err}"),
        exit_code: 1,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Failure> {
    let payload =
        serde_json::to_string_pretty(value).map_err(|err| failure("failed to serialize output", err))?;
    println!("{payload}");
    Ok(())
}

fn handle_simulate(options: &CliOptions) -> Result<(), Failure> {
    let pool = WorkerPool::with_workers(options.workers.unwrap_or(0));
    let show_progress = options.progress;
    let run = options.request.execute(&pool, |done, total| {
        if show_progress {
            eprintln!("progress: {done}/{total} trials");
        }
    })?;

    if let Some(path) = &options.outcomes_csv {
        let file = File::create(path).map_err(|err| failure("failed to create outcomes csv", err))?;
        write_outcomes_csv(&run.outcomes, file)
            .map_err(|err| failure("failed to write outcomes csv", err))?;
        eprintln!("wrote {} outcomes to {path}", run.outcomes.len());
    }

    match options.format {
        OutputFormat::Json => print_json(&run.report),
        OutputFormat::Text => {
            print!("{}", render_report_text(&run.report));
            Ok(())
        }
    }
}

fn handle_table(options: &CliOptions) -> Result<(), Failure> {
    let table = build_table(&options.request.table_options())?;
    if options.csv {
        return write_table_csv(table.entries(), io::stdout().lock())
            .map_err(|err| failure("failed to write table csv", err));
    }
    match options.format {
        OutputFormat::Json => print_json(&table.entries()),
        OutputFormat::Text => {
            print!("{}", render_table_text(table.entries()));
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct TraceReport {
    seed: u64,
    outcome: TrialOutcome,
    events: Vec<AttemptEvent>,
}

fn handle_trace(options: &CliOptions) -> Result<(), Failure> {
    let request = &options.request;
    request.validate().map_err(SimulationError::from)?;
    let seed = request.resolve_seed()?;
    let table = build_table(&request.table_options())?;
    let runner = TrialRunner::new(&table, request.journey())?;

    let mut trace = TraceCollector::from_mode(TraceMode::Events);
    let outcome = runner.run_traced(&mut Rng::new(seed), &mut trace);
    let events = trace.into_events();

    match options.format {
        OutputFormat::Json => print_json(&TraceReport {
            seed,
            outcome,
            events,
        }),
        OutputFormat::Text => {
            for event in &events {
                println!(
                    "#{}\t{} -> {}\t{:?}\troll={:.6}\tcost={:.0}",
                    event.attempt,
                    event.level,
                    event.level_after,
                    event.outcome,
                    event.roll,
                    event.total_cost
                );
            }
            println!(
                "total_cost={:.0}\tdestructions={}",
                outcome.total_cost, outcome.destruction_count
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_named_options_and_switches() {
        let options = parse_options(&args(&[
            "starforce",
            "simulate",
            "--start",
            "17",
            "--target",
            "25",
            "--tier",
            "200",
            "--penalty",
            "2500.5",
            "--trials",
            "40",
            "--seed",
            "3",
            "--workers",
            "2",
            "--boost-15-16",
            "--protect-below-18",
            "--format",
            "text",
        ]))
        .unwrap();
        let request = &options.request;
        assert_eq!((request.start_level, request.target_level), (17, 25));
        assert_eq!(request.equipment_tier, 200);
        assert_eq!(request.penalty, 2500.5);
        assert_eq!(request.trial_count, 40);
        assert_eq!(request.seed, Some(3));
        assert!(request.boost_15_16 && request.protect_below_18);
        assert!(!request.discount_cost && !request.reduce_destroy);
        assert_eq!(options.workers, Some(2));
        assert_eq!(options.format, OutputFormat::Text);
    }

    #[test]
    fn no_prefix_turns_a_switch_off() {
        let options =
            parse_options(&args(&["starforce", "table", "--reduce-destroy", "--no-reduce-destroy"]))
                .unwrap();
        assert!(!options.request.reduce_destroy);
    }

    #[test]
    fn invalid_values_are_usage_errors() {
        for bad in [
            vec!["starforce", "simulate", "--trials", "many"],
            vec!["starforce", "simulate", "--start"],
            vec!["starforce", "simulate", "--bogus"],
            vec!["starforce", "simulate", "--format", "xml"],
            vec!["starforce", "simulate", "--no-progress"],
        ] {
            assert!(
                matches!(parse_options(&args(&bad)), Err(CliError::Usage(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn unknown_command_is_none() {
        assert_eq!(parse_command(&args(&["starforce", "optimize"])), None);
        assert_eq!(parse_command(&args(&["starforce", "trace"])), Some(Command::Trace));
    }
}
