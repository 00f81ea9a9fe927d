use std::env;
use std::process::ExitCode;

use starforce::cli::run_with_args;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let code = run_with_args(&args);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
