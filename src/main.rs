use clap::Parser;
use std::env;
use std::process::ExitCode;
use tidydir::cli::{Cli, run_cli};
use tidydir::output::OutputFormatter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    let base_path = match env::current_dir() {
        Ok(path) => path,
        Err(e) => {
            OutputFormatter::error(&format!("Cannot determine the current directory: {}", e));
            return ExitCode::FAILURE;
        }
    };

    // Never sort the tool itself when it lives in the directory being tidied.
    let executable = env::current_exe().ok();

    match run_cli(&base_path, executable.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
