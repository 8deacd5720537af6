//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initialises logging
//! - parses CLI arguments into a `ScoreConfig`
//! - runs the scoring pipeline inside a session
//! - prints the process log

use clap::Parser;
use env_logger::Env;

use crate::cli::Cli;
use crate::domain::ScoreConfig;
use crate::error::AppError;
use crate::session::SessionSettings;

pub mod pipeline;

/// Entry point for the `score` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = score_config_from_args(&cli)?;
    let run = pipeline::run_scoring(&config)?;

    println!(
        "{}",
        crate::report::format_process_log(&run.metrics, &config.output)
    );
    Ok(())
}

/// Logs go to stderr at `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}

pub fn score_config_from_args(args: &Cli) -> Result<ScoreConfig, AppError> {
    Ok(ScoreConfig {
        input: args.input.clone(),
        output: args.output.clone(),
        model: args.model.clone(),
        session: SessionSettings::from_env(args.app_name.clone(), args.threads)?,
    })
}
