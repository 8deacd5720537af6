//! Command-line parsing for the batch scorer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline stages. Every path is a required flag; nothing is hardcoded.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "score",
    version,
    about = "Batch-score a housing CSV with a serialized regression pipeline"
)]
pub struct Cli {
    /// Input CSV to score (14 positional columns, header row required).
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Destination CSV for scored rows (input columns plus `prediction`).
    #[arg(long, value_name = "CSV")]
    pub output: PathBuf,

    /// Model bundle JSON to score with.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Worker threads for the scoring session (default: env `SCORE_THREADS`, else one per CPU).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Session name shown in logs and worker thread names (default: env `SCORE_APP_NAME`).
    #[arg(long)]
    pub app_name: Option<String>,
}
