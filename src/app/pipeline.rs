//! The scoring pipeline.
//!
//! read CSV -> assemble features -> load bundle + score -> write CSV -> evaluate
//!
//! Each stage consumes the previous stage's output and any failure stops the
//! run; no stage ever sees a missing predecessor result.

use crate::domain::{RegressionMetrics, Schema, ScoreConfig, ScoredData};
use crate::error::AppError;
use crate::session::{ScoringSession, with_session};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct ScoringRun {
    pub feature_names: Vec<String>,
    pub scored: ScoredData,
    pub metrics: RegressionMetrics,
}

/// Create a session, run every stage inside it, and release it afterwards.
pub fn run_scoring(config: &ScoreConfig) -> Result<ScoringRun, AppError> {
    with_session(&config.session, |session| {
        run_scoring_with_session(session, config)
    })
}

/// Execute the pipeline with a caller-owned session.
pub fn run_scoring_with_session(
    session: &ScoringSession,
    config: &ScoreConfig,
) -> Result<ScoringRun, AppError> {
    log::info!(
        "Session '{}' scoring '{}' with '{}'",
        session.app_name(),
        config.input.display(),
        config.model.display()
    );

    // 1) Read and validate input rows.
    let dataset = crate::io::read_dataset(&config.input, &Schema::housing())?;

    // 2) Assemble the feature matrix (all columns but the label).
    let frame = crate::features::assemble_features(session, dataset)?;
    let feature_names = frame.feature_names.clone();

    // 3) Load the bundle and score.
    let model = crate::io::load_model(&config.model)?;
    let scored = crate::models::score(session, frame, &model)?;

    // 4) Persist predictions.
    crate::io::write_scored_csv(&config.output, &scored)?;

    // 5) Evaluate against the label.
    let metrics = crate::metrics::evaluate(&scored)?;

    Ok(ScoringRun {
        feature_names,
        scored,
        metrics,
    })
}
