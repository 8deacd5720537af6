//! Model scoring.
//!
//! The pipeline itself lives in `pipeline`; this module applies it to an
//! assembled feature frame on the session's worker pool.

pub mod pipeline;

pub use pipeline::*;

use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{FeatureFrame, ScoredData};
use crate::error::{AppError, EXIT_MODEL};
use crate::session::ScoringSession;

/// Apply `model` to every row of `frame`, appending one prediction per row.
///
/// Rows are split into one contiguous block per worker; block order is kept so
/// predictions line up with input rows.
pub fn score(
    session: &ScoringSession,
    frame: FeatureFrame,
    model: &PipelineModel,
) -> Result<ScoredData, AppError> {
    log::info!("Scoring process starts...");

    if frame.num_features() != model.num_features {
        return Err(BundleError::FeatureCountMismatch {
            found: frame.num_features(),
            expected: model.num_features,
        }
        .into());
    }

    let n = frame.features.nrows();
    let block = n.div_ceil(session.threads().max(1)).max(1);
    let features = &frame.features;

    let blocks: Vec<DVector<f64>> = session.install(|| {
        (0..n)
            .step_by(block)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|start| {
                let end = (start + block).min(n);
                model.transform(features.view_range(start..end, ..).into_owned())
            })
            .collect::<Result<Vec<_>, BundleError>>()
    })?;

    let predictions: Vec<f64> = blocks.iter().flat_map(|b| b.iter().copied()).collect();
    if let Some(row) = predictions.iter().position(|p| !p.is_finite()) {
        return Err(AppError::new(
            EXIT_MODEL,
            format!("Non-finite model prediction for data row {}.", row + 1),
        ));
    }

    log::info!("Scored {} rows.", predictions.len());
    Ok(ScoredData {
        dataset: frame.dataset,
        predictions,
    })
}
