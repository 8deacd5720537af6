//! Feature assembly.
//!
//! Convention: every column except the last is a feature, in schema order.
//! The last column is the label. There is no name-based alignment with the
//! model; the bundle must have been fit on the same column order.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{Dataset, FeatureFrame};
use crate::error::{AppError, EXIT_INPUT};
use crate::session::ScoringSession;

/// Build the `rows × (width - 1)` feature matrix for `dataset`.
pub fn assemble_features(session: &ScoringSession, dataset: Dataset) -> Result<FeatureFrame, AppError> {
    log::info!("Data preprocessing...");

    let width = dataset.schema.len();
    if width < 2 {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Feature assembly needs at least 2 columns (features + label), got {width}."),
        ));
    }
    if let Some(row) = dataset.rows.iter().position(|r| r.len() != width) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Data row {} does not match the {width}-column schema.", row + 1),
        ));
    }

    let n_features = width - 1;
    let feature_names: Vec<String> = dataset
        .schema
        .names()
        .take(n_features)
        .map(str::to_string)
        .collect();

    let values: Vec<f64> = session.install(|| {
        dataset
            .rows
            .par_iter()
            .flat_map_iter(|row| row[..n_features].iter().map(|v| v.as_f64()))
            .collect()
    });
    let features = DMatrix::from_row_slice(dataset.len(), n_features, &values);

    log::info!(
        "Data have been processed successfully ({} features: {}).",
        n_features,
        feature_names.join(", ")
    );

    Ok(FeatureFrame {
        dataset,
        feature_names,
        features,
    })
}
