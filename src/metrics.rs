//! Regression evaluation: RMSE, MSE, R², MAE.
//!
//! Each metric is an independent pass over `(label, prediction)` pairs using
//! the population (divide-by-n) definitions.

use crate::domain::{LABEL_COLUMN, RegressionMetrics, ScoredData};
use crate::error::{AppError, EXIT_EVALUATION};

/// Evaluate predictions against the `medv` label column.
pub fn evaluate(scored: &ScoredData) -> Result<RegressionMetrics, AppError> {
    evaluate_against(scored, LABEL_COLUMN)
}

/// Evaluate predictions against an arbitrary label column.
pub fn evaluate_against(scored: &ScoredData, label: &str) -> Result<RegressionMetrics, AppError> {
    let idx = scored.dataset.schema.index_of(label).ok_or_else(|| {
        AppError::new(
            EXIT_EVALUATION,
            format!("Cannot evaluate: label column `{label}` is missing."),
        )
    })?;
    if scored.is_empty() {
        return Err(AppError::new(
            EXIT_EVALUATION,
            "Cannot evaluate: no scored rows.",
        ));
    }
    if scored.len() != scored.dataset.len() {
        return Err(AppError::new(
            EXIT_EVALUATION,
            format!(
                "Cannot evaluate: {} predictions for {} rows.",
                scored.len(),
                scored.dataset.len()
            ),
        ));
    }

    let labels = scored.dataset.column_f64(idx);
    let predictions = &scored.predictions;

    let metrics = RegressionMetrics {
        rmse: rmse(&labels, predictions),
        mse: mse(&labels, predictions),
        r2: r2(&labels, predictions),
        mae: mae(&labels, predictions),
    };
    log::debug!("Evaluation over {} rows: {metrics:?}", labels.len());
    Ok(metrics)
}

pub fn mse(labels: &[f64], predictions: &[f64]) -> f64 {
    let sum: f64 = labels
        .iter()
        .zip(predictions)
        .map(|(y, p)| (y - p) * (y - p))
        .sum();
    sum / labels.len() as f64
}

pub fn rmse(labels: &[f64], predictions: &[f64]) -> f64 {
    mse(labels, predictions).sqrt()
}

pub fn mae(labels: &[f64], predictions: &[f64]) -> f64 {
    let sum: f64 = labels.iter().zip(predictions).map(|(y, p)| (y - p).abs()).sum();
    sum / labels.len() as f64
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// With constant labels `SS_tot` is zero: a perfect fit scores 1, anything
/// else is undefined (NaN).
pub fn r2(labels: &[f64], predictions: &[f64]) -> f64 {
    let n = labels.len() as f64;
    let mean = labels.iter().sum::<f64>() / n;
    let ss_tot: f64 = labels.iter().map(|y| (y - mean) * (y - mean)).sum();
    let ss_res: f64 = labels
        .iter()
        .zip(predictions)
        .map(|(y, p)| (y - p) * (y - p))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { f64::NAN };
    }
    1.0 - ss_res / ss_tot
}
