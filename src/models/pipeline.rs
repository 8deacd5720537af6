//! Pipeline model: an ordered list of fitted stages ending in a regressor.
//!
//! Stages are plain data (serde-tagged enum) and evaluation is a `match`, so the
//! bundle format and the prediction code stay in one place. Evaluation works
//! on a block of rows at a time (`rows × num_features` matrix).

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One fitted stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
    /// `(x - mean) / std` per feature. A missing `mean` means no centering, a
    /// missing `std` means no scaling; a zero `std` entry maps that feature to 0.
    StandardScaler {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mean: Option<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        std: Option<Vec<f64>>,
    },
    /// `intercept + Σ coefficients[j] * x[j]`.
    LinearRegression { coefficients: Vec<f64>, intercept: f64 },
    /// Predicts `value` for every row (e.g. the mean training label).
    ConstantRegressor { value: f64 },
}

impl Stage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::StandardScaler { .. } => "standard_scaler",
            Stage::LinearRegression { .. } => "linear_regression",
            Stage::ConstantRegressor { .. } => "constant_regressor",
        }
    }

    pub fn is_regressor(&self) -> bool {
        matches!(
            self,
            Stage::LinearRegression { .. } | Stage::ConstantRegressor { .. }
        )
    }
}

/// Errors raised while loading, validating, or applying a model bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read or write model bundle '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse model bundle JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported bundle format '{found}' (expected '{expected}').")]
    UnsupportedFormat { found: String, expected: &'static str },
    #[error("Unsupported bundle version {found} (expected {expected}).")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Bundle declares zero input features.")]
    NoFeatures,
    #[error("Bundle has no stages.")]
    NoStages,
    #[error("Bundle pipeline must end with a regressor stage.")]
    MissingRegressor,
    #[error("Regressor stage `{stage}` at position {index} is not the last stage.")]
    RegressorNotLast { stage: &'static str, index: usize },
    #[error("Stage `{stage}` parameter `{param}` has length {found}, expected {expected}.")]
    LengthMismatch {
        stage: &'static str,
        param: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("Stage `{stage}` parameter `{param}` contains an invalid value.")]
    InvalidParameter {
        stage: &'static str,
        param: &'static str,
    },
    #[error("Input has {found} feature columns, but the model was fit on {expected}.")]
    FeatureCountMismatch { found: usize, expected: usize },
}

/// A validated, ready-to-apply pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineModel {
    pub num_features: usize,
    pub stages: Vec<Stage>,
}

impl PipelineModel {
    /// Check stage ordering and parameter shapes against `num_features`.
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.num_features == 0 {
            return Err(BundleError::NoFeatures);
        }
        let Some((last, transformers)) = self.stages.split_last() else {
            return Err(BundleError::NoStages);
        };
        if !last.is_regressor() {
            return Err(BundleError::MissingRegressor);
        }
        if let Some((index, stage)) = transformers.iter().enumerate().find(|(_, s)| s.is_regressor()) {
            return Err(BundleError::RegressorNotLast {
                stage: stage.display_name(),
                index,
            });
        }

        for stage in &self.stages {
            let name = stage.display_name();
            match stage {
                Stage::StandardScaler { mean, std } => {
                    if let Some(mean) = mean {
                        check_vector(name, "mean", mean, self.num_features)?;
                    }
                    if let Some(std) = std {
                        check_vector(name, "std", std, self.num_features)?;
                        if std.iter().any(|s| *s < 0.0) {
                            return Err(BundleError::InvalidParameter { stage: name, param: "std" });
                        }
                    }
                }
                Stage::LinearRegression {
                    coefficients,
                    intercept,
                } => {
                    check_vector(name, "coefficients", coefficients, self.num_features)?;
                    if !intercept.is_finite() {
                        return Err(BundleError::InvalidParameter {
                            stage: name,
                            param: "intercept",
                        });
                    }
                }
                Stage::ConstantRegressor { value } => {
                    if !value.is_finite() {
                        return Err(BundleError::InvalidParameter { stage: name, param: "value" });
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply every stage to a block of feature rows, returning one prediction per row.
    pub fn transform(&self, features: DMatrix<f64>) -> Result<DVector<f64>, BundleError> {
        if features.ncols() != self.num_features {
            return Err(BundleError::FeatureCountMismatch {
                found: features.ncols(),
                expected: self.num_features,
            });
        }
        let Some((last, transformers)) = self.stages.split_last() else {
            return Err(BundleError::NoStages);
        };

        let mut x = features;
        for stage in transformers {
            if let Stage::StandardScaler { mean, std } = stage {
                scale_columns(&mut x, mean.as_deref(), std.as_deref());
            }
        }

        match last {
            Stage::LinearRegression {
                coefficients,
                intercept,
            } => {
                let beta = DVector::from_column_slice(coefficients);
                Ok((&x * beta).add_scalar(*intercept))
            }
            Stage::ConstantRegressor { value } => Ok(DVector::from_element(x.nrows(), *value)),
            Stage::StandardScaler { .. } => Err(BundleError::MissingRegressor),
        }
    }
}

fn check_vector(
    stage: &'static str,
    param: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), BundleError> {
    if values.len() != expected {
        return Err(BundleError::LengthMismatch {
            stage,
            param,
            found: values.len(),
            expected,
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(BundleError::InvalidParameter { stage, param });
    }
    Ok(())
}

fn scale_columns(x: &mut DMatrix<f64>, mean: Option<&[f64]>, std: Option<&[f64]>) {
    for (j, mut column) in x.column_iter_mut().enumerate() {
        let m = mean.map_or(0.0, |m| m[j]);
        let s = std.map_or(1.0, |s| s[j]);
        if s == 0.0 {
            column.fill(0.0);
        } else {
            column.apply(|v| *v = (*v - m) / s);
        }
    }
}
