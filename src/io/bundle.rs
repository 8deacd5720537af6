//! Read/write model bundle JSON files.
//!
//! A bundle is the portable representation of a fitted pipeline:
//! - a format tag + version so foreign files are rejected early
//! - an optional human-readable name
//! - the pipeline itself (`num_features` + ordered stages)
//!
//! The pipeline schema is defined by `models::PipelineModel`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, EXIT_MODEL};
use crate::models::{BundleError, PipelineModel};

pub const BUNDLE_FORMAT: &str = "housing-score-bundle";
pub const BUNDLE_VERSION: u32 = 1;

/// On-disk envelope around a [`PipelineModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format: String,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub model: PipelineModel,
}

impl ModelBundle {
    pub fn new(name: Option<String>, model: PipelineModel) -> Self {
        Self {
            format: BUNDLE_FORMAT.to_string(),
            version: BUNDLE_VERSION,
            name,
            model,
        }
    }

    /// Parse a bundle file and validate it. Nothing is returned for a bundle
    /// that would fail at scoring time.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let file = File::open(path).map_err(|source| BundleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bundle: ModelBundle = serde_json::from_reader(BufReader::new(file))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Write the bundle as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), BundleError> {
        let io_err = |source: std::io::Error| BundleError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BundleError> {
        if self.format != BUNDLE_FORMAT {
            return Err(BundleError::UnsupportedFormat {
                found: self.format.clone(),
                expected: BUNDLE_FORMAT,
            });
        }
        if self.version != BUNDLE_VERSION {
            return Err(BundleError::UnsupportedVersion {
                found: self.version,
                expected: BUNDLE_VERSION,
            });
        }
        self.model.validate()
    }
}

impl From<BundleError> for AppError {
    fn from(err: BundleError) -> Self {
        AppError::new(EXIT_MODEL, format!("Model bundle error: {err}"))
    }
}

/// Load the pipeline stored at `path`, ready for scoring.
pub fn load_model(path: &Path) -> Result<PipelineModel, AppError> {
    log::info!("Loading model bundle '{}'", path.display());
    let bundle = ModelBundle::load(path)?;
    log::info!(
        "Loaded model bundle{} with {} stage(s) over {} features",
        bundle
            .name
            .as_deref()
            .map(|n| format!(" '{n}'"))
            .unwrap_or_default(),
        bundle.model.stages.len(),
        bundle.model.num_features
    );
    Ok(bundle.model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    fn sample_bundle() -> ModelBundle {
        ModelBundle::new(
            Some("mean".to_string()),
            PipelineModel {
                num_features: 2,
                stages: vec![Stage::ConstantRegressor { value: 3.0 }],
            },
        )
    }

    #[test]
    fn save_then_load_preserves_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let bundle = sample_bundle();
        bundle.save(&path).unwrap();
        assert_eq!(ModelBundle::load(&path).unwrap(), bundle);
    }

    #[test]
    fn parses_flat_json_layout() {
        let json = r#"{
            "format": "housing-score-bundle",
            "version": 1,
            "num_features": 1,
            "stages": [
                {"type": "standard_scaler", "std": [2.0]},
                {"type": "linear_regression", "coefficients": [4.0], "intercept": 1.0}
            ]
        }"#;
        let bundle: ModelBundle = serde_json::from_str(json).unwrap();
        bundle.validate().unwrap();
        assert_eq!(bundle.name, None);
        assert_eq!(bundle.model.stages.len(), 2);
    }

    #[test]
    fn rejects_foreign_format_and_version() {
        let mut bundle = sample_bundle();
        bundle.format = "mleap".to_string();
        assert!(matches!(bundle.validate(), Err(BundleError::UnsupportedFormat { .. })));

        let mut bundle = sample_bundle();
        bundle.version = 7;
        assert!(matches!(bundle.validate(), Err(BundleError::UnsupportedVersion { found: 7, .. })));
    }

    #[test]
    fn malformed_json_maps_to_model_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{").unwrap();

        assert!(matches!(ModelBundle::load(&path), Err(BundleError::Json(_))));
        let err = load_model(&path).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_MODEL);
        assert!(err.message().contains("parse model bundle JSON"), "{err}");
    }

    #[test]
    fn invalid_parameters_are_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let json = r#"{
            "format": "housing-score-bundle",
            "version": 1,
            "num_features": 1,
            "stages": [
                {"type": "standard_scaler", "std": [-1.0]},
                {"type": "constant_regressor", "value": 2.0}
            ]
        }"#;
        std::fs::write(&path, json).unwrap();

        let err = load_model(&path).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_MODEL);
        assert!(err.message().contains("`std`"), "{err}");
    }

    #[test]
    fn missing_file_maps_to_model_exit_code() {
        let err = load_model(Path::new("/nonexistent/model.json")).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_MODEL);
        assert!(err.message().contains("/nonexistent/model.json"), "{err}");
    }
}
