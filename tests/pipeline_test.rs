use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use housing_score::app::pipeline::run_scoring;
use housing_score::domain::{Schema, ScoreConfig};
use housing_score::error::{EXIT_INPUT, EXIT_MODEL};
use housing_score::io::{ModelBundle, read_dataset, read_scored_csv};
use housing_score::models::{PipelineModel, Stage};
use housing_score::session::SessionSettings;
use tempfile::TempDir;

const HEADER: &str = "crim,zn,indus,chas,nox,rm,age,dis,rad,tax,ptratio,b,lstat,medv";

const ROWS: [&str; 5] = [
    "0.00632,18,2.31,0,0.538,6.575,65.2,4.09,1,296,15.3,396.9,4.98,24",
    "0.02731,0,7.07,0,0.469,6.421,78.9,4.9671,2,242,17.8,396.9,9.14,21.6",
    "0.02729,0,7.07,0,0.469,7.185,61.1,4.9671,2,242,17.8,392.83,4.03,34.7",
    "0.03237,0,2.18,0,0.458,6.998,45.8,6.0622,3,222,18.7,394.63,2.94,33.4",
    "0.06905,0,2.18,0,0.458,7.147,54.2,6.0622,3,222,18.7,396.9,5.33,36.2",
];

const MEDV: [f64; 5] = [24.0, 21.6, 34.7, 33.4, 36.2];

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_csv(&self, name: &str, rows: &[&str]) -> PathBuf {
        let path = self.path(name);
        let mut text = format!("{HEADER}\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    fn write_bundle(&self, name: &str, model: PipelineModel) -> PathBuf {
        let path = self.path(name);
        ModelBundle::new(Some("test".to_string()), model)
            .save(&path)
            .unwrap();
        path
    }

    fn config(&self, input: &Path, model: &Path) -> ScoreConfig {
        ScoreConfig {
            input: input.to_path_buf(),
            output: self.path("scored.csv"),
            model: model.to_path_buf(),
            session: SessionSettings {
                app_name: "pipeline-test".to_string(),
                threads: Some(2),
            },
        }
    }
}

fn constant_model(value: f64) -> PipelineModel {
    PipelineModel {
        num_features: 13,
        stages: vec![Stage::ConstantRegressor { value }],
    }
}

#[test]
fn reader_counts_data_rows() {
    let fx = Fixture::new();
    let input = fx.write_csv("input.csv", &ROWS);
    let dataset = read_dataset(&input, &Schema::housing()).unwrap();
    assert_eq!(dataset.len(), ROWS.len());
}

#[test]
fn constant_bundle_end_to_end() {
    let fx = Fixture::new();
    let input = fx.write_csv("input.csv", &ROWS);
    let mean = 22.53;
    let model = fx.write_bundle("model.json", constant_model(mean));
    let config = fx.config(&input, &model);

    let run = run_scoring(&config).unwrap();
    assert_eq!(run.scored.len(), 5);
    assert!(run.scored.predictions.iter().all(|p| *p == mean));
    assert_eq!(run.feature_names.len(), 13);
    assert_eq!(run.feature_names.last().map(String::as_str), Some("lstat"));

    let expected_mae = MEDV.iter().map(|y| (y - mean).abs()).sum::<f64>() / 5.0;
    assert_relative_eq!(run.metrics.mae, expected_mae, max_relative = 1e-12);
    assert_relative_eq!(
        run.metrics.rmse * run.metrics.rmse,
        run.metrics.mse,
        max_relative = 1e-12
    );

    let written = read_scored_csv(&config.output, &Schema::housing()).unwrap();
    assert_eq!(written.len(), 5);
    assert!(written.predictions.iter().all(|p| *p == mean));
}

#[test]
fn linear_bundle_matches_hand_computed_prediction() {
    let fx = Fixture::new();
    let input = fx.write_csv("input.csv", &ROWS[..1]);

    let coefficients: Vec<f64> = (1..=13).map(|i| 0.1 * i as f64 - 0.7).collect();
    let mean: Vec<f64> = (0..13).map(|i| i as f64).collect();
    let std: Vec<f64> = (0..13).map(|i| 1.0 + 0.5 * i as f64).collect();
    let intercept = 36.46;
    let model = fx.write_bundle(
        "model.json",
        PipelineModel {
            num_features: 13,
            stages: vec![
                Stage::StandardScaler {
                    mean: Some(mean.clone()),
                    std: Some(std.clone()),
                },
                Stage::LinearRegression {
                    coefficients: coefficients.clone(),
                    intercept,
                },
            ],
        },
    );

    let row = [
        0.00632, 18.0, 2.31, 0.0, 0.538, 6.575, 65.2, 4.09, 1.0, 296.0, 15.3, 396.9, 4.98,
    ];
    let mut expected = intercept;
    for j in 0..13 {
        expected += coefficients[j] * (row[j] - mean[j]) / std[j];
    }

    let run = run_scoring(&fx.config(&input, &model)).unwrap();
    assert_eq!(run.scored.len(), 1);
    assert_relative_eq!(run.scored.predictions[0], expected, max_relative = 1e-6);
}

#[test]
fn scored_csv_round_trip_preserves_predictions() {
    let fx = Fixture::new();
    let input = fx.write_csv("input.csv", &ROWS);
    let model = fx.write_bundle(
        "model.json",
        PipelineModel {
            num_features: 13,
            stages: vec![Stage::LinearRegression {
                coefficients: vec![
                    -0.108, 0.046, 0.021, 2.687, -17.767, 3.810, 0.001, -1.476, 0.306, -0.012,
                    -0.953, 0.009, -0.525,
                ],
                intercept: 36.459,
            }],
        },
    );
    let config = fx.config(&input, &model);
    let run = run_scoring(&config).unwrap();

    let text = std::fs::read_to_string(&config.output).unwrap();
    assert!(text.starts_with(&format!("{HEADER},prediction\n")));

    let back = read_scored_csv(&config.output, &Schema::housing()).unwrap();
    assert_eq!(back.len(), run.scored.len());
    assert_eq!(back.predictions, run.scored.predictions);
    assert_eq!(back.dataset, run.scored.dataset);
}

#[test]
fn wrong_column_count_fails_with_schema_mismatch() {
    let fx = Fixture::new();
    let input = fx.write_csv(
        "input.csv",
        &[ROWS[0], "0.02731,0,7.07,0,0.469,6.421,78.9,4.9671,2,242,17.8,396.9,9.14"],
    );
    let model = fx.write_bundle("model.json", constant_model(1.0));
    let config = fx.config(&input, &model);

    let err = run_scoring(&config).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INPUT);
    assert!(err.message().contains("Schema mismatch"), "{err}");
    assert!(!config.output.exists());
}

#[test]
fn non_numeric_value_fails_with_schema_mismatch() {
    let fx = Fixture::new();
    let input = fx.write_csv(
        "input.csv",
        &["0.00632,18,2.31,0,0.538,six,65.2,4.09,1,296,15.3,396.9,4.98,24"],
    );
    let model = fx.write_bundle("model.json", constant_model(1.0));

    let err = run_scoring(&fx.config(&input, &model)).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INPUT);
    assert!(err.message().contains("Schema mismatch at line 2"), "{err}");
    assert!(err.message().contains("`rm`"), "{err}");
}

#[test]
fn bundle_fit_on_other_width_is_rejected() {
    let fx = Fixture::new();
    let input = fx.write_csv("input.csv", &ROWS);
    let model = fx.write_bundle(
        "model.json",
        PipelineModel {
            num_features: 12,
            stages: vec![Stage::ConstantRegressor { value: 1.0 }],
        },
    );

    let err = run_scoring(&fx.config(&input, &model)).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_MODEL);
    assert!(err.message().contains("fit on 12"), "{err}");
}
