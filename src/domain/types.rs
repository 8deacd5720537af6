//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built by the CSV reader and passed stage to stage
//! - written back out to CSV after scoring
//! - constructed directly in tests without touching the filesystem

use std::fmt;
use std::path::PathBuf;

use nalgebra::DMatrix;

use crate::session::SessionSettings;

/// Name of the label column the evaluator compares predictions against.
pub const LABEL_COLUMN: &str = "medv";

/// Name of the column appended by the scorer.
pub const PREDICTION_COLUMN: &str = "prediction";

/// Positional housing schema: `(name, type)` in file order.
///
/// The last field is the label; everything before it is a feature.
pub const HOUSING_FIELDS: [(&str, FieldType); 14] = [
    ("crim", FieldType::Double),
    ("zn", FieldType::Double),
    ("indus", FieldType::Double),
    ("chas", FieldType::Integer),
    ("nox", FieldType::Double),
    ("rm", FieldType::Double),
    ("age", FieldType::Double),
    ("dis", FieldType::Double),
    ("rad", FieldType::Integer),
    ("tax", FieldType::Integer),
    ("ptratio", FieldType::Double),
    ("b", FieldType::Double),
    ("lstat", FieldType::Double),
    ("medv", FieldType::Double),
];

/// Storage type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Double,
    Integer,
}

impl FieldType {
    /// Human-readable label for error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Integer => "integer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
}

/// Ordered, positional schema. Column names in the input file are never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, kind)| Field {
                    name: name.into(),
                    kind,
                })
                .collect(),
        }
    }

    /// The fixed 14-column housing schema.
    pub fn housing() -> Self {
        Self::new(HOUSING_FIELDS)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Double(f64),
    Integer(i64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Double(v) => v,
            Value::Integer(v) => v as f64,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // `{}` on f64 is the shortest representation that parses back to the same bits.
            Value::Double(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
        }
    }
}

/// Rows read against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub schema: Schema,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, widened to `f64`.
    pub fn column_f64(&self, idx: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[idx].as_f64()).collect()
    }
}

/// A dataset plus its assembled feature matrix (`rows × features`).
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    pub dataset: Dataset,
    pub feature_names: Vec<String>,
    pub features: DMatrix<f64>,
}

impl FeatureFrame {
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Input rows with one prediction per row.
#[derive(Debug, Clone)]
pub struct ScoredData {
    pub dataset: Dataset,
    pub predictions: Vec<f64>,
}

impl ScoredData {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Output header: schema names followed by `prediction`.
    pub fn header(&self) -> Vec<String> {
        self.dataset
            .schema
            .names()
            .map(str::to_string)
            .chain(std::iter::once(PREDICTION_COLUMN.to_string()))
            .collect()
    }
}

/// The four regression metrics reported for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mse: f64,
    pub r2: f64,
    pub mae: f64,
}

impl RegressionMetrics {
    /// `(rmse, mse, r2, mae)` in reporting order.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.rmse, self.mse, self.r2, self.mae)
    }
}

/// Resolved configuration for a scoring run. Every path is explicit.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model: PathBuf,
    pub session: SessionSettings,
}
