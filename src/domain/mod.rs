//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the positional schema and typed values (`Schema`, `Value`, `Dataset`)
//! - stage outputs (`FeatureFrame`, `ScoredData`, `RegressionMetrics`)
//! - run configuration (`ScoreConfig`)

pub mod types;

pub use types::*;
