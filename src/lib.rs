//! `housing-score` library crate.
//!
//! The binary (`score`) is a thin wrapper around this library so that:
//!
//! - every pipeline stage is testable without spawning processes
//! - stages can be driven individually (e.g. scoring an in-memory dataset)

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod metrics;
pub mod models;
pub mod report;
pub mod session;
