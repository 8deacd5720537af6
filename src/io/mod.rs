//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - scored CSV export (`export`)
//! - model bundle JSON read/write (`bundle`)

pub mod bundle;
pub mod export;
pub mod ingest;

pub use bundle::*;
pub use export::*;
pub use ingest::*;
