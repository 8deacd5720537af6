//! Reporting utilities: the terminal process log printed after a run.

pub mod format;

pub use format::*;
