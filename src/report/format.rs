//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring/evaluation code stays free of presentation details
//! - output changes are localized and testable without spawning processes

use std::path::Path;

use crate::domain::RegressionMetrics;

const RULE: &str = "--------------------";

/// Format the end-of-run process log (metrics + where predictions went).
pub fn format_process_log(metrics: &RegressionMetrics, output: &Path) -> String {
    let (rmse, mse, r2, mae) = metrics.as_tuple();

    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str("Process Log\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str("Scoring Job ends successfully!\n");
    out.push_str(&format!("RMSE for the model: {rmse}\n"));
    out.push_str(&format!("MSE for the model: {mse}\n"));
    out.push_str(&format!("R2 for the model: {r2}\n"));
    out.push_str(&format!("MAE for the model: {mae}\n"));
    out.push_str(&format!("Predictions written to {}", output.display()));

    out
}
