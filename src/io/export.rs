//! Write scored rows to CSV.
//!
//! The whole dataset is already in memory by the time we get here, so output
//! size is bounded by what a single process can hold.

use std::fs::File;
use std::path::Path;

use crate::domain::{Field, FieldType, PREDICTION_COLUMN, Schema, ScoredData, Value};
use crate::error::{AppError, EXIT_INPUT, EXIT_OUTPUT};
use crate::io::ingest::read_dataset_from_reader;

/// Write input columns plus `prediction`: comma-separated, header row, no index column.
pub fn write_scored_csv(path: &Path, scored: &ScoredData) -> Result<(), AppError> {
    log::info!("Writing predictions to '{}'", path.display());

    if scored.len() != scored.dataset.len() {
        return Err(AppError::new(
            EXIT_OUTPUT,
            format!(
                "Refusing to write {} predictions for {} rows.",
                scored.len(),
                scored.dataset.len()
            ),
        ));
    }

    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_OUTPUT,
            format!("Failed to create output CSV '{}': {e}", path.display()),
        )
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(scored.header())
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write output CSV header: {e}")))?;

    for (row, prediction) in scored.dataset.rows.iter().zip(&scored.predictions) {
        let record = row
            .iter()
            .map(Value::to_string)
            .chain(std::iter::once(Value::Double(*prediction).to_string()));
        writer
            .write_record(record)
            .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write output CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to flush output CSV: {e}")))?;

    log::debug!("Wrote {} scored rows", scored.len());
    Ok(())
}

/// Read a file produced by [`write_scored_csv`] back into memory.
///
/// `schema` describes the input columns; the trailing `prediction` column is
/// expected after them.
pub fn read_scored_csv(path: &Path, schema: &Schema) -> Result<ScoredData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open scored CSV '{}': {e}", path.display()),
        )
    })?;

    let mut extended = schema.clone();
    extended.fields.push(Field {
        name: PREDICTION_COLUMN.to_string(),
        kind: FieldType::Double,
    });

    let mut dataset = read_dataset_from_reader(file, &extended)?;
    let predictions = dataset
        .rows
        .iter_mut()
        .map(|row| row.pop().map(Value::as_f64).unwrap_or(f64::NAN))
        .collect();
    dataset.schema = schema.clone();

    Ok(ScoredData {
        dataset,
        predictions,
    })
}
