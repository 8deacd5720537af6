//! CSV ingest against a fixed, positional schema.
//!
//! Design goals:
//! - **Strict schema**: every row has exactly the schema's width and every
//!   cell parses as the declared type (clear errors + exit code 2)
//! - **Fail fast**: the first bad row stops the run; no partial dataset
//! - **Positional**: the header row is required but its names are ignored.
//!   Its width must still equal the schema's: a header of a different width
//!   means the file was exported with another column layout, and is rejected
//!   before any data row is read
//! - **Separation of concerns**: no feature or scoring logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Dataset, Field, FieldType, Schema, Value};
use crate::error::{AppError, EXIT_INPUT};

/// Load a CSV file and validate every row against `schema`.
pub fn read_dataset(path: &Path, schema: &Schema) -> Result<Dataset, AppError> {
    log::info!("Trying to read the data from '{}'...", path.display());

    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open CSV '{}': {e}", path.display()),
        )
    })?;

    let dataset = read_dataset_from_reader(file, schema)?;
    log::info!(
        "Data to score have been read successfully ({} rows).",
        dataset.len()
    );
    Ok(dataset)
}

/// Same as [`read_dataset`] over any reader (used for in-memory input).
pub fn read_dataset_from_reader<R: Read>(input: R, schema: &Schema) -> Result<Dataset, AppError> {
    if schema.is_empty() {
        return Err(AppError::new(EXIT_INPUT, "Cannot read CSV against an empty schema."));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV headers: {e}")))?
        .clone();

    if headers.len() != schema.len() {
        return Err(AppError::schema_mismatch(
            1,
            format!(
                "header has {} columns, expected {}",
                headers.len(),
                schema.len()
            ),
        ));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; lines are 1-based.
        let fallback_line = idx + 2;

        let record = result.map_err(|e| {
            let line = e
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(fallback_line);
            AppError::schema_mismatch(line, format!("CSV parse error: {e}"))
        })?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        rows.push(parse_record(&record, schema).map_err(|e| AppError::schema_mismatch(line, e))?);
    }

    Ok(Dataset {
        schema: schema.clone(),
        rows,
    })
}

fn parse_record(record: &StringRecord, schema: &Schema) -> Result<Vec<Value>, String> {
    if record.len() != schema.len() {
        return Err(format!(
            "row has {} columns, expected {}",
            record.len(),
            schema.len()
        ));
    }

    record
        .iter()
        .zip(&schema.fields)
        .enumerate()
        .map(|(col, (raw, field))| parse_value(raw, field).map_err(|e| format!("column {} {e}", col + 1)))
        .collect()
}

fn parse_value(raw: &str, field: &Field) -> Result<Value, String> {
    if raw.is_empty() {
        return Err(format!("(`{}`) is empty", field.name));
    }

    let invalid = || {
        format!(
            "(`{}`) expected {}, got '{raw}'",
            field.name,
            field.kind.display_name()
        )
    };

    match field.kind {
        FieldType::Double => {
            let v = raw.parse::<f64>().map_err(|_| invalid())?;
            if !v.is_finite() {
                return Err(invalid());
            }
            Ok(Value::Double(v))
        }
        FieldType::Integer => raw.parse::<i64>().map(Value::Integer).map_err(|_| invalid()),
    }
}
