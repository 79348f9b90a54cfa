//! Code for reading ambient-temperature traces from CSV files.
//!
//! Temperature sources are plain two-column tables: time in hours, then
//! temperature in Celsius. There is no header row and rows starting with `#`
//! are comments.
use crate::error::{ScenarioError, ScenarioResult};
use crate::temperature::{TemperatureSample, TemperatureSeries};
use crate::units::{Celsius, Hours};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

/// Parse the cell at `position` from a record as a float.
fn parse_cell(record: &StringRecord, row: usize, position: usize) -> ScenarioResult<f64> {
    let cell = record.get(position).ok_or_else(|| {
        ScenarioError::DataFormat(format!("row {row}: expected two columns"))
    })?;

    cell.parse().map_err(|_| {
        ScenarioError::DataFormat(format!("row {row}: non-numeric value {cell:?}"))
    })
}

/// Read a (time, temperature) trace from the CSV file at `file_path`.
///
/// The returned series is sorted by time; fewer than two rows, non-numeric
/// cells and duplicate timestamps are data-format errors.
pub fn read_temperature_series(file_path: &Path) -> ScenarioResult<TemperatureSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_path(file_path)?;

    let mut samples = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        samples.push(TemperatureSample {
            time: Hours(parse_cell(&record, row, 0)?),
            temperature: Celsius(parse_cell(&record, row, 1)?),
        });
    }

    TemperatureSeries::new(samples)
}
