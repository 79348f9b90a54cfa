//! The module responsible for extracting result tables and writing them to
//! disk.
//!
//! The two output schemas are fixed: downstream analysis relies on every
//! column being present, so a raw solution missing a metric fails extraction
//! instead of silently dropping the column.
use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::ScenarioKey;
use crate::solver::RawSolution;
use anyhow::{Context, Result, ensure};
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which run-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "cellage_results";

/// Column order of the cycle-summary table.
pub const SUMMARY_COLUMNS: [&str; 24] = [
    "Cycle number",
    "Throughput capacity [A.h]",
    "Measured capacity [A.h]",
    "Loss of lithium inventory [%]",
    "Loss of lithium inventory, including electrolyte [%]",
    "Loss of capacity to lithium plating [A.h]",
    "Loss of capacity to SEI [A.h]",
    "Total capacity lost to side reactions [A.h]",
    "Total lithium [mol]",
    "Total lithium in electrolyte [mol]",
    "Total lithium in positive electrode [mol]",
    "Positive electrode capacity [A.h]",
    "Loss of active material in positive electrode [%]",
    "Total lithium in negative electrode [mol]",
    "Negative electrode capacity [A.h]",
    "Loss of active material in negative electrode [%]",
    "Total lithium in particles [mol]",
    "Total lithium lost [mol]",
    "Total lithium lost from particles [mol]",
    "Total lithium lost from electrolyte [mol]",
    "Total lithium lost to side reactions [mol]",
    "Loss of lithium to SEI [mol]",
    "Loss of lithium to lithium plating [mol]",
    "Loss of lithium to SEI on cracks [mol]",
];

/// Column order of the time-series table.
pub const TRACE_COLUMNS: [&str; 7] = [
    "Time [h]",
    "Current [A]",
    "Terminal voltage [V]",
    "X-averaged cell temperature [K]",
    "Ambient temperature [K]",
    "X-averaged negative particle crack length [m]",
    "X-averaged total SEI thickness [m]",
];

/// A fixed-schema, column-major results table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    columns: &'static [&'static str],
    values: Vec<Vec<f64>>,
}

impl MetricTable {
    /// Assemble a table by pulling each named column through `lookup`.
    fn assemble<'a, F>(
        columns: &'static [&'static str],
        what: &str,
        lookup: F,
    ) -> ScenarioResult<Self>
    where
        F: Fn(&str) -> Option<&'a [f64]>,
    {
        let mut values = Vec::with_capacity(columns.len());
        for &name in columns {
            let series = lookup(name)
                .ok_or_else(|| ScenarioError::Schema(format!("missing {what} {name:?}")))?;
            values.push(series.to_vec());
        }

        let row_count = values[0].len();
        if values.iter().any(|series| series.len() != row_count) {
            return Err(ScenarioError::Schema(format!(
                "{what} series have unequal lengths"
            )));
        }

        Ok(Self { columns, values })
    }

    /// The table's column names, in order.
    pub fn columns(&self) -> &[&'static str] {
        self.columns
    }

    /// How many rows the table has.
    pub fn row_count(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Write the table as CSV, replacing any existing file at `file_path`.
    fn write_csv(&self, file_path: &Path) -> ScenarioResult<()> {
        let mut writer = csv::Writer::from_path(file_path)?;
        writer.write_record(self.columns)?;
        for row in 0..self.row_count() {
            writer.write_record(self.values.iter().map(|column| column[row].to_string()))?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// Map a raw solution's summary series onto the fixed summary schema.
pub fn extract_summary(raw: &RawSolution) -> ScenarioResult<MetricTable> {
    MetricTable::assemble(&SUMMARY_COLUMNS, "summary metric", |name| {
        raw.summary_series(name)
    })
}

/// Map a raw solution's trace channels onto the fixed time-series schema.
pub fn extract_timeseries(raw: &RawSolution) -> ScenarioResult<MetricTable> {
    MetricTable::assemble(&TRACE_COLUMNS, "trace channel", |name| {
        raw.trace_channel(name)
    })
}

/// Write both result tables for a scenario, returning the paths written.
///
/// File names are `{stem}_summary.csv` and `{stem}_data.csv` where the stem
/// comes from the scenario key. Existing files are overwritten.
pub fn write_results(
    output_dir: &Path,
    key: &ScenarioKey,
    summary: &MetricTable,
    timeseries: &MetricTable,
) -> ScenarioResult<(PathBuf, PathBuf)> {
    let stem = key.file_stem();
    let summary_path = output_dir.join(format!("{stem}_summary.csv"));
    let data_path = output_dir.join(format!("{stem}_data.csv"));

    summary.write_csv(&summary_path)?;
    timeseries.write_csv(&data_path)?;

    Ok((summary_path, data_path))
}

/// Get the output directory for the scenario set at the specified path.
pub fn get_output_dir(scenario_dir: &Path, override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    // Canonicalise in case the user has specified "."
    let scenario_dir = scenario_dir
        .canonicalize()
        .context("Could not resolve path to scenario set")?;

    let name = scenario_dir
        .file_name()
        .context("Scenario set cannot be in root folder")?
        .to_str()
        .context("Invalid chars in scenario dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, name].iter().collect())
}

/// Create the output directory, failing if it already exists and `overwrite`
/// was not given.
pub fn create_output_directory(output_dir: &Path, overwrite: bool) -> Result<()> {
    if output_dir.is_dir() {
        ensure!(
            overwrite,
            "Output directory {} already exists (pass --overwrite to reuse it)",
            output_dir.display()
        );
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::raw_solution;
    use itertools::Itertools;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    fn scenario_key() -> ScenarioKey {
        ScenarioKey {
            drive_profile_id: "Panskura".into(),
            temperature_source_id: crate::temperature::TemperatureSourceID::from_path(Path::new(
                "input/Temperature/delhi_everyhour.xlsx",
            ))
            .unwrap(),
        }
    }

    /// Read back a CSV file as (header, rows)
    fn read_back(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let header = reader
            .headers()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|record| {
                record
                    .unwrap()
                    .iter()
                    .map(ToString::to_string)
                    .collect_vec()
            })
            .collect();
        (header, rows)
    }

    #[rstest]
    fn test_extract_summary_shape(raw_solution: RawSolution) {
        let table = extract_summary(&raw_solution).unwrap();
        assert_eq!(table.columns(), SUMMARY_COLUMNS);
        assert_eq!(table.row_count(), 2);
    }

    #[rstest]
    fn test_extract_timeseries_shape(raw_solution: RawSolution) {
        let table = extract_timeseries(&raw_solution).unwrap();
        assert_eq!(table.columns(), TRACE_COLUMNS);
        assert_eq!(table.row_count(), 3);
    }

    /// Copy `raw`, leaving out one summary metric and one trace channel
    fn copy_without(raw: &RawSolution, summary_name: &str, trace_name: &str) -> RawSolution {
        let mut out = RawSolution::default();
        for name in SUMMARY_COLUMNS {
            if name != summary_name {
                out.insert_summary(name, raw.summary_series(name).unwrap().to_vec());
            }
        }
        for name in TRACE_COLUMNS {
            if name != trace_name {
                out.insert_trace(name, raw.trace_channel(name).unwrap().to_vec());
            }
        }
        out
    }

    #[rstest]
    fn test_extract_summary_missing_metric(raw_solution: RawSolution) {
        let raw = copy_without(&raw_solution, "Measured capacity [A.h]", "");

        let result = extract_summary(&raw);
        assert!(matches!(result, Err(ScenarioError::Schema(_))));
    }

    #[rstest]
    fn test_extract_timeseries_missing_channel(raw_solution: RawSolution) {
        let raw = copy_without(&raw_solution, "", "Ambient temperature [K]");

        let result = extract_timeseries(&raw);
        assert!(matches!(result, Err(ScenarioError::Schema(_))));
    }

    #[rstest]
    fn test_extract_summary_ragged_series(mut raw_solution: RawSolution) {
        raw_solution.insert_summary("Cycle number", vec![1.0]);

        let result = extract_summary(&raw_solution);
        assert!(matches!(result, Err(ScenarioError::Schema(_))));
    }

    #[rstest]
    fn test_write_results_file_names(raw_solution: RawSolution) {
        let summary = extract_summary(&raw_solution).unwrap();
        let timeseries = extract_timeseries(&raw_solution).unwrap();

        let dir = tempdir().unwrap();
        let (summary_path, data_path) =
            write_results(dir.path(), &scenario_key(), &summary, &timeseries).unwrap();

        assert_eq!(
            summary_path,
            dir.path().join("Panskura_delhi_everyhour_summary.csv")
        );
        assert_eq!(
            data_path,
            dir.path().join("Panskura_delhi_everyhour_data.csv")
        );
        assert!(summary_path.is_file());
        assert!(data_path.is_file());
    }

    #[rstest]
    fn test_write_results_round_trip(raw_solution: RawSolution) {
        let summary = extract_summary(&raw_solution).unwrap();
        let timeseries = extract_timeseries(&raw_solution).unwrap();

        let dir = tempdir().unwrap();
        let (summary_path, data_path) =
            write_results(dir.path(), &scenario_key(), &summary, &timeseries).unwrap();

        let (header, rows) = read_back(&summary_path);
        assert_eq!(header, SUMMARY_COLUMNS);
        assert_eq!(rows.len(), summary.row_count());

        let (header, rows) = read_back(&data_path);
        assert_eq!(header, TRACE_COLUMNS);
        assert_eq!(rows.len(), timeseries.row_count());
    }

    #[rstest]
    fn test_write_results_overwrites(raw_solution: RawSolution) {
        let summary = extract_summary(&raw_solution).unwrap();
        let timeseries = extract_timeseries(&raw_solution).unwrap();

        let dir = tempdir().unwrap();
        let stale_path = dir.path().join("Panskura_delhi_everyhour_summary.csv");
        {
            let mut file = File::create(&stale_path).unwrap();
            writeln!(file, "stale contents from a previous run").unwrap();
        }

        write_results(dir.path(), &scenario_key(), &summary, &timeseries).unwrap();

        let (header, _) = read_back(&stale_path);
        assert_eq!(header, SUMMARY_COLUMNS);
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");

        create_output_directory(&output_dir, false).unwrap();
        assert!(output_dir.is_dir());

        // A second run needs the overwrite flag
        assert!(create_output_directory(&output_dir, false).is_err());
        create_output_directory(&output_dir, true).unwrap();
    }
}
