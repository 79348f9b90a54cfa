//! Fixtures for tests

use crate::drive_profile::{DriveProfileMap, DriveProfileSpec};
use crate::output::{SUMMARY_COLUMNS, TRACE_COLUMNS};
use crate::solver::RawSolution;
use crate::temperature::{TemperatureSample, TemperatureSeries};
use crate::units::{CRate, Celsius, Hours, Seconds};
use indexmap::indexmap;
use rstest::fixture;
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;

#[fixture]
pub fn drive_profile() -> DriveProfileSpec {
    DriveProfileSpec {
        discharge_rate: CRate(0.5),
        active_duration: Seconds(1800.0),
        rest_duration: Hours(5.0),
    }
}

#[fixture]
pub fn drive_profiles(drive_profile: DriveProfileSpec) -> DriveProfileMap {
    indexmap! {
        "Panskura".into() => drive_profile,
        "Delhi".into() => DriveProfileSpec {
            discharge_rate: CRate(1.0),
            active_duration: Seconds(3600.0),
            rest_duration: Hours(3.0),
        },
    }
}

#[fixture]
pub fn temperature_series() -> TemperatureSeries {
    TemperatureSeries::new(vec![
        TemperatureSample {
            time: Hours(0.0),
            temperature: Celsius(25.0),
        },
        TemperatureSample {
            time: Hours(1.0),
            temperature: Celsius(26.5),
        },
        TemperatureSample {
            time: Hours(2.0),
            temperature: Celsius(24.0),
        },
    ])
    .unwrap()
}

/// A stubbed raw solution carrying every expected metric and channel
#[fixture]
pub fn raw_solution() -> RawSolution {
    let mut raw = RawSolution::default();
    for name in SUMMARY_COLUMNS {
        raw.insert_summary(name, vec![1.0, 51.0]);
    }
    for name in TRACE_COLUMNS {
        raw.insert_trace(name, vec![0.0, 0.5, 1.0]);
    }
    raw
}

/// Create a complete scenario directory with two drive profiles and two
/// temperature sources
pub fn create_scenario_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut file = File::create(dir.path().join("scenarios.toml")).unwrap();
        writeln!(
            file,
            "[simulation]
cycle_count = 10
record_stride = 2
concurrency = 2"
        )
        .unwrap();
    }

    {
        let mut file = File::create(dir.path().join("drive_profiles.csv")).unwrap();
        writeln!(
            file,
            "id,discharge_rate,active_duration,rest_duration
Panskura,0.5,1800,5
Delhi,1.0,3600,3"
        )
        .unwrap();
    }

    let temperature_dir = dir.path().join("temperature");
    fs::create_dir(&temperature_dir).unwrap();
    for (name, offset) in [("delhi_everyhour.csv", 0.0), ("kolkata_everyhour.csv", 2.5)] {
        let mut file = File::create(temperature_dir.join(name)).unwrap();
        writeln!(file, "# time [h], ambient temperature [degC]").unwrap();
        for hour in 0..24 {
            writeln!(file, "{hour},{}", 18.0 + offset + 1.5 * f64::from(hour % 12)).unwrap();
        }
    }

    dir
}
