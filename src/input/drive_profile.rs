//! Code for reading the drive-profile table from a CSV file.
use super::{input_err_msg, read_csv};
use crate::drive_profile::{DriveProfileID, DriveProfileMap, DriveProfileSpec};
use crate::units::{CRate, Hours, Seconds};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const DRIVE_PROFILES_FILE_NAME: &str = "drive_profiles.csv";

/// A drive-profile record retrieved from a CSV file
#[derive(Debug, Deserialize)]
struct DriveProfileRaw {
    id: String,
    discharge_rate: f64,
    active_duration: f64,
    rest_duration: f64,
}

/// Build the drive-profile map from an iterator of raw records.
///
/// Every numeric field is validated here; a missing or out-of-range value is
/// an error, never a default.
fn read_drive_profiles_from_iter<I>(iter: I) -> Result<DriveProfileMap>
where
    I: Iterator<Item = DriveProfileRaw>,
{
    let mut profiles = IndexMap::new();
    for raw in iter {
        ensure!(
            raw.discharge_rate > 0.0,
            "discharge_rate must be positive for {}",
            raw.id
        );
        ensure!(
            raw.active_duration > 0.0,
            "active_duration must be positive for {}",
            raw.id
        );
        ensure!(
            raw.rest_duration >= 0.0,
            "rest_duration cannot be negative for {}",
            raw.id
        );

        let id: DriveProfileID = raw.id.into();
        let spec = DriveProfileSpec {
            discharge_rate: CRate(raw.discharge_rate),
            active_duration: Seconds(raw.active_duration),
            rest_duration: Hours(raw.rest_duration),
        };
        ensure!(
            profiles.insert(id.clone(), spec).is_none(),
            "Duplicate drive profile entry for {id}"
        );
    }

    Ok(profiles)
}

/// Read drive profiles from the CSV file in the scenario directory.
///
/// # Arguments
///
/// * `scenario_dir` - Folder containing scenario configuration files
pub fn read_drive_profiles(scenario_dir: &Path) -> Result<DriveProfileMap> {
    let file_path = scenario_dir.join(DRIVE_PROFILES_FILE_NAME);
    let records = read_csv(&file_path)?;
    read_drive_profiles_from_iter(records.into_iter()).with_context(|| input_err_msg(&file_path))
}
