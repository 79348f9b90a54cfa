//! Scenario identity and enumeration.
//!
//! A scenario is one (drive profile, temperature source) pairing. Enumeration
//! is the pure, deterministic half of scheduling: the same inputs always
//! produce the same work list in the same order, though completion order
//! under the scheduler is unrelated.
use crate::drive_profile::{DriveProfileID, DriveProfileMap};
use crate::temperature::TemperatureSourceID;
use anyhow::Result;
use itertools::Itertools;
use std::fmt;
use std::path::PathBuf;

/// Identity of one unit of simulation work.
///
/// Keys are unique within a run; output file names derive from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScenarioKey {
    /// The drive profile supplying the discharge pattern.
    pub drive_profile_id: DriveProfileID,
    /// The ambient-temperature source.
    pub temperature_source_id: TemperatureSourceID,
}

impl ScenarioKey {
    /// The stem from which this scenario's output file names are derived.
    ///
    /// Spaces in the drive profile id become underscores.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            self.drive_profile_id.0.replace(' ', "_"),
            self.temperature_source_id
        )
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.drive_profile_id, self.temperature_source_id
        )
    }
}

/// One enumerated unit of work: the key plus its temperature source path.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// The scenario's identity.
    pub key: ScenarioKey,
    /// Path to the ambient-temperature source file.
    pub temperature_path: PathBuf,
}

/// Enumerate the cross product of drive profiles and temperature sources.
///
/// Ordering is deterministic: the outer loop runs over drive profiles in map
/// order, the inner loop over temperature sources in the given order.
pub fn enumerate_scenarios(
    drive_profiles: &DriveProfileMap,
    temperature_paths: &[PathBuf],
) -> Result<Vec<Scenario>> {
    drive_profiles
        .keys()
        .cartesian_product(temperature_paths)
        .map(|(drive_profile_id, temperature_path)| {
            let temperature_source_id = TemperatureSourceID::from_path(temperature_path)?;
            Ok(Scenario {
                key: ScenarioKey {
                    drive_profile_id: drive_profile_id.clone(),
                    temperature_source_id,
                },
                temperature_path: temperature_path.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::drive_profiles;
    use rstest::rstest;

    fn temperature_paths() -> Vec<PathBuf> {
        ["temperature/delhi_everyhour.csv", "temperature/kolkata_everyhour.csv"]
            .map(PathBuf::from)
            .to_vec()
    }

    #[rstest]
    fn test_enumerate_scenarios_cross_product(drive_profiles: DriveProfileMap) {
        let scenarios = enumerate_scenarios(&drive_profiles, &temperature_paths()).unwrap();

        assert_eq!(
            scenarios.len(),
            drive_profiles.len() * temperature_paths().len()
        );
        assert!(scenarios.iter().map(|s| &s.key).all_unique());

        // Outer loop over drive profiles, inner loop over temperature sources
        let keys: Vec<String> = scenarios.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(
            keys,
            [
                "Panskura @ delhi_everyhour",
                "Panskura @ kolkata_everyhour",
                "Delhi @ delhi_everyhour",
                "Delhi @ kolkata_everyhour",
            ]
        );
    }

    #[rstest]
    fn test_enumerate_scenarios_is_deterministic(drive_profiles: DriveProfileMap) {
        let first = enumerate_scenarios(&drive_profiles, &temperature_paths()).unwrap();
        let second = enumerate_scenarios(&drive_profiles, &temperature_paths()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_file_stem_replaces_spaces() {
        let key = ScenarioKey {
            drive_profile_id: "Urban Mixed".into(),
            temperature_source_id: "churu_everyhour".into(),
        };
        assert_eq!(key.file_stem(), "Urban_Mixed_churu_everyhour");
    }
}
