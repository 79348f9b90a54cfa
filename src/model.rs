//! Code for loading a scenario set from a scenario directory.
//!
//! A scenario directory holds `scenarios.toml` with the run parameters, the
//! drive-profile table and a `temperature` folder with one file per ambient
//! source. The loaded set is immutable: it is built once before scheduling
//! and shared read-only by every worker.
use crate::drive_profile::{DriveProfileID, DriveProfileMap, DriveProfileSpec};
use crate::error::{ScenarioError, ScenarioResult};
use crate::input::drive_profile::read_drive_profiles;
use crate::input::{input_err_msg, read_toml};
use crate::solver::{MeshSettings, SolverSettings};
use crate::units::Seconds;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const SCENARIOS_FILE_NAME: &str = "scenarios.toml";
const TEMPERATURE_DIR_NAME: &str = "temperature";

/// How many times the protocol block is repeated.
const DEFAULT_CYCLE_COUNT: u32 = 1095;

/// Record summary metrics every this many cycles.
const DEFAULT_RECORD_STRIDE: u32 = 50;

/// Worker pool size.
const DEFAULT_CONCURRENCY: usize = 4;

/// The `[simulation]` section of the scenarios file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct SimulationSection {
    cycle_count: u32,
    record_stride: u32,
    concurrency: usize,
    timescale: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            cycle_count: DEFAULT_CYCLE_COUNT,
            record_stride: DEFAULT_RECORD_STRIDE,
            concurrency: DEFAULT_CONCURRENCY,
            timescale: 1.0,
        }
    }
}

/// Represents the contents of the entire scenarios file.
#[derive(Debug, Default, Deserialize, PartialEq)]
struct ScenarioSetFile {
    #[serde(default)]
    simulation: SimulationSection,
    #[serde(default)]
    solver: SolverSettings,
    #[serde(default)]
    mesh: MeshSettings,
    log_level: Option<String>,
}

impl ScenarioSetFile {
    /// Read the scenarios file from the specified directory.
    fn from_path(scenario_dir: &Path) -> Result<Self> {
        let file_path = scenario_dir.join(SCENARIOS_FILE_NAME);
        let file: ScenarioSetFile = read_toml(&file_path)?;
        file.validate().with_context(|| input_err_msg(&file_path))?;

        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.simulation.cycle_count >= 1,
            "cycle_count must be at least 1"
        );
        ensure!(
            self.simulation.record_stride >= 1,
            "record_stride must be at least 1"
        );
        ensure!(
            self.simulation.concurrency >= 1,
            "concurrency must be at least 1"
        );
        ensure!(
            self.simulation.timescale > 0.0,
            "timescale must be positive"
        );
        self.solver.validate()?;
        self.mesh.validate()?;

        Ok(())
    }
}

/// A fully loaded, immutable scenario set.
pub struct ScenarioSet {
    /// Drive profiles, in the order they will be enumerated.
    pub drive_profiles: DriveProfileMap,
    /// Temperature source files, sorted by name.
    pub temperature_paths: Vec<PathBuf>,
    /// How many times the protocol block is repeated.
    pub cycle_count: u32,
    /// Record summary metrics every this many cycles.
    pub record_stride: u32,
    /// Worker pool size for the scheduler.
    pub concurrency: usize,
    /// Seconds per unit of the solver's internal time variable.
    pub timescale: Seconds,
    /// Solver robustness and step-size bounds.
    pub solver: SolverSettings,
    /// Spatial discretization densities.
    pub mesh: MeshSettings,
    /// Log level requested by the scenarios file, if any.
    pub log_level: Option<String>,
}

impl ScenarioSet {
    /// Load a scenario set from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `scenario_dir` - Folder containing scenario configuration files
    pub fn from_path(scenario_dir: &Path) -> Result<ScenarioSet> {
        let file = ScenarioSetFile::from_path(scenario_dir)?;
        let drive_profiles = read_drive_profiles(scenario_dir)?;
        let temperature_paths = find_temperature_sources(scenario_dir)?;

        Ok(ScenarioSet {
            drive_profiles,
            temperature_paths,
            cycle_count: file.simulation.cycle_count,
            record_stride: file.simulation.record_stride,
            concurrency: file.simulation.concurrency,
            timescale: Seconds(file.simulation.timescale),
            solver: file.solver,
            mesh: file.mesh,
            log_level: file.log_level,
        })
    }

    /// Look up a drive profile, failing with a config error if absent.
    pub fn drive_profile(&self, id: &DriveProfileID) -> ScenarioResult<&DriveProfileSpec> {
        self.drive_profiles.get(id).ok_or_else(|| {
            ScenarioError::Config(format!("no drive profile specification for {id}"))
        })
    }

    /// The sparse sequence of cycle indices at which summary metrics are
    /// recorded: every `record_stride`th cycle, starting from the first.
    pub fn record_cycles(&self) -> Vec<u32> {
        (1..self.cycle_count)
            .step_by(self.record_stride as usize)
            .collect()
    }
}

/// List temperature source files in the scenario directory, sorted by name.
fn find_temperature_sources(scenario_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = scenario_dir.join(TEMPERATURE_DIR_NAME);
    ensure!(
        dir.is_dir(),
        "No {TEMPERATURE_DIR_NAME} directory in {}",
        scenario_dir.display()
    );

    let mut paths = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    ensure!(
        !paths.is_empty(),
        "No temperature source files in {}",
        dir.display()
    );
    paths.sort();

    Ok(paths)
}
