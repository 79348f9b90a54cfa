//! The interface to the electrochemical simulation engine.
//!
//! The engine itself is an external collaborator: this module pins down what
//! the pipeline hands it (protocol, boundary condition, recording plan,
//! robustness settings) and what it must hand back (named summary series and
//! trace channels). The bundled [`surrogate`] implementation exists for dry
//! runs and tests.
use crate::boundary::BoundaryCondition;
use crate::error::ScenarioResult;
use crate::protocol::ExperimentProtocol;
use crate::units::Seconds;
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;

pub mod surrogate;

/// Robustness mode for the solver's integration strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SolverMode {
    /// Conservative stepping that retries failed sub-steps.
    Safe,
    /// Larger steps and fewer retries.
    Fast,
}

/// Solver robustness and step-size bounds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Integration robustness mode.
    pub mode: SolverMode,
    /// Upper bound on a single internal step, in seconds.
    pub max_step: f64,
    /// How many times a failing step may be shrunk before the solve gives up.
    pub max_step_decrease_count: u32,
    /// Whether an early failure yields the partial solution instead of an
    /// error.
    pub return_partial: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            mode: SolverMode::Safe,
            max_step: 200.0,
            max_step_decrease_count: 20,
            return_partial: true,
        }
    }
}

impl SolverSettings {
    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_step > 0.0, "max_step must be positive");
        ensure!(
            self.max_step_decrease_count >= 1,
            "max_step_decrease_count must be at least 1"
        );
        Ok(())
    }
}

/// Spatial discretization densities for the cell mesh.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Grid points across the negative electrode.
    pub negative_electrode_points: u32,
    /// Grid points across the separator.
    pub separator_points: u32,
    /// Grid points across the positive electrode.
    pub positive_electrode_points: u32,
    /// Radial grid points in negative electrode particles.
    pub negative_particle_points: u32,
    /// Radial grid points in positive electrode particles.
    pub positive_particle_points: u32,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            negative_electrode_points: 40,
            separator_points: 20,
            positive_electrode_points: 40,
            negative_particle_points: 40,
            positive_particle_points: 40,
        }
    }
}

impl MeshSettings {
    /// Check that every grid is fine enough to discretize on.
    pub fn validate(&self) -> Result<()> {
        let grids = [
            self.negative_electrode_points,
            self.separator_points,
            self.positive_electrode_points,
            self.negative_particle_points,
            self.positive_particle_points,
        ];
        ensure!(
            grids.iter().all(|&points| points >= 2),
            "every mesh grid needs at least 2 points"
        );
        Ok(())
    }
}

/// Everything a solver needs to run one scenario to completion.
pub struct SolveRequest<'a> {
    /// The multi-cycle protocol to execute.
    pub protocol: &'a ExperimentProtocol,
    /// Ambient-temperature boundary condition; its first sample also seeds
    /// the solver's initial cell temperature.
    pub boundary: &'a BoundaryCondition,
    /// Cycle indices at which summary metrics are recorded.
    pub record_cycles: &'a [u32],
    /// Seconds per unit of the solver's internal time variable.
    pub timescale: Seconds,
    /// Robustness and step-size bounds.
    pub settings: SolverSettings,
    /// Spatial discretization densities.
    pub mesh: MeshSettings,
}

/// A solver's raw output: named summary series and trace channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSolution {
    summary: IndexMap<String, Vec<f64>>,
    trace: IndexMap<String, Vec<f64>>,
}

impl RawSolution {
    /// Add a per-recorded-cycle summary series.
    pub fn insert_summary(&mut self, name: &str, values: Vec<f64>) {
        self.summary.insert(name.to_string(), values);
    }

    /// Add a per-time-step trace channel.
    pub fn insert_trace(&mut self, name: &str, values: Vec<f64>) {
        self.trace.insert(name.to_string(), values);
    }

    /// Look up a summary series by name.
    pub fn summary_series(&self, name: &str) -> Option<&[f64]> {
        self.summary.get(name).map(Vec::as_slice)
    }

    /// Look up a trace channel by name.
    pub fn trace_channel(&self, name: &str) -> Option<&[f64]> {
        self.trace.get(name).map(Vec::as_slice)
    }
}

/// The outcome of a solve that produced usable cycle history.
///
/// A solver configured to return partial solutions reports an early stop
/// here rather than failing; extraction then proceeds on the truncated
/// history and the scenario is reported as partial, not as a success.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// The full protocol ran to completion.
    Complete(RawSolution),
    /// The solver stopped early but kept the cycle history so far.
    Partial {
        /// The truncated solution.
        solution: RawSolution,
        /// Why the solve stopped.
        reason: String,
    },
}

/// An electrochemical simulation engine.
///
/// Implementations are called from multiple worker threads at once and so
/// must be [`Sync`]; a solve gets everything it needs from the request.
pub trait CellSolver: Sync {
    /// Run the requested protocol, returning the raw solution.
    fn solve(&self, request: &SolveRequest) -> ScenarioResult<SolveOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_settings_default() {
        let settings = SolverSettings::default();
        assert_eq!(settings.mode, SolverMode::Safe);
        assert_eq!(settings.max_step, 200.0);
        assert_eq!(settings.max_step_decrease_count, 20);
        assert!(settings.return_partial);
        settings.validate().unwrap();
    }

    #[test]
    fn test_solver_settings_validate() {
        let settings = SolverSettings {
            max_step: 0.0,
            ..SolverSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = SolverSettings {
            max_step_decrease_count: 0,
            ..SolverSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_mesh_settings_validate() {
        MeshSettings::default().validate().unwrap();

        let mesh = MeshSettings {
            separator_points: 1,
            ..MeshSettings::default()
        };
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_solver_mode_display() {
        assert_eq!(SolverMode::Safe.to_string(), "safe");
        assert_eq!(SolverMode::Fast.to_string(), "fast");
    }
}
