//! Functionality for running the aging simulation across scenarios.
//!
//! Enumeration is deterministic and pure; execution is parallel and partially
//! failing. The scheduler fans scenarios out over a fixed-size worker pool
//! and fans in per-scenario outcomes: one scenario failing, however it fails,
//! never aborts the others.
use crate::boundary::BoundaryCondition;
use crate::error::ScenarioResult;
use crate::input::temperature::read_temperature_series;
use crate::model::ScenarioSet;
use crate::output::{extract_summary, extract_timeseries, write_results};
use crate::protocol::build_protocol;
use crate::scenario::{Scenario, ScenarioKey};
use crate::solver::{CellSolver, SolveOutcome, SolveRequest};
use anyhow::{Context, Result};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::Path;

/// How one scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScenarioStatus {
    /// All cycles ran and both output tables were written.
    Succeeded,
    /// The solver stopped early; truncated tables were written.
    Partial,
    /// The scenario produced no output.
    Failed,
}

/// The outcome of one scenario.
#[derive(Debug)]
pub struct ScenarioReport {
    /// The scenario's identity.
    pub key: ScenarioKey,
    /// How the scenario ended.
    pub status: ScenarioStatus,
    /// The early-stop reason or failure message, where applicable.
    pub detail: Option<String>,
}

/// Aggregated outcomes for a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One report per scenario, in completion order.
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    /// How many scenarios ended with the given status.
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios
            .iter()
            .filter(|report| report.status == status)
            .count()
    }

    /// Whether every scenario failed.
    pub fn all_failed(&self) -> bool {
        !self.scenarios.is_empty() && self.count(ScenarioStatus::Failed) == self.scenarios.len()
    }
}

/// Run a single scenario to completion.
///
/// Loads the temperature trace, builds the boundary condition and protocol,
/// invokes the solver with the shared configuration, and writes both result
/// tables. A partial solve still goes through extraction and writing; the
/// truncated tables are reported as partial, not as a success.
fn run_scenario(
    scenario: &Scenario,
    set: &ScenarioSet,
    solver: &dyn CellSolver,
    output_dir: &Path,
) -> ScenarioResult<(ScenarioStatus, Option<String>)> {
    let series = read_temperature_series(&scenario.temperature_path)?;
    let boundary = BoundaryCondition::new(&series, set.timescale);
    let profile = set.drive_profile(&scenario.key.drive_profile_id)?;
    let protocol = build_protocol(profile, set.cycle_count)?;
    let record_cycles = set.record_cycles();

    let request = SolveRequest {
        protocol: &protocol,
        boundary: &boundary,
        record_cycles: &record_cycles,
        timescale: set.timescale,
        settings: set.solver,
        mesh: set.mesh,
    };
    let (raw, status, detail) = match solver.solve(&request)? {
        SolveOutcome::Complete(raw) => (raw, ScenarioStatus::Succeeded, None),
        SolveOutcome::Partial { solution, reason } => {
            warn!("{}: solver stopped early: {reason}", scenario.key);
            (solution, ScenarioStatus::Partial, Some(reason))
        }
    };

    let summary = extract_summary(&raw)?;
    let timeseries = extract_timeseries(&raw)?;
    write_results(output_dir, &scenario.key, &summary, &timeseries)?;

    Ok((status, detail))
}

/// Run every scenario under a bounded worker pool.
///
/// # Arguments
///
/// * `set` - The shared, read-only scenario set
/// * `scenarios` - The enumerated work items
/// * `solver` - The simulation engine
/// * `output_dir` - Folder where result files will be saved
pub fn run(
    set: &ScenarioSet,
    scenarios: &[Scenario],
    solver: &dyn CellSolver,
    output_dir: &Path,
) -> Result<RunReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(set.concurrency)
        .thread_name(|index| format!("cellage-worker-{index}"))
        .build()
        .context("Failed to build the worker pool")?;

    info!(
        "Running {} scenarios on {} workers",
        scenarios.len(),
        set.concurrency
    );

    let reports: Vec<ScenarioReport> = pool.install(|| {
        scenarios
            .par_iter()
            .map(|scenario| match run_scenario(scenario, set, solver, output_dir) {
                Ok((status, detail)) => {
                    info!("{}: {status}", scenario.key);
                    ScenarioReport {
                        key: scenario.key.clone(),
                        status,
                        detail,
                    }
                }
                Err(err) => {
                    error!("{}: {err}", scenario.key);
                    ScenarioReport {
                        key: scenario.key.clone(),
                        status: ScenarioStatus::Failed,
                        detail: Some(err.to_string()),
                    }
                }
            })
            .collect()
    });

    let report = RunReport { scenarios: reports };
    info!(
        "Run finished: {} succeeded, {} partial, {} failed",
        report.count(ScenarioStatus::Succeeded),
        report.count(ScenarioStatus::Partial),
        report.count(ScenarioStatus::Failed)
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{create_scenario_dir, raw_solution};
    use crate::scenario::enumerate_scenarios;
    use crate::solver::RawSolution;
    use crate::solver::surrogate::SurrogateSolver;
    use std::fs::File;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    /// A stub solver that tracks how many solves run concurrently.
    struct ProbeSolver {
        solution: RawSolution,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ProbeSolver {
        fn new(solution: RawSolution) -> Self {
            Self {
                solution,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl CellSolver for ProbeSolver {
        fn solve(&self, _request: &SolveRequest) -> ScenarioResult<SolveOutcome> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);

            Ok(SolveOutcome::Complete(self.solution.clone()))
        }
    }

    /// A stub solver that always stops early.
    struct PartialSolver(RawSolution);

    impl CellSolver for PartialSolver {
        fn solve(&self, _request: &SolveRequest) -> ScenarioResult<SolveOutcome> {
            Ok(SolveOutcome::Partial {
                solution: self.0.clone(),
                reason: "safety cutoff tripped at cycle 551".to_string(),
            })
        }
    }

    #[test]
    fn test_run_with_surrogate_solver() {
        let dir = create_scenario_dir();
        let set = ScenarioSet::from_path(dir.path()).unwrap();
        let scenarios = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths).unwrap();
        let output_dir = tempdir().unwrap();

        let report = run(&set, &scenarios, &SurrogateSolver, output_dir.path()).unwrap();

        assert_eq!(report.scenarios.len(), 4);
        assert_eq!(report.count(ScenarioStatus::Succeeded), 4);
        assert!(!report.all_failed());

        for scenario in &scenarios {
            let stem = scenario.key.file_stem();
            assert!(output_dir.path().join(format!("{stem}_summary.csv")).is_file());
            assert!(output_dir.path().join(format!("{stem}_data.csv")).is_file());
        }
    }

    #[test]
    fn test_run_isolates_scenario_failures() {
        let dir = create_scenario_dir();

        // Corrupt one temperature source; scenarios using it must fail while
        // the others complete
        let bad_path = dir.path().join("temperature").join("churu_everyhour.csv");
        {
            let mut file = File::create(&bad_path).unwrap();
            writeln!(file, "0,not-a-number").unwrap();
        }

        let set = ScenarioSet::from_path(dir.path()).unwrap();
        // 2 drive profiles x 3 temperature sources
        let scenarios = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths).unwrap();
        assert_eq!(scenarios.len(), 6);

        let output_dir = tempdir().unwrap();
        let report = run(&set, &scenarios, &SurrogateSolver, output_dir.path()).unwrap();

        assert_eq!(report.count(ScenarioStatus::Succeeded), 4);
        assert_eq!(report.count(ScenarioStatus::Failed), 2);
        assert!(!report.all_failed());

        let failed: Vec<&ScenarioReport> = report
            .scenarios
            .iter()
            .filter(|r| r.status == ScenarioStatus::Failed)
            .collect();
        assert!(
            failed
                .iter()
                .all(|r| r.key.temperature_source_id == "churu_everyhour".into())
        );
        assert!(failed.iter().all(|r| r.detail.is_some()));
    }

    #[test]
    fn test_run_bounds_concurrency() {
        let dir = create_scenario_dir();
        let mut set = ScenarioSet::from_path(dir.path()).unwrap();
        set.concurrency = 2;

        // 2 drive profiles x 2 temperature sources repeated 3 times = 12 items,
        // with the copies renamed so that output file names stay unique
        let base = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths).unwrap();
        let mut scenarios = base.clone();
        for copy in 1..3 {
            scenarios.extend(base.iter().cloned().map(|mut scenario| {
                let renamed = format!("{}-{copy}", scenario.key.temperature_source_id);
                scenario.key.temperature_source_id = renamed.into();
                scenario
            }));
        }
        assert_eq!(scenarios.len(), 12);

        let solver = ProbeSolver::new(raw_solution());
        let output_dir = tempdir().unwrap();
        let report = run(&set, &scenarios, &solver, output_dir.path()).unwrap();

        assert_eq!(report.count(ScenarioStatus::Succeeded), 12);
        assert!(solver.peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_run_reports_partial_solves() {
        let dir = create_scenario_dir();
        let set = ScenarioSet::from_path(dir.path()).unwrap();
        let scenarios = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths).unwrap();

        let solver = PartialSolver(raw_solution());
        let output_dir = tempdir().unwrap();
        let report = run(&set, &scenarios, &solver, output_dir.path()).unwrap();

        assert_eq!(report.count(ScenarioStatus::Partial), scenarios.len());
        for report in &report.scenarios {
            assert_eq!(
                report.detail.as_deref(),
                Some("safety cutoff tripped at cycle 551")
            );
            // Truncated outputs are still written
            let stem = report.key.file_stem();
            assert!(output_dir.path().join(format!("{stem}_summary.csv")).is_file());
        }
    }

    #[test]
    fn test_run_fails_scenario_with_unknown_drive_profile() {
        let dir = create_scenario_dir();
        let set = ScenarioSet::from_path(dir.path()).unwrap();
        let mut scenarios =
            enumerate_scenarios(&set.drive_profiles, &set.temperature_paths).unwrap();

        // Point one scenario at a profile that has no specification
        scenarios[0].key.drive_profile_id = "Chennai".into();

        let output_dir = tempdir().unwrap();
        let report = run(&set, &scenarios, &SurrogateSolver, output_dir.path()).unwrap();

        assert_eq!(report.count(ScenarioStatus::Failed), 1);
        assert_eq!(report.count(ScenarioStatus::Succeeded), 3);
    }
}
