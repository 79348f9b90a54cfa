//! Integration test running the bundled demo scenario set end to end.
use cellage::model::ScenarioSet;
use cellage::scenario::enumerate_scenarios;
use cellage::simulation::{self, ScenarioStatus};
use cellage::solver::surrogate::SurrogateSolver;
use std::path::{Path, PathBuf};

/// Get the path to the bundled demo scenario set.
fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("ev_fleet")
}

#[test]
fn test_demo_scenario_set_runs() {
    let set = ScenarioSet::from_path(&demo_dir()).unwrap();
    assert_eq!(set.cycle_count, 1095);
    assert_eq!(set.concurrency, 4);

    let scenarios = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths).unwrap();
    // 4 drive profiles x 3 temperature sources
    assert_eq!(scenarios.len(), 12);

    let output_dir = tempfile::tempdir().unwrap();
    let report = simulation::run(&set, &scenarios, &SurrogateSolver, output_dir.path()).unwrap();

    assert_eq!(report.count(ScenarioStatus::Succeeded), 12);
    assert_eq!(report.count(ScenarioStatus::Failed), 0);

    // Every scenario leaves a deterministically named pair of output files
    let summary_path = output_dir.path().join("Panskura_delhi_everyhour_summary.csv");
    let data_path = output_dir.path().join("Panskura_delhi_everyhour_data.csv");
    assert!(summary_path.is_file());
    assert!(data_path.is_file());
    for scenario in &scenarios {
        let stem = scenario.key.file_stem();
        assert!(output_dir.path().join(format!("{stem}_summary.csv")).is_file());
        assert!(output_dir.path().join(format!("{stem}_data.csv")).is_file());
    }

    // The summary has one row per recorded cycle
    let mut reader = csv::Reader::from_path(&summary_path).unwrap();
    assert_eq!(reader.records().count(), set.record_cycles().len());
}
