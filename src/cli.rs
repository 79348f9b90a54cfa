//! The command line interface for the simulation.
use crate::log;
use crate::model::ScenarioSet;
use crate::output::{create_output_directory, get_output_dir};
use crate::scenario::enumerate_scenarios;
use crate::simulation;
use crate::solver::surrogate::SurrogateSolver;
use ::log::info;
use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod demo;
use demo::DemoSubcommands;

/// The command line interface for the simulation.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Commands,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a scenario set.
    Run {
        /// Path to the scenario directory.
        scenario_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Check that a scenario set loads and enumerates, without running it.
    Validate {
        /// Path to the scenario directory.
        scenario_dir: PathBuf,
    },
    /// Manage bundled demo scenario sets.
    Demo {
        /// The available subcommands for managing demo scenario sets.
        #[command(subcommand)]
        subcommand: DemoSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { scenario_dir, opts } => handle_run_command(&scenario_dir, &opts),
            Self::Validate { scenario_dir } => handle_validate_command(&scenario_dir),
            Self::Demo { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    Cli::parse().command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(scenario_dir: &Path, opts: &RunOpts) -> Result<()> {
    let set = ScenarioSet::from_path(scenario_dir).context("Failed to load scenario set.")?;
    log::init(set.log_level.as_deref()).context("Failed to initialize logging.")?;

    let scenarios = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths)?;
    info!(
        "Loaded {} drive profiles and {} temperature sources ({} scenarios)",
        set.drive_profiles.len(),
        set.temperature_paths.len(),
        scenarios.len()
    );

    let output_dir = get_output_dir(scenario_dir, opts.output_dir.as_deref())?;
    create_output_directory(&output_dir, opts.overwrite)
        .context("Failed to create output directory.")?;
    info!("Output folder: {}", output_dir.display());

    // The electrochemical engine is pluggable behind the CellSolver trait;
    // the binary wires in the built-in surrogate.
    info!("Using the built-in surrogate solver");
    let report = simulation::run(&set, &scenarios, &SurrogateSolver, &output_dir)?;
    ensure!(!report.all_failed(), "Every scenario failed");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(scenario_dir: &Path) -> Result<()> {
    let set = ScenarioSet::from_path(scenario_dir).context("Failed to load scenario set.")?;
    let scenarios = enumerate_scenarios(&set.drive_profiles, &set.temperature_paths)?;

    println!(
        "Scenario set is valid: {} drive profiles x {} temperature sources = {} scenarios",
        set.drive_profiles.len(),
        set.temperature_paths.len(),
        scenarios.len()
    );

    Ok(())
}
