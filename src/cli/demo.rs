//! The `demo` subcommand for managing bundled demo scenario sets.
use super::{RunOpts, handle_run_command};
use anyhow::{Context, Result};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// The directory containing the bundled demo scenario sets.
pub const DEMOS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The available subcommands for managing demo scenario sets.
#[derive(Subcommand)]
pub enum DemoSubcommands {
    /// List available demos.
    List,
    /// Run a demo scenario set.
    Run {
        /// The name of the demo to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl DemoSubcommands {
    /// Execute the supplied demo subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_demo_list_command(),
            Self::Run { name, opts } => handle_demo_run_command(&name, &opts),
        }
    }
}

/// Copy a bundled directory's entries below `dest` on the file system.
fn copy_entries(dir: &Dir, dest: &Path) -> Result<()> {
    for entry in dir.entries() {
        let name = entry
            .path()
            .file_name()
            .context("Bundled entry has no file name.")?;
        match entry {
            DirEntry::Dir(sub_dir) => {
                let sub_dest = dest.join(name);
                fs::create_dir_all(&sub_dest)?;
                copy_entries(sub_dir, &sub_dest)?;
            }
            DirEntry::File(file) => {
                fs::write(dest.join(name), file.contents())?;
            }
        }
    }

    Ok(())
}

/// Handle the `demo run` command.
pub fn handle_demo_run_command(name: &str, opts: &RunOpts) -> Result<()> {
    let sub_dir = DEMOS_DIR.get_dir(name).context("Demo not found.")?;

    // Copy the demo to a temporary directory so it can be run in place. The
    // scenario directory keeps the demo's name, which names the output folder.
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let scenario_dir = temp_dir.path().join(name);
    fs::create_dir_all(&scenario_dir)?;
    copy_entries(sub_dir, &scenario_dir)?;

    handle_run_command(&scenario_dir, opts)
}

/// Handle the `demo list` command.
pub fn handle_demo_list_command() -> Result<()> {
    for entry in DEMOS_DIR.dirs() {
        println!("{}", entry.path().display());
    }

    Ok(())
}
