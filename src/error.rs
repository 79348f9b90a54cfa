//! Error types for classifying per-scenario failures.
//!
//! A scenario that fails is reported and skipped; it must never abort sibling
//! scenarios. The variants here are what the scheduler uses to tell a
//! misconfigured scenario from a bad input file or a solver that gave up.
use thiserror::Error;

/// A shorthand for results in scenario-level code.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// An error that fails a single scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A referenced id has no specification or a required parameter is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A temperature source file is malformed.
    #[error("malformed temperature data: {0}")]
    DataFormat(String),

    /// The solver could not complete the requested protocol.
    #[error("solver failure: {0}")]
    Solver(String),

    /// The raw solution is missing an expected metric or channel.
    #[error("result schema violation: {0}")]
    Schema(String),

    /// An error reading an input file or writing an output file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O error outside of CSV handling.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
