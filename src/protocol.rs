//! Synthesis of multi-cycle experiment protocols.
//!
//! Each cycle models one day of use: two discharge events separated by a long
//! recovery rest, a full recharge, and the drive profile's own relaxation
//! period. The cycle block is replicated for the configured number of cycles.
use crate::drive_profile::DriveProfileSpec;
use crate::error::{ScenarioError, ScenarioResult};
use crate::units::{CRate, Hours, Milliamps, Minutes, Seconds, Volts};
use std::fmt;
use std::iter;

/// Recovery window after the first discharge of each cycle.
const RECOVERY_REST: Hours = Hours(9.0);

/// Short rest between the second discharge and the charge phase.
const SHORT_REST: Minutes = Minutes(20.0);

/// Constant-current charge rate.
const CHARGE_RATE: CRate = CRate(0.1);

/// Upper voltage bound for the charge and hold phases.
const CHARGE_LIMIT: Volts = Volts(4.2);

/// Current cutoff terminating the constant-voltage hold.
const HOLD_CUTOFF: Milliamps = Milliamps(10.0);

/// The length and sampling grain of a rest step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestWindow {
    /// A rest measured in hours, sampled hourly.
    Hourly(Hours),
    /// A short rest measured in minutes.
    Short(Minutes),
}

/// One instruction within a cycle block.
///
/// `Display` renders the canonical instruction text consumed by the solver,
/// e.g. "Discharge at 0.5C for 1800 seconds".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProtocolStep {
    /// Galvanostatic discharge at a fixed C-rate.
    Discharge {
        /// Discharge rate.
        rate: CRate,
        /// How long the discharge lasts.
        duration: Seconds,
    },
    /// Open-circuit rest.
    Rest {
        /// Length and sampling grain of the rest.
        window: RestWindow,
    },
    /// Constant-current charge up to an upper voltage bound.
    Charge {
        /// Charge rate.
        rate: CRate,
        /// Voltage at which the charge phase ends.
        until: Volts,
    },
    /// Constant-voltage hold until the current tapers below a cutoff.
    Hold {
        /// Voltage held during the phase.
        voltage: Volts,
        /// Current below which the hold ends.
        cutoff: Milliamps,
    },
}

impl fmt::Display for ProtocolStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discharge { rate, duration } => {
                write!(f, "Discharge at {rate} for {duration}")
            }
            Self::Rest {
                window: RestWindow::Hourly(duration),
            } => write!(f, "Rest for {duration} (1 hour period)"),
            Self::Rest {
                window: RestWindow::Short(duration),
            } => write!(f, "Rest for {duration}"),
            Self::Charge { rate, until } => write!(f, "Charge at {rate} until {until}"),
            Self::Hold { voltage, cutoff } => write!(f, "Hold at {voltage} until {cutoff}"),
        }
    }
}

/// A cycle block replicated a fixed number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentProtocol {
    block: Vec<ProtocolStep>,
    cycle_count: u32,
}

impl ExperimentProtocol {
    /// The steps making up one cycle.
    pub fn cycle_block(&self) -> &[ProtocolStep] {
        &self.block
    }

    /// How many times the cycle block is repeated.
    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// Iterate over the cycle blocks in execution order.
    pub fn iter_cycles(&self) -> impl Iterator<Item = &[ProtocolStep]> {
        iter::repeat_n(self.block.as_slice(), self.cycle_count as usize)
    }
}

/// Check a single protocol parameter, reporting it as a configuration error.
fn check_param(valid: bool, message: &str) -> ScenarioResult<()> {
    if valid {
        Ok(())
    } else {
        Err(ScenarioError::Config(message.to_string()))
    }
}

/// Synthesize the multi-cycle protocol for one drive profile.
pub fn build_protocol(
    profile: &DriveProfileSpec,
    cycle_count: u32,
) -> ScenarioResult<ExperimentProtocol> {
    check_param(
        profile.discharge_rate.0 > 0.0,
        "discharge rate must be positive",
    )?;
    check_param(
        profile.active_duration.0 > 0.0,
        "active duration must be positive",
    )?;
    check_param(
        profile.rest_duration.0 >= 0.0,
        "rest duration cannot be negative",
    )?;
    check_param(cycle_count >= 1, "cycle count must be at least 1")?;

    let discharge = ProtocolStep::Discharge {
        rate: profile.discharge_rate,
        duration: profile.active_duration,
    };
    let block = vec![
        discharge,
        ProtocolStep::Rest {
            window: RestWindow::Hourly(RECOVERY_REST),
        },
        discharge,
        ProtocolStep::Rest {
            window: RestWindow::Short(SHORT_REST),
        },
        ProtocolStep::Charge {
            rate: CHARGE_RATE,
            until: CHARGE_LIMIT,
        },
        ProtocolStep::Hold {
            voltage: CHARGE_LIMIT,
            cutoff: HOLD_CUTOFF,
        },
        ProtocolStep::Rest {
            window: RestWindow::Hourly(profile.rest_duration),
        },
    ];

    Ok(ExperimentProtocol { block, cycle_count })
}
