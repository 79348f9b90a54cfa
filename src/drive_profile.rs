//! Drive profiles: named discharge usage patterns.
use crate::id::define_id_type;
use crate::units::{CRate, Hours, Seconds};
use indexmap::IndexMap;

define_id_type!(DriveProfileID);

/// A named discharge usage pattern.
///
/// Loaded once at startup and shared read-only by every scenario that
/// references it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveProfileSpec {
    /// Discharge rate applied during each active window.
    pub discharge_rate: CRate,
    /// Length of one active discharge window.
    pub active_duration: Seconds,
    /// Scenario-specific relaxation period at the end of each cycle.
    pub rest_duration: Hours,
}

/// A map of drive profiles, keyed and ordered by id.
///
/// Map order is the enumeration order of scenarios, so it must be stable
/// across runs with the same input file.
pub type DriveProfileMap = IndexMap<DriveProfileID, DriveProfileSpec>;
