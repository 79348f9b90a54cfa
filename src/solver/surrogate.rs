//! A closed-form aging surrogate used for dry runs and pipeline tests.
//!
//! This is not a physics engine: capacity fade follows a square-root-of-
//! throughput law with a mild ambient-temperature acceleration, and the trace
//! is a two-point sketch per recorded cycle. That is enough to exercise
//! protocol handling, boundary-condition sampling, sparse recording and the
//! full output schema without linking a numerical solver.
use super::{CellSolver, RawSolution, SolveOutcome, SolveRequest};
use crate::error::ScenarioResult;
use crate::protocol::{ProtocolStep, RestWindow};

/// Rated cell capacity assumed by the surrogate, in ampere-hours.
const RATED_CAPACITY_AH: f64 = 5.0;

/// Initial lithium inventory, in moles.
const INITIAL_LITHIUM_MOL: f64 = 0.25;

/// Reference temperature for the aging acceleration factor.
const REFERENCE_TEMPERATURE_K: f64 = 298.15;

/// Pristine SEI thickness, in metres.
const INITIAL_SEI_THICKNESS_M: f64 = 5e-9;

/// Pristine crack length, in metres.
const INITIAL_CRACK_LENGTH_M: f64 = 2e-7;

/// Faraday constant, in coulombs per mole.
const FARADAY: f64 = 96485.332;

/// Convert an ampere-hour quantity to moles of lithium.
fn ah_to_mol(ah: f64) -> f64 {
    ah * 3600.0 / FARADAY
}

/// Rough wall-clock length of a protocol step, in hours.
fn estimated_step_hours(step: &ProtocolStep) -> f64 {
    match step {
        ProtocolStep::Discharge { duration, .. } => duration.0 / 3600.0,
        ProtocolStep::Rest {
            window: RestWindow::Hourly(duration),
        } => duration.0,
        ProtocolStep::Rest {
            window: RestWindow::Short(duration),
        } => duration.0 / 60.0,
        // A full recharge at rate C takes roughly 1/C hours
        ProtocolStep::Charge { rate, .. } => 1.0 / rate.0,
        ProtocolStep::Hold { .. } => 0.5,
    }
}

/// Aging state evaluated at one recorded cycle.
struct CycleAging {
    cycle: u32,
    throughput_ah: f64,
    sei_ah: f64,
    plating_ah: f64,
    sei_crack_ah: f64,
    lam_negative_pct: f64,
    lam_positive_pct: f64,
    ambient_k: f64,
}

impl CycleAging {
    fn side_reaction_ah(&self) -> f64 {
        self.sei_ah + self.plating_ah + self.sei_crack_ah
    }

    fn measured_capacity_ah(&self) -> f64 {
        (RATED_CAPACITY_AH - self.side_reaction_ah()).max(0.0)
    }

    fn lithium_lost_mol(&self) -> f64 {
        ah_to_mol(self.side_reaction_ah())
    }

    fn total_lithium_mol(&self) -> f64 {
        INITIAL_LITHIUM_MOL - self.lithium_lost_mol()
    }
}

/// The built-in surrogate engine.
pub struct SurrogateSolver;

impl SurrogateSolver {
    fn evaluate_cycle(request: &SolveRequest, cycle: u32, cycle_hours: f64) -> CycleAging {
        let block = request.protocol.cycle_block();
        let discharge_ah: f64 = block
            .iter()
            .filter_map(|step| match step {
                ProtocolStep::Discharge { rate, duration } => {
                    Some(rate.0 * RATED_CAPACITY_AH * duration.0 / 3600.0)
                }
                _ => None,
            })
            .sum();

        // Discharged capacity is recharged once per cycle
        let throughput_ah = 2.0 * discharge_ah * cycle as f64;

        let start_hours = (cycle - 1) as f64 * cycle_hours;
        let ambient_k = request
            .boundary
            .ambient_temperature_at_hours(start_hours)
            .0;

        // Warmer cells grow SEI faster; colder cells plate more
        let acceleration =
            (1.0 + 0.02 * (ambient_k - REFERENCE_TEMPERATURE_K)).clamp(0.25, 4.0);

        let sei_ah = 0.02 * acceleration * throughput_ah.sqrt();
        let plating_ah = 0.008 / acceleration * throughput_ah.sqrt();
        let sei_crack_ah = 0.2 * sei_ah;

        CycleAging {
            cycle,
            throughput_ah,
            sei_ah,
            plating_ah,
            sei_crack_ah,
            lam_negative_pct: 0.05 * throughput_ah.sqrt(),
            lam_positive_pct: 0.03 * throughput_ah.sqrt(),
            ambient_k,
        }
    }

    fn build_summary(cycles: &[CycleAging]) -> RawSolution {
        let mut raw = RawSolution::default();
        let mut insert = |name: &str, series: Vec<f64>| raw.insert_summary(name, series);
        let col = |f: fn(&CycleAging) -> f64| cycles.iter().map(f).collect::<Vec<_>>();

        insert("Cycle number", col(|c| c.cycle as f64));
        insert("Throughput capacity [A.h]", col(|c| c.throughput_ah));
        insert("Measured capacity [A.h]", col(CycleAging::measured_capacity_ah));
        insert(
            "Loss of lithium inventory [%]",
            col(|c| 100.0 * c.side_reaction_ah() / RATED_CAPACITY_AH),
        );
        insert(
            "Loss of lithium inventory, including electrolyte [%]",
            col(|c| 110.0 * c.side_reaction_ah() / RATED_CAPACITY_AH),
        );
        insert("Loss of capacity to lithium plating [A.h]", col(|c| c.plating_ah));
        insert("Loss of capacity to SEI [A.h]", col(|c| c.sei_ah));
        insert(
            "Total capacity lost to side reactions [A.h]",
            col(CycleAging::side_reaction_ah),
        );
        insert("Total lithium [mol]", col(CycleAging::total_lithium_mol));
        insert(
            "Total lithium in electrolyte [mol]",
            col(|c| 0.15 * c.total_lithium_mol()),
        );
        insert(
            "Total lithium in positive electrode [mol]",
            col(|c| 0.45 * 0.85 * c.total_lithium_mol()),
        );
        insert(
            "Positive electrode capacity [A.h]",
            col(|c| 1.1 * RATED_CAPACITY_AH * (1.0 - c.lam_positive_pct / 100.0)),
        );
        insert(
            "Loss of active material in positive electrode [%]",
            col(|c| c.lam_positive_pct),
        );
        insert(
            "Total lithium in negative electrode [mol]",
            col(|c| 0.55 * 0.85 * c.total_lithium_mol()),
        );
        insert(
            "Negative electrode capacity [A.h]",
            col(|c| 1.15 * RATED_CAPACITY_AH * (1.0 - c.lam_negative_pct / 100.0)),
        );
        insert(
            "Loss of active material in negative electrode [%]",
            col(|c| c.lam_negative_pct),
        );
        insert(
            "Total lithium in particles [mol]",
            col(|c| 0.85 * c.total_lithium_mol()),
        );
        insert("Total lithium lost [mol]", col(CycleAging::lithium_lost_mol));
        insert(
            "Total lithium lost from particles [mol]",
            col(|c| 0.9 * c.lithium_lost_mol()),
        );
        insert(
            "Total lithium lost from electrolyte [mol]",
            col(|c| 0.1 * c.lithium_lost_mol()),
        );
        insert(
            "Total lithium lost to side reactions [mol]",
            col(CycleAging::lithium_lost_mol),
        );
        insert("Loss of lithium to SEI [mol]", col(|c| ah_to_mol(c.sei_ah)));
        insert(
            "Loss of lithium to lithium plating [mol]",
            col(|c| ah_to_mol(c.plating_ah)),
        );
        insert(
            "Loss of lithium to SEI on cracks [mol]",
            col(|c| ah_to_mol(c.sei_crack_ah)),
        );

        raw
    }

    fn add_trace(raw: &mut RawSolution, request: &SolveRequest, cycles: &[CycleAging], cycle_hours: f64) {
        let load_current = request
            .protocol
            .cycle_block()
            .iter()
            .find_map(|step| match step {
                ProtocolStep::Discharge { rate, .. } => Some(rate.0 * RATED_CAPACITY_AH),
                _ => None,
            })
            .unwrap_or(0.0);

        let point_count = 2 * cycles.len();
        let mut time = Vec::with_capacity(point_count);
        let mut current = Vec::with_capacity(point_count);
        let mut voltage = Vec::with_capacity(point_count);
        let mut cell_temperature = Vec::with_capacity(point_count);
        let mut ambient = Vec::with_capacity(point_count);
        let mut crack_length = Vec::with_capacity(point_count);
        let mut sei_thickness = Vec::with_capacity(point_count);

        for state in cycles {
            let start_hours = (state.cycle - 1) as f64 * cycle_hours;
            let end_hours = start_hours + cycle_hours;
            let end_ambient = request.boundary.ambient_temperature_at_hours(end_hours).0;
            let fade = state.side_reaction_ah() / RATED_CAPACITY_AH;
            let crack = INITIAL_CRACK_LENGTH_M * (1.0 + 0.01 * state.throughput_ah.sqrt());
            let sei = INITIAL_SEI_THICKNESS_M * (1.0 + 0.2 * state.sei_ah);

            // Under load at the start of the cycle
            time.push(start_hours);
            current.push(-load_current);
            voltage.push(3.4 - 0.4 * fade);
            cell_temperature.push(state.ambient_k + 2.0);
            ambient.push(state.ambient_k);
            crack_length.push(crack);
            sei_thickness.push(sei);

            // At rest, fully recharged, at the end of the cycle
            time.push(end_hours);
            current.push(0.0);
            voltage.push(4.2);
            cell_temperature.push(end_ambient);
            ambient.push(end_ambient);
            crack_length.push(crack);
            sei_thickness.push(sei);
        }

        raw.insert_trace("Time [h]", time);
        raw.insert_trace("Current [A]", current);
        raw.insert_trace("Terminal voltage [V]", voltage);
        raw.insert_trace("X-averaged cell temperature [K]", cell_temperature);
        raw.insert_trace("Ambient temperature [K]", ambient);
        raw.insert_trace("X-averaged negative particle crack length [m]", crack_length);
        raw.insert_trace("X-averaged total SEI thickness [m]", sei_thickness);
    }
}

impl CellSolver for SurrogateSolver {
    fn solve(&self, request: &SolveRequest) -> ScenarioResult<SolveOutcome> {
        let cycle_hours: f64 = request
            .protocol
            .cycle_block()
            .iter()
            .map(estimated_step_hours)
            .sum();

        let cycles: Vec<CycleAging> = request
            .record_cycles
            .iter()
            .map(|&cycle| Self::evaluate_cycle(request, cycle, cycle_hours))
            .collect();

        let mut raw = Self::build_summary(&cycles);
        Self::add_trace(&mut raw, request, &cycles, cycle_hours);

        Ok(SolveOutcome::Complete(raw))
    }
}
