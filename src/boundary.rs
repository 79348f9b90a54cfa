//! Conversion of discrete temperature traces into solver boundary conditions.
//!
//! The solver integrates over a dimensionless time variable; the boundary
//! condition maps that variable back onto the measured hourly trace through
//! the model timescale and interpolates linearly between samples.
use crate::temperature::TemperatureSeries;
use crate::units::{Kelvin, Seconds};

/// Seconds per hour, for mapping solver time onto the measured trace.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// A continuous ambient-temperature function over dimensionless solver time.
///
/// Queries outside the measured range hold the nearest boundary sample; the
/// trace is never extrapolated past its edges.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCondition {
    /// Sample times in hours, strictly increasing.
    times: Vec<f64>,
    /// Sample temperatures in kelvin.
    temperatures: Vec<f64>,
    /// Seconds per unit of the solver's internal time variable.
    timescale: f64,
}

impl BoundaryCondition {
    /// Build a boundary condition from a measured trace.
    ///
    /// # Arguments
    ///
    /// * `series` - The measured ambient-temperature trace
    /// * `timescale` - Seconds per unit of the solver's time variable
    pub fn new(series: &TemperatureSeries, timescale: Seconds) -> Self {
        let (times, temperatures) = series
            .samples()
            .iter()
            .map(|sample| (sample.time.0, sample.temperature.to_kelvin().0))
            .unzip();

        Self {
            times,
            temperatures,
            timescale: timescale.0,
        }
    }

    /// Ambient temperature at the given dimensionless solver time.
    pub fn ambient_temperature(&self, sim_time: f64) -> Kelvin {
        let hours = self.timescale * sim_time / SECONDS_PER_HOUR;
        self.ambient_temperature_at_hours(hours)
    }

    /// Ambient temperature at the given real time in hours.
    pub fn ambient_temperature_at_hours(&self, hours: f64) -> Kelvin {
        Kelvin(self.interpolate(hours))
    }

    /// The kelvin value of the first sample, used to seed the solver's
    /// initial condition.
    pub fn initial_temperature(&self) -> Kelvin {
        Kelvin(self.temperatures[0])
    }

    /// Linear interpolation with the edge values held beyond the sample range.
    fn interpolate(&self, hours: f64) -> f64 {
        if hours <= self.times[0] {
            return self.temperatures[0];
        }
        let last = self.times.len() - 1;
        if hours >= self.times[last] {
            return self.temperatures[last];
        }

        // First sample at or after the query time; in (1, last] by the edge
        // checks above.
        let hi = self.times.partition_point(|&t| t < hours);
        let lo = hi - 1;
        let fraction = (hours - self.times[lo]) / (self.times[hi] - self.times[lo]);
        self.temperatures[lo] + fraction * (self.temperatures[hi] - self.temperatures[lo])
    }
}
