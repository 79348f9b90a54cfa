//! Ambient-temperature measurement traces.
use crate::error::{ScenarioError, ScenarioResult};
use crate::id::define_id_type;
use crate::units::{Celsius, Hours};
use float_cmp::approx_eq;
use std::path::Path;

define_id_type!(TemperatureSourceID);

impl TemperatureSourceID {
    /// Derive the source id from a file path: the base name without extension.
    pub fn from_path(path: &Path) -> ScenarioResult<Self> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                ScenarioError::Config(format!(
                    "temperature source path {} has no usable file name",
                    path.display()
                ))
            })?;

        Ok(stem.into())
    }
}

/// One ambient-temperature measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSample {
    /// Measurement time in hours from the start of the trace.
    pub time: Hours,
    /// Measured ambient temperature.
    pub temperature: Celsius,
}

/// An ordered ambient-temperature trace.
///
/// Samples are sorted by time on construction and must be strictly increasing
/// afterwards; a trace shorter than two samples cannot be interpolated.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSeries(Vec<TemperatureSample>);

impl TemperatureSeries {
    /// Construct a series from unordered samples, sorting by time.
    pub fn new(mut samples: Vec<TemperatureSample>) -> ScenarioResult<Self> {
        if samples.len() < 2 {
            return Err(ScenarioError::DataFormat(format!(
                "expected at least 2 samples, got {}",
                samples.len()
            )));
        }

        for sample in &samples {
            if !(sample.time.0.is_finite() && sample.temperature.0.is_finite()) {
                return Err(ScenarioError::DataFormat(format!(
                    "non-finite sample at t = {}",
                    sample.time
                )));
            }
        }

        samples.sort_by(|a, b| a.time.0.total_cmp(&b.time.0));
        for pair in samples.windows(2) {
            if approx_eq!(f64, pair[0].time.0, pair[1].time.0, ulps = 2) {
                return Err(ScenarioError::DataFormat(format!(
                    "duplicate timestamp at t = {}",
                    pair[0].time
                )));
            }
        }

        Ok(Self(samples))
    }

    /// The samples in time order.
    pub fn samples(&self) -> &[TemperatureSample] {
        &self.0
    }

    /// The earliest sample.
    pub fn first(&self) -> TemperatureSample {
        self.0[0]
    }
}
