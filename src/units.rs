#![allow(missing_docs)]

//! Newtypes for the physical quantities flowing through protocol and boundary
//! construction.
//!
//! The `Display` impls render the spelling used in protocol instruction text,
//! e.g. `CRate(0.5)` displays as "0.5C".
use derive_more::Display;
use serde::Deserialize;

/// A charge/discharge rate normalised to the cell's rated capacity.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0}C")]
pub struct CRate(pub f64);

/// A duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0} seconds")]
pub struct Seconds(pub f64);

/// A duration in minutes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0} minutes")]
pub struct Minutes(pub f64);

/// A duration in hours.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0} hours")]
pub struct Hours(pub f64);

/// An electric potential in volts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0}V")]
pub struct Volts(pub f64);

/// A current in milliamperes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0}mA")]
pub struct Milliamps(pub f64);

/// A temperature in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0}degC")]
pub struct Celsius(pub f64);

/// A temperature in kelvin.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Display)]
#[display("{_0}K")]
pub struct Kelvin(pub f64);

/// Offset between the Celsius and kelvin scales.
const CELSIUS_TO_KELVIN_OFFSET: f64 = 273.15;

impl Celsius {
    /// Convert to kelvin.
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + CELSIUS_TO_KELVIN_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_spelling() {
        assert_eq!(CRate(0.5).to_string(), "0.5C");
        assert_eq!(Seconds(1800.0).to_string(), "1800 seconds");
        assert_eq!(Minutes(20.0).to_string(), "20 minutes");
        assert_eq!(Hours(9.0).to_string(), "9 hours");
        assert_eq!(Volts(4.2).to_string(), "4.2V");
        assert_eq!(Milliamps(10.0).to_string(), "10mA");
    }

    #[test]
    fn test_celsius_to_kelvin() {
        assert_eq!(Celsius(25.0).to_kelvin(), Kelvin(298.15));
        assert_eq!(Celsius(-273.15).to_kelvin(), Kelvin(0.0));
    }
}
