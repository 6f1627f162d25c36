// src/units.rs

use core::fmt;

/// Display unit for temperature values.
///
/// Readings are always stored in Celsius internally; conversion happens only
/// at the point a value is rendered into a response line.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TempUnit {
    /// Parses the single-letter protocol symbol (`C`, `F`, `K`).
    ///
    /// Input lines are uppercased before dispatch, so only the uppercase
    /// forms are accepted here.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "C" => Some(TempUnit::Celsius),
            "F" => Some(TempUnit::Fahrenheit),
            "K" => Some(TempUnit::Kelvin),
            _ => None,
        }
    }

    /// Protocol symbol used in `CONF:UNIT?` replies.
    pub const fn symbol(&self) -> &'static str {
        match self {
            TempUnit::Celsius => "C",
            TempUnit::Fahrenheit => "F",
            TempUnit::Kelvin => "K",
        }
    }

    /// Converts a canonical Celsius value into this display unit.
    pub fn from_celsius(&self, celsius: f32) -> f32 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TempUnit::Kelvin => celsius + 273.15,
        }
    }

    /// Inverse of [`from_celsius`](Self::from_celsius).
    pub fn to_celsius(&self, value: f32) -> f32 {
        match self {
            TempUnit::Celsius => value,
            TempUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TempUnit::Kelvin => value - 273.15,
        }
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
