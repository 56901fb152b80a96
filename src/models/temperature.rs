//! Temperature readings and the three-scale report

use serde::{Deserialize, Serialize};

/// Raw reading from the weather provider
///
/// Only `celsius` is trusted downstream; the report derives the other
/// scales from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    /// Temperature in Celsius
    pub celsius: f64,
    /// Temperature in Fahrenheit as reported by the provider
    pub fahrenheit: f64,
}

/// Convert Celsius to Fahrenheit
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Convert Celsius to Kelvin (integer offset, as served by the API)
#[must_use]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.0
}

/// Format a temperature with exactly two decimal places
#[must_use]
pub fn format_temperature(value: f64) -> String {
    format!("{value:.2}")
}

/// Final result served by both services
///
/// Values stay numeric in memory and are rendered as fixed-point strings
/// only when serialized (`{"city", "temp_C", "temp_F", "temp_K"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReport {
    pub city: String,
    #[serde(rename = "temp_C", with = "fixed_point")]
    pub celsius: f64,
    #[serde(rename = "temp_F", with = "fixed_point")]
    pub fahrenheit: f64,
    #[serde(rename = "temp_K", with = "fixed_point")]
    pub kelvin: f64,
}

impl TemperatureReport {
    /// Build a report where every scale derives from the same Celsius value
    #[must_use]
    pub fn from_celsius(city: impl Into<String>, celsius: f64) -> Self {
        Self {
            city: city.into(),
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
            kelvin: celsius_to_kelvin(celsius),
        }
    }

    #[must_use]
    pub fn celsius_text(&self) -> String {
        format_temperature(self.celsius)
    }

    #[must_use]
    pub fn fahrenheit_text(&self) -> String {
        format_temperature(self.fahrenheit)
    }

    #[must_use]
    pub fn kelvin_text(&self) -> String {
        format_temperature(self.kelvin)
    }
}

/// Serde adapter: `f64` on our side, `"%.2f"` string on the wire.
/// Plain JSON numbers are accepted when reading.
mod fixed_point {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::format_temperature;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_temperature(*value))
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Number(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Wire::deserialize(deserializer)? {
            Wire::Number(value) => Ok(value),
            Wire::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|e| D::Error::custom(format!("invalid temperature {text:?}: {e}"))),
        }
    }
}
