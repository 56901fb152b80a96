//! Data models for the CEP temperature pipeline
//!
//! This module contains the per-request transfer objects:
//! - Location: Address record resolved from a postal code
//! - Temperature: Raw provider readings and the final three-scale report

pub mod location;
pub mod temperature;

// Re-export all public types for convenient access
pub use location::Location;
pub use temperature::{
    TemperatureReport, TemperatureSample, celsius_to_fahrenheit, celsius_to_kelvin,
    format_temperature,
};
