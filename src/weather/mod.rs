//! Weather lookup by city name
//!
//! The pipeline depends on the [`TemperatureProvider`] capability;
//! [`WeatherApiProvider`] talks to weatherapi.com.

use async_trait::async_trait;

use crate::{Result, TraceContext, models::TemperatureSample};

pub mod weather_api;

pub use weather_api::WeatherApiProvider;

/// Capability to read the current temperature of a city
#[async_trait]
pub trait TemperatureProvider: Send + Sync {
    async fn fetch_temperature_by_city(
        &self,
        ctx: &TraceContext,
        city: &str,
    ) -> Result<TemperatureSample>;
}
