//! `cep-temperature` - current temperature for a Brazilian postal code
//!
//! This library provides the two cooperating services of the system:
//! service A validates a CEP and relays it to service B, and service B
//! resolves the CEP to a city (ViaCEP) and the city to a temperature
//! (WeatherAPI). The W3C trace context travels along every outbound call.

pub mod api;
pub mod cep;
pub mod config;
pub mod error;
pub mod http_client;
pub mod location;
pub mod metrics;
pub mod models;
pub mod remote;
pub mod telemetry;
pub mod trace_context;
pub mod usecase;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::AppConfig;
pub use error::{ErrorKind, TemperatureError};
pub use location::{LocationProvider, ViaCepLocationProvider};
pub use models::{Location, TemperatureReport, TemperatureSample};
pub use remote::{ServiceBClient, TemperatureByCepProvider};
pub use trace_context::TraceContext;
pub use usecase::{GetTemperatureFromCepUseCase, GetTemperatureFromServerBUseCase};
pub use weather::{TemperatureProvider, WeatherApiProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TemperatureError>;
