//! Use cases
//!
//! - [`GetTemperatureFromCepUseCase`]: service B's CEP → city → temperature pipeline
//! - [`GetTemperatureFromServerBUseCase`]: service A's relay to service B

pub mod temperature_from_cep;
pub mod temperature_from_server_b;

pub use temperature_from_cep::GetTemperatureFromCepUseCase;
pub use temperature_from_server_b::GetTemperatureFromServerBUseCase;
