//! Location resolution
//!
//! Maps a postal code to an address record. The pipeline only depends on the
//! [`LocationProvider`] capability; [`ViaCepLocationProvider`] is the
//! production implementation.

use async_trait::async_trait;

use crate::{Result, TraceContext, models::Location};

pub mod viacep;

pub use viacep::ViaCepLocationProvider;

/// Capability to resolve a postal code into a [`Location`]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Resolve `cep`; signals `LocationNotFound` when the provider has no record
    async fn fetch_location_by_cep(&self, ctx: &TraceContext, cep: &str) -> Result<Location>;
}
