//! Temperature relay (service A)

use std::sync::Arc;

use tracing::{Instrument, info_span};

use crate::{Result, TemperatureByCepProvider, TraceContext, models::TemperatureReport};

const ORIGIN: &str = "get_temperature_from_serverb_use_case.execute";

/// Delegates to service B and surfaces its result unchanged
#[derive(Clone)]
pub struct GetTemperatureFromServerBUseCase {
    temperature_by_cep_provider: Arc<dyn TemperatureByCepProvider>,
}

impl GetTemperatureFromServerBUseCase {
    pub fn new(temperature_by_cep_provider: Arc<dyn TemperatureByCepProvider>) -> Self {
        Self {
            temperature_by_cep_provider,
        }
    }

    pub async fn execute(&self, ctx: &TraceContext, cep: &str) -> Result<TemperatureReport> {
        let span = info_span!("get_temperature_from_serverb_use_case.execute", cep = %cep);
        let ctx = ctx.child(&span);
        self.temperature_by_cep_provider
            .fetch_temperature_by_cep(&ctx, cep)
            .instrument(span)
            .await
            .map_err(|err| err.context(ORIGIN))
    }
}
