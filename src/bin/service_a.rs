//! Service A: `POST /temperatures`, relayed to service B

use std::sync::Arc;

use anyhow::Result;
use cep_temperature::{
    AppConfig, GetTemperatureFromServerBUseCase, ServiceBClient,
    api::{self, ServiceAState},
    metrics, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let service_name = config.service_name_or("service-a");
    let telemetry = telemetry::init(&config, service_name)?;
    metrics::init(&metrics::prefix_for(service_name));

    let service_b = ServiceBClient::new(&config.server_b_host, config.server_b_port)?;
    tracing::info!(
        host = %config.server_b_host,
        port = config.server_b_port,
        "Relaying to service B"
    );

    let state = ServiceAState {
        use_case: Arc::new(GetTemperatureFromServerBUseCase::new(Arc::new(service_b))),
    };

    let served = web::run(api::service_a_router(state), config.server_a_port).await;
    telemetry.shutdown();
    served
}
