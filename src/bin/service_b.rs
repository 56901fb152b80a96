//! Service B: `GET /temperatures/{cep}` backed by ViaCEP and WeatherAPI

use std::sync::Arc;

use anyhow::Result;
use cep_temperature::{
    AppConfig, GetTemperatureFromCepUseCase, ViaCepLocationProvider, WeatherApiProvider,
    api::{self, ServiceBState},
    metrics, telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    let service_name = config.service_name_or("service-b");
    let telemetry = telemetry::init(&config, service_name)?;
    metrics::init(&metrics::prefix_for(service_name));

    config.validate_weather_api_key()?;

    let location_provider =
        ViaCepLocationProvider::new(&config.via_cep_api_url, config.upstream_timeout())?;
    let temperature_provider = WeatherApiProvider::new(
        &config.weather_api_key,
        &config.weather_api_url,
        config.upstream_timeout(),
    )?;

    let state = ServiceBState {
        use_case: Arc::new(GetTemperatureFromCepUseCase::new(
            Arc::new(location_provider),
            Arc::new(temperature_provider),
        )),
    };

    let served = web::run(api::service_b_router(state), config.server_b_port).await;
    telemetry.shutdown();
    served
}
