//! WeatherAPI (weatherapi.com) current-conditions provider

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{Instrument, debug, info, info_span, warn};

use super::TemperatureProvider;
use crate::{Result, TemperatureError, TraceContext, http_client, models::TemperatureSample};

const ORIGIN: &str = "weather_api_provider.fetch_temperature_by_city";

/// Current weather response from WeatherAPI
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    #[serde(default)]
    last_updated: Option<String>,
    temp_c: f64,
    temp_f: f64,
}

/// Temperature provider backed by WeatherAPI's `current.json` endpoint
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    client: Client,
    api_key: String,
    api_url: String,
}

impl WeatherApiProvider {
    /// Create a provider for `api_url` (e.g. `https://api.weatherapi.com/v1/current.json`)
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self::with_client(api_key, api_url, http_client::build(timeout)?))
    }

    /// Create a provider reusing an existing client
    pub fn with_client(api_key: impl Into<String>, api_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }

    fn url_for(&self, city: &str) -> String {
        format!(
            "{}?key={}&q={}&aqi=no",
            self.api_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(city)
        )
    }

    async fn fetch(&self, ctx: &TraceContext, city: &str) -> Result<TemperatureSample> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.url_for(city))
            .headers(ctx.headers())
            .send()
            .await
            .map_err(|e| TemperatureError::transport(ORIGIN, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "WeatherAPI status not ok");
            return Err(TemperatureError::upstream_status(ORIGIN, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TemperatureError::transport(ORIGIN, e))?;
        let payload: CurrentResponse =
            serde_json::from_slice(&body).map_err(|e| TemperatureError::decode(ORIGIN, e))?;

        debug!(
            last_updated = payload.current.last_updated.as_deref().unwrap_or("unknown"),
            "WeatherAPI reading"
        );
        info!(
            "Retrieved current temperature for '{}' in {:.3}s",
            city,
            start_time.elapsed().as_secs_f64()
        );

        Ok(TemperatureSample {
            celsius: payload.current.temp_c,
            fahrenheit: payload.current.temp_f,
        })
    }
}

#[async_trait]
impl TemperatureProvider for WeatherApiProvider {
    async fn fetch_temperature_by_city(
        &self,
        ctx: &TraceContext,
        city: &str,
    ) -> Result<TemperatureSample> {
        let span = info_span!("weather_api_provider.fetch_temperature_by_city", city = %city);
        let ctx = ctx.child(&span);
        self.fetch(&ctx, city).instrument(span).await
    }
}
