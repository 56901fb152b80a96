//! Remote temperature lookup (service A → service B)
//!
//! Service A never resolves anything itself: it asks service B's
//! `GET /temperatures/{cep}` and trusts its classification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{Instrument, debug, info_span, warn};

use crate::{Result, TemperatureError, TraceContext, http_client, models::TemperatureReport};

const ORIGIN: &str = "serverb_provider.fetch_temperature_by_cep";

/// Hard ceiling for one call to service B
pub const SERVICE_B_TIMEOUT: Duration = Duration::from_secs(10);

/// Capability to obtain a finished report for a postal code
#[async_trait]
pub trait TemperatureByCepProvider: Send + Sync {
    async fn fetch_temperature_by_cep(
        &self,
        ctx: &TraceContext,
        cep: &str,
    ) -> Result<TemperatureReport>;
}

/// HTTP client for service B
#[derive(Debug, Clone)]
pub struct ServiceBClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl ServiceBClient {
    /// Client for service B at `host:port`
    pub fn new(host: &str, port: u16) -> anyhow::Result<Self> {
        Self::with_base_url(format!("http://{host}:{port}"))
    }

    /// Client for service B at an explicit base URL, bounded by [`SERVICE_B_TIMEOUT`]
    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_base_url_and_timeout(base_url, SERVICE_B_TIMEOUT)
    }

    /// Client for service B with its own ceiling on each whole call
    pub fn with_base_url_and_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut client = Self::with_client(base_url, http_client::build(timeout)?);
        client.timeout = Some(timeout);
        Ok(client)
    }

    /// Client reusing an existing `reqwest::Client`; its timeout applies as-is
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout: None,
        }
    }

    /// Ceiling applied to each call, when this client built its own `reqwest::Client`
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn url_for(&self, cep: &str) -> String {
        format!("{}/temperatures/{}", self.base_url, urlencoding::encode(cep))
    }

    async fn fetch(&self, ctx: &TraceContext, cep: &str) -> Result<TemperatureReport> {
        let response = self
            .client
            .get(self.url_for(cep))
            .headers(ctx.headers())
            .send()
            .await
            .map_err(|e| TemperatureError::transport(ORIGIN, e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                debug!("Service B has no temperature for {}", cep);
                return Err(TemperatureError::not_found(ORIGIN));
            }
            status => {
                warn!(status = status.as_u16(), "Unexpected response from service B");
                return Err(TemperatureError::unexpected_response(ORIGIN, status.as_u16()));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TemperatureError::transport(ORIGIN, e))?;
        serde_json::from_slice(&body).map_err(|e| TemperatureError::decode(ORIGIN, e))
    }
}

#[async_trait]
impl TemperatureByCepProvider for ServiceBClient {
    async fn fetch_temperature_by_cep(
        &self,
        ctx: &TraceContext,
        cep: &str,
    ) -> Result<TemperatureReport> {
        let span = info_span!("serverb_provider.fetch_temperature_by_cep", cep = %cep);
        let ctx = ctx.child(&span);
        self.fetch(&ctx, cep).instrument(span).await
    }
}
