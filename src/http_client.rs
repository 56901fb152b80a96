//! Shared outbound HTTP client construction

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

/// User agent sent on every upstream call
pub const USER_AGENT: &str = concat!("cep-temperature/", env!("CARGO_PKG_VERSION"));

/// Build a client whose `timeout` bounds each whole call (connect, send, body)
pub fn build(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")
}
