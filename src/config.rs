//! Configuration management for both services
//!
//! Handles loading configuration from an optional file and environment
//! variables, and provides validation for all configuration settings.

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "CEP_TEMPERATURE_CONFIG";

/// Environment variables read into [`AppConfig`]; nothing else in the
/// process environment is consulted
pub const ENV_KEYS: &[&str] = &[
    "WEATHER_API_KEY",
    "WEATHER_API_URL",
    "VIA_CEP_API_URL",
    "SERVER_A_PORT",
    "SERVER_B_PORT",
    "SERVER_B_HOST",
    "SERVICE_NAME",
    "OTEL_ENDPOINT",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "UPSTREAM_TIMEOUT_SECONDS",
];

/// Root configuration shared by service A and service B
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// WeatherAPI key (required by service B)
    #[serde(default)]
    pub weather_api_key: String,
    /// WeatherAPI current-conditions endpoint
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,
    /// ViaCEP base URL; the CEP and `/json` are appended
    #[serde(default = "default_via_cep_api_url")]
    pub via_cep_api_url: String,
    #[serde(default = "default_server_a_port")]
    pub server_a_port: u16,
    #[serde(default = "default_server_b_port")]
    pub server_b_port: u16,
    /// Host name service A uses to reach service B
    #[serde(default = "default_server_b_host")]
    pub server_b_host: String,
    /// Name reported to the tracing backend; binaries supply a default
    #[serde(default)]
    pub service_name: Option<String>,
    /// OTLP/HTTP collector endpoint; exporting is off when unset
    #[serde(default)]
    pub otel_endpoint: Option<String>,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Timeout for each ViaCEP / WeatherAPI call
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_seconds: u64,
}

// Default value functions
fn default_weather_api_url() -> String {
    "https://api.weatherapi.com/v1/current.json".to_string()
}

fn default_via_cep_api_url() -> String {
    "https://viacep.com.br/ws/".to_string()
}

fn default_server_a_port() -> u16 {
    8080
}

fn default_server_b_port() -> u16 {
    8081
}

fn default_server_b_host() -> String {
    "goserverb".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

/// Flat names as deployed (`WEATHER_API_KEY`, `SERVER_B_HOST`, ...).
///
/// Values stay strings; numeric fields are parsed during deserialization,
/// so an all-digit API key is still read as text.
fn known_environment() -> Environment {
    let vars: Map<String, String> = ENV_KEYS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect();
    Environment::default().source(Some(vars))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            weather_api_key: String::new(),
            weather_api_url: default_weather_api_url(),
            via_cep_api_url: default_via_cep_api_url(),
            server_a_port: default_server_a_port(),
            server_b_port: default_server_b_port(),
            server_b_host: default_server_b_host(),
            service_name: None,
            otel_endpoint: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
            upstream_timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path (default `app.toml`)
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from("app.toml"));

        let settings = Config::builder()
            .add_source(
                File::from(config_file)
                    .required(false)
                    .format(FileFormat::Toml),
            )
            .add_source(known_environment())
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather_api_url.is_empty() {
            self.weather_api_url = default_weather_api_url();
        }
        if self.via_cep_api_url.is_empty() {
            self.via_cep_api_url = default_via_cep_api_url();
        }
        if self.server_b_host.is_empty() {
            self.server_b_host = default_server_b_host();
        }
        if self.log_level.is_empty() {
            self.log_level = default_log_level();
        }
        if self.log_format.is_empty() {
            self.log_format = default_log_format();
        }
        if self.otel_endpoint.as_deref().is_some_and(str::is_empty) {
            self.otel_endpoint = None;
        }
        if self.service_name.as_deref().is_some_and(str::is_empty) {
            self.service_name = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Service B cannot reach WeatherAPI without a key
    pub fn validate_weather_api_key(&self) -> Result<()> {
        if self.weather_api_key.trim().is_empty() {
            bail!("WEATHER_API_KEY is required to start service B");
        }
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        for (name, url) in [
            ("WEATHER_API_URL", self.weather_api_url.as_str()),
            ("VIA_CEP_API_URL", self.via_cep_api_url.as_str()),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{name} must be a valid HTTP or HTTPS URL, got '{url}'");
            }
        }

        if let Some(endpoint) = &self.otel_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                bail!("OTEL_ENDPOINT must be a valid HTTP or HTTPS URL, got '{endpoint}'");
            }
        }

        if self.server_b_host.contains('/') || self.server_b_host.contains(' ') {
            bail!("SERVER_B_HOST must be a bare host name, got '{}'", self.server_b_host);
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server_a_port == 0 || self.server_b_port == 0 {
            bail!("Server ports must be non-zero");
        }

        if self.upstream_timeout_seconds == 0 {
            bail!("Upstream timeout must be at least 1 second");
        }

        if self.upstream_timeout_seconds > 300 {
            bail!("Upstream timeout cannot exceed 300 seconds");
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            );
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.log_format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: {}",
                self.log_format,
                valid_log_formats.join(", ")
            );
        }

        Ok(())
    }

    /// Service name, falling back to the binary's own name
    #[must_use]
    pub fn service_name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.service_name.as_deref().unwrap_or(fallback)
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}
