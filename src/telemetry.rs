//! Logging and OpenTelemetry tracing initialization
//!
//! Installs a `tracing_subscriber` registry (env filter + pretty/json
//! output) and, when an OTLP endpoint is configured, an OpenTelemetry layer
//! exporting spans over OTLP/HTTP. The W3C propagator is always installed.

use anyhow::{Context, Result};
use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::{Resource, propagation::TraceContextPropagator, trace::SdkTracerProvider};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::AppConfig;

const TRACES_PATH: &str = "/v1/traces";

/// Keeps the tracer provider alive; call [`TelemetryGuard::shutdown`] on exit
#[must_use = "dropping the guard without shutdown() may lose buffered spans"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are exported to a collector
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush buffered spans and stop the exporter
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Tracer provider shutdown failed");
            } else {
                tracing::info!("Tracer provider shut down");
            }
        }
    }
}

/// OTLP/HTTP wants the signal path; accept a bare collector address too
fn traces_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    if endpoint.ends_with(TRACES_PATH) {
        endpoint.to_string()
    } else {
        format!("{endpoint}{TRACES_PATH}")
    }
}

fn build_resource(service_name: &str) -> Resource {
    Resource::builder_empty()
        .with_attributes([
            KeyValue::new(SERVICE_NAME, service_name.to_string()),
            KeyValue::new(SERVICE_VERSION, crate::VERSION),
        ])
        .build()
}

fn build_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(traces_endpoint(endpoint))
        .build()
        .with_context(|| format!("Failed to build OTLP exporter for {endpoint}"))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(build_resource(service_name))
        .build())
}

/// Initialize logging and tracing for `service_name`
pub fn init(config: &AppConfig, service_name: &str) -> Result<TelemetryGuard> {
    // Set W3C propagator for trace-context propagation
    global::set_text_map_propagator(TraceContextPropagator::new());

    let provider = config
        .otel_endpoint
        .as_deref()
        .map(|endpoint| build_provider(service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name.to_string()))
    });

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log level '{}'", config.log_level))?;

    let json = config.log_format == "json";
    let json_layer = json.then(|| fmt::layer().json().with_current_span(true));
    let pretty_layer = (!json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(json_layer)
        .with(pretty_layer)
        .with(filter)
        .try_init()
        .with_context(|| "Failed to install tracing subscriber")?;

    match &config.otel_endpoint {
        Some(endpoint) => tracing::info!(service = service_name, %endpoint, "Exporting spans via OTLP"),
        None => tracing::info!(service = service_name, "OTLP exporter disabled; logging only"),
    }

    Ok(TelemetryGuard { provider })
}
