//! Prometheus HTTP metrics exposed at `/metrics` by both services
//!
//! Collected per request (labels: method, endpoint, status):
//! - `<prefix>_http_request_total` counter
//! - `<prefix>_http_requests_duration_seconds` histogram
//! - `<prefix>_http_requests_pending` gauge

use axum::routing::{MethodRouter, get};
use prometheus_axum_middleware::PrometheusAxumLayer;

/// Scrape endpoint mounted on both routers
pub const METRICS_PATH: &str = "/metrics";

/// Set the metric name prefix; call once before the first request is served
pub fn init(prefix: &str) {
    prometheus_axum_middleware::set_prefix(prefix);
    tracing::info!(prefix, "Prometheus metrics initialized");
}

/// Metric names only allow `[a-zA-Z0-9_]`; `service-b` becomes `service_b`
#[must_use]
pub fn prefix_for(service_name: &str) -> String {
    service_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Middleware recording request count, latency and in-flight requests
#[must_use]
pub fn layer() -> PrometheusAxumLayer {
    PrometheusAxumLayer::new()
}

/// Handler rendering the registry in Prometheus text format
pub fn endpoint() -> MethodRouter {
    get(prometheus_axum_middleware::render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[test]
    fn test_prefix_for() {
        assert_eq!(prefix_for("service-b"), "service_b");
        assert_eq!(prefix_for("cep.temperature a"), "cep_temperature_a");
    }

    #[tokio::test]
    async fn test_requests_are_counted_and_scraped() {
        let app = crate::web::app(
            Router::new()
                .route("/ok", get(|| async { "ok" }))
                .route(METRICS_PATH, endpoint()),
        );

        let response = app
            .clone()
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get(METRICS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("# TYPE"), "no metric families in: {text}");
        assert!(text.contains("http_request"), "no http metrics in: {text}");
    }
}
