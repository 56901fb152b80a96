//! W3C trace context carried explicitly through the pipeline
//!
//! Every resolver and use case takes a `&TraceContext`. It wraps the
//! OpenTelemetry [`Context`] of the caller, parents the callee's span to it
//! and injects the `traceparent`/`tracestate` headers into outbound requests.

use std::sync::LazyLock;

use http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::{
    Context,
    propagation::{Extractor, Injector, TextMapPropagator},
    trace::TraceContextExt,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

static PROPAGATOR: LazyLock<TraceContextPropagator> = LazyLock::new(TraceContextPropagator::new);

struct HeadersExtractor<'a>(&'a HeaderMap);

impl Extractor for HeadersExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

struct HeadersInjector<'a>(&'a mut HeaderMap);

impl Injector for HeadersInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(val)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, val);
        }
    }
}

/// Trace context of one request, passed by reference down the call chain
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    cx: Context,
}

impl TraceContext {
    /// A context with no parent; outbound calls start a fresh trace
    #[must_use]
    pub fn root() -> Self {
        Self { cx: Context::new() }
    }

    /// Extract the remote parent from inbound W3C headers
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            cx: PROPAGATOR.extract(&HeadersExtractor(headers)),
        }
    }

    /// Context for an inbound request handled inside `span`.
    ///
    /// Prefers the span's own OpenTelemetry context (already parented by the
    /// HTTP layer); falls back to the raw headers when no OpenTelemetry layer
    /// is installed, so the inbound trace id is still forwarded.
    #[must_use]
    pub fn for_request(span: &Span, headers: &HeaderMap) -> Self {
        let cx = span.context();
        if cx.span().span_context().is_valid() {
            Self { cx }
        } else {
            Self::from_headers(headers)
        }
    }

    /// Parent `span` to this context and return the context of the child
    #[must_use]
    pub fn child(&self, span: &Span) -> Self {
        let _ = span.set_parent(self.cx.clone());
        let cx = span.context();
        if cx.span().span_context().is_valid() {
            Self { cx }
        } else {
            self.clone()
        }
    }

    /// Inject `traceparent`/`tracestate` into outbound request headers
    pub fn inject(&self, headers: &mut HeaderMap) {
        PROPAGATOR.inject_context(&self.cx, &mut HeadersInjector(headers));
    }

    /// Outbound headers carrying only this trace context
    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        self.inject(&mut headers);
        headers
    }

    /// Hex trace id, when this context belongs to a sampled or remote trace
    #[must_use]
    pub fn trace_id(&self) -> Option<String> {
        let span = self.cx.span();
        let span_context = span.span_context();
        span_context
            .is_valid()
            .then(|| span_context.trace_id().to_string())
    }

    /// The wrapped OpenTelemetry context
    #[must_use]
    pub fn otel_context(&self) -> &Context {
        &self.cx
    }
}

/// Parse trace ID from W3C traceparent header (format: "00-{trace_id}-{span_id}-{flags}")
pub fn parse_trace_id(traceparent: &str) -> Option<String> {
    let parts: Vec<&str> = traceparent.split('-').collect();
    if parts.len() >= 4 && parts[0] == "00" {
        Some(parts[1].to_string())
    } else {
        None
    }
}
