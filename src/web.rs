//! HTTP server plumbing shared by both binaries

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use tokio::{net::TcpListener, sync::watch};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{Span, field::Empty, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::{TraceContext, metrics};

/// In-flight requests get this long to finish once shutdown starts
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(7);

/// Wrap a service router with request tracing, metrics and panic recovery.
///
/// Each request runs inside an `http_request` span parented to the
/// inbound `traceparent`, so handler spans join the caller's trace.
pub fn app(router: Router) -> Router {
    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    let span = tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        status = Empty,
                        latency_ms = Empty,
                        "http.method" = %req.method(),
                        "http.target" = %req.uri().path(),
                        "user_agent.original" = req
                            .headers()
                            .get("user-agent")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("unknown"),
                    );

                    let parent = TraceContext::from_headers(req.headers());
                    let _ = span.set_parent(parent.otel_context().clone());
                    span
                })
                .on_response(|res: &Response<Body>, latency: Duration, span: &Span| {
                    let status = res.status().as_u16();
                    let latency_ms = latency.as_millis();
                    span.record("status", status);
                    span.record("latency_ms", latency_ms);
                    info!(status, latency_ms, "request completed");
                }),
        )
        .layer(metrics::layer())
        .layer(CatchPanicLayer::new())
}

/// Bind `0.0.0.0:port` and serve until SIGINT/SIGTERM
pub async fn run(router: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on {addr}");

    serve(listener, router, shutdown_signal()).await
}

/// Serve `router` on `listener` until `signal` resolves, then drain
///
/// Stops accepting connections as soon as `signal` fires and waits at most
/// [`SHUTDOWN_GRACE`] for in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let server = axum::serve(listener, app(router)).with_graceful_shutdown(async move {
        let _ = stop_rx.changed().await;
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        res = &mut server => {
            return res
                .context("HTTP server task panicked")?
                .context("HTTP server failed");
        }
        () = signal => {}
    }

    info!("Shutting down; draining in-flight requests");
    let _ = stop_tx.send(true);

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(res) => res
            .context("HTTP server task panicked")?
            .context("HTTP server failed")?,
        Err(_) => warn!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "Shutdown grace period elapsed; dropping remaining connections"
        ),
    }

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C"),
        () = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get};
    use tokio::sync::oneshot;

    fn panicking_router() -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/boom", get(boom))
    }

    async fn boom() -> &'static str {
        panic!("handler blew up")
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        use tower::ServiceExt;

        let response = app(panicking_router())
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_each_request_is_logged() {
        use tower::ServiceExt;

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = app(panicking_router())
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("request completed"), "logs: {output}");
        assert!(output.contains("status=200"), "logs: {output}");
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve(listener, panicking_router(), async move {
            let _ = rx.await;
        }));

        let body = reqwest::get(format!("http://{addr}/ok"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
