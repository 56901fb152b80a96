//! HTTP boundary for both services
//!
//! Service B: `GET /temperatures/{cep}`. Service A: `POST /temperatures`
//! with `{"cep": "..."}`. Both answer 200 with the JSON report, 404 when the
//! CEP is unknown, 422 when it is malformed and 500 otherwise.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{Span, error, info};

use crate::{
    GetTemperatureFromCepUseCase, GetTemperatureFromServerBUseCase, TemperatureError,
    TraceContext, cep,
    metrics::{self, METRICS_PATH},
    models::TemperatureReport,
};

/// Heartbeat endpoint exposed by both services
pub const HEALTH_CHECK_PATH: &str = "/health-check";

/// Service A request body
#[derive(Debug, Serialize, Deserialize)]
pub struct TemperatureRequest {
    #[serde(default)]
    pub cep: String,
}

impl IntoResponse for TemperatureError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            info!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, self.user_message()).into_response()
    }
}

/// Shared state for service B
#[derive(Clone)]
pub struct ServiceBState {
    pub use_case: Arc<GetTemperatureFromCepUseCase>,
}

/// Shared state for service A
#[derive(Clone)]
pub struct ServiceAState {
    pub use_case: Arc<GetTemperatureFromServerBUseCase>,
}

pub fn service_b_router(state: ServiceBState) -> Router {
    Router::new()
        .route("/temperatures/{cep}", get(get_temperature_from_cep))
        .route(HEALTH_CHECK_PATH, get(health_check))
        .with_state(state)
        .route(METRICS_PATH, metrics::endpoint())
}

pub fn service_a_router(state: ServiceAState) -> Router {
    Router::new()
        .route("/temperatures", post(get_temperature_from_server_b))
        .route(HEALTH_CHECK_PATH, get(health_check))
        .with_state(state)
        .route(METRICS_PATH, metrics::endpoint())
}

async fn health_check() -> &'static str {
    "."
}

async fn get_temperature_from_cep(
    State(state): State<ServiceBState>,
    cep: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Json<TemperatureReport>, TemperatureError> {
    let ctx = TraceContext::for_request(&Span::current(), &headers);
    // An undecodable segment can never be a valid CEP
    let Path(cep) = cep.map_err(|rejection| {
        info!(error = %rejection, "Error decoding path");
        TemperatureError::InvalidInput
    })?;
    let cep = cep::validate(&cep)?;

    let report = state.use_case.execute(&ctx, cep).await?;
    Ok(Json(report))
}

async fn get_temperature_from_server_b(
    State(state): State<ServiceAState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, TemperatureError> {
    let ctx = TraceContext::for_request(&Span::current(), &headers);

    let input: TemperatureRequest = match serde_json::from_slice(&body) {
        Ok(input) => input,
        Err(e) => {
            info!(error = %e, "Error decoding input");
            return Ok((StatusCode::BAD_REQUEST, e.to_string()).into_response());
        }
    };
    let cep = cep::validate(&input.cep)?;

    let report = state.use_case.execute(&ctx, cep).await?;
    Ok(Json(report).into_response())
}
