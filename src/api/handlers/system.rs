//! Health, status and metrics handlers.

use axum::{
    Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use super::unix_timestamp;
use crate::api::AppState;
use crate::mcp::MetricsSnapshot;
use crate::upstream::UpstreamRequest;

/// Result of probing the OpenMetadata server
#[derive(Serialize, ToSchema)]
pub struct UpstreamHealth {
    #[schema(example = "healthy")]
    pub status: String,
    /// Version document returned by OpenMetadata
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when OpenMetadata answers, `unhealthy` otherwise
    #[schema(example = "healthy")]
    pub status: String,
    pub openmetadata: UpstreamHealth,
    pub uptime_seconds: u64,
    pub timestamp: f64,
}

#[derive(Serialize, ToSchema)]
pub struct ServerSummary {
    #[schema(example = "0.3.0")]
    pub version: String,
    pub uptime_seconds: u64,
    #[schema(example = "production")]
    pub environment: String,
    pub error_reporting: bool,
}

#[derive(Serialize, ToSchema)]
pub struct AuthSummary {
    pub required: bool,
    pub token_endpoint: bool,
    pub google_login: bool,
}

/// Detailed status response
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub server: ServerSummary,
    pub openmetadata: UpstreamHealth,
    pub tool_count: usize,
    pub groups: Vec<String>,
    pub metrics: MetricsSnapshot,
    pub auth: AuthSummary,
    pub timestamp: f64,
}

/// Server statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_tools: usize,
    pub groups: Vec<String>,
    pub metrics: MetricsSnapshot,
    /// Uptime in seconds
    pub uptime: f64,
}

async fn probe_upstream(state: &AppState) -> UpstreamHealth {
    match state
        .executor()
        .upstream()
        .send(UpstreamRequest::get(["system", "version"]))
        .await
    {
        Ok(details) => UpstreamHealth {
            status: "healthy".to_string(),
            details: Some(details),
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "OpenMetadata health probe failed");
            UpstreamHealth {
                status: "unhealthy".to_string(),
                details: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn group_names(state: &AppState) -> Vec<String> {
    state
        .executor()
        .registry()
        .groups()
        .iter()
        .map(|g| g.as_str().to_string())
        .collect()
}

/// Health check endpoint
///
/// Probes OpenMetadata and reports the result
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Health report", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let openmetadata = probe_upstream(&state).await;
    Json(HealthResponse {
        status: openmetadata.status.clone(),
        openmetadata,
        uptime_seconds: state.uptime().as_secs(),
        timestamp: unix_timestamp(),
    })
}

/// Detailed status
///
/// Health plus tool metrics and server details
#[utoipa::path(
    get,
    path = "/status",
    tag = "system",
    responses(
        (status = 200, description = "Status report", body = StatusResponse)
    )
)]
#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let openmetadata = probe_upstream(&state).await;
    let uptime_seconds = state.uptime().as_secs();

    Json(StatusResponse {
        status: openmetadata.status.clone(),
        server: ServerSummary {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds,
            environment: state.environment().to_string(),
            error_reporting: state.error_reporting(),
        },
        openmetadata,
        tool_count: state.executor().registry().len(),
        groups: group_names(&state),
        metrics: state.executor().metrics().snapshot(),
        auth: AuthSummary {
            required: state.gate().is_required(),
            token_endpoint: state.tokens().is_some() && state.admin().is_some(),
            google_login: state.google().is_some(),
        },
        timestamp: unix_timestamp(),
    })
}

/// Server statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses(
        (status = 200, description = "Tool call statistics", body = StatsResponse),
        (status = 401, description = "Missing or invalid credentials", body = super::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        total_tools: state.executor().registry().len(),
        groups: group_names(&state),
        metrics: state.executor().metrics().snapshot(),
        uptime: state.uptime().as_secs_f64(),
    })
}

/// Prometheus metrics
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "system",
    responses(
        (status = 200, description = "Prometheus text exposition", content_type = "text/plain")
    )
)]
#[instrument(skip(state))]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state
            .executor()
            .metrics()
            .snapshot()
            .to_prometheus(state.uptime()),
    )
}
