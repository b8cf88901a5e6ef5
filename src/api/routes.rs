//! API route configuration.

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::handlers::{
    self, AuthSummary, AuthorizationUrl, ContentItem, ErrorResponse, HealthResponse,
    ServerSummary, StatsResponse, StatusResponse, TokenRequest, ToolInfo, ToolList, ToolRequest,
    ToolResponse, UpstreamHealth,
};
use super::state::AppState;
use super::static_assets;
use super::websocket;
use crate::auth::{AccessToken, require_identity};
use crate::mcp::{MetricsSnapshot, ToolStats, create_mcp_service};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpenMetadata MCP Server",
        description = "Model Context Protocol gateway for the OpenMetadata REST API",
        license(name = "MIT")
    ),
    paths(
        handlers::health,
        handlers::status,
        handlers::stats,
        handlers::metrics,
        handlers::issue_token,
        handlers::google_login,
        handlers::google_redirect,
        handlers::google_callback,
        handlers::list_tools,
        handlers::execute_tool,
    ),
    components(
        schemas(
            HealthResponse,
            UpstreamHealth,
            StatusResponse,
            ServerSummary,
            AuthSummary,
            StatsResponse,
            MetricsSnapshot,
            ToolStats,
            TokenRequest,
            AccessToken,
            AuthorizationUrl,
            ToolInfo,
            ToolList,
            ToolRequest,
            ToolResponse,
            ContentItem,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "Health, status and metrics endpoints"),
        (name = "auth", description = "Token issuing and Google login"),
        (name = "tools", description = "OpenMetadata tool listing and execution")
    )
)]
pub struct ApiDoc;

/// Full HTTP surface: REST, WebSocket, dashboard, docs and `/mcp`.
///
/// Tool access (`/tools*`, `/stats`, `/ws`, `/mcp`) goes through the auth
/// gate; health, status, metrics and login endpoints are public.
pub fn create_router(state: AppState, shutdown: CancellationToken) -> Router {
    let api = ApiDoc::openapi();
    let mcp_service = create_mcp_service(state.executor().clone(), shutdown);

    let public_routes = Router::new()
        .route("/", get(static_assets::dashboard))
        .route("/assets/{*path}", get(static_assets::serve_asset))
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .route("/auth/token", post(handlers::issue_token))
        .route("/auth/google/login", get(handlers::google_login))
        .route("/auth/google/redirect", get(handlers::google_redirect))
        .route("/auth/google/callback", get(handlers::google_callback));

    let protected_routes = Router::new()
        .route("/tools", get(handlers::list_tools))
        .route("/tools/execute", post(handlers::execute_tool))
        .route("/stats", get(handlers::stats))
        .route("/ws", get(websocket::ws_handler))
        .nest_service("/mcp", mcp_service)
        .route_layer(middleware::from_fn_with_state(
            state.gate().clone(),
            require_identity,
        ));

    public_routes
        .merge(protected_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}

/// Reduced surface for the `sse` transport: `/mcp` and `/health` only.
pub fn create_mcp_router(state: AppState, shutdown: CancellationToken) -> Router {
    let mcp_service = create_mcp_service(state.executor().clone(), shutdown);

    let mcp_routes = Router::new()
        .nest_service("/mcp", mcp_service)
        .route_layer(middleware::from_fn_with_state(
            state.gate().clone(),
            require_identity,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(mcp_routes)
        .with_state(state)
}
