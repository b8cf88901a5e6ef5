//! Router-level tests: which surfaces are mounted and which are gated.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use super::{AppState, cors_layer, create_mcp_router, create_router};
use crate::auth::AuthGate;
use crate::mcp::ToolExecutor;
use crate::registry::ToolRegistry;
use crate::upstream::MockUpstream;

fn state(upstream: MockUpstream) -> AppState {
    AppState::open(ToolExecutor::new(
        Arc::new(ToolRegistry::core()),
        Arc::new(upstream),
    ))
}

fn gated(upstream: MockUpstream) -> AppState {
    state(upstream).with_gate(AuthGate::new(
        true,
        None,
        Some("s3cret".to_string()),
        "X-API-Key",
    ))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn status_of(app: Router, request: Request<Body>) -> StatusCode {
    app.oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_docs_are_served() {
    let app = create_router(state(MockUpstream::new()), CancellationToken::new());
    assert_eq!(status_of(app, get("/docs")).await, StatusCode::OK);
}

#[test]
fn test_openapi_lists_rest_endpoints() {
    use utoipa::OpenApi;

    let doc = super::ApiDoc::openapi();
    for path in ["/health", "/status", "/tools", "/tools/execute", "/auth/token"] {
        assert!(doc.paths.paths.contains_key(path), "missing {}", path);
    }
}

#[tokio::test]
async fn test_stats_requires_auth() {
    let app = create_router(gated(MockUpstream::new()), CancellationToken::new());
    assert_eq!(status_of(app, get("/stats")).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_key_opens_gate() {
    let app = create_router(gated(MockUpstream::new()), CancellationToken::new());
    let request = Request::builder()
        .uri("/stats")
        .header("X-API-Key", "s3cret")
        .body(Body::empty())
        .unwrap();
    assert_eq!(status_of(app, request).await, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_is_public() {
    let app = create_router(gated(MockUpstream::new()), CancellationToken::new());
    assert_eq!(status_of(app, get("/metrics")).await, StatusCode::OK);
}

#[tokio::test]
async fn test_mcp_requires_auth() {
    let mut upstream = MockUpstream::new();
    upstream.expect_send().times(0);
    let app = create_router(gated(upstream), CancellationToken::new());

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json, text/event-stream")
        .body(Body::from(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": "database_get_databases", "arguments": {}}
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_mcp_mounted_when_open() {
    let app = create_router(state(MockUpstream::new()), CancellationToken::new());
    assert_ne!(
        status_of(app, get("/mcp")).await,
        StatusCode::NOT_FOUND,
        "MCP service should be mounted"
    );
}

#[tokio::test]
async fn test_mcp_only_router_surface() {
    let mut upstream = MockUpstream::new();
    upstream
        .expect_send()
        .returning(|_| Ok(json!({"version": "1.5.0"})));
    let app = create_mcp_router(state(upstream), CancellationToken::new());

    assert_eq!(status_of(app.clone(), get("/health")).await, StatusCode::OK);
    assert_eq!(status_of(app.clone(), get("/tools")).await, StatusCode::NOT_FOUND);
    assert_eq!(status_of(app.clone(), get("/docs")).await, StatusCode::NOT_FOUND);
    assert_ne!(status_of(app, get("/mcp")).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mcp_only_health_stays_public() {
    let mut upstream = MockUpstream::new();
    upstream
        .expect_send()
        .returning(|_| Ok(json!({"version": "1.5.0"})));
    let app = create_mcp_router(gated(upstream), CancellationToken::new());

    assert_eq!(status_of(app.clone(), get("/health")).await, StatusCode::OK);
    assert_eq!(status_of(app, get("/mcp")).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = create_router(state(MockUpstream::new()), CancellationToken::new()).layer(
        cors_layer(&["http://localhost:3000".to_string()], "X-API-Key"),
    );

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/tools")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let app = create_router(state(MockUpstream::new()), CancellationToken::new()).layer(
        cors_layer(&["http://localhost:3000".to_string()], "X-API-Key"),
    );

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/tools")
        .header(header::ORIGIN, "https://evil.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_lets_browser_clients_manage_mcp_sessions() {
    let app = create_router(gated(MockUpstream::new()), CancellationToken::new()).layer(
        cors_layer(&["http://localhost:3000".to_string()], "X-API-Key"),
    );

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/mcp")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "mcp-session-id")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();
    let headers = response.headers();
    let allowed_methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    let allowed_headers = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed_methods.contains("DELETE"));
    assert!(allowed_headers.contains("mcp-session-id"));

    let request = Request::builder()
        .uri("/docs")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let exposed = response
        .headers()
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(exposed.contains("mcp-session-id"));
}
