//! HTTP server: REST endpoints, WebSocket, dashboard and the MCP endpoint.

mod handlers;
mod routes;
mod state;
mod static_assets;
mod websocket;

#[cfg(test)]
mod routes_test;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::{HeaderName, HeaderValue, Method, header};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use handlers::{ContentItem, ToolResponse};
pub use routes::{ApiDoc, create_mcp_router, create_router};
pub use state::AppState;
pub use websocket::{ClientMessage, HEARTBEAT_INTERVAL, ServerMessage};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Serve only `/mcp` and `/health`
    pub mcp_only: bool,
    /// Origins allowed by CORS
    pub cors_origins: Vec<String>,
    /// Header carrying API keys, allowed through CORS
    pub api_key_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            mcp_only: false,
            cors_origins: Vec::new(),
            api_key_header: "X-API-Key".to_string(),
        }
    }
}

/// Session header of the MCP streamable HTTP transport.
const MCP_SESSION_ID: HeaderName = HeaderName::from_static("mcp-session-id");
const MCP_PROTOCOL_VERSION: HeaderName = HeaderName::from_static("mcp-protocol-version");

/// CORS policy for the configured origins. Credentials are allowed so the
/// dashboard can send its session cookie; browser MCP clients need the
/// session header and `DELETE` to end a session.
pub fn cors_layer(origins: &[String], api_key_header: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    let mut headers = vec![
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        MCP_SESSION_ID,
        MCP_PROTOCOL_VERSION,
    ];
    match HeaderName::from_bytes(api_key_header.as_bytes()) {
        Ok(name) => headers.push(name),
        Err(_) => warn!(header = %api_key_header, "API key header is not a valid header name"),
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(headers)
        .expose_headers([MCP_SESSION_ID])
        .allow_credentials(true)
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    token.cancel();
}

/// Run the HTTP server until Ctrl-C.
pub async fn run(config: ServerConfig, state: AppState) -> std::io::Result<()> {
    let shutdown = CancellationToken::new();

    let router = if config.mcp_only {
        create_mcp_router(state, shutdown.child_token())
    } else {
        create_router(state, shutdown.child_token())
    };
    let app = router
        .layer(cors_layer(&config.cors_origins, &config.api_key_header))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    if config.mcp_only {
        info!("MCP endpoint listening on http://{}/mcp", addr);
    } else {
        info!("HTTP server listening on http://{}", addr);
        info!("MCP endpoint at http://{}/mcp, docs at http://{}/docs", addr, addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
}
