//! MCP transport bindings
//!
//! Streamable HTTP for the `sse` and `http` transports, and stdio.

use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::SessionError;
use super::executor::ToolExecutor;
use super::server::OpenMetadataServer;

/// Create MCP Streamable HTTP service
///
/// The returned service can be nested into an Axum router:
///
/// ```no_run
/// # use std::sync::Arc;
/// # use openmetadata_mcp::mcp::{ToolExecutor, create_mcp_service};
/// # fn example(executor: ToolExecutor) {
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
///
/// let ct = CancellationToken::new();
/// let app: Router = Router::new().nest_service("/mcp", create_mcp_service(executor, ct));
/// # }
/// ```
pub fn create_mcp_service(
    executor: ToolExecutor,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<OpenMetadataServer, LocalSessionManager> {
    let server = OpenMetadataServer::new(executor);

    // One server per session; they share the executor and the tool list.
    // Returns io::Error to match rmcp's expected signature.
    let service_factory = move || -> Result<OpenMetadataServer, std::io::Error> { Ok(server.clone()) };

    let config = StreamableHttpServerConfig::default()
        .with_stateful_mode(true)
        .with_cancellation_token(cancellation_token);

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}

/// Serve MCP over stdin/stdout until the client disconnects.
///
/// Stdout carries JSON-RPC only; logging must already be pointed at stderr.
pub async fn serve_stdio(executor: ToolExecutor) -> Result<(), SessionError> {
    let server = OpenMetadataServer::new(executor);
    info!(tools = server.tools().len(), "Serving MCP over stdio");

    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| SessionError::Initialize {
            message: e.to_string(),
        })?;

    let reason = running.waiting().await.map_err(|e| SessionError::Aborted {
        message: e.to_string(),
    })?;
    info!(?reason, "MCP stdio session closed");
    Ok(())
}
