use axum::http::StatusCode;
use miette::Diagnostic;
use thiserror::Error;

use crate::registry::RegistryError;
use crate::upstream::UpstreamError;

/// Failure of a single tool invocation.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    #[diagnostic(code(openmetadata_mcp::tool::not_found))]
    NotFound { name: String },

    #[error("Invalid arguments for {tool}: {reason}")]
    #[diagnostic(code(openmetadata_mcp::tool::invalid_arguments))]
    InvalidArguments { tool: String, reason: String },

    #[error("OpenMetadata returned HTTP {status}: {body}")]
    #[diagnostic(code(openmetadata_mcp::tool::upstream))]
    Upstream { status: u16, body: String },

    #[error("OpenMetadata request failed: {message}")]
    #[diagnostic(code(openmetadata_mcp::tool::transport))]
    Transport { message: String },
}

impl ToolError {
    /// Stable name reported in responses and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound { .. } => "ToolNotFound",
            ToolError::InvalidArguments { .. } => "InvalidArguments",
            ToolError::Upstream { .. } => "UpstreamError",
            ToolError::Transport { .. } => "TransportError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ToolError::NotFound { .. } => StatusCode::NOT_FOUND,
            ToolError::InvalidArguments { .. } => StatusCode::BAD_REQUEST,
            ToolError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ToolError::Transport { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Whether the caller sent a bad request, as opposed to the upstream
    /// failing to serve a good one.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ToolError::NotFound { .. } | ToolError::InvalidArguments { .. }
        )
    }
}

impl From<RegistryError> for ToolError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound { name } | RegistryError::Duplicate { name } => {
                ToolError::NotFound { name }
            }
            RegistryError::InvalidArguments { tool, reason } => {
                ToolError::InvalidArguments { tool, reason }
            }
        }
    }
}

impl From<UpstreamError> for ToolError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::Status { status, body } => ToolError::Upstream { status, body },
            other => ToolError::Transport {
                message: other.to_string(),
            },
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Failure of a whole MCP session on the stdio transport.
#[derive(Error, Diagnostic, Debug)]
pub enum SessionError {
    #[error("MCP session failed to initialize: {message}")]
    #[diagnostic(
        code(openmetadata_mcp::mcp::initialize),
        help("The client must send an MCP initialize request first.")
    )]
    Initialize { message: String },

    #[error("MCP session aborted: {message}")]
    #[diagnostic(code(openmetadata_mcp::mcp::aborted))]
    Aborted { message: String },
}
