use miette::Diagnostic;
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::mcp::SessionError;
use crate::upstream::UpstreamError;

/// Startup and serving failures of the `om-mcp` binary.
#[derive(Error, Diagnostic, Debug)]
pub enum ServerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create the OpenMetadata client")]
    #[diagnostic(code(openmetadata_mcp::server::upstream))]
    Upstream(#[from] UpstreamError),

    #[error("Failed to set up authentication")]
    #[diagnostic(code(openmetadata_mcp::server::auth))]
    Auth(#[from] AuthError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error("HTTP server failed: {0}")]
    #[diagnostic(
        code(openmetadata_mcp::server::io),
        help("Is another process already listening on this port? Try --port.")
    )]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
