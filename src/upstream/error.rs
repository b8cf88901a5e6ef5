use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("HTTP {status}: {body}")]
    #[diagnostic(code(openmetadata_mcp::upstream::status))]
    Status { status: u16, body: String },

    #[error("Failed to reach OpenMetadata: {message}")]
    #[diagnostic(
        code(openmetadata_mcp::upstream::transport),
        help("Is OpenMetadata running? Check OPENMETADATA_HOST.")
    )]
    Transport { message: String },

    #[error("OpenMetadata login failed: {message}")]
    #[diagnostic(
        code(openmetadata_mcp::upstream::login),
        help("Check OPENMETADATA_USERNAME and OPENMETADATA_PASSWORD, or use OPENMETADATA_JWT_TOKEN.")
    )]
    Login { message: String },

    #[error("Cannot build upstream URL: {message}")]
    #[diagnostic(code(openmetadata_mcp::upstream::invalid_url))]
    InvalidUrl { message: String },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport {
            message: e.to_string(),
        }
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;
