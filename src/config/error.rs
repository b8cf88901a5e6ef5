use miette::Diagnostic;
use thiserror::Error;

/// Startup configuration errors.
///
/// Any of these aborts the process before a transport is bound.
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No OpenMetadata credentials configured")]
    #[diagnostic(
        code(openmetadata_mcp::config::missing_credentials),
        help(
            "Set OPENMETADATA_JWT_TOKEN, or both OPENMETADATA_USERNAME and OPENMETADATA_PASSWORD."
        )
    )]
    MissingCredentials,

    #[error("Invalid OpenMetadata host '{value}': {reason}")]
    #[diagnostic(
        code(openmetadata_mcp::config::invalid_host),
        help("The host must be an absolute URL such as http://localhost:8585")
    )]
    InvalidHost { value: String, reason: String },

    #[error("Invalid value for {name}: '{value}'")]
    #[diagnostic(code(openmetadata_mcp::config::invalid_value), help("{help}"))]
    InvalidValue {
        name: String,
        value: String,
        help: String,
    },

    #[error("SECRET_KEY is required when authentication is enabled")]
    #[diagnostic(
        code(openmetadata_mcp::config::missing_secret),
        help("Set SECRET_KEY to a random string of at least 32 characters.")
    )]
    MissingSecret,

    #[error("SECRET_KEY must be at least {min} characters long")]
    #[diagnostic(code(openmetadata_mcp::config::secret_too_short))]
    SecretTooShort { min: usize },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
