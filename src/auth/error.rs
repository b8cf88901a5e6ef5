use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required: {reason}")]
    #[diagnostic(
        code(openmetadata_mcp::auth::unauthenticated),
        help("Send 'Authorization: Bearer <token>' or the configured API key header.")
    )]
    Unauthenticated { reason: String },

    #[error("Not authorized: {reason}")]
    #[diagnostic(code(openmetadata_mcp::auth::unauthorized))]
    Unauthorized { reason: String },

    #[error("Invalid username or password")]
    #[diagnostic(code(openmetadata_mcp::auth::invalid_credentials))]
    InvalidCredentials,

    #[error("{feature} is not configured")]
    #[diagnostic(code(openmetadata_mcp::auth::not_configured))]
    NotConfigured { feature: &'static str },

    #[error("Invalid or expired login state")]
    #[diagnostic(
        code(openmetadata_mcp::auth::invalid_state),
        help("Start the login again from /auth/google/login.")
    )]
    InvalidState,

    #[error("Identity provider error: {message}")]
    #[diagnostic(code(openmetadata_mcp::auth::provider))]
    Provider { message: String },

    #[error("Failed to issue token: {message}")]
    #[diagnostic(code(openmetadata_mcp::auth::token))]
    Token { message: String },
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated { .. } | AuthError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            AuthError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::InvalidState => StatusCode::BAD_REQUEST,
            AuthError::Provider { .. } => StatusCode::BAD_GATEWAY,
            AuthError::Token { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
