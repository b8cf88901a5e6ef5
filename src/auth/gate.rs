use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::error::{AuthError, AuthResult};
use super::token::{Claims, TokenIssuer};

/// Cookie set by the browser login flow.
pub const SESSION_COOKIE: &str = "mcp_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    Jwt,
    ApiKey,
    Session,
    Anonymous,
}

/// Caller identity attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub subject: String,
    pub scopes: Vec<String>,
    pub method: AuthMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".to_string(),
            scopes: Vec::new(),
            method: AuthMethod::Anonymous,
            email: None,
        }
    }

    fn from_claims(claims: Claims, method: AuthMethod) -> Self {
        Self {
            subject: claims.sub,
            scopes: claims.scopes,
            method,
            email: claims.email,
        }
    }
}

/// Decides who is calling. Credentials are tried in order: bearer token,
/// API key header, session cookie.
#[derive(Clone)]
pub struct AuthGate {
    required: bool,
    tokens: Option<Arc<TokenIssuer>>,
    api_key: Option<String>,
    api_key_header: String,
}

impl AuthGate {
    pub fn new(
        required: bool,
        tokens: Option<Arc<TokenIssuer>>,
        api_key: Option<String>,
        api_key_header: impl Into<String>,
    ) -> Self {
        Self {
            required,
            tokens,
            api_key,
            api_key_header: api_key_header.into(),
        }
    }

    /// A gate that lets everyone through as anonymous.
    pub fn open() -> Self {
        Self::new(false, None, None, "X-API-Key")
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        match self.identify(headers) {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) if self.required => Err(AuthError::Unauthenticated {
                reason: "missing credentials".to_string(),
            }),
            Err(e) if self.required => Err(e),
            Ok(None) => Ok(Identity::anonymous()),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid credentials, authentication not required");
                Ok(Identity::anonymous())
            }
        }
    }

    fn identify(&self, headers: &HeaderMap) -> AuthResult<Option<Identity>> {
        if let Some(token) = bearer_token(headers) {
            let claims = self.verify(token)?;
            return Ok(Some(Identity::from_claims(claims, AuthMethod::Jwt)));
        }

        if let Some(presented) = headers
            .get(self.api_key_header.as_str())
            .and_then(|v| v.to_str().ok())
        {
            return match &self.api_key {
                Some(expected) if secrets_match(presented, expected) => Ok(Some(Identity {
                    subject: "api_key_user".to_string(),
                    scopes: vec!["read".to_string(), "write".to_string()],
                    method: AuthMethod::ApiKey,
                    email: None,
                })),
                _ => Err(AuthError::Unauthenticated {
                    reason: "invalid API key".to_string(),
                }),
            };
        }

        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            let claims = self.verify(cookie.value())?;
            return Ok(Some(Identity::from_claims(claims, AuthMethod::Session)));
        }

        Ok(None)
    }

    fn verify(&self, token: &str) -> AuthResult<Claims> {
        match &self.tokens {
            Some(issuer) => issuer.verify(token),
            None => Err(AuthError::Unauthenticated {
                reason: "token authentication is not configured".to_string(),
            }),
        }
    }
}

/// Compare a presented secret with the expected one in constant time.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Middleware that rejects unauthenticated requests and stores the
/// [`Identity`] in request extensions.
pub async fn require_identity(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = gate.authenticate(request.headers()).inspect_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "Rejected request");
    })?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
