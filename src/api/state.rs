//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use crate::auth::{AuthGate, AuthResult, GoogleLogin, GoogleProvider, TokenIssuer};
use crate::config::Config;
use crate::mcp::ToolExecutor;

/// Shared application state.
///
/// Every dependency is built once at startup and injected here; handlers only
/// read from it.
#[derive(Clone)]
pub struct AppState {
    executor: ToolExecutor,
    gate: AuthGate,
    tokens: Option<Arc<TokenIssuer>>,
    google: Option<Arc<GoogleLogin>>,
    admin: Option<(String, String)>,
    environment: String,
    error_reporting: bool,
    /// Mark session cookies `Secure`; set when the login callback is served over https
    secure_cookies: bool,
    started_at: Instant,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// Google login is enabled when client credentials are configured; the
    /// provider is only contacted on the first login.
    pub fn new(config: &Config, executor: ToolExecutor, require_auth: bool) -> AuthResult<Self> {
        let tokens = config
            .auth
            .secret_key
            .as_deref()
            .map(|secret| Arc::new(TokenIssuer::new(secret, config.auth.token_ttl_minutes)));

        let google = match &config.auth.google {
            Some(google) => {
                let provider = GoogleProvider::new(google)?;
                info!(redirect_uri = %google.redirect_uri, "Google login enabled");
                Some(Arc::new(GoogleLogin::new(
                    Arc::new(provider),
                    config.auth.allowed_domains.clone(),
                )))
            }
            None => None,
        };

        let gate = AuthGate::new(
            require_auth,
            tokens.clone(),
            config.auth.api_key.clone(),
            config.auth.api_key_header.clone(),
        );

        let admin = config
            .auth
            .admin_username
            .clone()
            .zip(config.auth.admin_password.clone());

        Ok(Self {
            executor,
            gate,
            tokens,
            google,
            admin,
            environment: config.monitoring.environment.clone(),
            error_reporting: config.monitoring.sentry_dsn.is_some(),
            secure_cookies: config
                .auth
                .google
                .as_ref()
                .is_some_and(|g| g.redirect_uri.starts_with("https://")),
            started_at: Instant::now(),
        })
    }

    /// State with no credentials configured and an open gate.
    pub fn open(executor: ToolExecutor) -> Self {
        Self {
            executor,
            gate: AuthGate::open(),
            tokens: None,
            google: None,
            admin: None,
            environment: "development".to_string(),
            error_reporting: false,
            secure_cookies: false,
            started_at: Instant::now(),
        }
    }

    pub fn with_gate(mut self, gate: AuthGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_tokens(mut self, tokens: Arc<TokenIssuer>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some((username.into(), password.into()));
        self
    }

    pub fn with_google(mut self, google: Arc<GoogleLogin>) -> Self {
        self.google = Some(google);
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn tokens(&self) -> Option<&TokenIssuer> {
        self.tokens.as_deref()
    }

    pub fn google(&self) -> Option<&GoogleLogin> {
        self.google.as_deref()
    }

    /// Configured admin `(username, password)` for the token endpoint.
    pub fn admin(&self) -> Option<(&str, &str)> {
        self.admin.as_ref().map(|(u, p)| (u.as_str(), p.as_str()))
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn error_reporting(&self) -> bool {
        self.error_reporting
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
