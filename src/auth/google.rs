//! Google sign-in for the browser dashboard.
//!
//! `GoogleLogin` owns the pending-login table: every `begin` stores the CSRF
//! state with its nonce and PKCE verifier, and `complete` consumes it exactly
//! once. The OIDC round trips live behind [`IdentityProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use openidconnect::core::{
    CoreAuthenticationFlow, CoreClient, CoreIdTokenClaims, CoreProviderMetadata,
};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointNotSet,
    EndpointSet, IssuerUrl, Nonce, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    TokenResponse,
};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::error::{AuthError, AuthResult};
use crate::config::GoogleConfig;

pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";

/// Pending logins older than this are rejected.
pub const LOGIN_STATE_TTL_SECS: i64 = 300;

const SCOPES: [&str; 2] = ["email", "profile"];

/// Client shape produced by discovery: auth URL set, token and userinfo
/// endpoints possibly set.
type ProviderClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// State kept between the redirect and the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogin {
    pub csrf_state: String,
    pub nonce: String,
    pub pkce_verifier: String,
    pub created_at: i64,
}

impl PendingLogin {
    fn is_expired(&self, now: i64) -> bool {
        now - self.created_at > LOGIN_STATE_TTL_SECS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleUser {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

impl GoogleUser {
    pub fn domain(&self) -> Option<String> {
        self.email
            .rsplit_once('@')
            .map(|(_, domain)| domain.to_ascii_lowercase())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the provider URL to send the browser to.
    async fn authorize_url(&self) -> AuthResult<(String, PendingLogin)>;

    /// Redeem an authorization code and verify the returned ID token.
    async fn exchange(&self, code: &str, pending: &PendingLogin) -> AuthResult<GoogleUser>;
}

fn provider_error(e: impl std::fmt::Display) -> AuthError {
    AuthError::Provider {
        message: e.to_string(),
    }
}

pub struct GoogleProvider {
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    http: openidconnect::reqwest::Client,
    metadata: OnceCell<CoreProviderMetadata>,
}

impl GoogleProvider {
    pub fn new(config: &GoogleConfig) -> AuthResult<Self> {
        let redirect_url =
            RedirectUrl::new(config.redirect_uri.clone()).map_err(provider_error)?;
        let http = openidconnect::reqwest::ClientBuilder::new()
            .redirect(openidconnect::reqwest::redirect::Policy::none())
            .build()
            .map_err(provider_error)?;

        Ok(Self {
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            redirect_url,
            http,
            metadata: OnceCell::new(),
        })
    }

    /// Discovery document, fetched on first use.
    async fn metadata(&self) -> AuthResult<&CoreProviderMetadata> {
        self.metadata
            .get_or_try_init(|| async {
                let issuer = IssuerUrl::new(GOOGLE_ISSUER.to_string()).map_err(provider_error)?;
                let metadata = CoreProviderMetadata::discover_async(issuer, &self.http)
                    .await
                    .map_err(provider_error)?;
                info!(issuer = GOOGLE_ISSUER, "Discovered OIDC provider");
                Ok::<_, AuthError>(metadata)
            })
            .await
    }

    async fn client(&self) -> AuthResult<ProviderClient> {
        let metadata = self.metadata().await?.clone();
        Ok(CoreClient::from_provider_metadata(
            metadata,
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    async fn authorize_url(&self) -> AuthResult<(String, PendingLogin)> {
        let client = self.client().await?;
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .set_pkce_challenge(pkce_challenge);
        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (url, csrf, nonce) = request.url();

        Ok((
            url.to_string(),
            PendingLogin {
                csrf_state: csrf.secret().clone(),
                nonce: nonce.secret().clone(),
                pkce_verifier: pkce_verifier.secret().clone(),
                created_at: Utc::now().timestamp(),
            },
        ))
    }

    async fn exchange(&self, code: &str, pending: &PendingLogin) -> AuthResult<GoogleUser> {
        let client = self.client().await?;

        let response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(provider_error)?
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier.clone()))
            .request_async(&self.http)
            .await
            .map_err(|e| provider_error(format!("code exchange failed: {}", e)))?;

        let id_token = response
            .id_token()
            .ok_or_else(|| provider_error("provider did not return an ID token"))?;
        let nonce = Nonce::new(pending.nonce.clone());
        let verifier = client.id_token_verifier();
        let claims: &CoreIdTokenClaims = id_token
            .claims(&verifier, &nonce)
            .map_err(|e| provider_error(format!("ID token rejected: {}", e)))?;

        let email = claims
            .email()
            .map(|e| e.as_str().to_string())
            .ok_or_else(|| provider_error("ID token has no email claim"))?;

        Ok(GoogleUser {
            subject: claims.subject().as_str().to_string(),
            email,
            email_verified: claims.email_verified().unwrap_or(false),
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.as_str().to_string()),
        })
    }
}

/// Browser login flow with single-use state.
pub struct GoogleLogin {
    provider: Arc<dyn IdentityProvider>,
    pending: DashMap<String, PendingLogin>,
    allowed_domains: Option<Vec<String>>,
}

impl GoogleLogin {
    pub fn new(provider: Arc<dyn IdentityProvider>, allowed_domains: Option<Vec<String>>) -> Self {
        Self {
            provider,
            pending: DashMap::new(),
            allowed_domains: allowed_domains
                .map(|domains| domains.iter().map(|d| d.to_ascii_lowercase()).collect()),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Start a login and return the URL to redirect to.
    pub async fn begin(&self) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        self.pending.retain(|_, login| !login.is_expired(now));

        let (url, login) = self.provider.authorize_url().await?;
        debug!(state = %login.csrf_state, "Started Google login");
        self.pending.insert(login.csrf_state.clone(), login);
        Ok(url)
    }

    pub async fn complete(&self, code: &str, state: &str) -> AuthResult<GoogleUser> {
        let (_, login) = self.pending.remove(state).ok_or(AuthError::InvalidState)?;
        if login.is_expired(Utc::now().timestamp()) {
            return Err(AuthError::InvalidState);
        }

        let user = self.provider.exchange(code, &login).await?;

        if !user.email_verified {
            warn!(email = %user.email, "Rejected unverified Google account");
            return Err(AuthError::Unauthorized {
                reason: "Email address is not verified".to_string(),
            });
        }
        if let Some(allowed) = &self.allowed_domains {
            let domain = user.domain().unwrap_or_default();
            if !allowed.contains(&domain) {
                warn!(email = %user.email, "Rejected Google account outside allowed domains");
                return Err(AuthError::Unauthorized {
                    reason: format!("Email domain '{}' is not authorized", domain),
                });
            }
        }

        info!(email = %user.email, "Google login completed");
        Ok(user)
    }
}
