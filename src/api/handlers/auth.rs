//! Token and Google login handlers.

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::auth::{
    AccessToken, AuthError, GoogleLogin, Profile, SESSION_COOKIE, TokenIssuer, secrets_match,
};

/// Login request DTO
#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

/// Google authorization URL DTO
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthorizationUrl {
    pub auth_url: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CallbackQuery {
    /// Authorization code from Google
    pub code: Option<String>,
    /// CSRF state issued by `/auth/google/login`
    pub state: Option<String>,
    /// Set by Google when the user declined
    pub error: Option<String>,
}

fn issuer(state: &AppState) -> Result<&TokenIssuer, AuthError> {
    state.tokens().ok_or(AuthError::NotConfigured {
        feature: "Token authentication",
    })
}

fn google(state: &AppState) -> Result<&GoogleLogin, AuthError> {
    state.google().ok_or(AuthError::NotConfigured {
        feature: "Google OAuth",
    })
}

/// Issue an access token
///
/// Exchanges the configured admin credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/token",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = AccessToken),
        (status = 401, description = "Invalid credentials", body = super::ErrorResponse),
        (status = 503, description = "Token authentication not configured", body = super::ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<AccessToken>, AuthError> {
    let issuer = issuer(&state)?;
    let (username, password) = state.admin().ok_or(AuthError::NotConfigured {
        feature: "Admin login",
    })?;

    // Both comparisons always run so timing does not reveal which one failed.
    let username_ok = secrets_match(&request.username, username);
    let password_ok = secrets_match(&request.password, password);
    if !(username_ok & password_ok) {
        warn!("Rejected token request");
        return Err(AuthError::InvalidCredentials);
    }

    let token = issuer.issue(&request.username, Profile::default())?;
    info!("Issued token");
    Ok(Json(token))
}

/// Start Google login
///
/// Returns the Google authorization URL for the client to open
#[utoipa::path(
    get,
    path = "/auth/google/login",
    tag = "auth",
    responses(
        (status = 200, description = "Authorization URL", body = AuthorizationUrl),
        (status = 503, description = "Google OAuth not configured", body = super::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn google_login(
    State(state): State<AppState>,
) -> Result<Json<AuthorizationUrl>, AuthError> {
    let auth_url = google(&state)?.begin().await?;
    Ok(Json(AuthorizationUrl { auth_url }))
}

/// Redirect the browser to Google
#[utoipa::path(
    get,
    path = "/auth/google/redirect",
    tag = "auth",
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 503, description = "Google OAuth not configured", body = super::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn google_redirect(State(state): State<AppState>) -> Result<Redirect, AuthError> {
    let auth_url = google(&state)?.begin().await?;
    Ok(Redirect::to(&auth_url))
}

/// Complete Google login
///
/// Consumes the login state, issues a token and stores it in the session cookie
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "auth",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Token issued", body = AccessToken),
        (status = 400, description = "Unknown, reused or expired state", body = super::ErrorResponse),
        (status = 403, description = "Account not allowed", body = super::ErrorResponse),
        (status = 502, description = "Google rejected the exchange", body = super::ErrorResponse)
    )
)]
#[instrument(skip(state, query, jar))]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AccessToken>), AuthError> {
    let google = google(&state)?;
    let issuer = issuer(&state)?;

    if let Some(error) = query.error {
        return Err(AuthError::Provider {
            message: format!("login was not completed: {}", error),
        });
    }
    let (code, csrf_state) = query.code.zip(query.state).ok_or(AuthError::InvalidState)?;

    let user = google.complete(&code, &csrf_state).await?;
    let token = issuer.issue(
        &user.email,
        Profile {
            email: Some(user.email.clone()),
            name: user.name.clone(),
            auth_method: Some("google_oauth".to_string()),
        },
    )?;

    let cookie = Cookie::build((SESSION_COOKIE, token.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(issuer.ttl_seconds()));

    Ok((jar.add(cookie), Json(token)))
}
