//! Tests for the token and Google login handlers.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::api::{AppState, create_router};
use crate::auth::{
    GoogleLogin, GoogleUser, MockIdentityProvider, PendingLogin, SESSION_COOKIE, TokenIssuer,
};
use crate::mcp::ToolExecutor;
use crate::registry::{ApiGroup, ToolRegistry};
use crate::upstream::MockUpstream;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

fn state() -> AppState {
    AppState::open(ToolExecutor::new(
        Arc::new(ToolRegistry::new(&[ApiGroup::Table])),
        Arc::new(MockUpstream::new()),
    ))
}

fn tokens() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(SECRET, 30))
}

fn router(state: AppState) -> Router {
    create_router(state, CancellationToken::new())
}

fn token_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"username": username, "password": password}).to_string(),
        ))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn google(email: &'static str, allowed: Option<Vec<String>>) -> Arc<GoogleLogin> {
    let mut provider = MockIdentityProvider::new();
    provider.expect_authorize_url().returning(|| {
        Ok((
            "https://accounts.google.com/o/oauth2/v2/auth?state=abc".to_string(),
            PendingLogin {
                csrf_state: "abc".to_string(),
                nonce: "n".to_string(),
                pkce_verifier: "v".to_string(),
                created_at: Utc::now().timestamp(),
            },
        ))
    });
    provider.expect_exchange().returning(move |_, _| {
        Ok(GoogleUser {
            subject: "42".to_string(),
            email: email.to_string(),
            email_verified: true,
            name: Some("Test User".to_string()),
        })
    });
    Arc::new(GoogleLogin::new(Arc::new(provider), allowed))
}

#[tokio::test]
async fn test_token_issued_for_admin() {
    let app = router(state().with_tokens(tokens()).with_admin("admin", "hunter2"));

    let response = app.oneshot(token_request("admin", "hunter2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);

    let claims = tokens()
        .verify(body["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "admin");
}

#[tokio::test]
async fn test_token_rejects_wrong_password() {
    let app = router(state().with_tokens(tokens()).with_admin("admin", "hunter2"));

    let response = app.oneshot(token_request("admin", "admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_rejects_wrong_username() {
    let app = router(state().with_tokens(tokens()).with_admin("admin", "hunter2"));

    let response = app.oneshot(token_request("root", "hunter2")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_unavailable_without_admin() {
    let app = router(state().with_tokens(tokens()));

    let response = app.oneshot(token_request("admin", "admin")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_google_unavailable_when_not_configured() {
    let response = router(state())
        .oneshot(get("/auth/google/login"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_google_login_returns_authorization_url() {
    let login = google("alice@example.com", None);
    let app = router(state().with_tokens(tokens()).with_google(login.clone()));

    let response = app.oneshot(get("/auth/google/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(
        body["auth_url"]
            .as_str()
            .unwrap()
            .starts_with("https://accounts.google.com/")
    );
    assert_eq!(login.pending_count(), 1);
}

#[tokio::test]
async fn test_google_redirect() {
    let app = router(
        state()
            .with_tokens(tokens())
            .with_google(google("alice@example.com", None)),
    );

    let response = app.oneshot(get("/auth/google/redirect")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("https://accounts.google.com/")
    );
}

#[tokio::test]
async fn test_google_callback_issues_token_and_cookie() {
    let login = google("alice@example.com", Some(vec!["example.com".to_string()]));
    let app = router(state().with_tokens(tokens()).with_google(login.clone()));
    login.begin().await.unwrap();

    let response = app
        .clone()
        .oneshot(get("/auth/google/callback?code=xyz&state=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(response).await;
    let claims = tokens()
        .verify(body["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "alice@example.com");
    assert_eq!(claims.auth_method.as_deref(), Some("google_oauth"));
    assert_eq!(claims.name.as_deref(), Some("Test User"));

    // The state was consumed by the first callback.
    let replay = app
        .oneshot(get("/auth/google/callback?code=xyz&state=abc"))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_google_callback_rejects_foreign_domain() {
    let login = google("mallory@evil.test", Some(vec!["example.com".to_string()]));
    let app = router(state().with_tokens(tokens()).with_google(login.clone()));
    login.begin().await.unwrap();

    let response = app
        .oneshot(get("/auth/google/callback?code=xyz&state=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Email domain 'evil.test' is not authorized")
    );
}

#[tokio::test]
async fn test_google_callback_without_code() {
    let login = google("alice@example.com", None);
    let app = router(state().with_tokens(tokens()).with_google(login));

    let response = app
        .oneshot(get("/auth/google/callback?state=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_cookie_grants_tool_access() {
    let issuer = tokens();
    let token = issuer
        .issue("alice@example.com", crate::auth::Profile::default())
        .unwrap();
    let state = state()
        .with_tokens(issuer.clone())
        .with_gate(crate::auth::AuthGate::new(true, Some(issuer), None, "X-API-Key"));

    let response = router(state)
        .oneshot(
            Request::builder()
                .uri("/tools")
                .header(
                    header::COOKIE,
                    format!("{}={}", SESSION_COOKIE, token.access_token),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

async fn session_cookie(state: AppState) -> String {
    let login = google("alice@example.com", None);
    let app = router(state.with_tokens(tokens()).with_google(login.clone()));
    login.begin().await.unwrap();

    let response = app
        .oneshot(get("/auth/google/callback?code=xyz&state=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_session_cookie_expires_with_token() {
    let cookie = session_cookie(state()).await;

    assert!(cookie.contains("Max-Age=1800"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_session_cookie_secure_over_https() {
    let cookie = session_cookie(state().with_secure_cookies(true)).await;

    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Max-Age=1800"));
}
