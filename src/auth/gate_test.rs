use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, header};

use super::error::AuthError;
use super::gate::{AuthGate, AuthMethod, SESSION_COOKIE, secrets_match};
use super::token::{Profile, TokenIssuer};

const SECRET: &str = "0123456789abcdef0123456789abcdef";

fn issuer() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(SECRET, 30))
}

fn gate(required: bool) -> AuthGate {
    AuthGate::new(
        required,
        Some(issuer()),
        Some("s3cret-key".to_string()),
        "X-API-Key",
    )
}

fn headers(name: &'static str, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(name, HeaderValue::from_str(value).unwrap());
    headers
}

fn token_for(subject: &str) -> String {
    issuer()
        .issue(subject, Profile::default())
        .unwrap()
        .access_token
}

#[test]
fn test_bearer_token_identifies_subject() {
    let token = token_for("alice");
    let identity = gate(true)
        .authenticate(&headers("authorization", &format!("Bearer {}", token)))
        .unwrap();

    assert_eq!(identity.subject, "alice");
    assert_eq!(identity.method, AuthMethod::Jwt);
    assert_eq!(identity.scopes, vec!["read", "write"]);
}

#[test]
fn test_bearer_scheme_is_case_insensitive() {
    let token = token_for("alice");
    let identity = gate(true)
        .authenticate(&headers("authorization", &format!("bearer {}", token)))
        .unwrap();
    assert_eq!(identity.subject, "alice");
}

#[test]
fn test_api_key_header() {
    let identity = gate(true)
        .authenticate(&headers("x-api-key", "s3cret-key"))
        .unwrap();
    assert_eq!(identity.method, AuthMethod::ApiKey);
}

#[test]
fn test_wrong_api_key_is_rejected() {
    let err = gate(true)
        .authenticate(&headers("x-api-key", "nope"))
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated { .. }));
}

#[test]
fn test_api_key_prefix_is_rejected() {
    let err = gate(true)
        .authenticate(&headers("x-api-key", "s3cret"))
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated { .. }));
}

#[test]
fn test_secrets_match() {
    assert!(secrets_match("s3cret-key", "s3cret-key"));
    assert!(!secrets_match("s3cret-kez", "s3cret-key"));
    assert!(!secrets_match("s3cret", "s3cret-key"));
    assert!(!secrets_match("", "s3cret-key"));
}

#[test]
fn test_session_cookie() {
    let token = token_for("bob@example.com");
    let identity = gate(true)
        .authenticate(&headers(
            "cookie",
            &format!("theme=dark; {}={}", SESSION_COOKIE, token),
        ))
        .unwrap();

    assert_eq!(identity.subject, "bob@example.com");
    assert_eq!(identity.method, AuthMethod::Session);
}

#[test]
fn test_missing_credentials_when_required() {
    let err = gate(true).authenticate(&HeaderMap::new()).unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
}

#[test]
fn test_invalid_token_when_required() {
    let err = gate(true)
        .authenticate(&headers("authorization", "Bearer garbage"))
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated { .. }));
}

#[test]
fn test_optional_gate_falls_back_to_anonymous() {
    let gate = gate(false);

    let identity = gate.authenticate(&HeaderMap::new()).unwrap();
    assert_eq!(identity.method, AuthMethod::Anonymous);

    let identity = gate
        .authenticate(&headers("authorization", "Bearer garbage"))
        .unwrap();
    assert_eq!(identity.method, AuthMethod::Anonymous);
}

#[test]
fn test_optional_gate_still_identifies_valid_callers() {
    let token = token_for("carol");
    let identity = gate(false)
        .authenticate(&headers("authorization", &format!("Bearer {}", token)))
        .unwrap();
    assert_eq!(identity.subject, "carol");
}

#[test]
fn test_token_without_issuer_is_rejected() {
    let gate = AuthGate::new(true, None, Some("k".to_string()), "X-API-Key");
    let token = token_for("alice");
    assert!(
        gate.authenticate(&headers("authorization", &format!("Bearer {}", token)))
            .is_err()
    );
}

#[test]
fn test_unauthenticated_response_carries_challenge() {
    use axum::response::IntoResponse;

    let response = AuthError::Unauthenticated {
        reason: "missing credentials".to_string(),
    }
    .into_response();

    assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[test]
fn test_forbidden_response_has_no_challenge() {
    use axum::response::IntoResponse;

    let response = AuthError::Unauthorized {
        reason: "nope".to_string(),
    }
    .into_response();

    assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
}
