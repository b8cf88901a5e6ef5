//! Tests for the OpenMetadata client against a local stub server.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};

use super::{OpenMetadataClient, Upstream, UpstreamError, UpstreamRequest};
use crate::config::{Credentials, UpstreamConfig};

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(host: &str, credentials: Credentials) -> OpenMetadataClient {
    OpenMetadataClient::new(&UpstreamConfig {
        host: host.to_string(),
        credentials,
    })
    .expect("client should build")
}

fn token() -> Credentials {
    Credentials::Token("om-token".to_string())
}

#[test]
fn test_url_for_appends_segments_below_api_base() {
    let client = client_for("http://localhost:8585", token());
    let url = client
        .url_for(&["tables".into(), "name".into(), "svc.db.schema.orders".into()])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:8585/api/v1/tables/name/svc.db.schema.orders"
    );
}

#[test]
fn test_url_for_escapes_segment_content() {
    let client = client_for("http://localhost:8585", token());
    let url = client
        .url_for(&["tables".into(), "name".into(), "a/b c".into()])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:8585/api/v1/tables/name/a%2Fb%20c"
    );
}

#[tokio::test]
async fn test_send_injects_bearer_token_and_query() {
    let router = Router::new().route(
        "/api/v1/databases",
        get(
            |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({ "auth": auth, "limit": query.get("limit") }))
            },
        ),
    );
    let host = spawn_stub(router).await;
    let client = client_for(&host, token());

    let mut request = UpstreamRequest::get(["databases"]);
    request.query.push(("limit".to_string(), "10".to_string()));
    let body = client.send(request).await.unwrap();

    assert_eq!(body, json!({ "auth": "Bearer om-token", "limit": "10" }));
}

#[tokio::test]
async fn test_non_success_status_maps_to_status_error() {
    let router = Router::new().route(
        "/api/v1/tables/missing",
        get(|| async { (StatusCode::NOT_FOUND, "table not found") }),
    );
    let host = spawn_stub(router).await;
    let client = client_for(&host, token());

    let err = client
        .send(UpstreamRequest::get(["tables", "missing"]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        UpstreamError::Status {
            status: 404,
            body: "table not found".to_string()
        }
    );
    assert_eq!(err.to_string(), "HTTP 404: table not found");
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let router = Router::new().route("/api/v1/tables/abc", delete(|| async { StatusCode::OK }));
    let host = spawn_stub(router).await;
    let client = client_for(&host, token());

    let body = client
        .send(UpstreamRequest::new(reqwest::Method::DELETE, ["tables", "abc"]))
        .await
        .unwrap();
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_login_credentials_obtain_token_once() {
    let logins = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&logins);

    let router = Router::new()
        .route(
            "/api/v1/users/login",
            post(move |Json(body): Json<Value>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let expected = STANDARD.encode("admin-pass");
                    if body["email"] == "admin@open-metadata.org" && body["password"] == expected {
                        (StatusCode::OK, Json(json!({ "accessToken": "issued-token" })))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad" })))
                    }
                }
            }),
        )
        .route(
            "/api/v1/system/version",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({ "auth": auth }))
            }),
        );
    let host = spawn_stub(router).await;
    let client = client_for(
        &host,
        Credentials::Login {
            username: "admin@open-metadata.org".to_string(),
            password: "admin-pass".to_string(),
        },
    );

    for _ in 0..2 {
        let body = client
            .send(UpstreamRequest::get(["system", "version"]))
            .await
            .unwrap();
        assert_eq!(body, json!({ "auth": "Bearer issued-token" }));
    }
    assert_eq!(logins.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejected_login_surfaces_upstream_status() {
    let router = Router::new().route(
        "/api/v1/users/login",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid credentials") }),
    );
    let host = spawn_stub(router).await;
    let client = client_for(
        &host,
        Credentials::Login {
            username: "admin".to_string(),
            password: "wrong".to_string(),
        },
    );

    let err = client
        .send(UpstreamRequest::get(["tables"]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        UpstreamError::Status {
            status: 401,
            body: "invalid credentials".to_string()
        }
    );
}

#[tokio::test]
async fn test_login_without_token_is_login_error() {
    let router = Router::new().route(
        "/api/v1/users/login",
        post(|| async { Json(json!({ "tokenType": "Bearer" })) }),
    );
    let host = spawn_stub(router).await;
    let client = client_for(
        &host,
        Credentials::Login {
            username: "admin".to_string(),
            password: "admin".to_string(),
        },
    );

    let err = client
        .send(UpstreamRequest::get(["tables"]))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Login { .. }));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr), token());
    let err = client
        .send(UpstreamRequest::get(["tables"]))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Transport { .. }));
}
