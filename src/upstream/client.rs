use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Response, Url};
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{Upstream, UpstreamError, UpstreamRequest, UpstreamResult};
use crate::config::{Credentials, UpstreamConfig};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the OpenMetadata REST API.
///
/// Shared by every concurrent tool call. The only lazily initialized state is
/// the bearer token obtained from username/password credentials.
pub struct OpenMetadataClient {
    http: Client,
    api_base: Url,
    credentials: Credentials,
    login_token: OnceCell<String>,
}

impl OpenMetadataClient {
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        // No-op when the binary already installed a provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let api_base = Url::parse(&config.api_url()).map_err(|e| UpstreamError::InvalidUrl {
            message: e.to_string(),
        })?;

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("openmetadata-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base,
            credentials: config.credentials.clone(),
            login_token: OnceCell::new(),
        })
    }

    /// Base URL of the versioned API, e.g. `http://localhost:8585/api/v1`.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub(crate) fn url_for(&self, segments: &[String]) -> UpstreamResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl {
                message: format!("{} cannot carry a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn token(&self) -> UpstreamResult<&str> {
        match &self.credentials {
            Credentials::Token(token) => Ok(token.as_str()),
            Credentials::Login { username, password } => self
                .login_token
                .get_or_try_init(|| self.login(username, password))
                .await
                .map(String::as_str),
        }
    }

    async fn login(&self, username: &str, password: &str) -> UpstreamResult<String> {
        let url = self.url_for(&["users".to_string(), "login".to_string()])?;
        info!(user = %username, "Logging in to OpenMetadata");

        let response = self
            .http
            .post(url)
            .json(&json!({
                "email": username,
                "password": STANDARD.encode(password),
            }))
            .send()
            .await?;

        let body = Self::handle_response(response)
            .await
            .inspect_err(|e| warn!(error = %e, "OpenMetadata rejected the login"))?;

        body.get("accessToken")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| UpstreamError::Login {
                message: "response did not contain an accessToken".to_string(),
            })
    }

    /// Decode a response body, mapping non-2xx statuses to
    /// [`UpstreamError::Status`].
    async fn handle_response(response: Response) -> UpstreamResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
    }
}

#[async_trait]
impl Upstream for OpenMetadataClient {
    async fn send(&self, request: UpstreamRequest) -> UpstreamResult<Value> {
        let url = self.url_for(&request.segments)?;
        let token = self.token().await?;

        debug!(method = %request.method, path = %request.path(), "Calling OpenMetadata");

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .bearer_auth(token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        Self::handle_response(response).await
    }
}
