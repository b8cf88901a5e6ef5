//! OpenMetadata REST client.
//!
//! The [`Upstream`] trait is the seam between tool execution and the network:
//! production code uses [`OpenMetadataClient`], tests use `MockUpstream`.

mod client;
mod error;

#[cfg(test)]
mod client_test;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

pub use client::OpenMetadataClient;
pub use error::{UpstreamError, UpstreamResult};

/// A single call against `/api/v1`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Path segments below `/api/v1`, unescaped
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// Relative path as it appears under `/api/v1`, for logs and messages.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// Executes upstream requests.
///
/// Successful responses yield the decoded JSON body; an empty body is
/// `Value::Null`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> UpstreamResult<Value>;
}
