//! Tool execution: resolve, validate, call upstream, record.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use super::error::{ToolError, ToolResult};
use super::metrics::ToolMetrics;
use crate::registry::ToolRegistry;
use crate::upstream::Upstream;

/// Executes tools against the upstream API.
///
/// Cheap to clone; all transports share one executor so metrics cover every
/// call regardless of where it came from.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    upstream: Arc<dyn Upstream>,
    metrics: Arc<ToolMetrics>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            registry,
            upstream,
            metrics: Arc::new(ToolMetrics::new()),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn upstream(&self) -> &dyn Upstream {
        self.upstream.as_ref()
    }

    pub fn metrics(&self) -> &ToolMetrics {
        &self.metrics
    }

    /// Run `name` with `arguments`.
    ///
    /// Invalid arguments never reach the upstream. Upstream failures are
    /// returned as-is; nothing is retried.
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let started = Instant::now();
        let result = self.run(name, &arguments).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => {
                self.metrics.record_success(name, elapsed);
                info!(duration_ms = elapsed.as_millis() as u64, "Tool call succeeded");
            }
            Err(e) => {
                let resolved = !matches!(e, ToolError::NotFound { .. });
                self.metrics
                    .record_failure(resolved.then_some(name), e.kind(), elapsed);
                if e.is_client_error() {
                    warn!(
                        duration_ms = elapsed.as_millis() as u64,
                        error_kind = e.kind(),
                        error = %e,
                        "Tool call rejected"
                    );
                } else {
                    // Error level reaches Sentry as an event when it is enabled.
                    error!(
                        duration_ms = elapsed.as_millis() as u64,
                        error_kind = e.kind(),
                        error = %e,
                        "Tool call failed"
                    );
                }
            }
        }
        result
    }

    async fn run(&self, name: &str, arguments: &Value) -> ToolResult<Value> {
        let descriptor = self.registry.resolve(name)?;
        let request = descriptor.bind(arguments)?;

        let deleted = (request.method == Method::DELETE).then(|| request.path());
        let body = self.upstream.send(request).await?;

        match (body, deleted) {
            (Value::Null, Some(resource)) => Ok(json!({
                "status": "deleted",
                "resource": resource,
            })),
            (body, _) => Ok(body),
        }
    }
}

/// Text form of a tool result: compact JSON, or the raw text when the upstream
/// answered with something other than JSON.
pub fn result_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
