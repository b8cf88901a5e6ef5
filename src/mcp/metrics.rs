//! In-process tool call metrics.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Default)]
struct Counters {
    calls: u64,
    failures: u64,
    total_time: Duration,
}

impl Counters {
    fn record(&mut self, success: bool, elapsed: Duration) {
        self.calls += 1;
        if !success {
            self.failures += 1;
        }
        self.total_time += elapsed;
    }

    fn average_seconds(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_time.as_secs_f64() / self.calls as f64
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    overall: Counters,
    errors_by_type: BTreeMap<String, u64>,
    per_tool: BTreeMap<String, Counters>,
}

/// Call counters shared by every transport.
#[derive(Debug, Default)]
pub struct ToolMetrics {
    inner: Mutex<Inner>,
}

/// Point-in-time view of [`ToolMetrics`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    /// Fraction of successful calls, 0.0 when nothing was called yet
    #[schema(example = 0.95)]
    pub success_rate: f64,
    /// Mean duration in seconds
    pub average_response_time: f64,
    pub errors_by_type: BTreeMap<String, u64>,
    pub tools: BTreeMap<String, ToolStats>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolStats {
    pub calls: u64,
    pub failures: u64,
    pub average_response_time: f64,
}

impl ToolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Counters stay meaningful even if a holder panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_success(&self, tool: &str, elapsed: Duration) {
        let mut inner = self.lock();
        inner.overall.record(true, elapsed);
        inner
            .per_tool
            .entry(tool.to_string())
            .or_default()
            .record(true, elapsed);
    }

    /// Record a failed call. `tool` is `None` when the name did not resolve,
    /// so caller-invented names never get a per-tool entry.
    pub fn record_failure(&self, tool: Option<&str>, error_type: &str, elapsed: Duration) {
        let mut inner = self.lock();
        inner.overall.record(false, elapsed);
        if let Some(tool) = tool {
            inner
                .per_tool
                .entry(tool.to_string())
                .or_default()
                .record(false, elapsed);
        }
        *inner
            .errors_by_type
            .entry(error_type.to_string())
            .or_default() += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.lock();
        let total = inner.overall.calls;
        let failed = inner.overall.failures;
        let successful = total - failed;

        MetricsSnapshot {
            total_calls: total,
            successful_calls: successful,
            failed_calls: failed,
            success_rate: if total == 0 {
                0.0
            } else {
                successful as f64 / total as f64
            },
            average_response_time: inner.overall.average_seconds(),
            errors_by_type: inner.errors_by_type.clone(),
            tools: inner
                .per_tool
                .iter()
                .map(|(name, c)| {
                    (
                        name.clone(),
                        ToolStats {
                            calls: c.calls,
                            failures: c.failures,
                            average_response_time: c.average_seconds(),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl MetricsSnapshot {
    /// Render in the Prometheus text exposition format.
    pub fn to_prometheus(&self, uptime: Duration) -> String {
        let mut out = String::new();
        let mut metric = |name: &str, kind: &str, help: &str, value: String| {
            let _ = writeln!(out, "# HELP {} {}", name, help);
            let _ = writeln!(out, "# TYPE {} {}", name, kind);
            let _ = writeln!(out, "{} {}", name, value);
        };

        metric(
            "mcp_tool_calls_total",
            "counter",
            "Total number of MCP tool calls",
            self.total_calls.to_string(),
        );
        metric(
            "mcp_tool_successful_calls_total",
            "counter",
            "Number of successful MCP tool calls",
            self.successful_calls.to_string(),
        );
        metric(
            "mcp_tool_failed_calls_total",
            "counter",
            "Number of failed MCP tool calls",
            self.failed_calls.to_string(),
        );
        metric(
            "mcp_tool_success_rate",
            "gauge",
            "Success rate of MCP tool calls",
            format!("{:.4}", self.success_rate),
        );
        metric(
            "mcp_tool_average_response_time_seconds",
            "gauge",
            "Average response time of MCP tool calls in seconds",
            format!("{:.4}", self.average_response_time),
        );

        let _ = writeln!(out, "# HELP mcp_tool_errors_total Number of errors by type");
        let _ = writeln!(out, "# TYPE mcp_tool_errors_total counter");
        for (error_type, count) in &self.errors_by_type {
            let _ = writeln!(
                out,
                "mcp_tool_errors_total{{error_type=\"{}\"}} {}",
                error_type, count
            );
        }

        let _ = writeln!(out, "# HELP mcp_server_uptime_seconds Server uptime in seconds");
        let _ = writeln!(out, "# TYPE mcp_server_uptime_seconds gauge");
        let _ = writeln!(out, "mcp_server_uptime_seconds {:.2}", uptime.as_secs_f64());
        out
    }
}
