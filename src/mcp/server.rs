//! MCP server implementation
//!
//! Tools are not known at compile time, so `list_tools` and `call_tool` are
//! implemented by hand on top of the [`ToolRegistry`](crate::registry::ToolRegistry)
//! instead of through the `#[tool]` macros.

use std::sync::Arc;

use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, ListToolsResult, PaginatedRequestParams,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use serde_json::Value;

use super::error::ToolError;
use super::executor::{ToolExecutor, result_text};

/// MCP server over the tool executor.
///
/// One instance is created per MCP session; they all share the executor.
#[derive(Clone)]
pub struct OpenMetadataServer {
    executor: ToolExecutor,
    tools: Arc<Vec<Tool>>,
}

impl OpenMetadataServer {
    pub fn new(executor: ToolExecutor) -> Self {
        let tools = executor
            .registry()
            .list_all()
            .iter()
            .map(|d| {
                Tool::new(
                    d.name.clone(),
                    d.description.clone(),
                    Arc::new(d.input_schema()),
                )
            })
            .collect();

        Self {
            executor,
            tools: Arc::new(tools),
        }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Run a tool and shape the outcome for MCP.
    ///
    /// Caller mistakes become JSON-RPC errors; upstream failures become tool
    /// results flagged `isError` so the client can read the upstream message.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<CallToolResult, ErrorData> {
        match self.executor.execute(name, arguments).await {
            Ok(value) => Ok(CallToolResult::success(vec![Content::text(result_text(
                &value,
            ))])),
            Err(e) if e.is_client_error() => Err(ErrorData::invalid_params(e.to_string(), None)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(error_text(&e))])),
        }
    }
}

fn error_text(e: &ToolError) -> String {
    match e {
        ToolError::Upstream { status, body } => format!("HTTP {}: {}", status, body),
        other => other.to_string(),
    }
}

impl ServerHandler for OpenMetadataServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build()).with_instructions(
            format!(
                "OpenMetadata MCP Server - {} tools for browsing and managing metadata \
                 (groups: {})",
                self.tools.len(),
                self.executor
                    .registry()
                    .groups()
                    .iter()
                    .map(|g| g.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.tools.to_vec())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);
            self.call(&request.name, arguments).await
        }
    }
}
