//! REST access to the tool registry.

use std::time::Instant;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::auth::Identity;
use crate::mcp::{ToolError, result_text};

/// Tool listing entry
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ToolInfo {
    #[schema(example = "table_get_tables")]
    pub name: String,
    pub description: String,
    #[schema(example = "table")]
    pub group: String,
    #[serde(rename = "inputSchema")]
    #[schema(value_type = Object)]
    pub input_schema: Map<String, Value>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ToolList {
    pub tools: Vec<ToolInfo>,
    pub count: usize,
}

/// Tool execution request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct ToolRequest {
    #[schema(example = "table_get_tables")]
    pub tool_name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ContentItem {
    #[serde(rename = "type")]
    #[schema(example = "text")]
    pub kind: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: String) -> Self {
        Self {
            kind: "text".to_string(),
            text,
        }
    }
}

/// Tool execution response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<ContentItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One of ToolNotFound, InvalidArguments, UpstreamError, TransportError
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Seconds spent executing
    pub execution_time: f64,
}

impl ToolResponse {
    pub fn from_result(result: &Result<Value, ToolError>, execution_time: f64) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                result: Some(vec![ContentItem::text(result_text(value))]),
                error: None,
                error_kind: None,
                execution_time,
            },
            Err(e) => Self {
                success: false,
                result: None,
                error: Some(e.to_string()),
                error_kind: Some(e.kind().to_string()),
                execution_time,
            },
        }
    }
}

/// List tools
///
/// Returns every registered tool with its input schema
#[utoipa::path(
    get,
    path = "/tools",
    tag = "tools",
    responses(
        (status = 200, description = "Registered tools", body = ToolList),
        (status = 401, description = "Missing or invalid credentials", body = super::ErrorResponse)
    )
)]
#[instrument(skip(state, identity), fields(user = %identity.subject))]
pub async fn list_tools(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Json<ToolList> {
    let tools: Vec<ToolInfo> = state
        .executor()
        .registry()
        .list_all()
        .iter()
        .map(|d| ToolInfo {
            name: d.name.clone(),
            description: d.description.clone(),
            group: d.group.as_str().to_string(),
            input_schema: d.input_schema(),
        })
        .collect();

    info!(tool_count = tools.len(), "Listed tools");
    Json(ToolList {
        count: tools.len(),
        tools,
    })
}

/// Execute a tool
///
/// Validates the arguments and runs the tool against OpenMetadata
#[utoipa::path(
    post,
    path = "/tools/execute",
    tag = "tools",
    request_body = ToolRequest,
    responses(
        (status = 200, description = "Tool executed", body = ToolResponse),
        (status = 400, description = "Invalid arguments", body = ToolResponse),
        (status = 401, description = "Missing or invalid credentials", body = super::ErrorResponse),
        (status = 404, description = "Unknown tool", body = ToolResponse),
        (status = 502, description = "OpenMetadata returned an error", body = ToolResponse),
        (status = 504, description = "OpenMetadata unreachable", body = ToolResponse)
    )
)]
#[instrument(skip(state, identity, request), fields(user = %identity.subject, tool = %request.tool_name))]
pub async fn execute_tool(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<ToolRequest>,
) -> (StatusCode, Json<ToolResponse>) {
    let started = Instant::now();
    let result = state
        .executor()
        .execute(&request.tool_name, request.arguments)
        .await;
    let response = ToolResponse::from_result(&result, started.elapsed().as_secs_f64());

    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    (status, Json(response))
}
