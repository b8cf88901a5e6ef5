//! WebSocket tool execution.
//!
//! Clients send JSON messages tagged by `type`; every `execute_tool` is
//! answered with a `tool_result` carrying the caller's `request_id`. The
//! server sends a `heartbeat` every [`HEARTBEAT_INTERVAL`].

use std::time::{Duration, Instant};

use axum::{
    Extension,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

use super::handlers::{ContentItem, unix_timestamp};
use super::state::AppState;
use crate::auth::Identity;
use crate::mcp::result_text;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Messages accepted from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ExecuteTool {
        tool_name: String,
        #[serde(default)]
        arguments: Value,
        #[serde(default)]
        request_id: Option<Value>,
    },
    Ping {
        #[serde(default)]
        timestamp: Value,
    },
}

/// Messages sent to the client.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ToolResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Vec<ContentItem>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_kind: Option<String>,
        execution_time: f64,
        tool_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<Value>,
    },
    Pong {
        timestamp: f64,
        request_timestamp: Value,
    },
    Heartbeat {
        timestamp: f64,
    },
    Error {
        message: String,
    },
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Decide the reply to one text frame.
pub async fn respond(state: &AppState, text: &str) -> ServerMessage {
    let raw: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            return ServerMessage::Error {
                message: "Invalid JSON message".to_string(),
            };
        }
    };

    let message = match serde_json::from_value::<ClientMessage>(raw.clone()) {
        Ok(m) => m,
        Err(e) => {
            return match raw.get("type") {
                Some(Value::String(t)) if t == "execute_tool" || t == "ping" => {
                    ServerMessage::Error {
                        message: format!("Malformed {} message: {}", t, e),
                    }
                }
                Some(Value::String(t)) => ServerMessage::Error {
                    message: format!("Unknown message type: {}", t),
                },
                other => ServerMessage::Error {
                    message: format!(
                        "Unknown message type: {}",
                        other.cloned().unwrap_or(Value::Null)
                    ),
                },
            };
        }
    };

    match message {
        ClientMessage::ExecuteTool {
            tool_name,
            arguments,
            request_id,
        } => {
            let started = Instant::now();
            let result = state.executor().execute(&tool_name, arguments).await;
            let execution_time = started.elapsed().as_secs_f64();

            match result {
                Ok(value) => ServerMessage::ToolResult {
                    success: true,
                    result: Some(vec![ContentItem::text(result_text(&value))]),
                    error: None,
                    error_kind: None,
                    execution_time,
                    tool_name,
                    request_id,
                },
                Err(e) => ServerMessage::ToolResult {
                    success: false,
                    result: None,
                    error: Some(e.to_string()),
                    error_kind: Some(e.kind().to_string()),
                    execution_time,
                    tool_name,
                    request_id,
                },
            }
        }
        ClientMessage::Ping { timestamp } => ServerMessage::Pong {
            timestamp: unix_timestamp(),
            request_timestamp: timestamp,
        },
    }
}

async fn send(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            error!("Failed to serialize message: {}", e);
            return true;
        }
    };
    match socket.send(Message::Text(json.into())).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to send message: {}", e);
            false
        }
    }
}

/// Handle an active WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: AppState, identity: Identity) {
    info!(user = %identity.subject, "WebSocket client connected");

    let mut heartbeat = interval_at(
        tokio::time::Instant::now() + HEARTBEAT_INTERVAL,
        HEARTBEAT_INTERVAL,
    );
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        debug!("Received from client: {}", text.as_str());
                        let reply = respond(&state, text.as_str()).await;
                        if !send(&mut socket, &reply).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Client closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            _ = heartbeat.tick() => {
                let beat = ServerMessage::Heartbeat { timestamp: unix_timestamp() };
                if !send(&mut socket, &beat).await {
                    break;
                }
            }
        }
    }

    info!(user = %identity.subject, "WebSocket client disconnected");
}
