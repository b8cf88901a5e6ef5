//! Model Context Protocol (MCP) server implementation
//!
//! - **executor**: validates arguments and calls the upstream; shared by every transport
//! - **server**: `ServerHandler` exposing the registry as MCP tools
//! - **service**: Streamable HTTP service and stdio binding
//! - **metrics**: call counters behind `/stats` and `/metrics`

mod error;
mod executor;
mod metrics;
mod server;
mod service;


pub use error::{SessionError, ToolError, ToolResult};
pub use executor::{ToolExecutor, result_text};
pub use metrics::{MetricsSnapshot, ToolMetrics, ToolStats};
pub use server::OpenMetadataServer;
pub use service::{create_mcp_service, serve_stdio};
