//! OpenMetadata MCP server.
//!
//! Exposes the OpenMetadata REST API as Model Context Protocol tools over
//! stdio or HTTP, with an optional REST/WebSocket surface for browsers and
//! scripts.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod mcp;
pub mod registry;
pub mod upstream;
