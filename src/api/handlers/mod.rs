//! HTTP handlers.

mod auth;
mod system;
mod tools;

#[cfg(test)]
mod auth_test;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

pub use auth::*;
pub use system::*;
pub use tools::*;

/// Error response DTO
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Tool not found: table_get_nothing")]
    pub error: String,
}

/// Seconds since the Unix epoch with millisecond precision.
pub fn unix_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
