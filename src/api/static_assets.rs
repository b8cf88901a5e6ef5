//! Embedded dashboard assets.
//!
//! In release mode the files under `assets/` are compiled into the binary; in
//! debug mode rust-embed reads them from disk at runtime.

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use rust_embed::RustEmbed;
use tracing::instrument;

use super::state::AppState;

#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "*.html"]
#[include = "*.css"]
#[include = "*.js"]
#[include = "*.svg"]
struct DashboardAssets;

const DASHBOARD: &str = "dashboard.html";

/// Fill the dashboard template placeholders.
pub fn render_dashboard(template: &str, tool_count: usize, uptime_secs: u64) -> String {
    template
        .replace("{{tool_count}}", &tool_count.to_string())
        .replace("{{uptime}}", &uptime_secs.to_string())
        .replace("{{version}}", env!("CARGO_PKG_VERSION"))
}

fn fallback_page(tool_count: usize) -> String {
    format!(
        "<html><head><title>OpenMetadata MCP Server</title></head><body>\
         <h1>OpenMetadata MCP Server</h1>\
         <p>Server is running with {} tools available.</p>\
         <p>API Documentation: <a href='/docs'>/docs</a></p>\
         </body></html>",
        tool_count
    )
}

/// Dashboard at `/`.
#[instrument(skip(state))]
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let tool_count = state.executor().registry().len();
    let page = match DashboardAssets::get(DASHBOARD) {
        Some(file) => render_dashboard(
            &String::from_utf8_lossy(&file.data),
            tool_count,
            state.uptime().as_secs(),
        ),
        None => fallback_page(tool_count),
    };
    Html(page)
}

/// Serve a static file from `/assets/*`. Unknown files are 404.
pub async fn serve_asset(uri: Uri) -> Response {
    let path = uri
        .path()
        .trim_start_matches('/')
        .trim_start_matches("assets/");

    match DashboardAssets::get(path) {
        Some(content) if path != DASHBOARD => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                Body::from(content.data),
            )
                .into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
