//! Command-line entry point for the `om-mcp` server.

pub mod error;


use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, AppState, ServerConfig};
use crate::config::{Config, MonitoringConfig};
use crate::mcp::{ToolExecutor, serve_stdio};
use crate::registry::{ApiGroup, ToolRegistry};
use crate::upstream::OpenMetadataClient;
use error::ServerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout
    Stdio,
    /// MCP streamable HTTP only (`/mcp` and `/health`)
    Sse,
    /// Full HTTP server: REST, WebSocket, dashboard and `/mcp`
    Http,
}

#[derive(Parser, Debug)]
#[command(name = "om-mcp")]
#[command(author, version, about = "MCP server for the OpenMetadata REST API", long_about = None)]
pub struct Cli {
    /// Transport to serve MCP on
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Host address to bind to (sse/http)
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on (sse/http)
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Reject HTTP requests without a valid token, API key or session
    #[arg(long)]
    pub require_auth: bool,

    /// API groups to expose as tools (comma-separated)
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = ApiGroup::CORE
    )]
    pub apis: Vec<ApiGroup>,
}

/// Sentry client options, or `None` when no DSN is configured.
fn sentry_options(monitoring: &MonitoringConfig) -> Option<sentry::ClientOptions> {
    let dsn = monitoring.sentry_dsn.clone()?;
    Some(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        environment: Some(monitoring.environment.clone().into()),
        traces_sample_rate: monitoring.traces_sample_rate,
        ..Default::default()
    })
}

/// Start the Sentry client. Events are flushed when the guard drops.
fn init_error_reporting(monitoring: &MonitoringConfig) -> Option<sentry::ClientInitGuard> {
    sentry_options(monitoring).map(sentry::init)
}

/// Initialize tracing.
///
/// Logs always go to stderr: on the stdio transport stdout carries JSON-RPC.
/// `RUST_LOG` wins over `LOG_LEVEL`. With Sentry enabled, `error!` events
/// are captured and lower levels become breadcrumbs.
fn init_tracing(monitoring: &MonitoringConfig) {
    let level = monitoring.log_level.as_filter();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "openmetadata_mcp={level},tower_http={level},rmcp={level}"
        ))
    });
    let sentry_layer = monitoring
        .sentry_dsn
        .is_some()
        .then(|| sentry::integrations::tracing::layer());

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(sentry_layer);
    if monitoring.structured_logging {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Parse arguments, load configuration and serve until shutdown.
pub async fn run() -> ServerResult<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate_auth(cli.require_auth)?;
    let _sentry = init_error_reporting(&config.monitoring);
    init_tracing(&config.monitoring);
    if let Some(dsn) = &config.monitoring.sentry_dsn {
        info!(
            host = dsn.host(),
            environment = %config.monitoring.environment,
            "Error reporting to Sentry enabled"
        );
    }

    let client = OpenMetadataClient::new(&config.upstream)?;
    let registry = Arc::new(ToolRegistry::new(&cli.apis));
    info!(
        tools = registry.len(),
        groups = ?registry.groups(),
        upstream = %client.api_base(),
        "Tool registry ready"
    );
    let executor = ToolExecutor::new(registry, Arc::new(client));

    match cli.transport {
        Transport::Stdio => {
            info!("Serving MCP on stdio");
            serve_stdio(executor).await?;
        }
        Transport::Sse | Transport::Http => {
            let state = AppState::new(&config, executor, cli.require_auth)?;
            let server = ServerConfig {
                host: cli.host,
                port: cli.port,
                mcp_only: cli.transport == Transport::Sse,
                cors_origins: config.cors_origins.clone(),
                api_key_header: config.auth.api_key_header.clone(),
            };
            api::run(server, state).await?;
        }
    }

    info!("Server stopped");
    Ok(())
}
