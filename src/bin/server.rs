//! `om-mcp`: OpenMetadata MCP server.

#[tokio::main]
async fn main() -> miette::Result<()> {
    openmetadata_mcp::cli::run().await?;
    Ok(())
}
