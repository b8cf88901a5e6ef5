use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown tool: {name}")]
    #[diagnostic(
        code(openmetadata_mcp::registry::not_found),
        help("List the available tools with GET /tools or the MCP tools/list request.")
    )]
    NotFound { name: String },

    #[error("Invalid arguments for {tool}: {reason}")]
    #[diagnostic(code(openmetadata_mcp::registry::invalid_arguments))]
    InvalidArguments { tool: String, reason: String },

    #[error("Tool registered twice: {name}")]
    #[diagnostic(code(openmetadata_mcp::registry::duplicate))]
    Duplicate { name: String },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
