//! Marquee MCP (Model Context Protocol) server
//!
//! Exposes the catalog assistant to desktop AI clients over stdio.
//!
//! ## Tools
//!
//! - `business_query`: runs a natural-language question through the full pipeline
//! - `test_query`: connectivity check that echoes a message with server status
//! - `dataset_info`: catalog summary at basic, detailed or full depth
//!
//! ## Example Usage
//!
//! ```no_run
//! use marquee_core::config::{AppConfig, LoadOptions};
//! use marquee_mcp::MarqueeMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load(LoadOptions::default())?;
//!     let server = MarqueeMcpServer::from_config(&config)?;
//!     server.run_stdio().await
//! }
//! ```

mod server;
mod tools;

pub use server::{BusinessQueryInput, DatasetInfoInput, MarqueeMcpServer, TestQueryInput};
pub use tools::*;

use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use thiserror::Error;

/// Errors specific to MCP server operations
#[derive(Error, Debug)]
pub enum McpError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::Validation(_) => -32602,  // Invalid params
            McpError::Unavailable(_) => -32001, // Server error
            McpError::Internal(_) => -32603,    // Internal error
        }
    }
}

impl From<McpError> for ErrorData {
    fn from(error: McpError) -> Self {
        ErrorData::new(ErrorCode(error.error_code()), error.to_string(), None)
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use rmcp::ErrorData;

    use super::McpError;

    #[test]
    fn error_codes_follow_json_rpc_ranges() {
        assert_eq!(McpError::Validation("audience".into()).error_code(), -32602);
        assert_eq!(McpError::Unavailable("busy".into()).error_code(), -32001);
        assert_eq!(McpError::Internal("serialize".into()).error_code(), -32603);
    }

    #[test]
    fn converts_into_protocol_error_with_message() {
        let data = ErrorData::from(McpError::Validation("unknown audience `elders`".into()));

        assert_eq!(data.code.0, -32602);
        assert!(data.message.contains("unknown audience"));
    }
}
