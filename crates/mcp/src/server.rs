//! MCP Server Implementation
//!
//! Implements the Model Context Protocol server for Marquee.

use std::sync::Arc;

use marquee_agent::{AgentRuntime, RuntimeError};
use marquee_core::config::AppConfig;
use marquee_core::dataset::{describe, DetailLevel};
use marquee_core::domain::{Audience, QueryContext};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    schemars::{self, JsonSchema},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::tools::ALL_TOOL_NAMES;
use crate::{McpError, McpResult};

const SERVER_NAME: &str = "marquee-mcp";

/// Main MCP server for Marquee
#[derive(Clone)]
pub struct MarqueeMcpServer {
    runtime: Arc<AgentRuntime>,
    permits: Arc<Semaphore>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool inputs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BusinessQueryInput {
    #[schemars(description = "Business question about the streaming catalog, in plain language")]
    pub natural_language_query: String,

    #[schemars(description = "Audience the answer is for: general, kids, family, teen or adult")]
    #[serde(default)]
    pub audience: Option<String>,

    #[schemars(description = "Caller locale, for example en-US")]
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TestQueryInput {
    #[schemars(description = "Message echoed back by the server")]
    #[serde(default = "default_test_message")]
    pub test_message: String,
}

impl Default for TestQueryInput {
    fn default() -> Self {
        Self { test_message: default_test_message() }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DatasetInfoInput {
    #[schemars(description = "Summary depth: basic, detailed or full")]
    #[serde(default = "default_detail_level")]
    pub detail_level: String,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl MarqueeMcpServer {
    /// Create a server around an already-built runtime.
    pub fn new(runtime: Arc<AgentRuntime>, max_concurrent_requests: usize) -> Self {
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "business_query",
        description = "Answer a business question about the streaming catalog. Returns a \
                       success, rejected or error response with the evidence behind it."
    )]
    async fn business_query(
        &self,
        Parameters(input): Parameters<BusinessQueryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let value = self.business_query_json(input).await?;
        json_result(&value)
    }

    #[tool(
        name = "test_query",
        description = "Check connectivity. Echoes the message with server status and counters."
    )]
    async fn test_query(
        &self,
        Parameters(input): Parameters<TestQueryInput>,
    ) -> Result<CallToolResult, ErrorData> {
        json_result(&self.test_query_json(input))
    }

    #[tool(
        name = "dataset_info",
        description = "Summarize the loaded catalog at basic, detailed or full depth."
    )]
    async fn dataset_info(
        &self,
        Parameters(input): Parameters<DatasetInfoInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let value = self.dataset_info_json(input)?;
        json_result(&value)
    }
}

impl MarqueeMcpServer {
    /// Build the runtime from configuration and size the request limiter.
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let runtime = AgentRuntime::from_config(config)?;
        Ok(Self::new(Arc::new(runtime), config.pipeline.max_concurrent_requests))
    }

    pub fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router.list_all().into_iter().map(|tool| tool.name.to_string()).collect()
    }

    /// Run the server with stdio transport
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        info!(event_name = "mcp.server.starting", transport = "stdio", "starting MCP server");

        let service = self.serve(stdio()).await?;
        let quit_reason = service.waiting().await?;

        info!(
            event_name = "mcp.server.stopped",
            reason = ?quit_reason,
            "MCP server shutdown complete"
        );
        Ok(())
    }

    /// Runs one question through the pipeline. Pipeline failures come back as an
    /// error `Response`; only malformed parameters surface as protocol errors.
    pub async fn business_query_json(&self, input: BusinessQueryInput) -> McpResult<Value> {
        let audience = input
            .audience
            .as_deref()
            .map(str::parse::<Audience>)
            .transpose()
            .map_err(|parse_error| McpError::Validation(parse_error.to_string()))?;
        let context = QueryContext { audience, locale: input.locale };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| McpError::Unavailable("request limiter closed".to_owned()))?;

        debug!(
            event_name = "mcp.tool.business_query",
            audience = context.audience().as_str(),
            "business_query called"
        );
        let response = self.runtime.handle(&input.natural_language_query, context).await;

        serde_json::to_value(&response)
            .map_err(|serialize_error| McpError::Internal(serialize_error.to_string()))
    }

    pub fn test_query_json(&self, input: TestQueryInput) -> Value {
        debug!(event_name = "mcp.tool.test_query", "test_query called");

        json!({
            "status": "success",
            "echo": input.test_message,
            "server_info": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
                "tools": ALL_TOOL_NAMES,
                "dataset_loaded": self.runtime.catalog().is_loaded(),
                "reasoning_provider": self.runtime.reasoning_provider(),
                "guardrails_enabled": self.runtime.guardrails_enabled(),
                "available_permits": self.permits.available_permits(),
                "stats": self.runtime.stats(),
            },
        })
    }

    pub fn dataset_info_json(&self, input: DatasetInfoInput) -> McpResult<Value> {
        let level = input.detail_level.parse::<DetailLevel>().map_err(McpError::Validation)?;

        let table = match self.runtime.catalog().table() {
            Ok(table) => table,
            Err(dataset_error) => {
                warn!(
                    event_name = "mcp.tool.dataset_info.unavailable",
                    error = %dataset_error,
                    "dataset_info requested without a loaded catalog"
                );
                return Ok(json!({ "status": "error", "reason": "dataset unavailable" }));
            }
        };

        serde_json::to_value(describe(table, level))
            .map_err(|serialize_error| McpError::Internal(serialize_error.to_string()))
    }
}

// Implement ServerHandler trait for MCP protocol
#[tool_handler]
impl ServerHandler for MarqueeMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Marquee MCP Server - business intelligence over a streaming catalog. \
                 Ask questions with business_query, inspect the data with dataset_info."
                    .to_owned(),
            ),
            ..Default::default()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn json_result(value: &Value) -> Result<CallToolResult, ErrorData> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|serialize_error| McpError::Internal(serialize_error.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(content)]))
}

fn default_test_message() -> String {
    "Hello MCP!".to_owned()
}

fn default_detail_level() -> String {
    "basic".to_owned()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use marquee_agent::AgentRuntime;
    use marquee_core::dataset::{sample_table, Catalog};
    use rmcp::ServerHandler;

    use super::{DatasetInfoInput, MarqueeMcpServer, TestQueryInput};
    use crate::tools::ALL_TOOL_NAMES;

    fn server(catalog: Catalog) -> MarqueeMcpServer {
        let runtime = AgentRuntime::builder(catalog).build().expect("runtime");
        MarqueeMcpServer::new(Arc::new(runtime), 2)
    }

    #[test]
    fn registers_exactly_the_catalogued_tools() {
        let server = server(Catalog::from_table(sample_table()));
        let mut names = server.tool_names();
        names.sort_unstable();
        let mut expected: Vec<String> =
            ALL_TOOL_NAMES.iter().map(|name| name.to_string()).collect();
        expected.sort_unstable();

        assert_eq!(names, expected);
    }

    #[test]
    fn server_info_advertises_tools_and_name() {
        let info = server(Catalog::from_table(sample_table())).get_info();

        assert_eq!(info.server_info.name, "marquee-mcp");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap_or_default().contains("business_query"));
    }

    #[test]
    fn test_query_defaults_to_hello_message() {
        let server = server(Catalog::from_table(sample_table()));
        let value = server.test_query_json(TestQueryInput::default());

        assert_eq!(value["status"], "success");
        assert_eq!(value["echo"], "Hello MCP!");
        assert_eq!(value["server_info"]["available_permits"], 2);
    }

    #[test]
    fn zero_concurrency_still_admits_one_request() {
        let runtime =
            AgentRuntime::builder(Catalog::from_table(sample_table())).build().expect("runtime");
        let server = MarqueeMcpServer::new(Arc::new(runtime), 0);

        let value = server.test_query_json(TestQueryInput::default());
        assert_eq!(value["server_info"]["available_permits"], 1);
    }

    #[test]
    fn unknown_detail_level_is_a_validation_error() {
        let error = server(Catalog::from_table(sample_table()))
            .dataset_info_json(DatasetInfoInput { detail_level: "verbose".to_owned() })
            .expect_err("invalid level");

        assert_eq!(error.error_code(), -32602);
    }
}
