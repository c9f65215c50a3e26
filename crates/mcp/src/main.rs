//! Marquee MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Run with marquee.toml from the working directory (or defaults)
//! marquee-mcp
//!
//! # Point at a specific dataset and enable an LLM judge
//! MARQUEE_DATASET_PATH=data/netflix_titles.csv \
//! MARQUEE_LLM_PROVIDER=ollama MARQUEE_LLM_BASE_URL=http://localhost:11434 marquee-mcp
//! ```
//!
//! Logs go to stderr; stdout carries the protocol.

use anyhow::Result;
use marquee_core::config::{AppConfig, LoadOptions, LoggingConfig};
use marquee_mcp::MarqueeMcpServer;
use tracing::info;

fn init_logging(logging: &LoggingConfig) {
    use marquee_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config.logging);

    info!(
        event_name = "mcp.server.bootstrap",
        dataset = %config.dataset.path.display(),
        provider = config.llm.provider.as_str(),
        max_concurrent_requests = config.pipeline.max_concurrent_requests,
        "starting Marquee MCP server"
    );

    let server = MarqueeMcpServer::from_config(&config)?;
    server.run_stdio().await
}
