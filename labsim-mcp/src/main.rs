//! labsim MCP Server
//!
//! Exposes lab comparisons as MCP tools over stdio.

use anyhow::{Context, Result};
use labsim::config::Config;
use labsim_mcp::tools::LabSimServer;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};

/// Main entry point for the MCP server.
///
/// Logs go to stderr; stdout carries the protocol.
#[tokio::main]
async fn main() -> Result<()> {
    labsim::logging::init(false);

    let config = Config::load();
    let db_path = config
        .database_path()
        .context("no database configured; set LABSIM_DB or `database` in labsim.toml")?;
    tracing::info!(path = %db_path.display(), "starting labsim MCP server");

    let server = LabSimServer::open(&db_path, config.engine_config()).await?;

    let transport = (stdin(), stdout());
    let service = server.serve(transport).await?;
    service.waiting().await?;

    Ok(())
}
