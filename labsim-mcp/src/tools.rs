//! MCP tool implementations for labsim.
//!
//! The stdio client is a local operator, so every call runs as an authenticated caller.

use labsim::api::{handle_compare_args, Caller};
use labsim::engine::{ComparisonEngine, EngineConfig};
use labsim::store::{ResultStore, SqliteStore};
use rmcp::{
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use std::path::Path;
use std::sync::Arc;

/// Request parameters for the `compare_lab` tool.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct CompareLabRequest {
    /// Lab whose submissions are compared.
    #[schemars(description = "Id of the lab whose submissions should be compared")]
    pub lab_id: String,
    /// Report threshold (0-100).
    #[schemars(
        description = "Minimum similarity (0-100) for a pair to be reported; defaults to the configured report threshold"
    )]
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Request parameters for the `lab_results` tool.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct LabResultsRequest {
    /// Lab to list.
    #[schemars(description = "Id of the lab whose stored comparisons should be listed")]
    pub lab_id: String,
}

/// The main MCP server struct for labsim.
#[derive(Debug, Clone)]
pub struct LabSimServer {
    engine: Arc<ComparisonEngine>,
    store: Arc<SqliteStore>,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl LabSimServer {
    /// Creates a server over an opened store.
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, config: EngineConfig) -> Self {
        let engine = ComparisonEngine::with_config(
            Arc::clone(&store) as _,
            Arc::clone(&store) as _,
            config,
        );
        Self {
            engine: Arc::new(engine),
            store,
            tool_router: Self::tool_router(),
        }
    }

    /// Opens the database at `db_path` and creates a server over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn open(db_path: &Path, config: EngineConfig) -> anyhow::Result<Self> {
        let store = SqliteStore::open(db_path).await?;
        Ok(Self::new(Arc::new(store), config))
    }
}

#[tool_router]
impl LabSimServer {
    /// Compare every submission of a lab and replace its stored results.
    ///
    /// # Errors
    ///
    /// Never fails at the protocol level; run failures come back as error results.
    #[tool(
        description = "Compare all submissions of a coding lab for plagiarism.\n\
        Keeps the best-scored submission per student, compares same-language pairs and stores \
        pairs at or above the threshold (the configured report threshold when omitted). Pairs at \
        or above the configured flag threshold are flagged; the server instructions list both values.\n\
        Returns JSON: {success, comparisons, potentialMatches, flagged, results}."
    )]
    pub async fn compare_lab(
        &self,
        params: Parameters<CompareLabRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let caller = Caller::Authenticated {
            user_id: "mcp".to_owned(),
        };
        let response =
            handle_compare_args(&self.engine, &caller, &req.lab_id, req.threshold).await;

        let json = serde_json::to_string_pretty(&response.body)
            .unwrap_or_else(|e| format!(r#"{{"error": "Serialization error: {e}"}}"#));
        if response.is_success() {
            Ok(CallToolResult::success(vec![Content::text(json)]))
        } else {
            Ok(CallToolResult::error(vec![Content::text(json)]))
        }
    }

    /// List stored comparison rows of a lab.
    ///
    /// # Errors
    ///
    /// Never fails at the protocol level; store failures come back as error results.
    #[tool(
        description = "List the stored comparison results of a lab, highest similarity first.\n\
        Each row has submission_1_id, submission_2_id, similarity_score, matching_lines and flagged."
    )]
    pub async fn lab_results(
        &self,
        params: Parameters<LabResultsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        match self.store.lab_results(&req.lab_id).await {
            Ok(rows) => {
                let json = serde_json::to_string_pretty(&rows)
                    .unwrap_or_else(|e| format!(r#"{{"error": "Serialization error: {e}"}}"#));
                Ok(CallToolResult::success(vec![Content::text(json)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to read results: {e}"
            ))])),
        }
    }
}

#[rmcp::tool_handler]
impl ServerHandler for LabSimServer {
    fn get_info(&self) -> ServerInfo {
        let config = self.engine.config();
        ServerInfo {
            instructions: Some(format!(
                "labsim checks coding-lab submissions for copied code.\n\n\
                 TOOLS AVAILABLE:\n\
                 • compare_lab - Run a comparison for a lab and store the suspicious pairs\n\
                 • lab_results - Show the pairs stored by the last comparison\n\n\
                 Scores are 0-100. Pairs at or above {report} are reported by default; pairs at \
                 or above {flag} are flagged for manual review.",
                report = config.report_threshold,
                flag = config.flag_threshold,
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub use rmcp::model::Content;
