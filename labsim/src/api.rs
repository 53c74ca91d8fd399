//! Request handler for the compare invocation.
//!
//! Hosts (the CLI, the MCP server, or an HTTP layer) hand in a JSON body and a [`Caller`];
//! the handler returns a status code plus the JSON body to send back.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::INSUFFICIENT_DATA_MESSAGE;
use crate::engine::{ComparisonEngine, PairComparison, RunOutcome, RunSummary};
use crate::error::EngineError;

/// Identity of whoever invoked the handler, established by the hosting layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// No valid credentials.
    Anonymous,
    /// Signed-in user.
    Authenticated {
        /// User id.
        user_id: String,
    },
}

/// Parsed compare request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRequest {
    /// Lab to compare.
    pub lab_id: String,
    /// Report threshold; `None` uses the engine default.
    pub threshold: Option<f64>,
}

impl CompareRequest {
    /// Parse `{ labId, threshold? }`.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingLabId`] when `labId` is absent, not a string, or blank;
    /// [`ApiError::InvalidRequest`] when `threshold` is not a number in `[0, 100]`.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let lab_id = body
            .get("labId")
            .and_then(Value::as_str)
            .ok_or(ApiError::MissingLabId)?;

        let threshold = match body.get("threshold") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_f64().ok_or_else(|| {
                ApiError::InvalidRequest(format!("threshold must be a number, got {value}"))
            })?),
        };

        Self::new(lab_id, threshold)
    }

    /// Build a request from already typed arguments.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingLabId`] when `lab_id` is blank;
    /// [`ApiError::InvalidRequest`] when `threshold` is not a finite number in `[0, 100]`.
    pub fn new(lab_id: &str, threshold: Option<f64>) -> Result<Self, ApiError> {
        let lab_id = lab_id.trim();
        if lab_id.is_empty() {
            return Err(ApiError::MissingLabId);
        }
        if let Some(t) = threshold {
            if !t.is_finite() || !(0.0..=100.0).contains(&t) {
                return Err(ApiError::InvalidRequest(format!(
                    "threshold must be between 0 and 100, got {t}"
                )));
            }
        }
        Ok(Self {
            lab_id: lab_id.to_owned(),
            threshold,
        })
    }
}

/// Failure reported to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `labId` missing or invalid.
    #[error("labId is required")]
    MissingLabId,
    /// Malformed request field.
    #[error("{0}")]
    InvalidRequest(String),
    /// Anonymous caller.
    #[error("Unauthorized")]
    Unauthorized,
    /// Anything that went wrong after validation.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP-style status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::MissingLabId | Self::InvalidRequest(_) => 400,
            Self::Unauthorized => 401,
            Self::Internal(_) => 500,
        }
    }

    /// `{ "error": message }`.
    #[must_use]
    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Validation(message) => Self::InvalidRequest(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// One entry of `results` in a success body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    /// Combined score.
    pub similarity: f64,
    /// Matching line count.
    pub matching_lines: usize,
    /// Flagged for review.
    pub flagged: bool,
}

impl From<&PairComparison> for ResultEntry {
    fn from(row: &PairComparison) -> Self {
        Self {
            similarity: row.similarity_score,
            matching_lines: row.matching_lines,
            flagged: row.flagged,
        }
    }
}

/// Body of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CompareResponse {
    /// Fewer than two authors.
    #[serde(rename_all = "camelCase")]
    InsufficientData {
        /// Always `true`.
        success: bool,
        /// Fixed explanation.
        message: String,
        /// Always 0.
        comparisons: usize,
        /// Always 0.
        flagged: usize,
    },
    /// Run completed.
    #[serde(rename_all = "camelCase")]
    Completed {
        /// Always `true`.
        success: bool,
        /// Pairs scored.
        comparisons: usize,
        /// Pairs at or above the report threshold.
        potential_matches: usize,
        /// Flagged pairs.
        flagged: usize,
        /// Retained pairs, highest score first.
        results: Vec<ResultEntry>,
    },
}

impl CompareResponse {
    /// Body for a run that found too few authors.
    #[must_use]
    pub fn insufficient_data() -> Self {
        Self::InsufficientData {
            success: true,
            message: INSUFFICIENT_DATA_MESSAGE.to_owned(),
            comparisons: 0,
            flagged: 0,
        }
    }

    /// Body for a completed run.
    #[must_use]
    pub fn completed(summary: &RunSummary) -> Self {
        Self::Completed {
            success: true,
            comparisons: summary.comparisons,
            potential_matches: summary.potential_matches,
            flagged: summary.flagged,
            results: summary.results.iter().map(ResultEntry::from).collect(),
        }
    }
}

impl From<&RunOutcome> for CompareResponse {
    fn from(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::InsufficientData { .. } => Self::insufficient_data(),
            RunOutcome::Completed(summary) => Self::completed(summary),
        }
    }
}

/// Status code and JSON body returned to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP-style status.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(response: &T) -> Self {
        match serde_json::to_value(response) {
            Ok(body) => Self { status: 200, body },
            Err(e) => {
                tracing::error!(error = %e, "failed to encode compare response");
                Self::error(&ApiError::Internal(format!("failed to encode response: {e}")))
            }
        }
    }

    fn error(error: &ApiError) -> Self {
        Self {
            status: error.status(),
            body: error.body(),
        }
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Run a compare request and return the outcome, or the error to report.
///
/// Anonymous callers are rejected before the body is looked at.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn compare(
    engine: &ComparisonEngine,
    caller: &Caller,
    body: &Value,
) -> Result<RunOutcome, ApiError> {
    authorize(caller)?;
    let request = CompareRequest::from_json(body)?;
    execute(engine, caller, &request).await
}

/// Same as [`compare`] for hosts that already hold typed arguments.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn compare_args(
    engine: &ComparisonEngine,
    caller: &Caller,
    lab_id: &str,
    threshold: Option<f64>,
) -> Result<RunOutcome, ApiError> {
    authorize(caller)?;
    let request = CompareRequest::new(lab_id, threshold)?;
    execute(engine, caller, &request).await
}

/// Run a compare request end to end and build the response.
pub async fn handle_compare(
    engine: &ComparisonEngine,
    caller: &Caller,
    body: &Value,
) -> ApiResponse {
    respond(compare(engine, caller, body).await)
}

/// Run a typed compare request end to end and build the response.
pub async fn handle_compare_args(
    engine: &ComparisonEngine,
    caller: &Caller,
    lab_id: &str,
    threshold: Option<f64>,
) -> ApiResponse {
    respond(compare_args(engine, caller, lab_id, threshold).await)
}

fn authorize(caller: &Caller) -> Result<(), ApiError> {
    if *caller == Caller::Anonymous {
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

async fn execute(
    engine: &ComparisonEngine,
    caller: &Caller,
    request: &CompareRequest,
) -> Result<RunOutcome, ApiError> {
    if let Caller::Authenticated { user_id } = caller {
        tracing::debug!(lab_id = %request.lab_id, user_id, "compare requested");
    }
    Ok(engine.run(&request.lab_id, request.threshold).await?)
}

fn respond(result: Result<RunOutcome, ApiError>) -> ApiResponse {
    match result {
        Ok(outcome) => ApiResponse::ok(&CompareResponse::from(&outcome)),
        Err(error) => {
            if error.status() >= 500 {
                tracing::error!(error = %error, "compare request failed");
            }
            ApiResponse::error(&error)
        }
    }
}
