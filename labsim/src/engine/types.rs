//! Core types for comparison runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::similarity::Language;

/// One student submission for a lab. Read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission id.
    pub id: String,
    /// Student who submitted.
    pub author_id: String,
    /// Raw source text.
    pub source_code: String,
    /// Language tag.
    pub language: Language,
    /// Grade, when graded.
    #[serde(default)]
    pub score: Option<f64>,
}

/// Persisted comparison of two submissions of the same lab.
///
/// `submission_1_id` always sorts before `submission_2_id`, so a pair has one identity no
/// matter which side it was enumerated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairComparison {
    /// Lab the pair belongs to.
    pub lab_id: String,
    /// Lexicographically smaller submission id.
    pub submission_1_id: String,
    /// Lexicographically larger submission id.
    pub submission_2_id: String,
    /// Combined similarity in `[0, 100]`, 2 decimals.
    pub similarity_score: f64,
    /// Distinct trimmed lines of submission 1 found verbatim in submission 2.
    pub matching_lines: usize,
    /// Score reached the flag threshold.
    pub flagged: bool,
}

/// Counters gathered during one run, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Submissions fetched for the lab.
    pub fetched: usize,
    /// Submissions left after one-per-author selection.
    pub selected: usize,
    /// Token bundles computed. Equals the number of submissions in at least one pair.
    pub bundles_built: usize,
    /// Pairs skipped because their languages differ.
    pub cross_language_skipped: usize,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Pairs actually scored.
    pub comparisons: usize,
    /// Pairs at or above the report threshold.
    pub potential_matches: usize,
    /// Retained pairs at or above the flag threshold.
    pub flagged: usize,
    /// Retained pairs, highest score first.
    pub results: Vec<PairComparison>,
    /// Run counters.
    pub stats: RunStats,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Fewer than two distinct authors. Nothing was scored or written.
    InsufficientData {
        /// Distinct authors found.
        authors: usize,
    },
    /// Scoring finished and stored results were replaced.
    Completed(RunSummary),
}

/// Stages of a comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Checking lab id and threshold.
    Validating,
    /// Loading submissions.
    Fetching,
    /// Reducing to one submission per author.
    Selecting,
    /// Fewer than two authors; terminal.
    InsufficientData,
    /// Enumerating same-language pairs.
    Pairing,
    /// Building bundles and scoring pairs.
    Scoring,
    /// Swapping stored results.
    Replacing,
    /// Finished.
    Done,
    /// Aborted.
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Fetching => "fetching",
            Self::Selecting => "selecting",
            Self::InsufficientData => "insufficient_data",
            Self::Pairing => "pairing",
            Self::Scoring => "scoring",
            Self::Replacing => "replacing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
