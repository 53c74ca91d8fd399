//! Comparison engine for coding-lab submissions.
//!
//! A run walks `Fetching → Selecting → (InsufficientData | Pairing) → Scoring → Replacing →
//! Done`, or ends in `Failed`. Only fetching and replacing touch a store; everything in
//! between is CPU work on a blocking thread.

mod selector;
mod types;

pub use selector::SubmissionSelector;
pub use types::{PairComparison, RunOutcome, RunState, RunStats, RunSummary, Submission};

pub(crate) use selector::compare_scores_desc;

use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::constants::{DEFAULT_REPORT_THRESHOLD, FLAG_THRESHOLD};
use crate::error::EngineError;
use crate::similarity::{matching_lines, ScoreWeights, SimilarityScorer, TokenBundle};
use crate::store::{ResultStore, SubmissionStore};

/// Thresholds and weights of a comparison engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Report threshold used when a run does not pass one.
    pub report_threshold: f64,
    /// Score at or above which a retained pair is flagged.
    pub flag_threshold: f64,
    /// Signal weights of the combined score.
    pub weights: ScoreWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            report_threshold: DEFAULT_REPORT_THRESHOLD,
            flag_threshold: FLAG_THRESHOLD,
            weights: ScoreWeights::default(),
        }
    }
}

/// Output of the CPU phase of a run.
#[derive(Debug, Clone, Default)]
pub struct ScoredLab {
    /// Pairs scored (same-language pairs of selected submissions).
    pub comparisons: usize,
    /// Pairs at or above the report threshold, highest score first.
    pub retained: Vec<PairComparison>,
    /// Bundles computed.
    pub bundles_built: usize,
    /// Pairs dropped for differing languages.
    pub cross_language_skipped: usize,
}

/// Orchestrates a full comparison run for one lab.
pub struct ComparisonEngine {
    submissions: Arc<dyn SubmissionStore>,
    results: Arc<dyn ResultStore>,
    config: EngineConfig,
    lab_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for ComparisonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ComparisonEngine {
    /// Create an engine with default thresholds and weights.
    #[must_use]
    pub fn new(submissions: Arc<dyn SubmissionStore>, results: Arc<dyn ResultStore>) -> Self {
        Self::with_config(submissions, results, EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    #[must_use]
    pub fn with_config(
        submissions: Arc<dyn SubmissionStore>,
        results: Arc<dyn ResultStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            submissions,
            results,
            config,
            lab_locks: DashMap::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Labs with a run in progress or waiting for one.
    #[must_use]
    pub fn active_labs(&self) -> usize {
        self.lab_locks.len()
    }

    /// Store the engine writes results to.
    #[must_use]
    pub fn result_store(&self) -> Arc<dyn ResultStore> {
        Arc::clone(&self.results)
    }

    /// Compare all submissions of `lab_id` and replace its stored results.
    ///
    /// `report_threshold` defaults to the configured value. Runs for the same lab on this
    /// engine are serialized; the last one to finish owns the stored rows.
    pub async fn run(
        &self,
        lab_id: &str,
        report_threshold: Option<f64>,
    ) -> Result<RunOutcome, EngineError> {
        let started = Instant::now();
        let report_threshold = report_threshold.unwrap_or(self.config.report_threshold);
        validate(lab_id, report_threshold).inspect_err(|e| log_failure(lab_id, e))?;

        let lock = Arc::clone(
            self.lab_locks
                .entry(lab_id.to_owned())
                .or_default()
                .value(),
        );
        let _guard = LabGuard {
            locks: &self.lab_locks,
            lab_id,
            held: Some(lock.lock_owned().await),
        };

        enter(lab_id, RunState::Fetching);
        let fetched = self
            .submissions
            .fetch_lab_submissions(lab_id)
            .await
            .map_err(|source| EngineError::UpstreamFetch {
                lab_id: lab_id.to_owned(),
                source,
            })
            .inspect_err(|e| log_failure(lab_id, e))?;
        let fetched_count = fetched.len();

        enter(lab_id, RunState::Selecting);
        let selected = SubmissionSelector::select(fetched);
        if selected.len() < 2 {
            enter(lab_id, RunState::InsufficientData);
            tracing::info!(
                lab_id,
                authors = selected.len(),
                "not enough authors to compare"
            );
            return Ok(RunOutcome::InsufficientData {
                authors: selected.len(),
            });
        }
        let selected_count = selected.len();

        enter(lab_id, RunState::Pairing);
        let scorer = SimilarityScorer::new(self.config.weights);
        let flag_threshold = self.config.flag_threshold;
        let owned_lab = lab_id.to_owned();
        enter(lab_id, RunState::Scoring);
        let scored = tokio::task::spawn_blocking(move || {
            score_selected(
                &owned_lab,
                &selected,
                &scorer,
                report_threshold,
                flag_threshold,
            )
        })
        .await
        .map_err(|source| EngineError::Scoring {
            lab_id: lab_id.to_owned(),
            source,
        })
        .inspect_err(|e| log_failure(lab_id, e))?;

        enter(lab_id, RunState::Replacing);
        self.results
            .replace_lab_results(lab_id, &scored.retained)
            .await
            .map_err(|source| EngineError::Persistence {
                lab_id: lab_id.to_owned(),
                source,
            })
            .inspect_err(|e| log_failure(lab_id, e))?;

        let stats = RunStats {
            fetched: fetched_count,
            selected: selected_count,
            bundles_built: scored.bundles_built,
            cross_language_skipped: scored.cross_language_skipped,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        let flagged = scored.retained.iter().filter(|pair| pair.flagged).count();

        enter(lab_id, RunState::Done);
        tracing::info!(
            lab_id,
            comparisons = scored.comparisons,
            potential_matches = scored.retained.len(),
            flagged,
            bundles_built = stats.bundles_built,
            cross_language_skipped = stats.cross_language_skipped,
            elapsed_ms = stats.elapsed_ms,
            "comparison run finished"
        );

        Ok(RunOutcome::Completed(RunSummary {
            comparisons: scored.comparisons,
            potential_matches: scored.retained.len(),
            flagged,
            results: scored.retained,
            stats,
        }))
    }
}

/// Score every same-language pair of already selected submissions.
///
/// Each submission that takes part in a pair is normalized and tokenized exactly once,
/// before any pair is scored; pairs then read the cached bundles by index.
#[must_use]
pub fn score_selected(
    lab_id: &str,
    selected: &[Submission],
    scorer: &SimilarityScorer,
    report_threshold: f64,
    flag_threshold: f64,
) -> ScoredLab {
    let (pairs, cross_language_skipped) = same_language_pairs(selected);

    let mut involved = vec![false; selected.len()];
    for &(i, j) in &pairs {
        involved[i] = true;
        involved[j] = true;
    }

    let bundles: Vec<Option<TokenBundle>> = selected
        .par_iter()
        .zip(involved.par_iter())
        .map(|(submission, &needed)| {
            needed.then(|| TokenBundle::build(&submission.source_code, &submission.language))
        })
        .collect();
    let bundles_built = bundles.iter().filter(|bundle| bundle.is_some()).count();

    let mut retained: Vec<PairComparison> = pairs
        .par_iter()
        .filter_map(|&(i, j)| {
            let (first, second) = if selected[i].id <= selected[j].id {
                (i, j)
            } else {
                (j, i)
            };
            let score = scorer.score(bundles[first].as_ref()?, bundles[second].as_ref()?);
            if score < report_threshold {
                return None;
            }
            Some(PairComparison {
                lab_id: lab_id.to_owned(),
                submission_1_id: selected[first].id.clone(),
                submission_2_id: selected[second].id.clone(),
                similarity_score: score,
                matching_lines: matching_lines(
                    &selected[first].source_code,
                    &selected[second].source_code,
                ),
                flagged: score >= flag_threshold,
            })
        })
        .collect();

    retained.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| a.submission_1_id.cmp(&b.submission_1_id))
            .then_with(|| a.submission_2_id.cmp(&b.submission_2_id))
    });

    ScoredLab {
        comparisons: pairs.len(),
        retained,
        bundles_built,
        cross_language_skipped,
    }
}

/// Index pairs `(i, j)`, `i < j`, whose languages match, plus the number of skipped pairs.
#[must_use]
pub fn same_language_pairs(selected: &[Submission]) -> (Vec<(usize, usize)>, usize) {
    let mut pairs = Vec::new();
    let mut skipped = 0;
    for i in 0..selected.len() {
        for j in (i + 1)..selected.len() {
            if selected[i].language == selected[j].language {
                pairs.push((i, j));
            } else {
                skipped += 1;
            }
        }
    }
    (pairs, skipped)
}

fn validate(lab_id: &str, report_threshold: f64) -> Result<(), EngineError> {
    if lab_id.trim().is_empty() {
        return Err(EngineError::Validation("labId is required".to_owned()));
    }
    if !report_threshold.is_finite() || !(0.0..=100.0).contains(&report_threshold) {
        return Err(EngineError::Validation(format!(
            "threshold must be between 0 and 100, got {report_threshold}"
        )));
    }
    Ok(())
}

/// Holds a lab's run lock and drops the lab's map entry once nobody else waits on it.
struct LabGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    lab_id: &'a str,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for LabGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        // Waiters hold a clone, so a count of 1 means only the map refers to the lock.
        self.locks
            .remove_if(self.lab_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn enter(lab_id: &str, state: RunState) {
    tracing::debug!(lab_id, state = %state, "run state");
}

fn log_failure(lab_id: &str, error: &EngineError) {
    tracing::warn!(
        lab_id,
        state = %RunState::Failed,
        failed_in = %error.state(),
        error = %error,
        "comparison run failed"
    );
}
