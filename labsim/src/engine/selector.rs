//! One-submission-per-author selection.

use rustc_hash::FxHashSet;
use std::cmp::Ordering;

use crate::engine::types::Submission;

/// Picks the representative submission of every author.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionSelector;

impl SubmissionSelector {
    /// Keep the highest-scoring submission of each author.
    ///
    /// Submissions are stable-sorted by score descending (ungraded ones after every graded
    /// one) and the first submission seen for each author wins, so equal scores resolve to
    /// input order. The result lists authors in that same order.
    #[must_use]
    pub fn select(submissions: Vec<Submission>) -> Vec<Submission> {
        let mut ordered = submissions;
        ordered.sort_by(|a, b| compare_scores_desc(a.score, b.score));

        let mut seen: FxHashSet<String> = FxHashSet::default();
        ordered
            .into_iter()
            .filter(|submission| seen.insert(submission.author_id.clone()))
            .collect()
    }
}

/// Descending score order with missing scores last.
pub(crate) fn compare_scores_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
