//! In-process store used by tests and embedding hosts.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{compare_scores_desc, PairComparison, Submission};
use crate::error::StoreError;
use crate::store::{ResultStore, SubmissionStore};

/// Submissions and results held in memory.
///
/// Each lab's results are one immutable `Arc<[PairComparison]>`; a replace swaps the pointer
/// under a single write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    submissions: RwLock<FxHashMap<String, Vec<Submission>>>,
    results: RwLock<FxHashMap<String, Arc<[PairComparison]>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed the submissions of a lab.
    #[must_use]
    pub fn with_lab(mut self, lab_id: &str, submissions: Vec<Submission>) -> Self {
        self.submissions
            .get_mut()
            .entry(lab_id.to_owned())
            .or_default()
            .extend(submissions);
        self
    }

    /// Append submissions to a lab.
    pub async fn insert_submissions(&self, lab_id: &str, submissions: Vec<Submission>) {
        self.submissions
            .write()
            .await
            .entry(lab_id.to_owned())
            .or_default()
            .extend(submissions);
    }

    /// Snapshot of the stored rows of a lab, shared with the store.
    pub async fn snapshot(&self, lab_id: &str) -> Option<Arc<[PairComparison]>> {
        self.results.read().await.get(lab_id).map(Arc::clone)
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn fetch_lab_submissions(&self, lab_id: &str) -> Result<Vec<Submission>, StoreError> {
        let mut submissions = self
            .submissions
            .read()
            .await
            .get(lab_id)
            .cloned()
            .unwrap_or_default();
        submissions.sort_by(|a, b| compare_scores_desc(a.score, b.score));
        Ok(submissions)
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn replace_lab_results(
        &self,
        lab_id: &str,
        rows: &[PairComparison],
    ) -> Result<(), StoreError> {
        let fresh: Arc<[PairComparison]> = Arc::from(rows);
        self.results.write().await.insert(lab_id.to_owned(), fresh);
        Ok(())
    }

    async fn lab_results(&self, lab_id: &str) -> Result<Vec<PairComparison>, StoreError> {
        Ok(self
            .snapshot(lab_id)
            .await
            .map(|rows| rows.to_vec())
            .unwrap_or_default())
    }
}
