//! Storage seams of the engine.
//!
//! The engine only reads submissions and replaces comparison rows; both stores are
//! traits so the hosting layer can plug its own datastore in.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::engine::{PairComparison, Submission};
use crate::error::StoreError;

/// Source of lab submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// All submissions of a lab, highest score first, ungraded last.
    async fn fetch_lab_submissions(&self, lab_id: &str) -> Result<Vec<Submission>, StoreError>;
}

/// Destination of comparison rows.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Replace every stored row of `lab_id` with `rows` as one atomic step.
    ///
    /// Readers observe either the previous set or the new one, never a mix or an empty gap.
    async fn replace_lab_results(
        &self,
        lab_id: &str,
        rows: &[PairComparison],
    ) -> Result<(), StoreError>;

    /// Stored rows of `lab_id`, highest score first.
    async fn lab_results(&self, lab_id: &str) -> Result<Vec<PairComparison>, StoreError>;
}
