//! Error types shared by the engine and its storage adapters.

use thiserror::Error;

use crate::engine::RunState;

/// Failure reported by a submissions or results store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The SQLite backend rejected an operation.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A blocking store task panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A stored value could not be converted.
    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Failure of a comparison run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid lab id or threshold. Raised before any data access.
    #[error("{0}")]
    Validation(String),
    /// Submissions could not be loaded. Nothing was written.
    #[error("failed to fetch submissions for lab {lab_id}: {source}")]
    UpstreamFetch {
        /// Lab being compared.
        lab_id: String,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
    /// The scoring task did not complete. Nothing was written.
    #[error("scoring failed for lab {lab_id}: {source}")]
    Scoring {
        /// Lab being compared.
        lab_id: String,
        /// Join failure of the blocking scoring task.
        #[source]
        source: tokio::task::JoinError,
    },
    /// Replacing the stored comparisons failed. Previous rows are left untouched.
    #[error("failed to store comparisons for lab {lab_id}: {source}")]
    Persistence {
        /// Lab being compared.
        lab_id: String,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    /// State the run was in when it failed.
    #[must_use]
    pub const fn state(&self) -> RunState {
        match self {
            Self::Validation(_) => RunState::Validating,
            Self::UpstreamFetch { .. } => RunState::Fetching,
            Self::Scoring { .. } => RunState::Scoring,
            Self::Persistence { .. } => RunState::Replacing,
        }
    }
}
