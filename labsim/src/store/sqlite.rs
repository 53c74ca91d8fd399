//! SQLite-backed store.
//!
//! Every call opens its own connection on a blocking thread. Result replacement runs
//! inside one transaction, so a failed write leaves the previous rows in place.

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use tokio::task;

use crate::engine::{PairComparison, Submission};
use crate::error::StoreError;
use crate::similarity::Language;
use crate::store::{ResultStore, SubmissionStore};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS submissions (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    lab_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    source_code TEXT NOT NULL,
    language TEXT NOT NULL,
    score REAL
);
CREATE INDEX IF NOT EXISTS idx_submissions_lab ON submissions(lab_id);
CREATE TABLE IF NOT EXISTS code_comparisons (
    lab_id TEXT NOT NULL,
    submission_1_id TEXT NOT NULL,
    submission_2_id TEXT NOT NULL,
    similarity_score REAL NOT NULL,
    matching_lines INTEGER NOT NULL,
    flagged INTEGER NOT NULL,
    UNIQUE (lab_id, submission_1_id, submission_2_id)
);
CREATE INDEX IF NOT EXISTS idx_comparisons_lab ON code_comparisons(lab_id);
";

/// Submissions and comparison rows in a single SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (creating when needed) the database at `db_path` and ensure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the schema cannot be created.
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = db_path.as_ref().to_path_buf();
        let setup_path = path.clone();
        task::spawn_blocking(move || {
            let conn = Connection::open(&setup_path)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, StoreError>(())
        })
        .await??;
        tracing::debug!(path = %path.display(), "sqlite store ready");
        Ok(Self { db_path: path })
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Insert submissions into `lab_id`, updating rows whose id already exists.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns an error when the transaction fails; no row is written in that case.
    pub async fn insert_submissions(
        &self,
        lab_id: &str,
        submissions: Vec<Submission>,
    ) -> Result<usize, StoreError> {
        let path = self.db_path.clone();
        let lab = lab_id.to_owned();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path)?;
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO submissions (id, lab_id, author_id, source_code, language, score)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                        lab_id = excluded.lab_id,
                        author_id = excluded.author_id,
                        source_code = excluded.source_code,
                        language = excluded.language,
                        score = excluded.score",
                )?;
                for submission in &submissions {
                    stmt.execute(params![
                        submission.id,
                        lab,
                        submission.author_id,
                        submission.source_code,
                        submission.language.as_str(),
                        submission.score,
                    ])?;
                }
            }
            tx.commit()?;
            Ok::<_, StoreError>(submissions.len())
        })
        .await?
    }

    /// Lab ids with stored submissions, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub async fn list_labs(&self) -> Result<Vec<String>, StoreError> {
        let path = self.db_path.clone();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let mut stmt = conn.prepare("SELECT DISTINCT lab_id FROM submissions ORDER BY lab_id")?;
            let labs = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok::<_, StoreError>(labs)
        })
        .await?
    }
}

#[async_trait]
impl SubmissionStore for SqliteStore {
    async fn fetch_lab_submissions(&self, lab_id: &str) -> Result<Vec<Submission>, StoreError> {
        let path = self.db_path.clone();
        let lab = lab_id.to_owned();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let mut stmt = conn.prepare(
                "SELECT id, author_id, source_code, language, score FROM submissions
                 WHERE lab_id = ?1
                 ORDER BY score IS NULL, score DESC, seq",
            )?;
            let rows = stmt
                .query_map(params![lab], submission_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok::<_, StoreError>(rows)
        })
        .await?
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn replace_lab_results(
        &self,
        lab_id: &str,
        rows: &[PairComparison],
    ) -> Result<(), StoreError> {
        let path = self.db_path.clone();
        let lab = lab_id.to_owned();
        let rows = rows.to_vec();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path)?;
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM code_comparisons WHERE lab_id = ?1", params![lab])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO code_comparisons
                        (lab_id, submission_1_id, submission_2_id, similarity_score, matching_lines, flagged)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for row in &rows {
                    let matching = i64::try_from(row.matching_lines).map_err(|_| {
                        StoreError::InvalidData(format!(
                            "matching line count {} does not fit the database",
                            row.matching_lines
                        ))
                    })?;
                    stmt.execute(params![
                        lab,
                        row.submission_1_id,
                        row.submission_2_id,
                        row.similarity_score,
                        matching,
                        row.flagged,
                    ])?;
                }
            }
            tx.commit()?;
            tracing::debug!(lab_id = %lab, rows = rows.len(), "comparisons replaced");
            Ok::<_, StoreError>(())
        })
        .await?
    }

    async fn lab_results(&self, lab_id: &str) -> Result<Vec<PairComparison>, StoreError> {
        let path = self.db_path.clone();
        let lab = lab_id.to_owned();
        task::spawn_blocking(move || {
            let conn = Connection::open(&path)?;
            let mut stmt = conn.prepare(
                "SELECT lab_id, submission_1_id, submission_2_id, similarity_score, matching_lines, flagged
                 FROM code_comparisons
                 WHERE lab_id = ?1
                 ORDER BY similarity_score DESC, submission_1_id, submission_2_id",
            )?;
            let raw = stmt
                .query_map(params![lab], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, bool>(5)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            raw.into_iter()
                .map(|(lab_id, first, second, score, matching, flagged)| {
                    let matching_lines = usize::try_from(matching).map_err(|_| {
                        StoreError::InvalidData(format!("negative matching line count {matching}"))
                    })?;
                    Ok(PairComparison {
                        lab_id,
                        submission_1_id: first,
                        submission_2_id: second,
                        similarity_score: score,
                        matching_lines,
                        flagged,
                    })
                })
                .collect::<Result<Vec<_>, StoreError>>()
        })
        .await?
    }
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    let language: String = row.get(3)?;
    Ok(Submission {
        id: row.get(0)?,
        author_id: row.get(1)?,
        source_code: row.get(2)?,
        language: Language::from(language.as_str()),
        score: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sub(id: &str, author: &str, score: Option<f64>) -> Submission {
        Submission {
            id: id.to_owned(),
            author_id: author.to_owned(),
            source_code: format!("int {id}() {{ return 0; }}"),
            language: Language::C,
            score,
        }
    }

    fn row(a: &str, b: &str, score: f64) -> PairComparison {
        PairComparison {
            lab_id: "lab".to_owned(),
            submission_1_id: a.to_owned(),
            submission_2_id: b.to_owned(),
            similarity_score: score,
            matching_lines: 2,
            flagged: score >= 70.0,
        }
    }

    async fn store(dir: &TempDir) -> SqliteStore {
        SqliteStore::open(dir.path().join("labsim.db")).await.unwrap()
    }

    #[tokio::test]
    async fn test_fetch_orders_scores_with_nulls_last() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store
            .insert_submissions(
                "lab",
                vec![sub("a", "1", None), sub("b", "2", Some(20.0)), sub("c", "3", Some(95.5))],
            )
            .await
            .unwrap();
        store
            .insert_submissions("other", vec![sub("z", "9", Some(100.0))])
            .await
            .unwrap();

        let fetched = store.fetch_lab_submissions("lab").await.unwrap();
        let ids: Vec<_> = fetched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(fetched[0].language, Language::C);
        assert_eq!(store.list_labs().await.unwrap(), vec!["lab", "other"]);
    }

    #[tokio::test]
    async fn test_insert_updates_existing_id() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.insert_submissions("lab", vec![sub("a", "1", None)]).await.unwrap();
        store
            .insert_submissions("lab", vec![sub("a", "1", Some(60.0))])
            .await
            .unwrap();

        let fetched = store.fetch_lab_submissions("lab").await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].score, Some(60.0));
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_rows() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store
            .replace_lab_results("lab", &[row("a", "b", 55.0), row("a", "c", 90.0)])
            .await
            .unwrap();
        store
            .replace_lab_results("lab", &[row("b", "c", 75.25)])
            .await
            .unwrap();

        let stored = store.lab_results("lab").await.unwrap();
        assert_eq!(stored, vec![row("b", "c", 75.25)]);
    }

    #[tokio::test]
    async fn test_results_sorted_by_score() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store
            .replace_lab_results("lab", &[row("a", "b", 55.0), row("a", "c", 90.0)])
            .await
            .unwrap();
        let stored = store.lab_results("lab").await.unwrap();
        assert_eq!(stored[0].similarity_score, 90.0);
        assert!(stored[0].flagged);
        assert!(!stored[1].flagged);
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_old_rows() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store
            .replace_lab_results("lab", &[row("a", "b", 80.0)])
            .await
            .unwrap();

        // The duplicate violates the unique key and rolls the whole transaction back.
        let duplicate = [row("c", "d", 60.0), row("c", "d", 60.0)];
        assert!(store.replace_lab_results("lab", &duplicate).await.is_err());

        let stored = store.lab_results("lab").await.unwrap();
        assert_eq!(stored, vec![row("a", "b", 80.0)]);
    }
}
