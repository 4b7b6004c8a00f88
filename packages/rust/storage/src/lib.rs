//! libSQL job store.
//!
//! The [`JobStore`] wraps a local libSQL database holding the `indexing_jobs`
//! table: one row per crawl-and-index run, carrying the lifecycle state,
//! document count, first fatal error, and a JSON summary of contained walk
//! failures. Ids are assigned here (UUID v7, time-sortable) so callers never
//! invent their own. Every operation acquires a fresh connection from the
//! database handle.

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use lakesearch_shared::{
    IndexingJob, JOB_TYPE_UNITY_CATALOG_SYNC, JobStatus, LakeSearchError, Result,
};
use libsql::{Connection, Database, params};
use uuid::Uuid;

/// Columns selected for every job read, in [`row_to_job`] order.
const JOB_COLUMNS: &str = "id, job_type, status, started_at, completed_at, \
                           records_processed, error_message, stats_json, created_at";

/// Job store handle wrapping a libSQL database.
pub struct JobStore {
    db: Database,
}

impl JobStore {
    /// Open or create the job database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LakeSearchError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LakeSearchError::Storage(e.to_string()))?;

        let store = Self { db };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Acquire a connection for one operation.
    fn connect(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| LakeSearchError::Storage(e.to_string()))
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let conn = self.connect()?;
        let current_version = Self::schema_version(&conn).await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                conn.execute_batch(migration.sql).await.map_err(|e| {
                    LakeSearchError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn schema_version(conn: &Connection) -> u32 {
        let result = conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Job lifecycle
    // -----------------------------------------------------------------------

    /// Insert a new job row in `running` state. Returns the assigned id.
    pub async fn create_job(&self) -> Result<String> {
        let conn = self.connect()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO indexing_jobs (id, job_type, status, started_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.as_str(),
                JOB_TYPE_UNITY_CATALOG_SYNC,
                JobStatus::Running.as_str(),
                now.as_str(),
                now.as_str()
            ],
        )
        .await
        .map_err(|e| LakeSearchError::Storage(e.to_string()))?;
        Ok(id)
    }

    /// Mark a job completed with its final document count and walk stats.
    pub async fn complete_job(
        &self,
        job_id: &str,
        records_processed: i64,
        stats_json: Option<&str>,
    ) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE indexing_jobs
             SET status = ?1, completed_at = ?2, records_processed = ?3, stats_json = ?4
             WHERE id = ?5",
            params![
                JobStatus::Completed.as_str(),
                now.as_str(),
                records_processed,
                stats_json,
                job_id
            ],
        )
        .await
        .map_err(|e| LakeSearchError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Mark a job failed with the fatal error's message. `records_processed`
    /// keeps its default of 0; nothing was fully written.
    pub async fn fail_job(&self, job_id: &str, error_message: &str) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE indexing_jobs
             SET status = ?1, completed_at = ?2, error_message = ?3
             WHERE id = ?4",
            params![
                JobStatus::Failed.as_str(),
                now.as_str(),
                error_message,
                job_id
            ],
        )
        .await
        .map_err(|e| LakeSearchError::Storage(e.to_string()))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Job queries
    // -----------------------------------------------------------------------

    /// Get a job by id.
    pub async fn get_job(&self, job_id: &str) -> Result<Option<IndexingJob>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                &format!("SELECT {JOB_COLUMNS} FROM indexing_jobs WHERE id = ?1"),
                params![job_id],
            )
            .await
            .map_err(|e| LakeSearchError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_job(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(LakeSearchError::Storage(e.to_string())),
        }
    }

    /// List the most recent jobs, newest first.
    pub async fn list_recent_jobs(&self, limit: u32) -> Result<Vec<IndexingJob>> {
        let conn = self.connect()?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {JOB_COLUMNS} FROM indexing_jobs
                     ORDER BY created_at DESC LIMIT ?1"
                ),
                params![limit],
            )
            .await
            .map_err(|e| LakeSearchError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_job(&row)?);
        }
        Ok(results)
    }
}

/// Convert a database row to an [`IndexingJob`].
fn row_to_job(row: &libsql::Row) -> Result<IndexingJob> {
    let status: String = row
        .get(2)
        .map_err(|e| LakeSearchError::Storage(e.to_string()))?;

    Ok(IndexingJob {
        id: row
            .get::<String>(0)
            .map_err(|e| LakeSearchError::Storage(e.to_string()))?,
        job_type: row
            .get::<String>(1)
            .map_err(|e| LakeSearchError::Storage(e.to_string()))?,
        status: status.parse()?,
        started_at: parse_datetime(
            &row.get::<String>(3)
                .map_err(|e| LakeSearchError::Storage(e.to_string()))?,
        )?,
        completed_at: match row.get::<String>(4).ok() {
            Some(s) => Some(parse_datetime(&s)?),
            None => None,
        },
        records_processed: row
            .get::<i64>(5)
            .map_err(|e| LakeSearchError::Storage(e.to_string()))?,
        error_message: row.get::<String>(6).ok(),
        stats_json: row.get::<String>(7).ok(),
        created_at: parse_datetime(
            &row.get::<String>(8)
                .map_err(|e| LakeSearchError::Storage(e.to_string()))?,
        )?,
    })
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LakeSearchError::Storage(format!("invalid date: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a temp file store for testing.
    async fn test_store() -> JobStore {
        let tmp = std::env::temp_dir().join(format!("ls_test_{}.db", Uuid::now_v7()));
        JobStore::open(&tmp).await.expect("open test db")
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let store = test_store().await;
        let conn = store.connect().expect("connect");
        assert_eq!(JobStore::schema_version(&conn).await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("ls_test_{}.db", Uuid::now_v7()));
        let s1 = JobStore::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = JobStore::open(&tmp).await.expect("second open");
        let conn = s2.connect().expect("connect");
        assert_eq!(JobStore::schema_version(&conn).await, 1);
    }

    #[tokio::test]
    async fn created_job_starts_running() {
        let store = test_store().await;
        let job_id = store.create_job().await.expect("create job");
        assert!(!job_id.is_empty());

        let job = store
            .get_job(&job_id)
            .await
            .expect("get job")
            .expect("job exists");
        assert_eq!(job.id, job_id);
        assert_eq!(job.job_type, JOB_TYPE_UNITY_CATALOG_SYNC);
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.records_processed, 0);
        assert!(job.completed_at.is_none());
        assert!(job.error_message.is_none());
    }

    #[tokio::test]
    async fn complete_job_records_count_and_stats() {
        let store = test_store().await;
        let job_id = store.create_job().await.unwrap();

        store
            .complete_job(&job_id, 1234, Some(r#"{"branch_failures": []}"#))
            .await
            .expect("complete job");

        let job = store.get_job(&job_id).await.unwrap().expect("job exists");
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.records_processed, 1234);
        assert!(job.completed_at.is_some());
        assert!(job.error_message.is_none());
        assert!(job.stats_json.as_deref().unwrap().contains("branch_failures"));
    }

    #[tokio::test]
    async fn fail_job_keeps_zero_records() {
        let store = test_store().await;
        let job_id = store.create_job().await.unwrap();

        store
            .fail_job(&job_id, "index error: update rejected: HTTP 503")
            .await
            .expect("fail job");

        let job = store.get_job(&job_id).await.unwrap().expect("job exists");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.records_processed, 0);
        assert!(job.completed_at.is_some());
        assert!(
            job.error_message
                .as_deref()
                .unwrap()
                .contains("HTTP 503")
        );
    }

    #[tokio::test]
    async fn get_unknown_job_is_none() {
        let store = test_store().await;
        let found = store.get_job("no-such-job").await.expect("get job");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_recent_orders_newest_first() {
        let store = test_store().await;

        // UUID v7 ids are time-ordered, and created_at is set per insert.
        let first = store.create_job().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create_job().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = store.create_job().await.unwrap();

        let recent = store.list_recent_jobs(2).await.expect("list jobs");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, third);
        assert_eq!(recent[1].id, second);

        let all = store.list_recent_jobs(10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].id, first);
    }

    #[tokio::test]
    async fn invalid_status_rejected_by_schema() {
        let store = test_store().await;
        let conn = store.connect().unwrap();
        let result = conn
            .execute(
                "INSERT INTO indexing_jobs (id, job_type, status, started_at, created_at)
                 VALUES ('x', 'unity_catalog_sync', 'exploded', '2024-01-01', '2024-01-01')",
                params![],
            )
            .await;
        assert!(result.is_err());
    }
}
