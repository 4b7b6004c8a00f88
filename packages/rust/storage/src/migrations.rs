//! SQL migration definitions for the job database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: indexing_jobs",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per crawl-and-index run
CREATE TABLE IF NOT EXISTS indexing_jobs (
    id                TEXT PRIMARY KEY,
    job_type          TEXT NOT NULL,
    status            TEXT NOT NULL
                      CHECK (status IN ('pending', 'running', 'completed', 'failed')),
    started_at        TEXT NOT NULL,
    completed_at      TEXT,
    records_processed INTEGER NOT NULL DEFAULT 0,
    error_message     TEXT,
    stats_json        TEXT,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_indexing_jobs_created ON indexing_jobs(created_at);
CREATE INDEX IF NOT EXISTS idx_indexing_jobs_status ON indexing_jobs(status);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
