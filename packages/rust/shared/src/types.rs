//! Core domain types for LakeSearch: search documents and indexing jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LakeSearchError;

/// Job type tag recorded on every run of this pipeline.
pub const JOB_TYPE_UNITY_CATALOG_SYNC: &str = "unity_catalog_sync";

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// The kind of catalog entity a search document was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Catalog,
    Schema,
    Table,
    Column,
    Volume,
    File,
    Directory,
}

impl EntityType {
    /// Lowercase tag, used both as the serialized `type` value and as the
    /// leading segment of document ids.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
            Self::Volume => "volume",
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ---------------------------------------------------------------------------
// SearchDocument
// ---------------------------------------------------------------------------

/// The flat record written to the search core, uniform across every entity
/// kind. Fields that do not apply to a given kind are `None` and omitted
/// from the serialized form; text fields the schema requires are kept
/// present as empty strings instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Deterministic identifier: type tag plus ancestor names, joined with
    /// underscores and sanitized to `[A-Za-z0-9_-]`.
    pub id: String,
    /// The entity's own name (for files, the base name).
    pub name: String,
    /// Dotted ancestor path; file entries append `/relative/path` to the
    /// owning volume's full name.
    pub full_name: String,
    /// Entity kind, serialized under the `type` key.
    #[serde(rename = "type")]
    pub doc_type: EntityType,

    /// Owning (or own) catalog name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    /// Owning (or own) schema name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Owning (or own) table name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Owning (or own) volume name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_name: Option<String>,
    /// File base name (file and directory entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Column name (column entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,

    /// Source comment; empty string when the source has none.
    #[serde(default)]
    pub description: String,
    /// Entity owner; empty string when the source has none.
    #[serde(default)]
    pub owner: String,
    /// ISO-8601 creation timestamp; never null.
    pub created_at: String,
    /// ISO-8601 last-update timestamp; never null.
    pub updated_at: String,
    /// Entity tags; always present, empty when the source carries none.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Size in bytes (file entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    /// Directory flag (file and directory entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_directory: Option<bool>,
    /// Column data type name (column entries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Backing storage location (tables and volumes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
}

// ---------------------------------------------------------------------------
// IndexingJob
// ---------------------------------------------------------------------------

/// Lifecycle state of an indexing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Lowercase form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = LakeSearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(LakeSearchError::validation(format!(
                "unknown job status: {other}"
            ))),
        }
    }
}

/// A persisted indexing run, one row in `indexing_jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingJob {
    /// Storage-assigned identifier (UUID v7, time-sortable).
    pub id: String,
    /// Pipeline tag; [`JOB_TYPE_UNITY_CATALOG_SYNC`] for this pipeline.
    pub job_type: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state; `None` while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Documents written on a completed run; stays 0 otherwise.
    pub records_processed: i64,
    /// First fatal error of a failed run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// JSON walk summary: contained branch failures and truncated paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_json: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}
