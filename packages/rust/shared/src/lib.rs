//! Shared types, error model, and configuration for LakeSearch.
//!
//! This crate is the foundation depended on by all other LakeSearch crates.
//! It provides:
//! - [`LakeSearchError`]: the unified error type
//! - Domain types ([`SearchDocument`], [`EntityType`], [`IndexingJob`])
//! - Configuration ([`AppConfig`] and config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, MetadataConfig, SearchConfig, StorageConfig, WalkerConfig, apply_env_overrides,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_db_path,
    resolve_token, validate_config,
};
pub use error::{LakeSearchError, Result};
pub use types::{
    EntityType, IndexingJob, JOB_TYPE_UNITY_CATALOG_SYNC, JobStatus, SearchDocument,
};
