//! Pipeline orchestration for LakeSearch.
//!
//! This crate ties the metadata client, catalog walker, batch indexer, and
//! job store together into the end-to-end `sync` workflow.

pub mod pipeline;

pub use pipeline::{ProgressReporter, SilentProgress, SyncConfig, SyncResult, run_sync};
