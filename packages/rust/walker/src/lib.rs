//! Catalog hierarchy traversal.
//!
//! This crate provides:
//! - [`CatalogWalker`]: depth-first walk over catalogs, schemas, tables,
//!   columns, volumes, and volume directory trees
//! - [`WalkReport`]: every produced document plus the contained failures

pub mod engine;

pub use engine::{BranchFailure, CatalogWalker, WalkReport};
