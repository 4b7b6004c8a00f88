//! Depth-bounded catalog walk with per-branch fault isolation.
//!
//! The walker visits catalogs, their schemas, then each schema's volumes
//! (descending into directory trees) and tables (descending into columns),
//! flattening every entity into a search document. Only the top-level
//! catalog listing can fail the walk; any deeper failure is contained in
//! its own branch, logged, and recorded on the report.

use lakesearch_document as document;
use lakesearch_metadata::{MetadataClient, TableInfo, VolumeInfo};
use lakesearch_shared::{LakeSearchError, Result, SearchDocument, WalkerConfig};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Catalogs never indexed: system namespaces of the metastore.
const EXCLUDED_CATALOGS: &[&str] = &["system", "__databricks_internal", "samples"];

/// Built-in schema present in every catalog; metadata about metadata, skipped.
const INFORMATION_SCHEMA: &str = "information_schema";

// ---------------------------------------------------------------------------
// WalkReport
// ---------------------------------------------------------------------------

/// One contained branch failure: the entity path it occurred under and the
/// rendered error.
#[derive(Debug, Clone, Serialize)]
pub struct BranchFailure {
    /// Dotted entity path (or directory path) whose listing failed.
    pub path: String,
    /// Rendered error message.
    pub error: String,
}

/// Outcome of one full walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Every document produced, each parent at or before its children.
    pub documents: Vec<SearchDocument>,
    /// Branch-local failures that were contained rather than raised.
    pub failures: Vec<BranchFailure>,
    /// Directory paths whose descent was stopped by the depth bound.
    pub truncated: Vec<String>,
}

impl WalkReport {
    fn fail(&mut self, path: &str, error: &LakeSearchError) {
        self.failures.push(BranchFailure {
            path: path.to_string(),
            error: error.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// CatalogWalker
// ---------------------------------------------------------------------------

/// Sequential, depth-first walker over one metastore.
pub struct CatalogWalker {
    client: MetadataClient,
    config: WalkerConfig,
}

impl CatalogWalker {
    /// Create a walker over the given client with the given policies.
    pub fn new(client: MetadataClient, config: WalkerConfig) -> Self {
        Self { client, config }
    }

    /// Walk the whole catalog hierarchy, producing one document per entity.
    ///
    /// A failure of the top-level catalog listing is the only error that
    /// propagates; everything deeper lands in [`WalkReport::failures`].
    #[instrument(skip_all)]
    pub async fn walk(&self) -> Result<WalkReport> {
        let mut report = WalkReport::default();

        // The only fatal listing of the walk.
        let catalogs = self.client.list_catalogs().await?;

        info!(catalogs = catalogs.len(), "starting catalog walk");

        for catalog in &catalogs {
            if self.is_excluded(&catalog.name) {
                debug!(catalog = %catalog.name, "excluded catalog, skipping");
                continue;
            }
            report.documents.push(document::catalog_document(catalog));
            self.walk_catalog(&catalog.name, &mut report).await;
        }

        info!(
            documents = report.documents.len(),
            branch_failures = report.failures.len(),
            truncated = report.truncated.len(),
            "catalog walk completed"
        );

        Ok(report)
    }

    /// Whether a catalog is excluded from indexing.
    fn is_excluded(&self, name: &str) -> bool {
        EXCLUDED_CATALOGS.contains(&name)
            || self.config.exclude_catalogs.iter().any(|c| c == name)
    }

    /// Walk one catalog's schemas. A listing failure here ends the catalog's
    /// branch; the catalog document itself is already emitted.
    async fn walk_catalog(&self, catalog: &str, report: &mut WalkReport) {
        let schemas = match self.client.list_schemas(catalog).await {
            Ok(schemas) => schemas,
            Err(e) => {
                warn!(catalog, error = %e, "schema listing failed");
                report.fail(catalog, &e);
                return;
            }
        };

        for schema in &schemas {
            if schema.name == INFORMATION_SCHEMA {
                debug!(catalog, schema = %schema.name, "built-in schema, skipping");
                continue;
            }
            report.documents.push(document::schema_document(schema));

            // Volumes and tables are independent branches of the schema;
            // one failing must not stop the other.
            self.walk_volumes(catalog, &schema.name, report).await;
            self.walk_tables(catalog, &schema.name, report).await;
        }
    }

    /// Walk one schema's volumes and their directory trees.
    async fn walk_volumes(&self, catalog: &str, schema: &str, report: &mut WalkReport) {
        let volumes = match self.client.list_volumes(catalog, schema).await {
            Ok(volumes) => volumes,
            Err(e) => {
                warn!(catalog, schema, error = %e, "volume listing failed");
                report.fail(&format!("{catalog}.{schema}"), &e);
                return;
            }
        };

        for volume in &volumes {
            report.documents.push(document::volume_document(volume));
            self.walk_volume_tree(volume, report).await;
        }
    }

    /// Iterative descent over one volume's directory tree with an explicit
    /// (path, depth) worklist. `depth` counts listing levels below the
    /// volume root, so no listing ever happens more than `max_depth` levels
    /// deep; subtrees past the bound are recorded as truncated.
    async fn walk_volume_tree(&self, volume: &VolumeInfo, report: &mut WalkReport) {
        let root = volume.root_path();
        let mut worklist: Vec<(String, u32)> = vec![(root.clone(), 0)];

        while let Some((path, depth)) = worklist.pop() {
            let entries = match self.client.list_directory(&path).await {
                Ok(entries) => entries,
                Err(e) if e.is_not_found() => {
                    // Nothing has ever been written under this path.
                    debug!(%path, "directory has no contents");
                    continue;
                }
                Err(e) => {
                    warn!(%path, error = %e, "directory listing failed");
                    report.fail(&path, &e);
                    continue;
                }
            };

            let mut subdirs: Vec<String> = Vec::new();
            for entry in &entries {
                let rel_path = relative_path(&root, &entry.path, &entry.name);
                report
                    .documents
                    .push(document::entry_document(volume, &rel_path, entry));

                if entry.is_directory {
                    if depth + 1 < self.config.max_depth {
                        subdirs.push(entry.path.clone());
                    } else {
                        debug!(
                            path = %entry.path,
                            max_depth = self.config.max_depth,
                            "depth bound reached, not descending"
                        );
                        report.truncated.push(entry.path.clone());
                    }
                }
            }

            // Reverse push so the depth-first pop order follows listing order.
            for subdir in subdirs.into_iter().rev() {
                worklist.push((subdir, depth + 1));
            }
        }
    }

    /// Walk one schema's tables and their columns.
    async fn walk_tables(&self, catalog: &str, schema: &str, report: &mut WalkReport) {
        let tables = match self.client.list_tables(catalog, schema).await {
            Ok(tables) => tables,
            Err(e) => {
                warn!(catalog, schema, error = %e, "table listing failed");
                report.fail(&format!("{catalog}.{schema}"), &e);
                return;
            }
        };

        for table in &tables {
            report.documents.push(document::table_document(table));
            self.walk_columns(table, report).await;
        }
    }

    /// Walk one table's columns. Table kinds without column metadata answer
    /// 404, which just means an empty contribution.
    async fn walk_columns(&self, table: &TableInfo, report: &mut WalkReport) {
        let full_name = table.full_name();
        let columns = match self.client.list_columns(&full_name).await {
            Ok(columns) => columns,
            Err(e) if e.is_not_found() => {
                debug!(table = %full_name, "no column metadata");
                return;
            }
            Err(e) => {
                warn!(table = %full_name, error = %e, "column listing failed");
                report.fail(&full_name, &e);
                return;
            }
        };

        for column in &columns {
            report
                .documents
                .push(document::column_document(table, column));
        }
    }
}

/// Path of a directory entry relative to the volume root, without leading
/// or trailing slashes. Falls back to the entry name if the server returns
/// a path outside the root.
fn relative_path(root: &str, entry_path: &str, entry_name: &str) -> String {
    entry_path
        .strip_prefix(root)
        .map(|p| p.trim_matches('/').to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| entry_name.to_string())
}
