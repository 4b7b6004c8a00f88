//! End-to-end `sync` pipeline: open job → clear index → walk → bulk load →
//! close job.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use lakesearch_indexer::BatchIndexer;
use lakesearch_metadata::MetadataClient;
use lakesearch_shared::{Result, SearchConfig, WalkerConfig};
use lakesearch_storage::JobStore;
use lakesearch_walker::{CatalogWalker, WalkReport};

/// Configuration for one `sync` run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the metadata API workspace.
    pub metadata_base_url: String,
    /// Bearer token for the metadata API.
    pub metadata_token: String,
    /// Search engine coordinates.
    pub search: SearchConfig,
    /// Path of the local job database.
    pub db_path: PathBuf,
    /// Walk policies (depth bound, extra catalog exclusions).
    pub walker: WalkerConfig,
}

/// Result of one completed sync.
#[derive(Debug)]
pub struct SyncResult {
    /// Id of the recorded job row.
    pub job_id: String,
    /// Number of documents written to the search core.
    pub documents_indexed: usize,
    /// Branches that failed and contributed no further documents.
    pub branch_failures: usize,
    /// Directory subtrees cut off by the depth bound.
    pub truncated_paths: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &SyncResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &SyncResult) {}
}

/// Run the full `sync` pipeline.
///
/// 1. Record a `running` job
/// 2. Clear the search core
/// 3. Walk the catalog hierarchy into documents
/// 4. Bulk-load the documents
/// 5. Mark the job completed (or failed)
///
/// A failure before the job row exists propagates as-is; any later failure
/// is recorded on the job before it propagates.
#[instrument(skip_all, fields(base_url = %config.metadata_base_url))]
pub async fn run_sync(
    config: &SyncConfig,
    progress: &dyn ProgressReporter,
) -> Result<SyncResult> {
    let start = Instant::now();

    progress.phase("Opening job store");
    let store = JobStore::open(&config.db_path).await?;
    let job_id = store.create_job().await?;

    info!(%job_id, "starting sync");

    match sync_phases(config, progress).await {
        Ok((report, written)) => {
            let stats = serde_json::json!({
                "documents": written,
                "branch_failures": report.failures,
                "truncated_paths": report.truncated,
            });
            store
                .complete_job(&job_id, written as i64, Some(&stats.to_string()))
                .await?;

            let result = SyncResult {
                job_id,
                documents_indexed: written,
                branch_failures: report.failures.len(),
                truncated_paths: report.truncated.len(),
                elapsed: start.elapsed(),
            };
            progress.done(&result);

            info!(
                job_id = %result.job_id,
                documents = result.documents_indexed,
                branch_failures = result.branch_failures,
                truncated_paths = result.truncated_paths,
                elapsed_ms = result.elapsed.as_millis(),
                "sync complete"
            );

            Ok(result)
        }
        Err(e) => {
            error!(%job_id, error = %e, "sync failed");
            if let Err(store_err) = store.fail_job(&job_id, &e.to_string()).await {
                error!(%job_id, error = %store_err, "could not record job failure");
            }
            Err(e)
        }
    }
}

/// The fallible middle of the pipeline: everything between job creation and
/// the final status update.
async fn sync_phases(
    config: &SyncConfig,
    progress: &dyn ProgressReporter,
) -> Result<(WalkReport, usize)> {
    let indexer = BatchIndexer::new(&config.search)?;
    let client = MetadataClient::new(&config.metadata_base_url, &config.metadata_token)?;
    let walker = CatalogWalker::new(client, config.walker.clone());

    progress.phase("Clearing search core");
    indexer.clear().await?;

    progress.phase("Walking catalog hierarchy");
    let report = walker.walk().await?;

    progress.phase("Indexing documents");
    let written = indexer.index_all(&report.documents).await?;

    Ok((report, written))
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use lakesearch_shared::{JobStatus, LakeSearchError};
    use lakesearch_storage::JobStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SOLR_UPDATE: &str = "/solr/test_core/update";

    /// Sync config pointed at the mock server for both the metadata API and
    /// the search engine, with a fresh temp database.
    fn sync_config(server: &MockServer) -> SyncConfig {
        let db_path =
            std::env::temp_dir().join(format!("ls_sync_{}.db", uuid::Uuid::now_v7()));
        SyncConfig {
            metadata_base_url: server.uri(),
            metadata_token: "test-token".into(),
            search: SearchConfig {
                host: "127.0.0.1".into(),
                port: server.address().port(),
                core: "test_core".into(),
            },
            db_path,
            walker: WalkerConfig::default(),
        }
    }

    async fn mock_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    /// One catalog, one schema, one two-column table, no volumes.
    async fn mount_metastore(server: &MockServer) {
        mock_json(
            server,
            "/api/2.1/unity-catalog/catalogs",
            serde_json::json!({"catalogs": [{"name": "sales"}]}),
        )
        .await;
        mock_json(
            server,
            "/api/2.1/unity-catalog/schemas",
            serde_json::json!({"schemas": [{"name": "raw", "catalog_name": "sales"}]}),
        )
        .await;
        mock_json(server, "/api/2.1/unity-catalog/volumes", serde_json::json!({})).await;
        mock_json(
            server,
            "/api/2.1/unity-catalog/tables",
            serde_json::json!({
                "tables": [{"name": "orders", "catalog_name": "sales", "schema_name": "raw"}]
            }),
        )
        .await;
        mock_json(
            server,
            "/api/2.1/unity-catalog/tables/sales.raw.orders",
            serde_json::json!({
                "name": "orders", "catalog_name": "sales", "schema_name": "raw",
                "columns": [
                    {"name": "order_id", "type_name": "BIGINT"},
                    {"name": "amount", "type_name": "DECIMAL(10,2)"}
                ]
            }),
        )
        .await;
    }

    async fn mount_solr(server: &MockServer, status: u16) {
        Mock::given(method("POST"))
            .and(path(SOLR_UPDATE))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({"responseHeader": {"status": 0}})),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_sync_records_completed_job() {
        let server = MockServer::start().await;
        mount_metastore(&server).await;
        mount_solr(&server, 200).await;

        let config = sync_config(&server);
        let result = run_sync(&config, &SilentProgress).await.unwrap();

        // catalog + schema + table + 2 columns
        assert_eq!(result.documents_indexed, 5);
        assert_eq!(result.branch_failures, 0);
        assert_eq!(result.truncated_paths, 0);

        let store = JobStore::open(&config.db_path).await.unwrap();
        let job = store
            .get_job(&result.job_id)
            .await
            .unwrap()
            .expect("job row");
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.records_processed, 5);
        assert!(job.completed_at.is_some());
        assert!(job.error_message.is_none());
        let stats = job.stats_json.expect("stats recorded");
        assert!(stats.contains("\"documents\":5"));
    }

    #[tokio::test]
    async fn test_clear_precedes_document_writes() {
        let server = MockServer::start().await;
        mount_metastore(&server).await;
        mount_solr(&server, 200).await;

        let config = sync_config(&server);
        run_sync(&config, &SilentProgress).await.unwrap();

        let requests = server.received_requests().await.expect("recorded requests");
        let updates: Vec<String> = requests
            .iter()
            .filter(|r| r.url.path() == SOLR_UPDATE)
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .collect();

        // One delete-all, then one batch of documents.
        assert_eq!(updates.len(), 2);
        assert!(updates[0].contains("\"delete\""));
        assert!(updates[1].starts_with('['));
    }

    #[tokio::test]
    async fn test_index_failure_records_failed_job() {
        let server = MockServer::start().await;
        mount_solr(&server, 500).await;

        let config = sync_config(&server);
        let err = run_sync(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, LakeSearchError::Index(_)));

        let store = JobStore::open(&config.db_path).await.unwrap();
        let jobs = store.list_recent_jobs(10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, JobStatus::Failed);
        assert_eq!(jobs[0].records_processed, 0);
        assert!(jobs[0].completed_at.is_some());
        let message = jobs[0].error_message.as_deref().expect("failure message");
        assert!(message.contains("500"));
    }

    #[tokio::test]
    async fn test_branch_failures_survive_into_job_stats() {
        let server = MockServer::start().await;
        mount_metastore(&server).await;
        mount_solr(&server, 200).await;

        // Volume listing breaks; the rest of the schema still syncs.
        Mock::given(method("GET"))
            .and(path("/api/2.1/unity-catalog/volumes"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;

        let config = sync_config(&server);
        let result = run_sync(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.branch_failures, 1);
        assert_eq!(result.documents_indexed, 5);

        let store = JobStore::open(&config.db_path).await.unwrap();
        let job = store
            .get_job(&result.job_id)
            .await
            .unwrap()
            .expect("job row");
        assert_eq!(job.status, JobStatus::Completed);
        let stats = job.stats_json.expect("stats recorded");
        assert!(stats.contains("sales.raw"));
    }
}
