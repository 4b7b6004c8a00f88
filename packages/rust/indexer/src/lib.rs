//! Bulk loader for the search core.
//!
//! Speaks the Solr update protocol against a single core: a delete-by-query
//! to clear the index, then JSON document arrays in fixed-size batches, each
//! request committed immediately (`commit=true`). There is no double
//! buffering; callers own the decision to clear before rebuilding.

use std::time::Duration;

use lakesearch_shared::{LakeSearchError, Result, SearchConfig, SearchDocument};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Documents per bulk write.
const BATCH_SIZE: usize = 100;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for search engine requests.
const USER_AGENT: &str = concat!("lakesearch/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// BatchIndexer
// ---------------------------------------------------------------------------

/// Client for one search core's update endpoint.
pub struct BatchIndexer {
    client: Client,
    update_url: Url,
}

impl BatchIndexer {
    /// Build an indexer for the configured core.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let update_url = Url::parse(&format!(
            "http://{}:{}/solr/{}/update",
            config.host, config.port, config.core
        ))
        .map_err(|e| {
            LakeSearchError::config(format!(
                "invalid search engine address {}:{}: {e}",
                config.host, config.port
            ))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LakeSearchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, update_url })
    }

    /// Delete every document in the core and commit immediately.
    ///
    /// The core stays observably empty until the following rebuild lands;
    /// searches issued in that window see no results.
    pub async fn clear(&self) -> Result<()> {
        info!(url = %self.update_url, "clearing search core");
        self.post_update(&serde_json::json!({ "delete": { "query": "*:*" } }))
            .await
    }

    /// Write all documents in [`BATCH_SIZE`] chunks, committing each one.
    ///
    /// The first failed batch aborts the remaining ones; batches already
    /// committed stay in the core. Returns the number of documents written.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn index_all(&self, documents: &[SearchDocument]) -> Result<usize> {
        let mut written = 0usize;

        for (batch_no, batch) in documents.chunks(BATCH_SIZE).enumerate() {
            if let Err(e) = self.post_update(batch).await {
                if let Some(first) = batch.first() {
                    warn!(
                        batch = batch_no,
                        first_doc_id = %first.id,
                        error = %e,
                        "batch write failed"
                    );
                }
                return Err(e);
            }
            written += batch.len();
            debug!(batch = batch_no, size = batch.len(), "batch committed");
        }

        info!(documents = written, "index load completed");
        Ok(written)
    }

    /// POST one update body with `commit=true`.
    async fn post_update<T: Serialize + ?Sized>(&self, body: &T) -> Result<()> {
        let response = self
            .client
            .post(self.update_url.clone())
            .query(&[("commit", "true")])
            .json(body)
            .send()
            .await
            .map_err(|e| LakeSearchError::Index(format!("update request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LakeSearchError::Index(format!(
                "update rejected: HTTP {status}: {detail}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakesearch_shared::EntityType;

    fn search_config(server: &wiremock::MockServer) -> SearchConfig {
        SearchConfig {
            host: "127.0.0.1".into(),
            port: server.address().port(),
            core: "test_core".into(),
        }
    }

    fn document(n: usize) -> SearchDocument {
        SearchDocument {
            id: format!("table_cat_schema_t{n}"),
            name: format!("t{n}"),
            full_name: format!("cat.schema.t{n}"),
            doc_type: EntityType::Table,
            catalog_name: Some("cat".into()),
            schema_name: Some("schema".into()),
            table_name: Some(format!("t{n}")),
            volume_name: None,
            file_name: None,
            column_name: None,
            description: String::new(),
            owner: String::new(),
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
            tags: Vec::new(),
            file_size: None,
            is_directory: None,
            data_type: None,
            storage_location: None,
        }
    }

    #[tokio::test]
    async fn test_clear_sends_delete_by_query() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/solr/test_core/update"))
            .and(wiremock::matchers::query_param("commit", "true"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({"delete": {"query": "*:*"}}),
            ))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let indexer = BatchIndexer::new(&search_config(&server)).unwrap();
        indexer.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_index_all_batches_by_hundred() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/solr/test_core/update"))
            .and(wiremock::matchers::query_param("commit", "true"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let documents: Vec<SearchDocument> = (0..250).map(document).collect();
        let indexer = BatchIndexer::new(&search_config(&server)).unwrap();
        let written = indexer.index_all(&documents).await.unwrap();
        assert_eq!(written, 250);

        // Batch payloads are arrays of 100, 100, and 50 documents.
        let requests = server.received_requests().await.expect("recorded requests");
        let sizes: Vec<usize> = requests
            .iter()
            .map(|r| {
                let body: serde_json::Value =
                    serde_json::from_slice(&r.body).expect("json body");
                body.as_array().expect("array body").len()
            })
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_empty_input_writes_nothing() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let indexer = BatchIndexer::new(&search_config(&server)).unwrap();
        let written = indexer.index_all(&[]).await.unwrap();
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn test_failed_batch_aborts_remaining() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/solr/test_core/update"))
            .respond_with(
                wiremock::ResponseTemplate::new(500).set_body_string("commit failed"),
            )
            .mount(&server)
            .await;

        let documents: Vec<SearchDocument> = (0..250).map(document).collect();
        let indexer = BatchIndexer::new(&search_config(&server)).unwrap();
        let err = indexer.index_all(&documents).await.unwrap_err();

        assert!(matches!(err, LakeSearchError::Index(_)));
        assert!(err.to_string().contains("commit failed"));

        // Only the first batch was attempted.
        let requests = server.received_requests().await.expect("recorded requests");
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_clear_surfaces_index_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(400).set_body_string(
                "undefined field type",
            ))
            .mount(&server)
            .await;

        let indexer = BatchIndexer::new(&search_config(&server)).unwrap();
        let err = indexer.clear().await.unwrap_err();
        assert!(matches!(err, LakeSearchError::Index(_)));
        assert!(err.to_string().contains("HTTP 400"));
    }
}
