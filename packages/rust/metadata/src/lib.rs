//! Typed client for the lakehouse catalog metadata API.
//!
//! Covers the hierarchy endpoints (catalogs, schemas, tables, volumes), the
//! per-table column lookup, and the Files API directory listing used to walk
//! volume contents. Every request carries the bearer token; failures map onto
//! [`LakeSearchError`]: 401/403 become `Auth`, other HTTP failures become
//! `Remote` (carrying the status so callers can special-case 404), transport
//! failures become `Network`.

mod types;

use std::time::Duration;

use lakesearch_shared::{LakeSearchError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub use types::{
    CatalogInfo, ColumnInfo, DirectoryEntry, SchemaInfo, TableInfo, Timestamp, VolumeInfo,
};
use types::{
    ListCatalogsResponse, ListDirectoryResponse, ListSchemasResponse, ListTablesResponse,
    ListVolumesResponse,
};

/// Unity Catalog API path prefix.
const CATALOG_API: &str = "/api/2.1/unity-catalog";

/// Files API path prefix for directory listings.
const FILES_API: &str = "/api/2.0/fs/directories";

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Request timeout in seconds. This is the only timeout in the pipeline.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for metadata requests.
const USER_AGENT: &str = concat!("lakesearch/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// MetadataClient
// ---------------------------------------------------------------------------

/// Authenticated client for one workspace's catalog API.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl MetadataClient {
    /// Build a client for the given workspace base URL and bearer token.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            LakeSearchError::config(format!("invalid metadata base URL {base_url}: {e}"))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LakeSearchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    /// List every catalog in the metastore.
    pub async fn list_catalogs(&self) -> Result<Vec<CatalogInfo>> {
        let resp: ListCatalogsResponse = self
            .get_json(&format!("{CATALOG_API}/catalogs"), &[])
            .await?;
        Ok(resp.catalogs)
    }

    /// List the schemas of one catalog.
    pub async fn list_schemas(&self, catalog: &str) -> Result<Vec<SchemaInfo>> {
        let resp: ListSchemasResponse = self
            .get_json(
                &format!("{CATALOG_API}/schemas"),
                &[("catalog_name", catalog)],
            )
            .await?;
        Ok(resp.schemas)
    }

    /// List the tables of one schema.
    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<TableInfo>> {
        let resp: ListTablesResponse = self
            .get_json(
                &format!("{CATALOG_API}/tables"),
                &[("catalog_name", catalog), ("schema_name", schema)],
            )
            .await?;
        Ok(resp.tables)
    }

    /// Fetch one table's column metadata via the single-table endpoint.
    ///
    /// Several table kinds expose no column metadata at all; the endpoint
    /// answers 404 for those, which surfaces here as a `Remote` error that
    /// callers check with [`LakeSearchError::is_not_found`].
    pub async fn list_columns(&self, full_table_name: &str) -> Result<Vec<ColumnInfo>> {
        let table: TableInfo = self
            .get_json(&format!("{CATALOG_API}/tables/{full_table_name}"), &[])
            .await?;
        Ok(table.columns)
    }

    /// List the volumes of one schema.
    pub async fn list_volumes(&self, catalog: &str, schema: &str) -> Result<Vec<VolumeInfo>> {
        let resp: ListVolumesResponse = self
            .get_json(
                &format!("{CATALOG_API}/volumes"),
                &[("catalog_name", catalog), ("schema_name", schema)],
            )
            .await?;
        Ok(resp.volumes)
    }

    /// List one directory in the files namespace. `path` is absolute
    /// (`/Volumes/<catalog>/<schema>/<volume>/...`).
    ///
    /// An empty or never-written directory answers 404, which callers treat
    /// as an empty listing.
    pub async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let resp: ListDirectoryResponse = self
            .get_json(&format!("{FILES_API}{path}"), &[])
            .await?;
        Ok(resp.contents)
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// Authenticated GET that decodes the JSON body into `T`.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| LakeSearchError::validation(format!("invalid request path {path}: {e}")))?;

        debug!(%url, "metadata request");

        let mut request = self.client.get(url).bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LakeSearchError::Network(format!("{path}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(LakeSearchError::auth(
                status.as_u16(),
                format!("{path}: credential rejected"),
            ));
        }
        if !status.is_success() {
            return Err(LakeSearchError::remote(
                status.as_u16(),
                format!("{path}: HTTP {status}"),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LakeSearchError::validation(format!("{path}: malformed response: {e}")))
    }
}
