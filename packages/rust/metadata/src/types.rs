//! Wire types for catalog API responses.
//!
//! Collection keys are defaulted so a response that omits them (the API's way
//! of saying "nothing here") decodes as an empty listing rather than an error.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A timestamp as the catalog API serializes it: epoch milliseconds on most
/// endpoints, an ISO-8601 string on some. Decoded untagged so either shape
/// is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

// ---------------------------------------------------------------------------
// Hierarchy entities
// ---------------------------------------------------------------------------

/// One catalog from `GET /catalogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// One schema from `GET /schemas?catalog_name=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    pub catalog_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// One table from `GET /tables?...` or `GET /tables/{full_name}`.
///
/// The listing endpoint usually omits `columns`; the single-table endpoint
/// includes them for table kinds that expose column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub catalog_name: String,
    pub schema_name: String,
    #[serde(default)]
    pub table_type: Option<String>,
    #[serde(default)]
    pub data_source_format: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Three-level dotted name (`catalog.schema.table`).
    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.catalog_name, self.schema_name, self.name)
    }
}

/// One column of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// One volume from `GET /volumes?...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub name: String,
    pub catalog_name: String,
    pub schema_name: String,
    #[serde(default)]
    pub volume_type: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl VolumeInfo {
    /// Three-level dotted name (`catalog.schema.volume`).
    pub fn full_name(&self) -> String {
        format!("{}.{}.{}", self.catalog_name, self.schema_name, self.name)
    }

    /// Absolute root path of the volume in the files namespace.
    pub fn root_path(&self) -> String {
        format!(
            "/Volumes/{}/{}/{}",
            self.catalog_name, self.schema_name, self.name
        )
    }
}

/// One entry of a volume directory listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Base name of the file or directory.
    pub name: String,
    /// Absolute path within the files namespace.
    pub path: String,
    #[serde(default)]
    pub is_directory: bool,
    /// Size in bytes; absent for directories.
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub modification_time: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ListCatalogsResponse {
    #[serde(default)]
    pub catalogs: Vec<CatalogInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListSchemasResponse {
    #[serde(default)]
    pub schemas: Vec<SchemaInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListTablesResponse {
    #[serde(default)]
    pub tables: Vec<TableInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListVolumesResponse {
    #[serde(default)]
    pub volumes: Vec<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListDirectoryResponse {
    #[serde(default)]
    pub contents: Vec<DirectoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_decodes_both_shapes() {
        let millis: Timestamp = serde_json::from_str("1700000000000").expect("millis");
        assert_eq!(millis, Timestamp::Millis(1_700_000_000_000));

        let text: Timestamp =
            serde_json::from_str("\"2024-03-01T12:00:00Z\"").expect("text");
        assert_eq!(text, Timestamp::Text("2024-03-01T12:00:00Z".into()));
    }

    #[test]
    fn missing_collection_key_is_empty() {
        let resp: ListCatalogsResponse = serde_json::from_str("{}").expect("decode");
        assert!(resp.catalogs.is_empty());

        let resp: ListDirectoryResponse = serde_json::from_str("{}").expect("decode");
        assert!(resp.contents.is_empty());
    }

    #[test]
    fn catalog_fixture_decodes() {
        let fixture = std::fs::read_to_string(
            "../../../fixtures/json/catalog-listing.fixture.json",
        )
        .expect("read fixture");
        let resp: ListCatalogsResponse =
            serde_json::from_str(&fixture).expect("deserialize fixture listing");
        assert_eq!(resp.catalogs.len(), 3);
        assert_eq!(resp.catalogs[0].name, "sales");
        assert_eq!(resp.catalogs[0].owner.as_deref(), Some("data-platform"));
    }

    #[test]
    fn table_decode_defaults_columns() {
        let json = r#"{
            "name": "orders",
            "catalog_name": "sales",
            "schema_name": "raw",
            "table_type": "MANAGED",
            "created_at": 1700000000000
        }"#;
        let table: TableInfo = serde_json::from_str(json).expect("decode table");
        assert!(table.columns.is_empty());
        assert_eq!(table.full_name(), "sales.raw.orders");
        assert_eq!(table.created_at, Some(Timestamp::Millis(1_700_000_000_000)));
    }

    #[test]
    fn volume_paths() {
        let volume = VolumeInfo {
            name: "landing".into(),
            catalog_name: "sales".into(),
            schema_name: "raw".into(),
            volume_type: Some("MANAGED".into()),
            storage_location: None,
            comment: None,
            owner: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(volume.full_name(), "sales.raw.landing");
        assert_eq!(volume.root_path(), "/Volumes/sales/raw/landing");
    }
}
