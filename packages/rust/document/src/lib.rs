//! Entity-to-document mapping.
//!
//! One pure function per catalog entity kind, each flattening the entity and
//! its ancestor coordinates into a [`SearchDocument`]. Identity, timestamp,
//! and empty-field policies all live here so every entity kind serializes
//! consistently:
//! - ids are the type tag plus ancestor names joined with `_`, sanitized to
//!   `[A-Za-z0-9_-]`
//! - timestamps are rendered ISO-8601 and never null (current time is the
//!   last-resort default)
//! - `description` and `owner` are empty strings when the source has none

use chrono::{DateTime, Utc};
use lakesearch_metadata::{
    CatalogInfo, ColumnInfo, DirectoryEntry, SchemaInfo, TableInfo, Timestamp, VolumeInfo,
};
use lakesearch_shared::{EntityType, SearchDocument};

// ---------------------------------------------------------------------------
// Per-entity builders
// ---------------------------------------------------------------------------

/// Build the document for one catalog.
pub fn catalog_document(catalog: &CatalogInfo) -> SearchDocument {
    SearchDocument {
        catalog_name: Some(catalog.name.clone()),
        description: text_or_empty(&catalog.comment),
        owner: text_or_empty(&catalog.owner),
        ..base(
            EntityType::Catalog,
            doc_id(EntityType::Catalog, &[&catalog.name]),
            &catalog.name,
            catalog.name.clone(),
            &catalog.created_at,
            &catalog.updated_at,
        )
    }
}

/// Build the document for one schema.
pub fn schema_document(schema: &SchemaInfo) -> SearchDocument {
    SearchDocument {
        catalog_name: Some(schema.catalog_name.clone()),
        schema_name: Some(schema.name.clone()),
        description: text_or_empty(&schema.comment),
        owner: text_or_empty(&schema.owner),
        ..base(
            EntityType::Schema,
            doc_id(EntityType::Schema, &[&schema.catalog_name, &schema.name]),
            &schema.name,
            format!("{}.{}", schema.catalog_name, schema.name),
            &schema.created_at,
            &schema.updated_at,
        )
    }
}

/// Build the document for one table.
pub fn table_document(table: &TableInfo) -> SearchDocument {
    SearchDocument {
        catalog_name: Some(table.catalog_name.clone()),
        schema_name: Some(table.schema_name.clone()),
        table_name: Some(table.name.clone()),
        description: text_or_empty(&table.comment),
        owner: text_or_empty(&table.owner),
        storage_location: table.storage_location.clone(),
        ..base(
            EntityType::Table,
            doc_id(
                EntityType::Table,
                &[&table.catalog_name, &table.schema_name, &table.name],
            ),
            &table.name,
            table.full_name(),
            &table.created_at,
            &table.updated_at,
        )
    }
}

/// Build the document for one column of a table.
///
/// The column API carries no timestamps, so both timestamp fields fall back
/// to the build time.
pub fn column_document(table: &TableInfo, column: &ColumnInfo) -> SearchDocument {
    SearchDocument {
        catalog_name: Some(table.catalog_name.clone()),
        schema_name: Some(table.schema_name.clone()),
        table_name: Some(table.name.clone()),
        column_name: Some(column.name.clone()),
        description: text_or_empty(&column.comment),
        data_type: column.type_name.clone(),
        ..base(
            EntityType::Column,
            doc_id(
                EntityType::Column,
                &[
                    &table.catalog_name,
                    &table.schema_name,
                    &table.name,
                    &column.name,
                ],
            ),
            &column.name,
            format!("{}.{}", table.full_name(), column.name),
            &None,
            &None,
        )
    }
}

/// Build the document for one volume.
pub fn volume_document(volume: &VolumeInfo) -> SearchDocument {
    SearchDocument {
        catalog_name: Some(volume.catalog_name.clone()),
        schema_name: Some(volume.schema_name.clone()),
        volume_name: Some(volume.name.clone()),
        description: text_or_empty(&volume.comment),
        owner: text_or_empty(&volume.owner),
        storage_location: volume.storage_location.clone(),
        ..base(
            EntityType::Volume,
            doc_id(
                EntityType::Volume,
                &[&volume.catalog_name, &volume.schema_name, &volume.name],
            ),
            &volume.name,
            volume.full_name(),
            &volume.created_at,
            &volume.updated_at,
        )
    }
}

/// Build the document for one file or directory inside a volume.
///
/// `rel_path` is the entry's path relative to the volume root, without a
/// leading slash. The entry's modification time stands in for both
/// timestamp fields; the files namespace records no creation time.
pub fn entry_document(volume: &VolumeInfo, rel_path: &str, entry: &DirectoryEntry) -> SearchDocument {
    let doc_type = if entry.is_directory {
        EntityType::Directory
    } else {
        EntityType::File
    };

    SearchDocument {
        catalog_name: Some(volume.catalog_name.clone()),
        schema_name: Some(volume.schema_name.clone()),
        volume_name: Some(volume.name.clone()),
        file_name: Some(entry.name.clone()),
        file_size: entry.size,
        is_directory: Some(entry.is_directory),
        ..base(
            doc_type,
            doc_id(
                doc_type,
                &[
                    &volume.catalog_name,
                    &volume.schema_name,
                    &volume.name,
                    rel_path,
                ],
            ),
            &entry.name,
            format!("{}/{rel_path}", volume.full_name()),
            &entry.modification_time,
            &entry.modification_time,
        )
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Deterministic document id: type tag plus ancestor identifiers joined with
/// underscores, then sanitized for the index.
pub fn doc_id(doc_type: EntityType, parts: &[&str]) -> String {
    let mut segments = Vec::with_capacity(parts.len() + 1);
    segments.push(doc_type.tag());
    segments.extend_from_slice(parts);
    sanitize_id(&segments.join("_"))
}

/// Strip every character outside `[A-Za-z0-9_-]`.
fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Render a source timestamp as ISO-8601.
///
/// Numeric values are epoch milliseconds; string values pass through
/// unchanged; an absent (or out-of-range) value falls back to the current
/// time, keeping the field non-null.
fn normalize_timestamp(value: &Option<Timestamp>) -> String {
    match value {
        Some(Timestamp::Millis(ms)) => DateTime::<Utc>::from_timestamp_millis(*ms)
            .unwrap_or_else(Utc::now)
            .to_rfc3339(),
        Some(Timestamp::Text(text)) => text.clone(),
        None => Utc::now().to_rfc3339(),
    }
}

// ---------------------------------------------------------------------------
// Shared skeleton
// ---------------------------------------------------------------------------

/// Common document skeleton: identity and timestamps filled in, every
/// kind-specific field empty. Builders override what applies via struct
/// update syntax.
fn base(
    doc_type: EntityType,
    id: String,
    name: &str,
    full_name: String,
    created_at: &Option<Timestamp>,
    updated_at: &Option<Timestamp>,
) -> SearchDocument {
    SearchDocument {
        id,
        name: name.to_string(),
        full_name,
        doc_type,
        catalog_name: None,
        schema_name: None,
        table_name: None,
        volume_name: None,
        file_name: None,
        column_name: None,
        description: String::new(),
        owner: String::new(),
        created_at: normalize_timestamp(created_at),
        updated_at: normalize_timestamp(updated_at),
        tags: Vec::new(),
        file_size: None,
        is_directory: None,
        data_type: None,
        storage_location: None,
    }
}

fn text_or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
