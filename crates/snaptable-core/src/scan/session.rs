//! Scan session lifecycle: the per-table-open state of the read adapter.
//!
//! Opening a session is the one-time initialization event: the table
//! location is taken from the caller's properties, metadata is loaded from
//! storage, the virtual-column name is resolved once, and the augmented
//! schema is built once. Everything on the session is immutable afterward,
//! so independent reader tasks can share it freely while materializing and
//! projecting records.
use std::{collections::HashMap, sync::Arc};

use snafu::prelude::*;

use crate::{
    metadata::{MetadataError, MetadataStore, TableMetadata},
    record::{GenericRecord, Record},
    row::{self, ProjectError, Row},
    scan::virtual_column::{self, VirtualColumnError},
    schema::Schema,
};

/// Properties key naming the table root location.
pub const LOCATION_KEY: &str = "location";

/// Errors raised while opening or using a scan session.
#[derive(Debug, Snafu)]
pub enum SessionError {
    /// The properties map did not name a table location. There is no
    /// sensible default to substitute, so this surfaces to the caller as an
    /// invalid-argument error.
    #[snafu(display("No table location configured (missing \"location\" property)"))]
    MissingLocation,

    /// Table metadata could not be located or parsed.
    #[snafu(display("Failed to load table metadata: {source}"))]
    Metadata {
        /// Underlying metadata error.
        source: MetadataError,
    },

    /// Augmenting the table schema with the virtual column failed.
    #[snafu(display("Virtual column error: {source}"))]
    VirtualColumn {
        /// Underlying virtual-column error.
        source: VirtualColumnError,
    },

    /// Record/schema mismatch during row projection.
    #[snafu(display("Row projection failed: {source}"))]
    Project {
        /// Underlying projection error.
        source: ProjectError,
    },
}

/// Per-table-open read state.
///
/// Holds the parsed [`TableMetadata`], the resolved virtual-column name, and
/// the augmented schema. Created at table open, discarded at session end;
/// immutable in between.
#[derive(Debug, Clone)]
pub struct ScanSession {
    metadata: TableMetadata,
    schema: Arc<Schema>,
    augmented_schema: Arc<Schema>,
    snapshot_column: String,
}

impl ScanSession {
    /// Open a session from a flat properties map.
    ///
    /// Requires the [`LOCATION_KEY`] property; loads the newest table
    /// metadata from `<location>/metadata/`, resolves the virtual-column
    /// name (see [`virtual_column::snapshot_column_name_from_properties`]),
    /// and builds the augmented schema.
    pub async fn open(properties: &HashMap<String, String>) -> Result<Self, SessionError> {
        let location = properties.get(LOCATION_KEY).context(MissingLocationSnafu)?;
        let metadata = MetadataStore::new(location)
            .load()
            .await
            .context(MetadataSnafu)?;

        let snapshot_column = virtual_column::snapshot_column_name_from_properties(properties);
        let augmented =
            virtual_column::schema_with_snapshot_column(&metadata.schema, &snapshot_column)
                .context(VirtualColumnSnafu)?;

        Ok(Self {
            schema: Arc::new(metadata.schema.clone()),
            augmented_schema: Arc::new(augmented),
            snapshot_column,
            metadata,
        })
    }

    /// The parsed table metadata.
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// The table's base schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The base schema extended with the virtual snapshot-id column.
    pub fn augmented_schema(&self) -> &Arc<Schema> {
        &self.augmented_schema
    }

    /// The resolved virtual-column name, constant for this session.
    pub fn snapshot_column(&self) -> &str {
        &self.snapshot_column
    }

    /// Flatten `record` against its own bound schema into a [`Row`].
    ///
    /// Works for base and augmented records alike; for augmented records the
    /// snapshot id lands in the final position.
    pub fn deserialize(&self, record: &dyn Record) -> Result<Row, SessionError> {
        row::project(record, record.schema()).context(ProjectSnafu)
    }

    /// Materialize the augmented counterpart of `record` for a system-table
    /// read, tagging it with `snapshot_id`. Called once per source record.
    pub fn materialize(
        &self,
        record: &dyn Record,
        snapshot_id: i64,
    ) -> Result<GenericRecord, SessionError> {
        virtual_column::record_with_snapshot_column(
            record,
            snapshot_id,
            &self.schema,
            &self.snapshot_column,
        )
        .context(VirtualColumnSnafu)
    }
}
