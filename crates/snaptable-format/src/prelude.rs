//! Wrapper prelude.
//!
//! The `snaptable-format` crate is the supported public entry point.
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::{
    DEFAULT_SNAPSHOT_COLUMN_NAME, Field, FieldType, GenericRecord, MetadataStore, Record, Row,
    SNAPSHOT_COLUMN_KEY, ScanConfig, ScanSession, Schema, SessionError, Snapshot, TableMetadata,
    Value, project,
};

/// DataFusion table provider (enabled by default).
#[cfg(feature = "datafusion")]
pub use crate::SnapTableProvider;
