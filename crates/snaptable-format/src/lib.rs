//! # snaptable-format
//!
//! Versioned, schema-carrying table format with a row-oriented read adapter.
//!
//! This crate is the supported public entry point and provides a small,
//! stable surface over `snaptable-core`.
//!
//! ## Features
//!
//! - `datafusion` (default): enables the DataFusion integration
//!
//! ## Example
//!
//! ```rust,ignore
//! use snaptable_format::prelude::*;
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

/// DataFusion integration (enabled by default).
#[cfg(feature = "datafusion")]
pub mod datafusion {
    pub use snaptable_datafusion::*;
}

pub use snaptable_core::metadata::{MetadataStore, Snapshot, TableMetadata};
pub use snaptable_core::record::{GenericRecord, Record, Value};
pub use snaptable_core::row::{Row, project};
pub use snaptable_core::scan::{
    DEFAULT_SNAPSHOT_COLUMN_NAME, SNAPSHOT_COLUMN_KEY, ScanConfig, ScanSession, SessionError,
};
pub use snaptable_core::schema::{Field, FieldType, Schema};

/// DataFusion table provider (enabled by default).
#[cfg(feature = "datafusion")]
pub use snaptable_datafusion::SnapTableProvider;
