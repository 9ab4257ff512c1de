//! Read-side adapter: the virtual snapshot-id column and the scan session.
//!
//! This module holds the pieces a row-oriented query engine needs to read a
//! snaptable table:
//!
//! - Schema augmentation with a synthetic snapshot-id column that is never
//!   stored on disk (`virtual_column`).
//! - Per-record materialization of augmented records for system-table reads
//!   (`virtual_column`).
//! - Resolution of the virtual column's name from either of the two
//!   supported configuration carriers (`virtual_column`, `config`).
//! - The per-table-open [`ScanSession`], which resolves the name once, loads
//!   table metadata, and caches the augmented schema for the lifetime of the
//!   session (`session`).
//!
//! All operations here are pure functions over immutable inputs, except
//! [`ScanSession::open`], which performs the one-time metadata read.
pub mod config;
pub mod session;
pub mod virtual_column;

pub use config::ScanConfig;
pub use session::{LOCATION_KEY, ScanSession, SessionError};
pub use virtual_column::{
    DEFAULT_SNAPSHOT_COLUMN_NAME, RESERVED_FIELD_ID, SNAPSHOT_COLUMN_KEY, VirtualColumnError,
    record_with_snapshot_column, schema_with_snapshot_column, snapshot_column_name_from_config,
    snapshot_column_name_from_properties,
};
