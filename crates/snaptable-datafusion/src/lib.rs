//! DataFusion integration for `snaptable-core`.
//!
//! This crate intentionally keeps all Arrow and DataFusion types out of
//! `snaptable-core`: it translates a snaptable schema into the engine's type
//! descriptors ([`reflect`]) and exposes tables to DataFusion through
//! [`SnapTableProvider`].

mod provider;
pub mod reflect;

pub use provider::SnapTableProvider;
pub use reflect::{FIELD_ID_METADATA_KEY, ReflectError, arrow_schema, rows_to_record_batch};
