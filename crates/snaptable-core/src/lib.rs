//! Core read adapter for the snaptable table format.
//!
//! snaptable is a versioned, schema-carrying table format. This crate holds
//! the engine-agnostic read-side pieces:
//!
//! - A logical `Schema`/`Field` model with stable per-field ids
//!   (`schema` module).
//! - Schema-bound, field-keyed `Record` containers addressable by name and
//!   by position (`record` module).
//! - Flat, positionally ordered `Row` projection for row-oriented consumers
//!   (`row` module).
//! - The virtual snapshot-id column and the per-table-open scan session
//!   (`scan` module).
//! - Versioned table-metadata discovery and loading (`metadata` module).
//!
//! Query-engine integration (Arrow schema exposure, the DataFusion table
//! provider) lives in `snaptable-datafusion`, so this core crate carries no
//! engine dependency.
#![deny(missing_docs)]
pub mod metadata;
pub mod record;
pub mod row;
pub mod scan;
pub mod schema;
