//! The virtual snapshot-id column.
//!
//! System-table reads expose which table version each record was read from.
//! The snapshot id is not part of the on-disk schema, so the read path
//! injects it as a trailing optional int64 column: the schema is augmented
//! once per session, and each source record is copied into a new record
//! bound to the augmented schema with the snapshot id set by name.
//!
//! The column's name is configurable under [`SNAPSHOT_COLUMN_KEY`] and
//! defaults to [`DEFAULT_SNAPSHOT_COLUMN_NAME`]; its field id is pinned to
//! [`RESERVED_FIELD_ID`] so it can never collide with a real column's id.
use std::collections::HashMap;
use std::sync::Arc;

use snafu::prelude::*;

use crate::{
    record::{GenericRecord, Record, RecordError, Value},
    scan::config::ScanConfig,
    schema::{Field, FieldType, Schema, SchemaError},
};

/// Configuration key naming the virtual snapshot-id column.
///
/// Recognized by both configuration carriers (see
/// [`snapshot_column_name_from_config`] and
/// [`snapshot_column_name_from_properties`]).
pub const SNAPSHOT_COLUMN_KEY: &str = "snaptable.scan.snapshot-column-name";

/// Column name used when no override is configured.
pub const DEFAULT_SNAPSHOT_COLUMN_NAME: &str = "snapshot__id";

/// Field id reserved for the virtual column.
///
/// Real columns receive small sequential ids at table creation, so the
/// maximum representable id can never be assigned to one of them.
pub const RESERVED_FIELD_ID: i32 = i32::MAX;

/// Errors raised while augmenting schemas or materializing augmented records.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
pub enum VirtualColumnError {
    /// The configured virtual-column name is already taken by a real column.
    /// Duplicate names would make name-based lookups ambiguous, so this
    /// fails instead of renaming.
    #[snafu(display("Virtual column name {name:?} collides with an existing column"))]
    NameCollision {
        /// The colliding name.
        name: String,
    },

    /// The schema already carries a column with the reserved field id, i.e.
    /// it has been augmented before.
    #[snafu(display("Schema already carries a virtual column ({column:?} has the reserved id)"))]
    AlreadyAugmented {
        /// Name of the existing reserved-id column.
        column: String,
    },

    /// The record's bound schema and the base schema disagree in field
    /// count; the two must describe the same record shape.
    #[snafu(display("Record has {record_fields} fields but the base schema has {schema_fields}"))]
    FieldCountMismatch {
        /// Field count of the record's bound schema.
        record_fields: usize,
        /// Field count of the base schema passed by the caller.
        schema_fields: usize,
    },

    /// Construction of the augmented schema failed validation.
    #[snafu(display("Augmented schema construction failed: {source}"))]
    Augment {
        /// Underlying schema validation error.
        source: SchemaError,
    },

    /// Copying values into the augmented record failed.
    #[snafu(display("Failed to populate augmented record: {source}"))]
    Populate {
        /// Underlying record accessor error.
        source: RecordError,
    },
}

/// Append the virtual snapshot-id column to `schema`.
///
/// The result is `schema`'s fields, unchanged and in original order,
/// followed by one optional int64 field named `column_name` with the
/// reserved field id. Pure; `schema` is never mutated.
///
/// Fails fast on a name collision with an existing column and on schemas
/// that already carry the reserved id (double augmentation).
pub fn schema_with_snapshot_column(
    schema: &Schema,
    column_name: &str,
) -> Result<Schema, VirtualColumnError> {
    if let Some(existing) = schema.fields().iter().find(|f| f.id == RESERVED_FIELD_ID) {
        return AlreadyAugmentedSnafu {
            column: existing.name.clone(),
        }
        .fail();
    }
    ensure!(
        schema.field_by_name(column_name).is_none(),
        NameCollisionSnafu { name: column_name }
    );

    let mut fields = schema.fields().to_vec();
    fields.push(Field::optional(
        RESERVED_FIELD_ID,
        column_name,
        FieldType::Int64,
    ));
    Schema::new(fields).context(AugmentSnafu)
}

/// Materialize the augmented counterpart of `record` for a system-table read.
///
/// Augments `schema`, allocates a new [`GenericRecord`] bound to the result,
/// copies every base value by position, and sets the virtual field by name
/// to `snapshot_id`. The source record is only read, never mutated.
pub fn record_with_snapshot_column(
    record: &dyn Record,
    snapshot_id: i64,
    schema: &Schema,
    column_name: &str,
) -> Result<GenericRecord, VirtualColumnError> {
    let record_fields = record.schema().field_count();
    ensure!(
        record_fields == schema.field_count(),
        FieldCountMismatchSnafu {
            record_fields,
            schema_fields: schema.field_count(),
        }
    );

    let augmented = Arc::new(schema_with_snapshot_column(schema, column_name)?);
    let mut out = GenericRecord::create(augmented);
    for position in 0..schema.field_count() {
        // Base field names and order are stable between the two schemas, so
        // the copy is positional rather than name-based.
        let value = record
            .get(position)
            .ok_or(RecordError::PositionOutOfRange {
                position,
                field_count: record_fields,
            })
            .context(PopulateSnafu)?;
        out.set(position, value.clone()).context(PopulateSnafu)?;
    }
    out.set_field(column_name, Value::Int64(snapshot_id))
        .context(PopulateSnafu)?;
    Ok(out)
}

/// Resolve the effective virtual-column name from the key-value
/// configuration carrier.
pub fn snapshot_column_name_from_config(config: &ScanConfig) -> String {
    resolve_snapshot_column_name(config.get(SNAPSHOT_COLUMN_KEY))
}

/// Resolve the effective virtual-column name from a plain properties map.
pub fn snapshot_column_name_from_properties(properties: &HashMap<String, String>) -> String {
    resolve_snapshot_column_name(properties.get(SNAPSHOT_COLUMN_KEY).map(String::as_str))
}

// Present and non-empty wins verbatim (no trimming, no validation); unset or
// empty falls back to the default.
fn resolve_snapshot_column_name(configured: Option<&str>) -> String {
    match configured {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_SNAPSHOT_COLUMN_NAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::project;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn base_schema() -> Schema {
        Schema::new(vec![
            Field::required(1, "id", FieldType::Int64),
            Field::optional(2, "data", FieldType::Utf8),
        ])
        .expect("valid schema")
    }

    #[test]
    fn augmentation_preserves_base_fields_as_prefix() -> TestResult {
        let base = base_schema();
        let augmented = schema_with_snapshot_column(&base, DEFAULT_SNAPSHOT_COLUMN_NAME)?;

        assert_eq!(augmented.field_count(), base.field_count() + 1);
        assert_eq!(
            &augmented.fields()[..base.field_count()],
            base.fields(),
            "base fields must form a strict prefix, unchanged and in order"
        );
        Ok(())
    }

    #[test]
    fn augmentation_appends_optional_int64_with_reserved_id() -> TestResult {
        let augmented = schema_with_snapshot_column(&base_schema(), "snap_id")?;

        let last = augmented.fields().last().expect("appended field");
        assert_eq!(last.name, "snap_id");
        assert_eq!(last.id, RESERVED_FIELD_ID);
        assert_eq!(last.field_type, FieldType::Int64);
        assert!(last.nullable);
        Ok(())
    }

    #[test]
    fn augmentation_rejects_name_collision() {
        let err = schema_with_snapshot_column(&base_schema(), "data")
            .expect_err("collision should be rejected");
        assert_eq!(
            err,
            VirtualColumnError::NameCollision {
                name: "data".to_string(),
            }
        );
    }

    #[test]
    fn augmentation_rejects_already_augmented_schema() -> TestResult {
        let once = schema_with_snapshot_column(&base_schema(), DEFAULT_SNAPSHOT_COLUMN_NAME)?;
        let err = schema_with_snapshot_column(&once, "another_name")
            .expect_err("double augmentation should be rejected");
        assert_eq!(
            err,
            VirtualColumnError::AlreadyAugmented {
                column: DEFAULT_SNAPSHOT_COLUMN_NAME.to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn materialization_round_trips_base_values() -> TestResult {
        let base = base_schema();
        let record = GenericRecord::with_values(
            Arc::new(base.clone()),
            vec![Value::Int64(3), Value::from("Berta")],
        )?;

        let augmented_schema =
            schema_with_snapshot_column(&base, DEFAULT_SNAPSHOT_COLUMN_NAME)?;
        let augmented =
            record_with_snapshot_column(&record, 7, &base, DEFAULT_SNAPSHOT_COLUMN_NAME)?;

        let base_row = project(&record, &base)?;
        let augmented_row = project(&augmented, &augmented_schema)?;

        assert_eq!(augmented_row.len(), base_row.len() + 1);
        assert_eq!(&augmented_row.values()[..base_row.len()], base_row.values());
        assert_eq!(augmented_row[base_row.len()], Value::Int64(7));
        Ok(())
    }

    #[test]
    fn materialization_sets_virtual_field_by_name() -> TestResult {
        let base = base_schema();
        let record = GenericRecord::with_values(
            Arc::new(base.clone()),
            vec![Value::Int64(1), Value::from("Michael")],
        )?;

        let augmented = record_with_snapshot_column(&record, 42, &base, "snap_id")?;
        assert_eq!(augmented.field("snap_id"), Some(&Value::Int64(42)));
        assert_eq!(augmented.schema().field_count(), 3);
        Ok(())
    }

    #[test]
    fn materialization_rejects_field_count_mismatch() -> TestResult {
        let base = base_schema();
        let narrow = Schema::new(vec![Field::required(1, "id", FieldType::Int64)])?;
        let record = GenericRecord::create(Arc::new(narrow));

        let err =
            record_with_snapshot_column(&record, 7, &base, DEFAULT_SNAPSHOT_COLUMN_NAME)
                .expect_err("count mismatch should be rejected");
        assert_eq!(
            err,
            VirtualColumnError::FieldCountMismatch {
                record_fields: 1,
                schema_fields: 2,
            }
        );
        Ok(())
    }

    #[test]
    fn name_resolution_defaults_when_unset() {
        assert_eq!(
            snapshot_column_name_from_config(&ScanConfig::new()),
            DEFAULT_SNAPSHOT_COLUMN_NAME
        );
        assert_eq!(
            snapshot_column_name_from_properties(&HashMap::new()),
            DEFAULT_SNAPSHOT_COLUMN_NAME
        );
    }

    #[test]
    fn name_resolution_returns_configured_value_verbatim() {
        let config = ScanConfig::new().with(SNAPSHOT_COLUMN_KEY, "snap_id");
        assert_eq!(snapshot_column_name_from_config(&config), "snap_id");

        // No trimming: surrounding whitespace survives.
        let config = ScanConfig::new().with(SNAPSHOT_COLUMN_KEY, " padded ");
        assert_eq!(snapshot_column_name_from_config(&config), " padded ");
    }

    #[test]
    fn name_resolution_treats_empty_as_unset() {
        let config = ScanConfig::new().with(SNAPSHOT_COLUMN_KEY, "");
        assert_eq!(
            snapshot_column_name_from_config(&config),
            DEFAULT_SNAPSHOT_COLUMN_NAME
        );
    }

    #[test]
    fn name_resolution_is_carrier_agnostic() {
        let config = ScanConfig::new().with(SNAPSHOT_COLUMN_KEY, "snap_id");
        let mut properties = HashMap::new();
        properties.insert(SNAPSHOT_COLUMN_KEY.to_string(), "snap_id".to_string());

        assert_eq!(
            snapshot_column_name_from_config(&config),
            snapshot_column_name_from_properties(&properties)
        );
    }
}
