//! Schema and row translation into Arrow types.
//!
//! [`arrow_schema`] is the type-reflection boundary: it describes a
//! snaptable [`Schema`] as an Arrow [`SchemaRef`] the engine can introspect,
//! preserving snaptable field ids in Arrow field metadata.
//! [`rows_to_record_batch`] is the row hand-off: projected [`Row`]s become a
//! [`RecordBatch`] for display, failing fast on any value/type mismatch
//! rather than substituting nulls.
use std::{collections::HashMap, sync::Arc};

use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Float32Builder, Float64Builder, Int32Builder,
    Int64Builder, RecordBatch, StringBuilder, TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef, TimeUnit};
use snafu::prelude::*;

use snaptable_core::{
    record::Value,
    row::Row,
    schema::{Field, FieldType, Schema},
};

/// Arrow field-metadata key carrying the snaptable field id.
pub const FIELD_ID_METADATA_KEY: &str = "snaptable.field_id";

/// Errors raised while handing rows over to the engine.
#[derive(Debug, Snafu)]
pub enum ReflectError {
    /// A row's width disagrees with the schema it is being batched under.
    #[snafu(display("Row {row_index} has {row_len} values but the schema has {field_count} fields"))]
    RowWidthMismatch {
        /// Index of the offending row in the batch.
        row_index: usize,
        /// Number of values in that row.
        row_len: usize,
        /// Field count of the schema.
        field_count: usize,
    },

    /// A value is incompatible with its column's declared type.
    #[snafu(display("Value {value} is not valid for column {column:?} of type {expected}"))]
    ValueTypeMismatch {
        /// Name of the offending column.
        column: String,
        /// The column's declared type.
        expected: FieldType,
        /// Display form of the incompatible value.
        value: String,
    },

    /// Arrow rejected the assembled batch (for example, a null in a
    /// non-nullable column).
    #[snafu(display("Arrow error while building record batch: {source}"))]
    Arrow {
        /// Underlying Arrow error.
        source: arrow::error::ArrowError,
    },
}

fn arrow_data_type(field_type: FieldType) -> DataType {
    match field_type {
        FieldType::Bool => DataType::Boolean,
        FieldType::Int32 => DataType::Int32,
        FieldType::Int64 => DataType::Int64,
        FieldType::Float32 => DataType::Float32,
        FieldType::Float64 => DataType::Float64,
        FieldType::Utf8 => DataType::Utf8,
        FieldType::Binary => DataType::Binary,
        FieldType::TimestampMicros => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

fn arrow_field(field: &Field) -> ArrowField {
    ArrowField::new(
        field.name.clone(),
        arrow_data_type(field.field_type),
        field.nullable,
    )
    .with_metadata(HashMap::from([(
        FIELD_ID_METADATA_KEY.to_string(),
        field.id.to_string(),
    )]))
}

/// Describe a snaptable schema as an Arrow [`SchemaRef`].
///
/// Every snaptable type maps cleanly onto an Arrow type, so the translation
/// is infallible. Field ids land under [`FIELD_ID_METADATA_KEY`] in each
/// Arrow field's metadata.
pub fn arrow_schema(schema: &Schema) -> SchemaRef {
    let fields: Vec<ArrowField> = schema.fields().iter().map(arrow_field).collect();
    Arc::new(ArrowSchema::new(fields))
}

/// Build one typed Arrow column from a fixed row position.
///
/// Shared by all primitive column types in `build_column`; nulls are
/// appended as-is and left to Arrow's batch validation, values of any other
/// variant fail with [`ReflectError::ValueTypeMismatch`].
macro_rules! build_typed_column {
    ($builder_ty:ty, $variant:ident, $field:expr, $rows:expr, $index:expr) => {{
        let mut builder = <$builder_ty>::new();
        for row in $rows {
            match &row[$index] {
                Value::$variant(v) => builder.append_value(v.clone()),
                Value::Null => builder.append_null(),
                other => {
                    return ValueTypeMismatchSnafu {
                        column: $field.name.clone(),
                        expected: $field.field_type,
                        value: other.to_string(),
                    }
                    .fail();
                }
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

fn build_column(field: &Field, rows: &[Row], index: usize) -> Result<ArrayRef, ReflectError> {
    let column = match field.field_type {
        FieldType::Bool => build_typed_column!(BooleanBuilder, Bool, field, rows, index),
        FieldType::Int32 => build_typed_column!(Int32Builder, Int32, field, rows, index),
        FieldType::Int64 => build_typed_column!(Int64Builder, Int64, field, rows, index),
        FieldType::Float32 => build_typed_column!(Float32Builder, Float32, field, rows, index),
        FieldType::Float64 => build_typed_column!(Float64Builder, Float64, field, rows, index),
        FieldType::Utf8 => build_typed_column!(StringBuilder, Utf8, field, rows, index),
        FieldType::Binary => build_typed_column!(BinaryBuilder, Binary, field, rows, index),
        FieldType::TimestampMicros => {
            build_typed_column!(TimestampMicrosecondBuilder, TimestampMicros, field, rows, index)
        }
    };
    Ok(column)
}

/// Assemble projected rows into a [`RecordBatch`] under `schema`.
///
/// Rows must have been projected against the same schema: every row's width
/// must equal the schema's field count, and every value must match its
/// column's declared type (or be an explicit null).
pub fn rows_to_record_batch(schema: &Schema, rows: &[Row]) -> Result<RecordBatch, ReflectError> {
    for (row_index, row) in rows.iter().enumerate() {
        ensure!(
            row.len() == schema.field_count(),
            RowWidthMismatchSnafu {
                row_index,
                row_len: row.len(),
                field_count: schema.field_count(),
            }
        );
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.field_count());
    for (index, field) in schema.fields().iter().enumerate() {
        columns.push(build_column(field, rows, index)?);
    }

    RecordBatch::try_new(arrow_schema(schema), columns).context(ArrowSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array, StringArray};
    use snaptable_core::{
        record::GenericRecord,
        row::project,
        scan::{DEFAULT_SNAPSHOT_COLUMN_NAME, RESERVED_FIELD_ID, schema_with_snapshot_column},
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn simple_schema() -> Schema {
        Schema::new(vec![
            Field::required(1, "id", FieldType::Int64),
            Field::optional(2, "data", FieldType::Utf8),
        ])
        .expect("valid schema")
    }

    #[test]
    fn arrow_schema_maps_types_and_preserves_field_ids() {
        let schema = simple_schema();
        let arrow = arrow_schema(&schema);

        assert_eq!(arrow.fields().len(), 2);
        let id = arrow.field(0);
        assert_eq!(id.name(), "id");
        assert_eq!(id.data_type(), &DataType::Int64);
        assert!(!id.is_nullable());
        assert_eq!(
            id.metadata().get(FIELD_ID_METADATA_KEY).map(String::as_str),
            Some("1")
        );

        let data = arrow.field(1);
        assert_eq!(data.data_type(), &DataType::Utf8);
        assert!(data.is_nullable());
    }

    #[test]
    fn arrow_schema_places_virtual_column_last() -> TestResult {
        let augmented =
            schema_with_snapshot_column(&simple_schema(), DEFAULT_SNAPSHOT_COLUMN_NAME)?;
        let arrow = arrow_schema(&augmented);

        let last = arrow.field(2);
        assert_eq!(last.name(), DEFAULT_SNAPSHOT_COLUMN_NAME);
        assert_eq!(last.data_type(), &DataType::Int64);
        assert!(last.is_nullable());
        assert_eq!(
            last.metadata()
                .get(FIELD_ID_METADATA_KEY)
                .map(String::as_str),
            Some(RESERVED_FIELD_ID.to_string().as_str())
        );
        Ok(())
    }

    #[test]
    fn rows_become_a_record_batch() -> TestResult {
        let schema = simple_schema();
        let bound = Arc::new(schema.clone());

        let rows: Vec<Row> = [(1, Some("Michael")), (2, Some("Andy")), (3, None)]
            .into_iter()
            .map(|(id, data)| {
                let values = vec![
                    Value::Int64(id),
                    data.map_or(Value::Null, Value::from),
                ];
                let record = GenericRecord::with_values(Arc::clone(&bound), values)
                    .expect("record matches schema");
                project(&record, &schema).expect("projection succeeds")
            })
            .collect();

        let batch = rows_to_record_batch(&schema, &rows)?;
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 2);

        let ids = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .expect("int64 column");
        assert_eq!(ids.value(0), 1);
        assert_eq!(ids.value(1), 2);
        assert_eq!(ids.value(2), 3);

        let names = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("utf8 column");
        assert_eq!(names.value(0), "Michael");
        assert!(names.is_null(2));
        Ok(())
    }

    #[test]
    fn value_type_mismatch_fails_instead_of_coercing() -> TestResult {
        let schema = simple_schema();

        // Bind the record to a same-shape schema whose "id" is Utf8, so the
        // projected row carries a string where the batch schema wants int64.
        let lying = Arc::new(Schema::new(vec![
            Field::required(1, "id", FieldType::Utf8),
            Field::optional(2, "data", FieldType::Utf8),
        ])?);
        let record = GenericRecord::with_values(
            lying,
            vec![Value::from("not-a-number"), Value::from("x")],
        )?;
        let row = project(&record, &schema)?;

        let err = rows_to_record_batch(&schema, &[row])
            .expect_err("type mismatch should be rejected");
        assert!(matches!(
            err,
            ReflectError::ValueTypeMismatch { column, expected: FieldType::Int64, .. }
                if column == "id"
        ));
        Ok(())
    }

    #[test]
    fn row_width_mismatch_is_rejected() -> TestResult {
        let schema = simple_schema();
        let narrow = Arc::new(Schema::new(vec![Field::required(
            1,
            "id",
            FieldType::Int64,
        )])?);
        let record = GenericRecord::with_values(Arc::clone(&narrow), vec![Value::Int64(1)])?;
        let row = project(&record, &narrow)?;

        let err = rows_to_record_batch(&schema, &[row])
            .expect_err("width mismatch should be rejected");
        assert!(matches!(
            err,
            ReflectError::RowWidthMismatch {
                row_index: 0,
                row_len: 1,
                field_count: 2,
            }
        ));
        Ok(())
    }

    #[test]
    fn empty_row_set_builds_an_empty_batch() -> TestResult {
        let batch = rows_to_record_batch(&simple_schema(), &[])?;
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 2);
        Ok(())
    }
}
