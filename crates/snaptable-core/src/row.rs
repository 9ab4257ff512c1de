//! Row projection: flattening a record against a schema.
//!
//! A [`Row`] is the hand-off format for row-oriented consumers: a flat,
//! name-free value sequence where position `i` corresponds to field `i` of
//! the schema used to produce it. Rows are constructed fresh per source
//! record and not retained by this crate afterward.
use snafu::prelude::*;

use crate::{
    record::{Record, Value},
    schema::Schema,
};

/// Flat, immutable, positionally ordered value sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    /// Borrow the values in projection order.
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Number of values in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at the given position, or `None` past the end of the row.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Consume the row, returning the owned values.
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl std::ops::Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors raised while projecting a record into a row.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
pub enum ProjectError {
    /// The schema names a field the record does not carry. This signals a
    /// record/schema mismatch (for example, an augmented schema paired with
    /// an un-augmented record) and is never silently tolerated, since a
    /// missing slot would corrupt row alignment downstream.
    #[snafu(display("Schema names field {name:?} but the record has no such field"))]
    MissingField {
        /// The field name absent from the record.
        name: String,
    },
}

/// Project `record` against `schema`, producing one value per schema field in
/// declared order.
///
/// The lookup is name-based, so the schema's declaration order alone decides
/// the output order. Read-only with respect to both inputs.
pub fn project<R: Record + ?Sized>(record: &R, schema: &Schema) -> Result<Row, ProjectError> {
    let mut values = Vec::with_capacity(schema.field_count());
    for field in schema.fields() {
        let value = record
            .field(&field.name)
            .context(MissingFieldSnafu { name: &field.name })?;
        values.push(value.clone());
    }
    Ok(Row(values))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        record::GenericRecord,
        schema::{Field, FieldType},
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn abc_schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                Field::required(1, "a", FieldType::Int64),
                Field::required(2, "b", FieldType::Int64),
                Field::required(3, "c", FieldType::Int64),
            ])
            .expect("valid schema"),
        )
    }

    #[test]
    fn projection_order_matches_schema_order() -> TestResult {
        let schema = abc_schema();
        let record = GenericRecord::with_values(
            Arc::clone(&schema),
            vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)],
        )?;

        let row = project(&record, &schema)?;
        assert_eq!(
            row.values(),
            &[Value::Int64(1), Value::Int64(2), Value::Int64(3)]
        );
        Ok(())
    }

    #[test]
    fn reordered_schema_reorders_output() -> TestResult {
        let schema = abc_schema();
        let record = GenericRecord::with_values(
            Arc::clone(&schema),
            vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)],
        )?;

        // Same fields, different declaration order: name-bound values follow.
        let reordered = Schema::new(vec![
            Field::required(3, "c", FieldType::Int64),
            Field::required(1, "a", FieldType::Int64),
            Field::required(2, "b", FieldType::Int64),
        ])?;

        let row = project(&record, &reordered)?;
        assert_eq!(
            row.values(),
            &[Value::Int64(3), Value::Int64(1), Value::Int64(2)]
        );
        Ok(())
    }

    #[test]
    fn missing_field_fails_instead_of_inserting_null() -> TestResult {
        let schema = abc_schema();
        let record = GenericRecord::create(Arc::clone(&schema));

        let wider = Schema::new(vec![
            Field::required(1, "a", FieldType::Int64),
            Field::optional(9, "extra", FieldType::Utf8),
        ])?;

        let err = project(&record, &wider).expect_err("mismatch should fail");
        assert!(matches!(err, ProjectError::MissingField { name } if name == "extra"));
        Ok(())
    }

    #[test]
    fn row_accessors() -> TestResult {
        let schema = abc_schema();
        let record = GenericRecord::with_values(
            Arc::clone(&schema),
            vec![Value::Int64(10), Value::Int64(20), Value::Int64(30)],
        )?;

        let row = project(&record, &schema)?;
        assert_eq!(row.len(), 3);
        assert!(!row.is_empty());
        assert_eq!(row[1], Value::Int64(20));
        assert_eq!(row.get(3), None);

        let collected: Vec<&Value> = (&row).into_iter().collect();
        assert_eq!(collected.len(), 3);

        let owned = row.into_values();
        assert_eq!(owned[2], Value::Int64(30));
        Ok(())
    }
}
