//! Records: schema-bound, field-keyed value containers.
//!
//! A record is bound to exactly one [`Schema`] at construction time and never
//! rebinds; augmentation always produces a new record bound to a new schema.
//! The [`Record`] trait captures the capability set the read adapter needs
//! (get/set by position, get/set by name) so records materialized from
//! different storage formats can flow through the same code paths.
use std::{fmt, sync::Arc};

use snafu::prelude::*;

use crate::schema::Schema;

/// A single column value.
///
/// `Null` is an explicit value so optional columns can be represented without
/// wrapping every slot in `Option`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null for an optional column.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 encoded string.
    Utf8(String),
    /// Variable-length binary data.
    Binary(Vec<u8>),
    /// Microsecond-precision UTC timestamp.
    TimestampMicros(i64),
}

impl Value {
    /// Whether this value is the explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v:?}"),
            Value::Binary(v) => write!(f, "binary[{} bytes]", v.len()),
            Value::TimestampMicros(v) => write!(f, "timestamp[us]({v})"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

/// Errors raised by record accessors.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
pub enum RecordError {
    /// Positional access past the end of the record.
    #[snafu(display("Position {position} out of range for record with {field_count} fields"))]
    PositionOutOfRange {
        /// The offending position.
        position: usize,
        /// Field count of the record's bound schema.
        field_count: usize,
    },

    /// Named access to a field the bound schema does not declare.
    #[snafu(display("Record schema has no field named {name:?}"))]
    UnknownField {
        /// The unresolved field name.
        name: String,
    },

    /// Construction with a value vector that disagrees with the schema.
    #[snafu(display("Value count {value_count} does not match schema field count {field_count}"))]
    ValueCountMismatch {
        /// Number of values supplied.
        value_count: usize,
        /// Field count of the target schema.
        field_count: usize,
    },
}

/// Capability set required of any record implementation.
///
/// Implementations must keep values addressable both by positional index
/// (matching the bound schema's field order) and by field name; the two views
/// must never desynchronize.
pub trait Record {
    /// The schema this record is bound to.
    fn schema(&self) -> &Arc<Schema>;

    /// Value at the given position, or `None` past the end of the record.
    fn get(&self, position: usize) -> Option<&Value>;

    /// Replace the value at the given position.
    fn set(&mut self, position: usize, value: Value) -> Result<(), RecordError>;

    /// Value of the named field, or `None` when the bound schema does not
    /// declare the name. An explicit null is `Some(&Value::Null)`.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Replace the value of the named field.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), RecordError>;
}

/// General-purpose record backed by a positional value vector.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericRecord {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl GenericRecord {
    /// Allocate a record bound to `schema` with every field set to null.
    pub fn create(schema: Arc<Schema>) -> Self {
        let values = vec![Value::Null; schema.field_count()];
        GenericRecord { schema, values }
    }

    /// Build a record from positional values.
    ///
    /// Fails when the value count disagrees with the schema's field count.
    pub fn with_values(schema: Arc<Schema>, values: Vec<Value>) -> Result<Self, RecordError> {
        ensure!(
            values.len() == schema.field_count(),
            ValueCountMismatchSnafu {
                value_count: values.len(),
                field_count: schema.field_count(),
            }
        );
        Ok(GenericRecord { schema, values })
    }

    /// Borrow all values in positional order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Record for GenericRecord {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    fn set(&mut self, position: usize, value: Value) -> Result<(), RecordError> {
        let slot = self
            .values
            .get_mut(position)
            .context(PositionOutOfRangeSnafu {
                position,
                field_count: self.schema.field_count(),
            })?;
        *slot = value;
        Ok(())
    }

    fn field(&self, name: &str) -> Option<&Value> {
        let position = self.schema.index_of(name)?;
        self.values.get(position)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), RecordError> {
        let position = self
            .schema
            .index_of(name)
            .context(UnknownFieldSnafu { name })?;
        self.values[position] = value;
        Ok(())
    }
}
