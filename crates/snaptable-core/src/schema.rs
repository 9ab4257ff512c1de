//! Logical schema definitions for snaptable tables.
//!
//! A [`Schema`] is an ordered list of named, typed [`Field`]s. Field ids are
//! unique within a schema and stable across schema evolutions of the same
//! logical table; names are unique per schema. Both invariants are enforced
//! at construction time so every other component can rely on them.
use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

/// Logical value types storable in a snaptable column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 encoded string.
    Utf8,
    /// Variable-length binary data.
    Binary,
    /// Microsecond-precision UTC timestamp.
    TimestampMicros,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int32 => write!(f, "int32"),
            FieldType::Int64 => write!(f, "int64"),
            FieldType::Float32 => write!(f, "float32"),
            FieldType::Float64 => write!(f, "float64"),
            FieldType::Utf8 => write!(f, "utf8"),
            FieldType::Binary => write!(f, "binary"),
            FieldType::TimestampMicros => write!(f, "timestamp[us]"),
        }
    }
}

/// Column definition in a schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    /// Stable field id, assigned at table creation and never reused.
    pub id: i32,
    /// Column name, unique within the schema.
    pub name: String,
    /// Logical value type of the column.
    pub field_type: FieldType,
    /// Whether the column allows null values.
    pub nullable: bool,
}

impl Field {
    /// A non-nullable field.
    pub fn required(id: i32, name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            id,
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    /// A nullable field.
    pub fn optional(id: i32, name: impl Into<String>, field_type: FieldType) -> Self {
        Field {
            id,
            name: name.into(),
            field_type,
            nullable: true,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}: {}?: {}", self.id, self.name, self.field_type)
        } else {
            write!(f, "{}: {}: {}", self.id, self.name, self.field_type)
        }
    }
}

/// Errors raised while constructing or validating a schema.
#[derive(Debug, Clone, Snafu, PartialEq, Eq)]
pub enum SchemaError {
    /// Duplicate column names are not allowed.
    #[snafu(display("Duplicate column name: {column}"))]
    DuplicateColumn {
        /// The duplicate column name.
        column: String,
    },

    /// Field ids must be unique within a schema.
    #[snafu(display("Duplicate field id {field_id} (column {column})"))]
    DuplicateFieldId {
        /// The duplicated field id.
        field_id: i32,
        /// The column that re-used the id.
        column: String,
    },

    /// Column names must be non-empty.
    #[snafu(display("Column name must be non-empty (field id {field_id})"))]
    EmptyColumnName {
        /// Field id of the unnamed column.
        field_id: i32,
    },
}

/// Ordered, named, typed field list describing a table's logical structure.
///
/// Invariant: field ids and names are unique. A `Schema` is immutable after
/// construction; augmentation always produces a new `Schema`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Construct a validated schema.
    ///
    /// Rejects duplicate column names, duplicate field ids, and empty names.
    pub fn new(fields: Vec<Field>) -> Result<Self, SchemaError> {
        let mut seen_names = HashSet::with_capacity(fields.len());
        let mut seen_ids = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.is_empty() {
                return EmptyColumnNameSnafu { field_id: field.id }.fail();
            }
            if !seen_names.insert(field.name.clone()) {
                return DuplicateColumnSnafu {
                    column: field.name.clone(),
                }
                .fail();
            }
            if !seen_ids.insert(field.id) {
                return DuplicateFieldIdSnafu {
                    field_id: field.id,
                    column: field.name.clone(),
                }
                .fail();
            }
        }

        Ok(Self { fields })
    }

    /// Borrow the fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields in the schema.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Positional index of the named field, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, "}}")
    }
}
