//! Error types for field registry and form operations.
//!
//! These are programmer errors: they abort the triggering call and are never
//! stored in a form's error map. Validation failures are plain data
//! ([`ErrorMessage`](crate::validator::ErrorMessage)) and never appear here.

use indexmap::IndexMap;

use crate::value::FieldType;

/// Errors raised when an operation violates a form precondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The operation referenced a field name that is not registered.
    #[error("field '{field}' not found; registered fields: [{}]", .valid_fields.join(", "))]
    FieldNotFound {
        /// The unknown field name.
        field: String,
        /// Names of all registered fields, in registration order.
        valid_fields: Vec<String>,
        /// The declared type of every registered field.
        field_types: IndexMap<String, FieldType>,
    },

    /// A value's type disagrees with the field's declared type.
    #[error("type mismatch for field '{field}': expected {expected}, found {}", describe_type(.actual))]
    TypeMismatch {
        /// The field being read or written.
        field: String,
        /// The declared (on write) or requested (on read) type.
        expected: FieldType,
        /// The type actually found, or `None` for an absent value.
        actual: Option<FieldType>,
    },

    /// A field with the same name is already registered.
    #[error("field '{field}' already exists")]
    FieldAlreadyExists {
        /// The colliding field name.
        field: String,
    },
}

impl FormError {
    /// Creates a [`TypeMismatch`](Self::TypeMismatch).
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: FieldType,
        actual: Option<FieldType>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }

    /// Creates a [`FieldAlreadyExists`](Self::FieldAlreadyExists).
    pub fn already_exists(field: impl Into<String>) -> Self {
        Self::FieldAlreadyExists {
            field: field.into(),
        }
    }

    /// Returns the name of the field this error is about.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::FieldNotFound { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::FieldAlreadyExists { field } => field,
        }
    }
}

fn describe_type(actual: &Option<FieldType>) -> &'static str {
    actual.map_or("absent value", FieldType::name)
}
