//! Immutable form snapshots.

use formwork_fields::{ErrorMessage, FieldErrors, FieldType, FieldValue, FieldValues};
use indexmap::IndexMap;
use serde::Serialize;

use crate::strategy::ValidationStrategy;

/// A point-in-time view of a form's values, errors, validity and strategy.
///
/// Snapshots are never modified after construction. Every mutation of a
/// [`FormController`](crate::controller::FormController) publishes a new one,
/// so a snapshot held by a subscriber stays consistent.
///
/// `values` and `field_types` always have the same keys, in registration
/// order; `errors` only holds entries for invalid fields, keyed by a subset
/// of those names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    values: FieldValues,
    errors: FieldErrors,
    is_valid: bool,
    strategy: ValidationStrategy,
    field_types: IndexMap<String, FieldType>,
}

impl FormSnapshot {
    pub(crate) fn new(
        values: FieldValues,
        errors: FieldErrors,
        is_valid: bool,
        strategy: ValidationStrategy,
        field_types: IndexMap<String, FieldType>,
    ) -> Self {
        Self {
            values,
            errors,
            is_valid,
            strategy,
            field_types,
        }
    }

    /// All field values, in registration order.
    #[must_use]
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Errors of the invalid fields.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Whether the form can be submitted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The strategy in effect when this snapshot was taken.
    #[must_use]
    pub fn strategy(&self) -> ValidationStrategy {
        self.strategy
    }

    /// Declared type of every field.
    #[must_use]
    pub fn field_types(&self) -> &IndexMap<String, FieldType> {
        &self.field_types
    }

    /// Returns the value of a field; `None` for both unknown fields and
    /// absent values.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Returns the error of a field.
    #[must_use]
    pub fn error(&self, name: &str) -> Option<&ErrorMessage> {
        self.errors.get(name)
    }

    /// Returns whether a field has an error.
    #[must_use]
    pub fn has_error(&self, name: &str) -> bool {
        self.errors.contains_key(name)
    }

    /// Returns whether a field is part of this snapshot.
    #[must_use]
    pub fn contains_field(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}
