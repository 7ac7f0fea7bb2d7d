//! Field definitions.

use core::fmt;

use crate::validator::BoxedValidator;
use crate::value::{FieldType, FieldValue};

/// Declaration of a single form field.
///
/// Immutable once built. Replacing validators produces a new definition
/// (see [`with_replaced_validators`](Self::with_replaced_validators)).
///
/// # Example
///
/// ```
/// use formwork_fields::definition::FieldDefinition;
/// use formwork_fields::value::FieldType;
/// use formwork_fields::validators::{email, required};
///
/// let field = FieldDefinition::new("email", FieldType::Text)
///     .with_initial_value("")
///     .with_validator(required())
///     .with_validator(email());
///
/// assert_eq!(field.name(), "email");
/// assert_eq!(field.validators().len(), 2);
/// ```
#[derive(Clone)]
pub struct FieldDefinition {
    name: String,
    value_type: FieldType,
    validators: Vec<BoxedValidator>,
    initial_value: Option<FieldValue>,
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("validators", &self.validators.len())
            .field("initial_value", &self.initial_value)
            .finish()
    }
}

impl FieldDefinition {
    /// Creates a field with no validators and no initial value.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: FieldType) -> Self {
        Self {
            name: name.into(),
            value_type,
            validators: Vec::new(),
            initial_value: None,
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Appends a validator. Validators run in insertion order.
    #[must_use]
    pub fn with_validator(mut self, validator: BoxedValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Appends several validators.
    #[must_use]
    pub fn with_validators(mut self, validators: impl IntoIterator<Item = BoxedValidator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Returns a copy of this definition with its validator list replaced.
    #[must_use]
    pub fn with_replaced_validators(&self, validators: Vec<BoxedValidator>) -> Self {
        Self {
            name: self.name.clone(),
            value_type: self.value_type,
            validators,
            initial_value: self.initial_value.clone(),
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn value_type(&self) -> FieldType {
        self.value_type
    }

    /// Returns the validators in evaluation order.
    #[must_use]
    pub fn validators(&self) -> &[BoxedValidator] {
        &self.validators
    }

    /// Returns the initial value.
    #[must_use]
    pub fn initial_value(&self) -> Option<&FieldValue> {
        self.initial_value.as_ref()
    }
}
