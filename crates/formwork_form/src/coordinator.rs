//! Precondition checks and error-map merging.
//!
//! Every mutating operation of the controller funnels its argument checks
//! through [`ValidationCoordinator`] so the structured errors are raised the
//! same way everywhere.

use formwork_fields::{
    ErrorMessage, FieldErrors, FieldRegistry, FieldType, FieldValue, FormError, FromFieldValue,
};

/// Stateless checks shared by every mutating operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationCoordinator;

impl ValidationCoordinator {
    /// Checks that a field is registered.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`], carrying the registered names and types.
    pub fn ensure_field_exists(registry: &FieldRegistry, name: &str) -> Result<(), FormError> {
        if registry.field_exists(name) {
            Ok(())
        } else {
            Err(registry.not_found(name))
        }
    }

    /// Checks that every named field is registered.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] for the first unknown name.
    pub fn ensure_fields_exist<'a>(
        registry: &FieldRegistry,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), FormError> {
        names
            .into_iter()
            .try_for_each(|name| Self::ensure_field_exists(registry, name))
    }

    /// Checks that `value` may be stored in the field, returning its declared
    /// type.
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] for an unknown field and
    /// [`FormError::TypeMismatch`] for a value of another type.
    pub fn ensure_value_type(
        registry: &FieldRegistry,
        name: &str,
        value: Option<&FieldValue>,
    ) -> Result<FieldType, FormError> {
        let declared = registry.field_type(name)?;
        if declared.accepts(value) {
            Ok(declared)
        } else {
            Err(FormError::type_mismatch(
                name,
                declared,
                value.map(FieldValue::field_type),
            ))
        }
    }

    /// Converts a stored value to `T`.
    ///
    /// `T` must read the field's declared type, and the stored value must
    /// convert (an absent value only converts into `Option<_>`).
    ///
    /// # Errors
    ///
    /// [`FormError::FieldNotFound`] for an unknown field and
    /// [`FormError::TypeMismatch`] when `T` is incompatible.
    pub fn read_value<T: FromFieldValue>(
        registry: &FieldRegistry,
        name: &str,
        value: Option<&FieldValue>,
    ) -> Result<T, FormError> {
        let declared = registry.field_type(name)?;
        let requested = T::expected_type();
        if requested != declared {
            return Err(FormError::type_mismatch(name, requested, Some(declared)));
        }
        T::from_field_value(value).ok_or_else(|| {
            FormError::type_mismatch(name, requested, value.map(FieldValue::field_type))
        })
    }

    /// Merges manual error updates into `current`.
    ///
    /// `Some(message)` sets a field's error and `None` clears it. The input
    /// map is left untouched.
    #[must_use]
    pub fn merge_errors<I>(current: &FieldErrors, updates: I) -> FieldErrors
    where
        I: IntoIterator<Item = (String, Option<ErrorMessage>)>,
    {
        let mut merged = current.clone();
        for (name, message) in updates {
            match message {
                Some(message) => {
                    merged.insert(name, message);
                }
                None => {
                    merged.shift_remove(&name);
                }
            }
        }
        merged
    }
}
