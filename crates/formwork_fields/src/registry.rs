//! Field registry.
//!
//! The [`FieldRegistry`] owns the live list of [`FieldDefinition`]s and keeps
//! a set of derived, read-only indices in step with it:
//!
//! - name → declared [`FieldType`]
//! - name → composite [`ValidatorChain`]
//! - dependency name → names of fields whose validators read it
//!
//! Every mutation updates the indices incrementally, so they are never stale
//! relative to the definitions. Iteration order is registration order.
//!
//! # Usage
//!
//! ```
//! use formwork_fields::definition::FieldDefinition;
//! use formwork_fields::registry::FieldRegistry;
//! use formwork_fields::validators::{matches, required};
//! use formwork_fields::value::FieldType;
//!
//! let registry = FieldRegistry::new([
//!     FieldDefinition::new("password", FieldType::Text).with_validator(required()),
//!     FieldDefinition::new("confirm", FieldType::Text).with_validator(matches("password")),
//! ])
//! .unwrap();
//!
//! assert!(registry.field_exists("password"));
//! assert_eq!(registry.dependents_of("password"), ["confirm"]);
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::definition::FieldDefinition;
use crate::environment::Environment;
use crate::error::FormError;
use crate::validator::{BoxedValidator, ErrorMessage, Validator, ValidatorChain};
use crate::value::{FieldType, FieldValue, FieldValues};

/// Registry of the fields of one form.
#[derive(Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldDefinition>,
    field_types: IndexMap<String, FieldType>,
    validators: IndexMap<String, Arc<ValidatorChain>>,
    dependents: HashMap<String, Vec<String>>,
}

impl core::fmt::Debug for FieldRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.field_types)
            .field("dependents", &self.dependents)
            .finish()
    }
}

impl FieldRegistry {
    /// Creates a registry from a list of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldAlreadyExists`] on the first duplicate name
    /// and [`FormError::TypeMismatch`] if an initial value disagrees with its
    /// field's declared type.
    pub fn new(definitions: impl IntoIterator<Item = FieldDefinition>) -> Result<Self, FormError> {
        let mut registry = Self::default();
        for definition in definitions {
            registry.add_field(definition)?;
        }
        Ok(registry)
    }

    /// Returns whether a field with the given name is registered.
    #[must_use]
    pub fn field_exists(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the declared type of a field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if the field is not registered.
    pub fn field_type(&self, name: &str) -> Result<FieldType, FormError> {
        self.field_types
            .get(name)
            .copied()
            .ok_or_else(|| self.not_found(name))
    }

    /// Returns the declared type of every field, in registration order.
    #[must_use]
    pub fn field_types(&self) -> &IndexMap<String, FieldType> {
        &self.field_types
    }

    /// Returns the names of all fields, in registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the definition of a field.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Returns all definitions, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    /// Returns the number of registered fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the initial value of every field, in registration order.
    #[must_use]
    pub fn initial_values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|(name, definition)| (name.clone(), definition.initial_value().cloned()))
            .collect()
    }

    /// Returns the composite validator of a field.
    #[must_use]
    pub fn validator(&self, name: &str) -> Option<&ValidatorChain> {
        self.validators.get(name).map(Arc::as_ref)
    }

    /// Returns the names of fields whose validators depend on `name`.
    #[must_use]
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.dependents
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registers a new field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldAlreadyExists`] if the name is taken, or
    /// [`FormError::TypeMismatch`] if the initial value has the wrong type.
    pub fn add_field(&mut self, definition: FieldDefinition) -> Result<(), FormError> {
        self.check_addable(&definition)?;

        let name = definition.name().to_owned();
        self.field_types
            .insert(name.clone(), definition.value_type());
        self.index_validators(&name, definition.validators().to_vec());
        self.fields.insert(name.clone(), definition);

        tracing::debug!(field = %name, "field registered");
        Ok(())
    }

    /// Checks that `definition` could be added without applying it.
    ///
    /// # Errors
    ///
    /// Same as [`add_field`](Self::add_field).
    pub fn check_addable(&self, definition: &FieldDefinition) -> Result<(), FormError> {
        if self.field_exists(definition.name()) {
            return Err(FormError::already_exists(definition.name()));
        }
        let initial = definition.initial_value();
        if !definition.value_type().accepts(initial) {
            return Err(FormError::type_mismatch(
                definition.name(),
                definition.value_type(),
                initial.map(FieldValue::field_type),
            ));
        }
        Ok(())
    }

    /// Unregisters a field, returning its definition.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if the field is not registered.
    pub fn remove_field(&mut self, name: &str) -> Result<FieldDefinition, FormError> {
        let Some(definition) = self.fields.shift_remove(name) else {
            return Err(self.not_found(name));
        };
        self.field_types.shift_remove(name);
        self.unindex_validators(name);

        tracing::debug!(field = %name, "field unregistered");
        Ok(definition)
    }

    /// Replaces a field's validators, rebuilding its composite validator.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if the field is not registered.
    pub fn update_field_validators(
        &mut self,
        name: &str,
        validators: Vec<BoxedValidator>,
    ) -> Result<(), FormError> {
        let Some(current) = self.fields.get(name) else {
            return Err(self.not_found(name));
        };
        let replacement = current.with_replaced_validators(validators);

        self.unindex_validators(name);
        self.index_validators(name, replacement.validators().to_vec());
        if let Some(slot) = self.fields.get_mut(name) {
            *slot = replacement;
        }

        tracing::debug!(field = %name, "field validators replaced");
        Ok(())
    }

    /// Runs a field's composite validator against the current form values.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::FieldNotFound`] if the field is not registered.
    pub fn validate_field(
        &self,
        name: &str,
        values: &FieldValues,
        env: &Environment,
    ) -> Result<Option<ErrorMessage>, FormError> {
        let chain = self
            .validators
            .get(name)
            .ok_or_else(|| self.not_found(name))?;
        let value = values.get(name).and_then(Option::as_ref);
        Ok(chain.run(value, values, env))
    }

    /// Builds a [`FormError::FieldNotFound`] carrying the current field set.
    #[must_use]
    pub fn not_found(&self, name: &str) -> FormError {
        FormError::FieldNotFound {
            field: name.to_owned(),
            valid_fields: self.fields.keys().cloned().collect(),
            field_types: self.field_types.clone(),
        }
    }

    fn index_validators(&mut self, name: &str, validators: Vec<BoxedValidator>) {
        let chain = ValidatorChain::new(validators);
        for dependency in chain.dependent_fields() {
            let dependents = self.dependents.entry(dependency.clone()).or_default();
            if !dependents.iter().any(|dependent| dependent == name) {
                dependents.push(name.to_owned());
            }
        }
        self.validators.insert(name.to_owned(), Arc::new(chain));
    }

    fn unindex_validators(&mut self, name: &str) {
        let Some(chain) = self.validators.shift_remove(name) else {
            return;
        };
        for dependency in chain.dependent_fields() {
            if let Some(dependents) = self.dependents.get_mut(dependency) {
                dependents.retain(|dependent| dependent != name);
                if dependents.is_empty() {
                    self.dependents.remove(dependency);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{matches, min_length, required};

    fn sample() -> FieldRegistry {
        FieldRegistry::new([
            FieldDefinition::new("email", FieldType::Text)
                .with_initial_value("")
                .with_validator(required()),
            FieldDefinition::new("age", FieldType::Integer),
        ])
        .unwrap()
    }

    #[test]
    fn derived_views_follow_registration_order() {
        let registry = sample();
        assert_eq!(registry.field_names().collect::<Vec<_>>(), ["email", "age"]);
        assert_eq!(
            registry.field_types().keys().collect::<Vec<_>>(),
            ["email", "age"]
        );
        assert_eq!(registry.field_type("age"), Ok(FieldType::Integer));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_names_fail_fast_on_construction() {
        let result = FieldRegistry::new([
            FieldDefinition::new("email", FieldType::Text),
            FieldDefinition::new("email", FieldType::Integer),
        ]);
        assert_eq!(
            result.unwrap_err(),
            FormError::already_exists("email"),
            "the first duplicate must abort construction"
        );
    }

    #[test]
    fn initial_value_must_match_declared_type() {
        let result = FieldRegistry::new([
            FieldDefinition::new("age", FieldType::Integer).with_initial_value("thirty")
        ]);
        assert_eq!(
            result.unwrap_err(),
            FormError::type_mismatch("age", FieldType::Integer, Some(FieldType::Text))
        );
    }

    #[test]
    fn unknown_field_reports_valid_names_and_types() {
        let registry = sample();
        match registry.field_type("phone") {
            Err(FormError::FieldNotFound {
                field,
                valid_fields,
                field_types,
            }) => {
                assert_eq!(field, "phone");
                assert_eq!(valid_fields, ["email", "age"]);
                assert_eq!(field_types.get("email"), Some(&FieldType::Text));
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn remove_field_drops_every_index() {
        let mut registry = FieldRegistry::new([
            FieldDefinition::new("password", FieldType::Text),
            FieldDefinition::new("confirm", FieldType::Text).with_validator(matches("password")),
        ])
        .unwrap();
        assert_eq!(registry.dependents_of("password"), ["confirm"]);

        let removed = registry.remove_field("confirm").unwrap();
        assert_eq!(removed.name(), "confirm");
        assert!(!registry.field_exists("confirm"));
        assert!(registry.field_type("confirm").is_err());
        assert!(registry.validator("confirm").is_none());
        assert!(registry.dependents_of("password").is_empty());

        assert!(matches!(
            registry.remove_field("confirm"),
            Err(FormError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn update_validators_rebuilds_chain_and_dependency_index() {
        let mut registry = FieldRegistry::new([
            FieldDefinition::new("password", FieldType::Text),
            FieldDefinition::new("confirm", FieldType::Text),
        ])
        .unwrap();
        assert!(registry.dependents_of("password").is_empty());

        registry
            .update_field_validators("confirm", vec![required(), matches("password")])
            .unwrap();
        assert_eq!(registry.dependents_of("password"), ["confirm"]);
        assert_eq!(registry.validator("confirm").map(ValidatorChain::len), Some(2));

        registry
            .update_field_validators("confirm", vec![min_length(2)])
            .unwrap();
        assert!(registry.dependents_of("password").is_empty());

        assert!(registry.update_field_validators("nope", Vec::new()).is_err());
    }

    #[test]
    fn validate_field_runs_chain_with_dependencies() {
        let registry = FieldRegistry::new([
            FieldDefinition::new("password", FieldType::Text),
            FieldDefinition::new("confirm", FieldType::Text)
                .with_validators([required(), matches("password")]),
        ])
        .unwrap();
        let env = Environment::default();

        let mut values = registry.initial_values();
        values.insert("password".into(), Some(FieldValue::from("secret")));
        values.insert("confirm".into(), Some(FieldValue::from("secret")));
        assert_eq!(registry.validate_field("confirm", &values, &env), Ok(None));

        values.insert("password".into(), Some(FieldValue::from("changed")));
        assert_eq!(
            registry.validate_field("confirm", &values, &env),
            Ok(Some("Must match password".to_owned()))
        );

        values.insert("confirm".into(), None);
        assert_eq!(
            registry.validate_field("confirm", &values, &env),
            Ok(Some("This field is required".to_owned())),
            "the chain stops at the first failing validator"
        );
    }

    #[test]
    fn initial_values_seed_every_field() {
        let registry = sample();
        let values = registry.initial_values();
        assert_eq!(values.get("email"), Some(&Some(FieldValue::from(""))));
        assert_eq!(values.get("age"), Some(&None));
    }
}
