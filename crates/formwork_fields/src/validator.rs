//! The validator abstraction.
//!
//! A validator is a pure function of `(value, dependency values, environment)`
//! that returns an [`ErrorMessage`] when the value is invalid. Validators are
//! stored type-erased as [`BoxedValidator`] so heterogeneous rules can share a
//! field's validator list.
//!
//! # Cross-field validators
//!
//! A validator may declare the names of other fields it reads through
//! [`Validator::dependent_fields`]. The registry indexes these declarations so
//! that a change to a dependency triggers revalidation of the dependent field.
//!
//! ```
//! use formwork_fields::validator::{cross_field, validator};
//! use formwork_fields::value::FieldValue;
//!
//! let not_empty = validator(|value, _env| {
//!     value.is_none().then(|| "missing".to_owned())
//! });
//!
//! let before_end = cross_field(["end"], |value, deps, _env| {
//!     let start = value.and_then(FieldValue::as_integer)?;
//!     let end = deps.get("end").and_then(FieldValue::as_integer)?;
//!     (start > end).then(|| "start must not be after end".to_owned())
//! });
//!
//! assert!(not_empty.dependent_fields().is_empty());
//! assert_eq!(before_end.dependent_fields(), ["end".to_owned()]);
//! ```

use core::fmt;
use std::sync::Arc;

use crate::environment::Environment;
use crate::value::{FieldValue, FieldValues};

/// A user-facing validation error message.
pub type ErrorMessage = String;

/// Type-erased, shareable validator.
pub type BoxedValidator = Arc<dyn Validator>;

// ─────────────────────────────────────────────────────────────────────────────
// DependencyValues
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only view of the current values of a validator's dependencies.
///
/// Only declared dependencies are visible; unknown or absent fields read as
/// `None`.
#[derive(Debug, Clone, Default)]
pub struct DependencyValues<'a> {
    entries: Vec<(&'a str, Option<&'a FieldValue>)>,
}

impl<'a> DependencyValues<'a> {
    /// Creates an empty view.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collects the values of `dependencies` from the current form values.
    #[must_use]
    pub fn collect(dependencies: &'a [String], values: &'a FieldValues) -> Self {
        let entries = dependencies
            .iter()
            .map(|name| {
                let value = values.get(name).and_then(Option::as_ref);
                (name.as_str(), value)
            })
            .collect();
        Self { entries }
    }

    /// Returns the current value of a dependency.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        self.entries
            .iter()
            .find(|(dependency, _)| *dependency == name)
            .and_then(|(_, value)| *value)
    }

    /// Returns whether `name` is a declared dependency.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(dependency, _)| *dependency == name)
    }

    /// Returns the number of declared dependencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no declared dependencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validator
// ─────────────────────────────────────────────────────────────────────────────

/// A synchronous, pure validation rule.
pub trait Validator: Send + Sync {
    /// Validates `value`, returning an error message if it is invalid.
    fn validate(
        &self,
        value: Option<&FieldValue>,
        dependencies: &DependencyValues<'_>,
        env: &Environment,
    ) -> Option<ErrorMessage>;

    /// Names of other fields this validator reads.
    fn dependent_fields(&self) -> &[String] {
        &[]
    }
}

impl fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("dependent_fields", &self.dependent_fields())
            .finish()
    }
}

/// Adapter turning a closure over `(value, env)` into a [`Validator`].
pub struct FnValidator<F> {
    check: F,
}

impl<F> FnValidator<F>
where
    F: Fn(Option<&FieldValue>, &Environment) -> Option<ErrorMessage> + Send + Sync,
{
    /// Wraps `check`.
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(Option<&FieldValue>, &Environment) -> Option<ErrorMessage> + Send + Sync,
{
    fn validate(
        &self,
        value: Option<&FieldValue>,
        _dependencies: &DependencyValues<'_>,
        env: &Environment,
    ) -> Option<ErrorMessage> {
        (self.check)(value, env)
    }
}

/// A validator that reads other fields' values.
pub struct CrossFieldValidator<F> {
    dependencies: Vec<String>,
    check: F,
}

impl<F> CrossFieldValidator<F>
where
    F: Fn(Option<&FieldValue>, &DependencyValues<'_>, &Environment) -> Option<ErrorMessage>
        + Send
        + Sync,
{
    /// Wraps `check`, declaring the fields it depends on.
    pub fn new<I, S>(dependencies: I, check: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in dependencies {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self {
            dependencies: names,
            check,
        }
    }
}

impl<F> Validator for CrossFieldValidator<F>
where
    F: Fn(Option<&FieldValue>, &DependencyValues<'_>, &Environment) -> Option<ErrorMessage>
        + Send
        + Sync,
{
    fn validate(
        &self,
        value: Option<&FieldValue>,
        dependencies: &DependencyValues<'_>,
        env: &Environment,
    ) -> Option<ErrorMessage> {
        (self.check)(value, dependencies, env)
    }

    fn dependent_fields(&self) -> &[String] {
        &self.dependencies
    }
}

/// Creates a boxed validator from a closure over `(value, env)`.
pub fn validator<F>(check: F) -> BoxedValidator
where
    F: Fn(Option<&FieldValue>, &Environment) -> Option<ErrorMessage> + Send + Sync + 'static,
{
    Arc::new(FnValidator::new(check))
}

/// Creates a boxed cross-field validator depending on `dependencies`.
pub fn cross_field<I, S, F>(dependencies: I, check: F) -> BoxedValidator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: Fn(Option<&FieldValue>, &DependencyValues<'_>, &Environment) -> Option<ErrorMessage>
        + Send
        + Sync
        + 'static,
{
    Arc::new(CrossFieldValidator::new(dependencies, check))
}

// ─────────────────────────────────────────────────────────────────────────────
// ValidatorChain
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered AND-composition of validators.
///
/// Evaluation stops at the first validator that reports an error, and that
/// error is the chain's result. The chain's dependencies are the union of its
/// members' dependencies.
#[derive(Debug, Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<BoxedValidator>,
    dependencies: Vec<String>,
}

impl ValidatorChain {
    /// Builds a chain from an ordered list of validators.
    #[must_use]
    pub fn new(validators: Vec<BoxedValidator>) -> Self {
        let mut dependencies: Vec<String> = Vec::new();
        for validator in &validators {
            for name in validator.dependent_fields() {
                if !dependencies.contains(name) {
                    dependencies.push(name.clone());
                }
            }
        }
        Self {
            validators,
            dependencies,
        }
    }

    /// Returns the number of validators in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if the chain has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Runs the chain against a value and the full set of current form values.
    #[must_use]
    pub fn run(
        &self,
        value: Option<&FieldValue>,
        values: &FieldValues,
        env: &Environment,
    ) -> Option<ErrorMessage> {
        let dependencies = DependencyValues::collect(&self.dependencies, values);
        self.validate(value, &dependencies, env)
    }
}

impl Validator for ValidatorChain {
    fn validate(
        &self,
        value: Option<&FieldValue>,
        dependencies: &DependencyValues<'_>,
        env: &Environment,
    ) -> Option<ErrorMessage> {
        self.validators
            .iter()
            .find_map(|validator| validator.validate(value, dependencies, env))
    }

    fn dependent_fields(&self) -> &[String] {
        &self.dependencies
    }
}
