//! Typed fields, validators and the field registry for Formwork.
//!
//! This crate provides the leaf data model of a form:
//!
//! - [`FieldValue`] / [`FieldType`]: tagged values and their declared types
//! - [`Environment`]: opaque validation context with localized messages
//! - [`Validator`]: pure validation rules, including cross-field rules
//! - [`FieldDefinition`]: a field's name, type, initial value and validators
//! - [`FieldRegistry`]: the live set of fields with derived indices
//! - [`FormError`]: structured precondition errors
//!
//! # Example
//!
//! ```
//! use formwork_fields::prelude::*;
//!
//! let registry = FieldRegistry::new([
//!     FieldDefinition::new("email", FieldType::Text)
//!         .with_initial_value("")
//!         .with_validators([required(), email()]),
//!     FieldDefinition::new("age", FieldType::Integer).with_validator(required()),
//! ])
//! .unwrap();
//!
//! let mut values = registry.initial_values();
//! values.insert("email".into(), Some(FieldValue::from("not-an-email")));
//!
//! let error = registry
//!     .validate_field("email", &values, &Environment::default())
//!     .unwrap();
//! assert_eq!(error.as_deref(), Some("Invalid email address"));
//! ```

/// Field declarations.
pub mod definition;

/// Validation environment and message lookup.
pub mod environment;

/// Structured precondition errors.
pub mod error;

/// Field registry with derived indices.
pub mod registry;

/// Validator trait, adapters and composition.
pub mod validator;

/// Built-in validators.
pub mod validators;

/// Typed field values.
pub mod value;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::definition::FieldDefinition;
    pub use crate::environment::{Environment, ErrorKind, InMemoryCatalog, MessageCatalog};
    pub use crate::error::FormError;
    pub use crate::registry::FieldRegistry;
    pub use crate::validator::{
        BoxedValidator, CrossFieldValidator, DependencyValues, ErrorMessage, FnValidator,
        Validator, ValidatorChain, cross_field, validator,
    };
    pub use crate::validators::{
        contains, custom, email, exact, matches, max_length, min_length, range, required,
    };
    pub use crate::value::{FieldErrors, FieldType, FieldValue, FieldValues, FromFieldValue};
}

// Re-export key types at crate root for convenience
pub use definition::FieldDefinition;
pub use environment::{Environment, ErrorKind, MessageCatalog};
pub use error::FormError;
pub use registry::FieldRegistry;
pub use validator::{BoxedValidator, ErrorMessage, Validator};
pub use value::{FieldErrors, FieldType, FieldValue, FieldValues, FromFieldValue};
