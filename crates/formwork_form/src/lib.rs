//! Validation strategies, state calculation, debouncing and the form
//! controller.
//!
//! This crate turns the field declarations of
//! [`formwork_fields`] into a live form:
//!
//! - [`strategy`]: the five validation strategies and their one transition
//! - [`tracking`]: which fields the user has touched
//! - [`calculator`]: the pure snapshot computation
//! - [`debounce`]: per-field debounce timers on tokio
//! - [`lifecycle`]: adding and removing fields at runtime
//! - [`controller`]: the [`FormController`] facade tying it together
//!
//! # Example
//!
//! ```
//! use formwork_form::prelude::*;
//!
//! let form = FormController::new(
//!     [FieldDefinition::new("email", FieldType::Text)
//!         .with_initial_value("")
//!         .with_validator(required())],
//!     FormConfig::new().with_strategy(ValidationStrategy::OnSubmitOnly),
//! )
//! .unwrap();
//!
//! // No validation on change under `OnSubmitOnly`.
//! let snapshot = form.update_field("email", "").unwrap();
//! assert!(snapshot.errors().is_empty());
//!
//! let passed = form.validate_form(|_| {}, |failed| {
//!     assert!(failed.has_error("email"));
//! });
//! assert!(!passed);
//! ```

/// Snapshot computation.
pub mod calculator;

/// Form configuration.
pub mod config;

/// The form controller facade.
pub mod controller;

/// Precondition checks and error merging.
pub mod coordinator;

/// Debounced validation scheduling.
pub mod debounce;

/// Runtime field addition and removal.
pub mod lifecycle;

/// Immutable form snapshots.
pub mod snapshot;

/// Validation strategies.
pub mod strategy;

/// Snapshot subscribers.
pub mod subscribers;

/// Touched-field tracking.
pub mod tracking;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::config::{ConfigError, FormConfig};
    pub use crate::controller::{FormController, FormResult};
    pub use crate::snapshot::FormSnapshot;
    pub use crate::strategy::ValidationStrategy;
    pub use crate::subscribers::SubscriptionId;
    pub use formwork_fields::prelude::*;
}

// Re-export key types at crate root for convenience
pub use config::{ConfigError, FormConfig};
pub use controller::{FormController, FormResult};
pub use snapshot::FormSnapshot;
pub use strategy::ValidationStrategy;
pub use subscribers::SubscriptionId;
