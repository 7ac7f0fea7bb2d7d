//! # Formwork Internal Library
//!
//! Re-exports the core Formwork crates for convenience.

/// Layer 1: field values, validators and the field registry.
pub use formwork_fields;

/// Layer 2: strategies, state calculation and the form controller.
pub use formwork_form;

/// Infrastructure: tracing setup.
pub use formwork_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use formwork_core::{TracingFormat, TracingSetup};
    pub use formwork_form::prelude::*;
}
