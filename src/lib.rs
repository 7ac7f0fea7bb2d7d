//! A typed, multi-field form validation and state-reconciliation engine.
//!

pub use formwork_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use formwork_internal::prelude::*;
}
