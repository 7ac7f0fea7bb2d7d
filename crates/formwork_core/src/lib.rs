//! Core infrastructure shared by Formwork crates.
//!
//! Currently this is the [`tracing`] subscriber setup used by applications
//! and tests that want to see what the engine is doing:
//!
//! ```
//! use formwork_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("formwork_form=trace")
//!     .init();
//! ```

/// Tracing subscriber configuration.
pub mod tracing_setup;

pub use tracing_setup::{TracingConfig, TracingFormat, TracingSetup};
