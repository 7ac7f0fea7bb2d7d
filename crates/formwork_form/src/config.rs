//! Form configuration.
//!
//! ```
//! use core::time::Duration;
//! use formwork_form::config::FormConfig;
//! use formwork_form::strategy::ValidationStrategy;
//!
//! let config = FormConfig::from_json_str(
//!     r#"{ "strategy": "realTimeOnly", "debounce_ms": 150 }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.strategy(), ValidationStrategy::RealTimeOnly);
//! assert_eq!(config.debounce(), Duration::from_millis(150));
//! assert_eq!(config.locale(), "en");
//! ```

use core::time::Duration;

use formwork_fields::Environment;
use serde::{Deserialize, Serialize};

use crate::strategy::ValidationStrategy;

/// Default delay between the last keystroke and debounced validation.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Errors raised while loading a [`FormConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid form configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings of a form controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    strategy: ValidationStrategy,
    #[serde(rename = "debounce_ms", with = "millis")]
    debounce: Duration,
    locale: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            strategy: ValidationStrategy::default(),
            debounce: DEFAULT_DEBOUNCE,
            locale: "en".to_owned(),
        }
    }
}

impl FormConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the document is malformed or a key has the
    /// wrong shape.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the initial validation strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the default debounce delay.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the locale of the initial environment.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// The initial validation strategy.
    #[must_use]
    pub fn strategy(&self) -> ValidationStrategy {
        self.strategy
    }

    /// The default debounce delay.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// The locale of the initial environment.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Builds the initial environment.
    #[must_use]
    pub fn environment(&self) -> Environment {
        Environment::new(self.locale.clone())
    }
}

mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
