//! Opaque validation environment and localized message lookup.
//!
//! The [`Environment`] is plain data handed to every validator: a locale,
//! free-form flags (theme, platform, ...) and an optional [`MessageCatalog`].
//! The engine passes it through untouched; validators use it only to turn an
//! [`ErrorKind`] into display text.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

/// Parameters interpolated into message templates (`{name}` placeholders).
pub type MessageParams<'a> = &'a [(&'static str, String)];

// ─────────────────────────────────────────────────────────────────────────────
// ErrorKind
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of a validation failure, used as the message lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value is required but absent or blank.
    Required,
    /// Malformed email address.
    Email,
    /// Text or list shorter than the minimum.
    MinLength,
    /// Text or list longer than the maximum.
    MaxLength,
    /// Number outside the allowed range.
    Range,
    /// Text does not match the expected pattern.
    Pattern,
    /// Value differs from the field it must match.
    Mismatch,
    /// Application-defined kind with its own stable code.
    Custom(&'static str),
}

impl ErrorKind {
    /// Returns the stable code of this kind.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::MinLength => "too_short",
            Self::MaxLength => "too_long",
            Self::Range => "range",
            Self::Pattern => "pattern",
            Self::Mismatch => "mismatch",
            Self::Custom(code) => code,
        }
    }

    /// Returns the built-in English template for this kind.
    #[must_use]
    pub fn default_template(self) -> &'static str {
        match self {
            Self::Required => "This field is required",
            Self::Email => "Invalid email address",
            Self::MinLength => "Must be at least {min} characters",
            Self::MaxLength => "Must be at most {max} characters",
            Self::Range => "Must be between {min} and {max}",
            Self::Pattern => "Invalid format",
            Self::Mismatch => "Must match {other}",
            Self::Custom(_) => "Invalid value",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MessageCatalog
// ─────────────────────────────────────────────────────────────────────────────

/// External lookup service for localized message templates.
///
/// Returning `None` falls back to [`ErrorKind::default_template`].
pub trait MessageCatalog: Send + Sync + 'static {
    /// Returns the template for `kind` in `locale`, if the catalog has one.
    fn template(&self, kind: ErrorKind, locale: &str) -> Option<String>;
}

/// A catalog backed by an in-memory table of `(locale, code) -> template`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    templates: HashMap<(String, &'static str), String>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template for `kind` in `locale`.
    #[must_use]
    pub fn with_template(
        mut self,
        locale: impl Into<String>,
        kind: ErrorKind,
        template: impl Into<String>,
    ) -> Self {
        self.templates
            .insert((locale.into(), kind.code()), template.into());
        self
    }
}

impl MessageCatalog for InMemoryCatalog {
    fn template(&self, kind: ErrorKind, locale: &str) -> Option<String> {
        self.templates
            .get(&(locale.to_owned(), kind.code()))
            .cloned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment
// ─────────────────────────────────────────────────────────────────────────────

/// Context passed to validators. Never mutated by the engine.
#[derive(Clone)]
pub struct Environment {
    locale: String,
    flags: HashMap<String, String>,
    catalog: Option<Arc<dyn MessageCatalog>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("locale", &self.locale)
            .field("flags", &self.flags)
            .field("has_catalog", &self.catalog.is_some())
            .finish()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Environment {
    /// Creates an environment for the given locale with no flags or catalog.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            flags: HashMap::new(),
            catalog: None,
        }
    }

    /// Sets a flag.
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }

    /// Attaches a message catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<dyn MessageCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Returns the locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns a flag value.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<&str> {
        self.flags.get(key).map(String::as_str)
    }

    /// Resolves the display message for `kind`, interpolating `params`.
    #[must_use]
    pub fn resolve(&self, kind: ErrorKind, params: MessageParams<'_>) -> String {
        let template = self
            .catalog
            .as_ref()
            .and_then(|catalog| catalog.template(kind, &self.locale))
            .unwrap_or_else(|| kind.default_template().to_owned());

        params
            .iter()
            .fold(template, |message, (key, value)| {
                message.replace(&format!("{{{key}}}"), value)
            })
    }
}
