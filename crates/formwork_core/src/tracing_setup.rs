//! Tracing subscriber setup.
//!
//! [`TracingSetup`] installs a global `tracing-subscriber` registry with an
//! [`EnvFilter`] and one formatting layer. `RUST_LOG` overrides the
//! configured directives. Installing twice is a no-op, so every test in a
//! binary may call [`TracingSetup::init`].

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// The effective configuration of a [`TracingSetup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracingConfig {
    /// The configured log level.
    pub level: Level,
    /// The configured output format.
    pub format: TracingFormat,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the global tracing subscriber.
///
/// # Example
///
/// ```
/// use formwork_core::{TracingFormat, TracingSetup};
/// use tracing::Level;
///
/// // Development: pretty output with span enter/exit events.
/// let dev = TracingSetup::new()
///     .with_level(Level::DEBUG)
///     .with_span_events(true);
///
/// // Production: JSON for log aggregation.
/// let prod = TracingSetup::new()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("formwork_form=info");
///
/// assert_eq!(dev.config().level, Level::DEBUG);
/// assert_eq!(prod.config().format, TracingFormat::Json);
/// ```
#[derive(Debug, Clone)]
pub struct TracingSetup {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

/// Targets the engine logs under.
pub const FORMWORK_TARGETS: [&str; 2] = ["formwork_fields", "formwork_form"];

impl TracingSetup {
    /// Creates a setup with default settings (INFO, pretty).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A setup that shows the engine's own events at `level` and everything
    /// else at WARN.
    ///
    /// ```
    /// use formwork_core::TracingSetup;
    /// use tracing::Level;
    ///
    /// let setup = TracingSetup::for_formwork(Level::TRACE);
    /// assert_eq!(
    ///     setup.filter_directives(),
    ///     "warn,formwork_fields=trace,formwork_form=trace"
    /// );
    /// ```
    #[must_use]
    pub fn for_formwork(level: Level) -> Self {
        let level = level.as_str().to_ascii_lowercase();
        let directives = FORMWORK_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .fold(String::from("warn"), |acc, directive| acc + "," + &directive);
        Self::new().with_env_filter(directives)
    }

    /// Sets the fallback log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives (`target=level,...`).
    ///
    /// `RUST_LOG`, when set and valid, takes precedence. Invalid directives
    /// fall back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Emits span enter/exit events.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the level and format this setup installs.
    #[must_use]
    pub fn config(&self) -> TracingConfig {
        TracingConfig {
            level: self.level,
            format: self.format,
        }
    }

    /// The directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        self.env_filter
            .clone()
            .unwrap_or_else(|| self.level.as_str().to_ascii_lowercase())
    }

    fn build_filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        EnvFilter::try_new(self.filter_directives())
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }

    /// Installs the global subscriber.
    ///
    /// Returns `false` if a global subscriber was already installed.
    pub fn init(&self) -> bool {
        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        // Exactly one of the three layers is `Some`.
        let pretty = (self.format == TracingFormat::Pretty)
            .then(|| fmt::layer().pretty().with_span_events(span_events.clone()));
        let compact = (self.format == TracingFormat::Compact)
            .then(|| fmt::layer().compact().with_span_events(span_events.clone()));
        let json = (self.format == TracingFormat::Json)
            .then(|| fmt::layer().json().with_span_events(span_events.clone()));

        let installed = tracing_subscriber::registry()
            .with(self.build_filter())
            .with(pretty)
            .with(compact)
            .with(json)
            .try_init()
            .is_ok();

        if installed {
            tracing::debug!(
                level = %self.level,
                format = ?self.format,
                directives = %self.filter_directives(),
                "formwork tracing installed"
            );
        }
        installed
    }
}
