//! Tracing subscriber configuration.
//!
//! # Example
//!
//! ```no_run
//! use stratum_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("stratum_resources=trace,stratum_expr=debug")
//!     .init();
//!
//! tracing::info!("provisioning started");
//! ```

use core::str::FromStr;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Environment variable holding the filter directives.
pub const LOG_FILTER_ENV: &str = "STRATUM_LOG";

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "STRATUM_LOG_FORMAT";

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

impl FromStr for TracingFormat {
    type Err = TracingInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(TracingFormat::Pretty),
            "compact" => Ok(TracingFormat::Compact),
            "json" => Ok(TracingFormat::Json),
            _ => Err(TracingInitError::UnknownFormat(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingInitError
// ─────────────────────────────────────────────────────────────────────────────

/// Failure to install the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    /// The filter directives did not parse.
    #[error("invalid tracing filter: {0}")]
    InvalidFilter(#[from] ParseError),

    /// The format name is not one of `pretty`, `compact` or `json`.
    #[error("unknown tracing format '{0}'")]
    UnknownFormat(String),

    /// A global subscriber was installed earlier.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] TryInitError),
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the process-wide `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    level: Level,
    format: TracingFormat,
    /// Filter directives, e.g. `"stratum_expr=debug,hyper=warn"`.
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`LOG_FILTER_ENV`] and [`LOG_FORMAT_ENV`] from the process
    /// environment.
    ///
    /// Unset variables keep their defaults; an unrecognized format falls back
    /// to [`TracingFormat::Pretty`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|f| !f.trim().is_empty()) {
            config.env_filter = Some(filter);
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).and_then(|f| f.parse().ok()) {
            config.format = format;
        }
        config
    }

    /// Sets the maximum log level used when no filter is given.
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

    /// Sets filter directives in `target=level,...` form.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Installs the subscriber.
    ///
    /// An invalid filter falls back to the configured level, and an already
    /// installed subscriber is left in place.
    pub fn init(&self) {
        let filter = match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        };

        if self.install(filter).is_ok() {
            self.announce();
        }
    }

    /// Installs the subscriber, reporting every failure.
    ///
    /// # Errors
    ///
    /// Returns [`TracingInitError::InvalidFilter`] for malformed directives
    /// and [`TracingInitError::AlreadyInstalled`] when a global subscriber
    /// exists.
    pub fn try_init(&self) -> Result<(), TracingInitError> {
        let filter = match &self.env_filter {
            Some(filter) => EnvFilter::try_new(filter)?,
            None => EnvFilter::new(self.level.as_str()),
        };

        self.install(filter)?;
        self.announce();
        Ok(())
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }

    fn install(&self, filter: EnvFilter) -> Result<(), TryInitError> {
        let registry = tracing_subscriber::registry().with(filter);
        let span_events = self.fmt_span();

        match self.format {
            TracingFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        }
    }

    fn announce(&self) {
        tracing::debug!(
            level = %self.level,
            format = ?self.format,
            filter = self.env_filter.as_deref(),
            "tracing initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>().unwrap(), TracingFormat::Json);
        assert_eq!(" compact ".parse::<TracingFormat>().unwrap(), TracingFormat::Compact);
        assert!(matches!(
            "xml".parse::<TracingFormat>(),
            Err(TracingInitError::UnknownFormat(ref s)) if s == "xml"
        ));
    }

    #[test]
    fn builder_sets_fields() {
        let config = TracingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("stratum_expr=trace")
            .with_span_events(true);

        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format(), TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("stratum_expr=trace"));
        assert_eq!(config.fmt_span(), FmtSpan::ENTER | FmtSpan::EXIT);
    }

    #[test]
    fn lookup_reads_filter_and_format() {
        let config = TracingConfig::from_lookup(|key| match key {
            LOG_FILTER_ENV => Some("stratum_resources=debug".to_string()),
            LOG_FORMAT_ENV => Some("compact".to_string()),
            _ => None,
        });

        assert_eq!(config.env_filter.as_deref(), Some("stratum_resources=debug"));
        assert_eq!(config.format(), TracingFormat::Compact);
    }

    #[test]
    fn lookup_keeps_defaults_for_unset_or_unknown_values() {
        let config = TracingConfig::from_lookup(|key| match key {
            LOG_FILTER_ENV => Some("   ".to_string()),
            LOG_FORMAT_ENV => Some("yaml".to_string()),
            _ => None,
        });

        assert_eq!(config.env_filter, None);
        assert_eq!(config.format(), TracingFormat::Pretty);
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn try_init_rejects_malformed_filter() {
        let err = TracingConfig::new()
            .with_env_filter("stratum=loudest")
            .try_init()
            .unwrap_err();
        assert!(matches!(err, TracingInitError::InvalidFilter(_)));
    }

    #[test]
    fn second_install_is_reported() {
        let config = TracingConfig::new().with_format(TracingFormat::Compact);
        config.init();
        let err = config.try_init().unwrap_err();
        assert!(matches!(err, TracingInitError::AlreadyInstalled(_)));
    }
}
