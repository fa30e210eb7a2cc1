//! Logging configuration and setup.

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for structured logging.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level used when no filter overrides it.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
    /// Include source file location.
    pub include_location: bool,
    /// Custom filter string (e.g., "glasspane_input=trace").
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            include_location: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Create a debug configuration.
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            ..Default::default()
        }
    }

    /// Create a configuration that traces every ingested event.
    ///
    /// Per-message paths log at `TRACE`, so this is very verbose.
    pub fn trace() -> Self {
        Self {
            level: Level::TRACE,
            include_location: true,
            ..Default::default()
        }
    }

    /// Set a custom filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        if let Some(ref custom_filter) = self.filter {
            EnvFilter::try_new(custom_filter)
                .unwrap_or_else(|_| EnvFilter::new(format!("{}", self.level)))
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}", self.level)))
        }
    }
}

/// Initialize logging with the given configuration.
///
/// Panics if a global subscriber is already installed; use [`try_init`]
/// from code that may run after another initializer (tests in particular).
pub fn init(config: LogConfig) {
    let filter = config.env_filter();

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact().with_target(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}

/// Initialize logging, returning `false` if a subscriber was already set.
pub fn try_init(config: LogConfig) -> bool {
    let filter = config.env_filter();
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
