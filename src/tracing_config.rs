//! Tracing configuration module for structured logging
//!
//! The library only emits events and spans; the CLI installs a subscriber
//! through this module.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors (default for CLI)
    Console,
    /// Compact console output for CI environments
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    /// Output format
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Session ID for correlation
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Filter directives the subscriber will use
    pub fn filter_directives(&self) -> &str {
        self.env_filter
            .as_deref()
            .unwrap_or_else(|| self.verbosity_to_filter())
    }

    /// Install the global subscriber
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = EnvFilter::try_new(self.filter_directives())?;

        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },

            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },

            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr);
                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "Extraction session started");
        }

        Ok(())
    }
}

/// Initialize tracing with CLI-friendly defaults
///
/// A non-empty `RUST_LOG` replaces the verbosity-derived filter.
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<String> {
    let session_id = uuid::Uuid::new_v4().to_string();

    let mut config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_session_id(session_id.clone());
    if let Ok(filter) = std::env::var("RUST_LOG") {
        if !filter.trim().is_empty() {
            config = config.with_env_filter(filter);
        }
    }

    config.init()?;
    Ok(session_id)
}

/// Span creation helpers for common operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span for the entire CLI invocation
    pub fn session(session_id: &str, backend: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "session",
            session_id = %session_id,
            backend = %backend
        )
    }

    pub fn file_processing(file_path: &std::path::Path, format: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "file_processing",
            file_path = %file_path.display(),
            format = %format
        )
    }

    /// Span for one label extraction
    pub fn extraction(label: u32, part: Option<&str>) -> Span {
        tracing::span!(
            Level::DEBUG,
            "extraction",
            label = %label,
            part = %part.unwrap_or("unknown")
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{debug, error, info, warn};

    /// Log a user-facing progress update
    pub fn progress(message: &str) {
        info!("{}", message);
    }

    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(error = %error, context = %context, "Operation failed");
    }

    pub fn warning_with_recommendation(message: &str, recommendation: &str) {
        warn!(
            message = %message,
            recommendation = %recommendation,
            "Warning"
        );
    }

    pub fn performance_metric(operation: &str, duration_ms: u64) {
        debug!(operation = %operation, duration_ms = %duration_ms, "Performance metric");
    }
}
