//! Logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;

/// Default filter when nothing else is configured.
pub const DEFAULT_FILTER: &str = "warn";

/// Filter applied by `--verbose`.
pub const VERBOSE_FILTER: &str = "warn,rolegate=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name. Unknown names fall back to [`LogFormat::Pretty`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings.
    ///
    /// Filter precedence: `--verbose`, then the configured filter (which
    /// already carries `ROLEGATE_LOG`), then `RUST_LOG`, then [`DEFAULT_FILTER`].
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::resolve(settings, verbose, std::env::var("RUST_LOG").ok())
    }

    fn resolve(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        rust_log: Option<String>,
    ) -> Self {
        let format = settings
            .and_then(|s| s.format.as_deref())
            .map_or_else(LogFormat::default, LogFormat::parse);
        let file = settings.and_then(|s| s.file.clone());

        let filter = if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            settings
                .and_then(|s| s.filter.clone())
                .or(rust_log)
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string())
        };

        Self {
            format,
            filter,
            file,
        }
    }
}
