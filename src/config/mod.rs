//! Configuration management.
//!
//! Precedence, lowest to highest: built-in defaults, `config.toml`,
//! environment variables.
//!
//! | Key | Default | Env |
//! |-----|---------|-----|
//! | `database_path` | `<data dir>/rolegate/rolegate.db` | `ROLEGATE_DATABASE` |
//! | `seed_on_open` | `true` | |
//! | `logging.format` | `pretty` | `ROLEGATE_LOG_FORMAT` |
//! | `logging.file` | none | `ROLEGATE_LOG_FILE` |
//! | `logging.filter` | `warn` | `ROLEGATE_LOG` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config and data dirs.
const APP_DIR: &str = "rolegate";

/// Main configuration for rolegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolegateConfig {
    /// `SQLite` database file.
    pub database_path: PathBuf,
    /// Seed the permission catalog and system roles when the store opens.
    pub seed_on_open: bool,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging section. Unset fields fall back to the logging defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Append logs to this file instead of stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive, for example `rolegate=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Database path.
    pub database_path: Option<String>,
    /// Seed on open.
    pub seed_on_open: Option<bool>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

impl Default for RolegateConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_on_open: true,
            logging: LoggingSettings::default(),
        }
    }
}

impl RolegateConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::operation("read_config_file", e))?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| crate::Error::operation("parse_config_file", e))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/rolegate/` on macOS)
    /// 2. XDG config dir (`~/.config/rolegate/` for Unix compatibility)
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        default_config_paths()
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| match Self::load_from_file(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring unreadable config file"
                    );
                    None
                },
            })
            .unwrap_or_default()
    }

    /// Applies `ROLEGATE_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` (an environment-like key lookup).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup("ROLEGATE_DATABASE") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(format) = lookup("ROLEGATE_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = lookup("ROLEGATE_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
        if let Some(filter) = lookup("ROLEGATE_LOG") {
            self.logging.filter = Some(filter);
        }
        self
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Renders the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::operation("render_config", e))
    }

    /// Converts a `ConfigFile` to `RolegateConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(path) = file.database_path {
            config.database_path = PathBuf::from(path);
        }
        if let Some(seed) = file.seed_on_open {
            config.seed_on_open = seed;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }
}

/// Candidate config file locations, most specific first.
fn default_config_paths() -> Vec<PathBuf> {
    let Some(base_dirs) = directories::BaseDirs::new() else {
        return Vec::new();
    };
    let platform = base_dirs.config_dir().join(APP_DIR).join("config.toml");
    let xdg = base_dirs
        .home_dir()
        .join(".config")
        .join(APP_DIR)
        .join("config.toml");

    if platform == xdg {
        vec![platform]
    } else {
        vec![platform, xdg]
    }
}

/// `<platform data dir>/rolegate/rolegate.db`, or `rolegate.db` in the
/// working directory when no home directory is available.
fn default_database_path() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("rolegate.db"),
        |dirs| dirs.data_dir().join(APP_DIR).join("rolegate.db"),
    )
}
