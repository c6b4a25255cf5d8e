//! Configuration management for projdoc.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::report::{layout::DEFAULT_PLACEHOLDER, PageSetup, ReportCompiler};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "projdoc";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "documentation.db";

/// Smallest printable extent, in points, accepted for either page axis.
const MIN_PRINTABLE: f32 = 72.0;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PROJDOC_`, sections split on `__`)
/// 2. TOML config file at `~/.config/projdoc/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Report configuration.
    pub report: ReportConfig,
}

/// Which record store backs the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable `SQLite` database.
    #[default]
    Sqlite,
    /// Process-local store; nothing is kept between runs.
    Memory,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Record store backend.
    pub backend: StorageBackend,
    /// Path to the database file.
    /// Defaults to `~/.local/share/projdoc/documentation.db`
    pub database_path: Option<PathBuf>,
}

/// Report-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Text printed in place of an unanswered field.
    pub placeholder: String,
    /// Directory reports are written to. Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Margin on every edge in points.
    pub margin: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let page = PageSetup::default();
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            output_dir: None,
            page_width: page.width,
            page_height: page.height,
            margin: page.margin,
        }
    }
}

impl ReportConfig {
    /// Page geometry for the renderer.
    #[must_use]
    pub fn page_setup(&self) -> PageSetup {
        PageSetup {
            width: self.page_width,
            height: self.page_height,
            margin: self.margin,
        }
    }

    /// Build a report compiler from these settings.
    #[must_use]
    pub fn compiler(&self) -> ReportCompiler {
        ReportCompiler::new(self.placeholder.clone(), self.page_setup())
    }

    /// Directory reports are written to.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PROJDOC_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let report = &self.report;

        if report.placeholder.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "report.placeholder must not be empty".to_string(),
            });
        }

        for (key, value) in [
            ("page_width", report.page_width),
            ("page_height", report.page_height),
            ("margin", report.margin),
        ] {
            if !value.is_finite() {
                return Err(Error::ConfigValidation {
                    message: format!("report.{key} ({value}) must be a finite number"),
                });
            }
        }

        if report.margin < 0.0 {
            return Err(Error::ConfigValidation {
                message: format!("report.margin ({}) cannot be negative", report.margin),
            });
        }

        let printable_width = report.page_width - 2.0 * report.margin;
        let printable_height = report.page_height - 2.0 * report.margin;
        if printable_width < MIN_PRINTABLE || printable_height < MIN_PRINTABLE {
            return Err(Error::ConfigValidation {
                message: format!(
                    "page {}x{} with margin {} leaves no printable area",
                    report.page_width, report.page_height, report.margin
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
