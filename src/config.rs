//! Logging configuration
//!
//! Values come from the `log` table of the host application's TOML config.
//! Dotted keys (`log.file.maxSize = 5`) and nested tables are equivalent, and
//! everything outside `log` is ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{Level, RotationPolicy};

/// Extension every log file name ends with
pub const LOG_EXTENSION: &str = ".log";

/// Host configuration document, of which only `log` is read
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }
}

/// The `log.*` keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Directory holding the log file; empty means the working directory
    #[serde(default)]
    pub folder: String,

    /// Minimum level name (case-insensitive, unknown names mean "info")
    #[serde(default = "default_level")]
    pub level: String,

    /// Attach the caller's file and line to every record
    #[serde(default = "default_true")]
    pub caller: bool,

    /// File sink settings
    #[serde(default)]
    pub file: FileConfig,
}

/// The `log.file.*` keys
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// Write to a rotating file besides the console
    #[serde(default = "default_true")]
    pub enable: bool,

    /// File name, `.log` is appended when missing
    #[serde(default = "default_file_name")]
    pub name: String,

    /// Size in megabytes before the file is rotated
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Number of rotated files to keep
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Days to keep rotated files
    #[serde(default = "default_max_age")]
    pub max_age: u64,

    /// Gzip rotated files
    #[serde(default = "default_true")]
    pub compress: bool,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_name() -> String {
    "application.log".to_string()
}

fn default_max_size() -> u64 {
    10 // MB
}

fn default_max_backups() -> usize {
    3
}

fn default_max_age() -> u64 {
    28 // days
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            folder: String::new(),
            level: default_level(),
            caller: default_true(),
            file: FileConfig::default(),
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enable: default_true(),
            name: default_file_name(),
            max_size: default_max_size(),
            max_backups: default_max_backups(),
            max_age: default_max_age(),
            compress: default_true(),
        }
    }
}

impl LogConfig {
    /// Resolved minimum level
    pub fn min_level(&self) -> Level {
        Level::from_config(&self.level)
    }

    /// Log folder with `~` and environment variables expanded
    pub fn folder_path(&self) -> PathBuf {
        if self.folder.trim().is_empty() {
            return PathBuf::from(".");
        }
        let expanded = shellexpand::full(&self.folder)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| shellexpand::tilde(&self.folder).into_owned());
        PathBuf::from(expanded)
    }

    /// Effective file name, always ending in `.log`
    pub fn file_name(&self) -> String {
        if self.file.name.trim().is_empty() {
            return default_file_name();
        }
        with_log_extension(&self.file.name)
    }

    /// Full path of the active log file
    pub fn file_path(&self) -> PathBuf {
        self.folder_path().join(self.file_name())
    }

    /// Rotation parameters for the file sink
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::from_megabytes(
            self.file.max_size,
            self.file.max_backups,
            self.file.max_age,
            self.file.compress,
        )
    }
}

/// Append `.log` unless the name already ends with it
pub fn with_log_extension(name: &str) -> String {
    if name.ends_with(LOG_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, LOG_EXTENSION)
    }
}
