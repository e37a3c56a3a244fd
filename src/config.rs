//! Application configuration management.
//!
//! The engine takes a fully resolved [`Config`] and never reads from disk
//! itself. The binary builds one with [`Config::load`], layering sources
//! with figment:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `config.toml` in the platform config dir)
//! 3. `VIDUPE_*` environment variables (`__` separates nested keys)
//!
//! CLI flags are applied on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::{DeleteGuard, DeleteMode};
use crate::duplicates::KeyPolicy;
use crate::scanner::classifier::{DEFAULT_RESERVED_NAMES, DEFAULT_VIDEO_EXTENSIONS};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "VIDUPE_";

/// Default size of the hashing pool.
pub const DEFAULT_IO_THREADS: usize = 2;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// No platform config directory could be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// Serializing the configuration failed.
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Writing the configuration failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Static configuration consumed by the scan engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Roots scanned when a request names none.
    pub scan_paths: Vec<PathBuf>,
    /// Path prefixes never scanned, merged with per-request exclusions.
    pub exclude_paths: Vec<PathBuf>,
    /// Confirm name matches by hashing file contents.
    pub scan_by_content: bool,
    /// How grouping keys are derived from file names.
    pub key_policy: KeyPolicy,
    /// Workers in the hashing pool.
    pub io_threads: usize,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Recognized video extensions.
    pub video_extensions: Vec<String>,
    /// Directory names never descended into.
    pub reserved_names: Vec<String>,
    /// How files are deleted.
    pub delete_mode: DeleteMode,
    /// Which paths may be deleted.
    pub delete_guard: DeleteGuard,
    /// Default log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_paths: Vec::new(),
            exclude_paths: Vec::new(),
            scan_by_content: false,
            key_policy: KeyPolicy::default(),
            io_threads: DEFAULT_IO_THREADS,
            follow_symlinks: false,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            reserved_names: DEFAULT_RESERVED_NAMES.iter().map(|s| s.to_string()).collect(),
            delete_mode: DeleteMode::default(),
            delete_guard: DeleteGuard::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// With `path` the file must exist; without it the platform default
    /// file is used when present.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing or a source does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = &file {
            log::debug!("Loading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment.extract().map_err(Box::new)?;
        Ok(config.normalized())
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "vidupe", "vidupe").map(|d| d.config_dir().join("config.toml"))
    }

    /// Write the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails on serialization or I/O errors.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Configuration written to {}", path.display());
        Ok(())
    }

    /// TOML rendering of the configuration.
    ///
    /// # Errors
    ///
    /// Fails if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Configured log level, if it parses.
    #[must_use]
    pub fn log_level_filter(&self) -> Option<log::LevelFilter> {
        self.log_level.trim().parse().ok()
    }

    fn normalized(mut self) -> Self {
        self.io_threads = self.io_threads.max(1);
        self
    }
}
