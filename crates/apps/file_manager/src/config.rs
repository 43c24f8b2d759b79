//! Typed configuration for the file manager binary.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use appdata_native::{default_app_data_root, APP_DIR_NAME};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "APPDATA_FILES_CONFIG";
/// Config file name inside `<config dir>/appdata_files/`.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Filter used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
/// Failures while locating or loading configuration.
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// The config file is not valid TOML for the expected shape.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser error text.
        message: String,
    },
    /// No `root_dir` is configured and the platform has no data directory.
    #[error("no app-data root configured and no platform data directory available")]
    NoDataDir,
}

/// TOML-backed config loader for one file.
///
/// The loader only reads and deserializes; callers validate the typed value.
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned + Default,
{
    /// Create a loader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the file.
    pub fn load(&self) -> Result<T, ConfigError> {
        let body = fs::read_to_string(&self.path).map_err(|err| ConfigError::Read {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        toml::from_str(&body).map_err(|err| ConfigError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    /// Like [`Self::load`], but a missing file yields `T::default()`.
    pub fn load_or_default(&self) -> Result<T, ConfigError> {
        match fs::metadata(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(T::default())
            }
            _ => self.load(),
        }
    }

    /// Config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Settings read from `config.toml`.
pub struct FileManagerConfig {
    /// Native directory used as the app-data root instead of the platform default.
    pub root_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl FileManagerConfig {
    /// Native app-data root: the configured `root_dir`, else the platform default.
    pub fn resolve_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.root_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_app_data_root().ok_or(ConfigError::NoDataDir),
        }
    }
}

/// Config path from the environment override, else `<config dir>/appdata_files/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(std::env::var_os(CONFIG_PATH_ENV), dirs::config_dir())
}

fn config_path_from(env_override: Option<OsString>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    match env_override {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => config_dir.map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)),
    }
}
