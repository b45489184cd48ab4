//! Optional user defaults, read from a small TOML file.
//!
//! Lookup order:
//! 1. `FILETAGS_CONFIG` environment variable, when set.
//! 2. `~/.config/filetags/config.toml`.
//!
//! A missing file yields [`Defaults::default`]. Command-line flags always win
//! over values from the file.

use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FILETAGS_CONFIG";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Act on symlink targets and descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Treat search patterns as literal text.
    pub literal: bool,
    /// Print bare path names for search results.
    pub names_only: bool,
    /// Force colour on or off. Unset means "only on a terminal".
    pub color: Option<bool>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
}

impl ConfigError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config from {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => match path {
                Some(path) => write!(
                    f,
                    "failed to parse config TOML ({}): {}",
                    path.display(),
                    source
                ),
                None => write!(f, "failed to parse config TOML: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<Defaults, ConfigError> {
    toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { path: None, source })
}

/// Load defaults from `path`. A nonexistent file is not an error.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Defaults, ConfigError> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Defaults::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    load_from_str(&contents).map_err(|error| error.with_path(path))
}

/// Path of the defaults file, if one can be determined.
pub fn default_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    home::home_dir().map(|home| home.join(".config/filetags/config.toml"))
}

/// Load the user's defaults from [`default_path`].
pub fn load() -> Result<Defaults, ConfigError> {
    match default_path() {
        Some(path) => load_from_path(path),
        None => Ok(Defaults::default()),
    }
}
