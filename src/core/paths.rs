//! Locations of atexpand files on disk.

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME};
use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref ATEXPAND_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Errors raised while locating the config directory or expanding configured paths.
#[derive(Error, Debug)]
pub enum PathError {
    /// The platform reports no config directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// The config directory does not exist and could not be created.
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        /// The directory that was being created.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A `~` or `$VAR` reference in a path could not be resolved.
    #[error("Could not expand path '{template}': {message}")]
    Expansion {
        /// The path as written in the configuration.
        template: String,
        /// What failed to resolve.
        message: String,
    },
}

/// Returns the path to the atexpand configuration directory (`~/.config/atexpand`).
/// Creates it if it doesn't exist.
///
/// This function is memoized: the first call computes and caches the path,
/// subsequent calls return the cached value.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = ATEXPAND_CONFIG_DIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(CONFIG_DIR_NAME);

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the default `config.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a path template and strips
/// Windows verbatim prefixes from the result.
pub fn expand_path_template(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        message: e.to_string(),
    })?;
    Ok(dunce::simplified(&PathBuf::from(expanded.into_owned())).to_path_buf())
}
