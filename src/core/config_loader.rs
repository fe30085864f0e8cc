//! # Config Loader
//!
//! Reads `config.toml` into [`Settings`], the resolved runtime configuration. A missing file is
//! not an error: every key has a default, so a fresh install works without running `init`.

use crate::{
    CancellationToken,
    constants::{DEFAULT_MAX_DEPTH, DEFAULT_SCRIPT_MEMORY_LIMIT, DEFAULT_SHELL_CMD},
    core::{
        paths::{self, PathError},
        registry::Registry,
    },
    models::{ScriptOptions, SettingsFile, TomlVar},
    system::executor::SystemRunner,
};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors that can occur while reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A filesystem I/O error occurred.
    #[error("Could not access config file '{path}': {source}")]
    Io {
        /// The file that was being accessed.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the expected schema.
    #[error("Invalid config file '{path}': {source}")]
    TomlParse {
        /// The file that failed to parse.
        path: String,
        /// The parser error, including the offending key.
        #[source]
        source: toml::de::Error,
    },
    /// An error occurred while serializing the settings to TOML.
    #[error("Failed to serialize to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// The config directory or a configured path could not be resolved.
    #[error("Path error: {0}")]
    Path(#[from] PathError),
}

/// Fully resolved settings with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Shell interpreter prefix for `@(...)@`.
    pub shell_cmd: String,
    /// Maximum nesting depth of expansion forms.
    pub max_depth: usize,
    /// Working directory of spawned commands, already expanded.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for spawned commands.
    pub env: HashMap<String, String>,
    /// Lua memory cap in bytes, `0` for none.
    pub script_memory_limit: usize,
    /// Seed values for the variable registry.
    pub vars: BTreeMap<String, TomlVar>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shell_cmd: DEFAULT_SHELL_CMD.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            cwd: None,
            env: HashMap::new(),
            script_memory_limit: DEFAULT_SCRIPT_MEMORY_LIMIT,
            vars: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Applies defaults to a parsed settings file and expands its paths.
    pub fn from_file(file: SettingsFile) -> Result<Self, ConfigError> {
        let cwd = file
            .cwd
            .as_deref()
            .map(paths::expand_path_template)
            .transpose()?;

        Ok(Self {
            shell_cmd: file
                .shell_cmd
                .unwrap_or_else(|| DEFAULT_SHELL_CMD.to_string()),
            max_depth: file.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            cwd,
            env: file.env.into_iter().collect(),
            script_memory_limit: file
                .script
                .memory_limit
                .unwrap_or(DEFAULT_SCRIPT_MEMORY_LIMIT),
            vars: file.vars,
        })
    }

    /// Builds a process runner configured with these settings.
    pub fn system_runner(&self, cancellation_token: CancellationToken) -> SystemRunner {
        SystemRunner::new(self.shell_cmd.clone(), cancellation_token)
            .with_cwd(self.cwd.clone())
            .with_env(self.env.clone())
    }

    /// Builds a registry seeded from `[vars]`.
    pub fn registry(&self) -> Registry {
        Registry::from_toml_vars(&self.vars)
    }
}

/// Resolves which config file to use: the explicit one, or the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(paths::get_config_file_path()?),
    }
}

/// Loads settings from `explicit` or the default config file. A missing file yields defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = resolve_config_path(explicit)?;
    log::debug!("Loading settings from '{}'", path.display());

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No config file at '{}'; using defaults.", path.display());
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    parse_settings(&content, &path)
}

/// Parses the contents of a config file. `origin` is only used in error messages.
pub fn parse_settings(content: &str, origin: &Path) -> Result<Settings, ConfigError> {
    let file: SettingsFile = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: origin.display().to_string(),
        source: e,
    })?;
    Settings::from_file(file)
}

/// The settings file written by `init`: every scalar key spelled out with its default.
pub fn default_settings_file() -> SettingsFile {
    let mut vars = BTreeMap::new();
    vars.insert("greeting".to_string(), TomlVar::Text("hello".to_string()));

    SettingsFile {
        shell_cmd: Some(DEFAULT_SHELL_CMD.to_string()),
        max_depth: Some(DEFAULT_MAX_DEPTH),
        cwd: None,
        env: BTreeMap::new(),
        script: ScriptOptions {
            memory_limit: Some(DEFAULT_SCRIPT_MEMORY_LIMIT),
        },
        vars,
    }
}

/// Writes `settings` to `path` as pretty TOML, creating parent directories as needed.
pub fn write_settings(path: &Path, settings: &SettingsFile) -> Result<(), ConfigError> {
    let toml_string = toml::to_string_pretty(settings)?;
    let io_err = |e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, toml_string).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::VarRegistry;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.shell_cmd, DEFAULT_SHELL_CMD);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = parse_settings("max_depth = 3\n", Path::new("test.toml")).unwrap();
        assert_eq!(settings.max_depth, 3);
        assert_eq!(settings.shell_cmd, DEFAULT_SHELL_CMD);
        assert_eq!(settings.script_memory_limit, DEFAULT_SCRIPT_MEMORY_LIMIT);
        assert!(settings.cwd.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "shell_cmd = \"bash -c\"\ncwd = \"/tmp\"\n[env]\nMODE = \"test\"\n[vars]\nname = \"world\"\n",
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.shell_cmd, "bash -c");
        assert_eq!(settings.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(settings.env.get("MODE").map(String::as_str), Some("test"));

        let registry = settings.registry();
        assert_eq!(registry.lookup("name").map(|v| v.render()), Some("world".to_string()));

        let runner = settings.system_runner(Default::default());
        assert_eq!(runner.shell_cmd(), "bash -c");
    }

    #[test]
    fn test_invalid_file_names_the_path() {
        let err = parse_settings("max_depth = \"deep\"", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_unsupported_var_type_names_the_variable() {
        let err = parse_settings("[vars]\nenabled = true\n", Path::new("c.toml")).unwrap_err();
        assert!(err.to_string().contains("enabled"), "Error message was: {}", err);
    }

    #[test]
    fn test_write_then_load_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        write_settings(&path, &default_settings_file()).unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.shell_cmd, DEFAULT_SHELL_CMD);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(
            settings.vars.get("greeting"),
            Some(&TomlVar::Text("hello".to_string()))
        );
    }
}
