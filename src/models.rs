// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- `config.toml` MODELS (What is read from the configuration file) ---

/// Represents the deserialized structure of a `config.toml` file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Shell interpreter prefix, e.g. `"/bin/sh -c"` or `"bash -c"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_cmd: Option<String>,
    /// Maximum nesting depth of expansion forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// Working directory for spawned commands. `~` and environment variables are expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Extra environment variables for spawned commands.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Options for the scripting engine.
    #[serde(default)]
    pub script: ScriptOptions,
    /// Initial contents of the variable registry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, TomlVar>,
}

/// The `[script]` table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScriptOptions {
    /// Memory cap for the Lua state in bytes. `0` disables the cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<usize>,
}

/// A variable value as written in `[vars]`. Uses `untagged` so plain TOML scalars map onto
/// the registry kinds; any other TOML type fails to deserialize.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TomlVar {
    /// `count = 42`
    Integer(i64),
    /// `ratio = 0.5`
    Float(f64),
    /// `name = "world"`
    Text(String),
}
