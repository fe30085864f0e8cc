// src/cli/handlers/commons.rs

use anyhow::{Context, Result, anyhow};
use std::{collections::HashMap, path::Path};

use crate::core::{
    config_loader::{self, Settings},
    registry::Registry,
};

/// Loads the settings for a handler, from `config` or the default location.
pub fn load_settings(config: Option<&Path>) -> Result<Settings> {
    config_loader::load_settings(config).context("Could not load the atexpand configuration")
}

/// Builds the registry from the config `[vars]`, then applies `--var KEY=VALUE` overrides as
/// strings.
pub fn build_registry(settings: &Settings, overrides: &[String]) -> Result<Registry> {
    let mut registry = settings.registry();
    for (key, value) in parse_key_value_pairs(overrides)? {
        registry.set_str(key, value);
    }
    Ok(registry)
}

/// Parses `KEY=VALUE` pairs. Keys and values are trimmed; the first `=` separates them.
pub fn parse_key_value_pairs(pairs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((key, _)) if key.trim().is_empty() => {
                return Err(anyhow!("Empty key in key-value pair: '{}'.", pair));
            }
            Some((key, value)) => {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                return Err(anyhow!(
                    "Invalid format for key-value pair: '{}'. Expected 'KEY=VALUE'.",
                    pair
                ));
            }
        }
    }
    Ok(map)
}
