//! # Variable Registry
//!
//! Typed variables consulted by `@{name}` and `@name`. The registry is owned by the caller and
//! handed to the [`Expander`](crate::core::expander::Expander) by reference; the engine only
//! ever reads from it.

use crate::models::TomlVar;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, RwLock},
};

/// A string owned outside the registry. `None` means the owner has not set it yet.
pub type SharedStr = Arc<RwLock<Option<String>>>;

/// The value stored for one variable name.
#[derive(Debug, Clone)]
pub enum VarValue {
    /// A shared, possibly unset string.
    Str(SharedStr),
    /// A copied integer.
    Int(i64),
    /// A copied float.
    Float(f64),
}

/// The kind of a [`VarValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// See [`VarValue::Str`].
    Str,
    /// See [`VarValue::Int`].
    Int,
    /// See [`VarValue::Float`].
    Float,
}

impl VarValue {
    /// Renders the value as substitution text. An unset string renders as `""`.
    pub fn render(&self) -> String {
        match self {
            Self::Str(shared) => shared
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
                .unwrap_or_default(),
            Self::Int(i) => i.to_string(),
            // Shortest representation that parses back to the same f64.
            Self::Float(f) => f.to_string(),
        }
    }

    /// Returns `true` for a string entry whose shared value is unset.
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Str(shared) => shared
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .is_none(),
            _ => false,
        }
    }

    /// The kind tag of this value.
    pub fn kind(&self) -> VarKind {
        match self {
            Self::Str(_) => VarKind::Str,
            Self::Int(_) => VarKind::Int,
            Self::Float(_) => VarKind::Float,
        }
    }
}

/// Read-only lookup of variables by name.
pub trait VarRegistry {
    /// Returns the entry for `name`, or `None` when no such variable exists.
    fn lookup(&self, name: &str) -> Option<VarValue>;
}

/// An in-memory [`VarRegistry`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    vars: HashMap<String, VarValue>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the `[vars]` table of a configuration file.
    pub fn from_toml_vars(vars: &BTreeMap<String, TomlVar>) -> Self {
        let mut registry = Self::new();
        for (name, value) in vars {
            match value {
                TomlVar::Integer(i) => registry.set_int(name, *i),
                TomlVar::Float(f) => registry.set_float(name, *f),
                TomlVar::Text(s) => {
                    registry.set_str(name, s.clone());
                }
            }
        }
        registry
    }

    /// Stores `value` in a new shared string and returns the handle so the caller can
    /// keep updating it.
    pub fn set_str(&mut self, name: impl Into<String>, value: impl Into<String>) -> SharedStr {
        let shared: SharedStr = Arc::new(RwLock::new(Some(value.into())));
        self.bind_str(name, Arc::clone(&shared));
        shared
    }

    /// Binds `name` to a string owned elsewhere.
    pub fn bind_str(&mut self, name: impl Into<String>, shared: SharedStr) {
        self.vars.insert(name.into(), VarValue::Str(shared));
    }

    /// Stores an integer.
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.vars.insert(name.into(), VarValue::Int(value));
    }

    /// Stores a float.
    pub fn set_float(&mut self, name: impl Into<String>, value: f64) {
        self.vars.insert(name.into(), VarValue::Float(value));
    }

    /// Removes a variable, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<VarValue> {
        self.vars.remove(name)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` when no variables are registered.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All entries sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &VarValue)> {
        let mut entries: Vec<(&str, &VarValue)> =
            self.vars.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl VarRegistry for Registry {
    fn lookup(&self, name: &str) -> Option<VarValue> {
        self.vars.get(name).cloned()
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
        };
        f.write_str(label)
    }
}

/// Resolves a variable name to its substitution text. Unknown names resolve to `""`.
pub fn resolve_var(registry: &dyn VarRegistry, name: &str) -> String {
    match registry.lookup(name) {
        Some(value) => value.render(),
        None => {
            log::trace!("Variable '{}' is not registered.", name);
            String::new()
        }
    }
}
