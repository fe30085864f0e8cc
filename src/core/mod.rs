// src/core/mod.rs

pub mod config_loader;
pub mod dispatcher;
/// Markup escaping and literal quoting.
pub mod escape;
/// The scan loop and the per-form handlers.
pub mod expander;
pub mod paths;
pub mod registry;
