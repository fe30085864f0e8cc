// src/cli/handlers/mod.rs

/// Helpers shared by several handlers.
pub mod commons;
/// `atexpand expand`
pub mod expand;
/// `atexpand init`
pub mod init;
/// `atexpand vars`
pub mod vars;
