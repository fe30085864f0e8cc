//! # atexpand
//!
//! A sigil-driven expansion engine. Text such as `echo @{user} on @(+hostname)@` is scanned
//! left to right and every `@`-form is replaced by a variable value, the output of a command,
//! the result of a Lua snippet or markup-escaped text. The entry point is
//! [`core::expander::Expander`].

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Shared flag checked by long-running collaborators before they start work.
pub type CancellationToken = Arc<AtomicBool>;

pub mod cli;
/// Syntax characters, defaults and file names.
pub mod constants;
/// The expansion engine and its in-process collaborators.
pub mod core;
/// Serde models of `config.toml`.
pub mod models;
pub mod system;
