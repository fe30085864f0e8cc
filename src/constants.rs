// src/constants.rs

/// The character that introduces an expansion form.
pub const SIGIL: char = '@';

/// The character that makes the next character literal.
pub const ESCAPE_CHAR: char = '\\';

/// Prefix that selects the direct (shell-less) command path and the script-file path.
pub const DIRECT_MARKER: char = '+';

/// Characters that end a bareword variable reference, in addition to whitespace.
pub const BAREWORD_TERMINATORS: &[char] = &[
    '^', '°', '!', '"', '§', '$', '%', '&', '/', '(', ')', '=', '?', '\'', '`', '+', '~', '*', '#',
    '-', '.', ':', ',', ';', '@', '<', '>', '|', '\\', '{', '}', '[', ']', '¹', '²', '³', '¼', '½',
];

/// Default limit on nested expansion forms.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Shell interpreter prefix used when none is configured.
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_SHELL_CMD: &str = "/bin/sh -c";
/// Shell interpreter prefix used when none is configured.
#[cfg(target_os = "windows")]
pub const DEFAULT_SHELL_CMD: &str = "cmd /C";

/// Name under which inline script chunks are reported.
pub const INLINE_CHUNK_NAME: &str = "(command)";

/// Default memory cap for the Lua state, in bytes.
pub const DEFAULT_SCRIPT_MEMORY_LIMIT: usize = 10 * 1024 * 1024;

/// The name of the directory holding atexpand configuration (inside the system config dir).
pub const CONFIG_DIR_NAME: &str = "atexpand";

/// The name of the configuration file.
pub const CONFIG_FILENAME: &str = "config.toml";
