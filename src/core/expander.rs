// src/core/expander.rs

use crate::{
    constants::{DEFAULT_MAX_DEPTH, DIRECT_MARKER, ESCAPE_CHAR, SIGIL},
    core::{
        dispatcher::{self, ExpandError, Form, Token},
        escape::{Escaper, MarkupEscaper},
        registry::{self, VarRegistry},
    },
    system::{executor::CommandRunner, script::ScriptEngine},
};
use std::{fmt, path::Path};

static MARKUP_ESCAPER: MarkupEscaper = MarkupEscaper;

/// Expands `@`-forms in text.
///
/// The expander borrows its collaborators and never mutates them, so one registry can serve
/// any number of expanders.
///
/// | Form | Result |
/// |---|---|
/// | `@{name}`, `@name` | the variable's value |
/// | `@(cmd)@` | stdout of `cmd` run through the shell (`@(+prog args)@` skips the shell) |
/// | `@<code>@` | the script engine's result (`@<+file>@` evaluates a file) |
/// | `@[text]@` | `text`, markup-escaped |
/// | `\c` | `c`, literally |
pub struct Expander<'a> {
    registry: &'a dyn VarRegistry,
    runner: &'a dyn CommandRunner,
    scripts: &'a dyn ScriptEngine,
    escaper: &'a dyn Escaper,
    max_depth: usize,
}

impl<'a> Expander<'a> {
    /// Creates an expander with the markup escaper and the default depth limit.
    pub fn new(
        registry: &'a dyn VarRegistry,
        runner: &'a dyn CommandRunner,
        scripts: &'a dyn ScriptEngine,
    ) -> Self {
        Self {
            registry,
            runner,
            scripts,
            escaper: &MARKUP_ESCAPER,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replaces the escaper used by `@[...]@`.
    pub fn with_escaper(mut self, escaper: &'a dyn Escaper) -> Self {
        self.escaper = escaper;
        self
    }

    /// Sets how deeply forms may nest inside each other.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The configured nesting limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Expands `input`. Malformed input yields `""` for the whole call.
    pub fn expand(&self, input: &str) -> String {
        match self.try_expand(input) {
            Ok(expanded) => expanded,
            Err(e) => {
                log::warn!("Expansion aborted, substituting an empty string: {}", e);
                String::new()
            }
        }
    }

    /// Expands `input`, reporting why malformed input could not be expanded.
    pub fn try_expand(&self, input: &str) -> Result<String, ExpandError> {
        self.expand_at(input, 0)
    }

    fn expand_at(&self, input: &str, depth: usize) -> Result<String, ExpandError> {
        if depth > self.max_depth {
            return Err(ExpandError::DepthExceeded(self.max_depth));
        }

        let mut output = String::with_capacity(input.len());
        let mut cursor = 0;

        while let Some(ch) = next_char(input, cursor) {
            cursor += ch.len_utf8();
            match ch {
                ESCAPE_CHAR => {
                    // A trailing lone escape character is dropped.
                    if let Some(escaped) = next_char(input, cursor) {
                        output.push(escaped);
                        cursor += escaped.len_utf8();
                    }
                }
                SIGIL => {
                    let extraction = dispatcher::classify_and_extract(input, cursor)?;
                    cursor = extraction.next;
                    output.push_str(&self.resolve(extraction.token, depth)?);
                }
                _ => output.push(ch),
            }
        }

        Ok(output)
    }

    /// Expands the inner text of a form. Malformed inner text resolves to `""` so the handler
    /// still receives a string; only an exceeded depth limit travels further up.
    fn expand_nested(&self, raw: &str, depth: usize) -> Result<String, ExpandError> {
        match self.expand_at(raw, depth + 1) {
            Err(ExpandError::Unterminated { form, offset, .. }) => {
                log::debug!(
                    "Nested text '{}' has an unterminated {} form at byte {}; using an empty string.",
                    raw,
                    form,
                    offset
                );
                Ok(String::new())
            }
            other => other,
        }
    }

    fn resolve(&self, token: Token<'_>, depth: usize) -> Result<String, ExpandError> {
        log::trace!("Resolving {} form: '{}'", token.form, token.raw);
        match token.form {
            Form::Variable | Form::Bareword => Ok(registry::resolve_var(self.registry, token.raw)),
            Form::Command => self.resolve_cmd(token.raw, depth),
            Form::Script => self.resolve_script(token.raw, depth),
            Form::Escape => self.resolve_esc(token.raw, depth),
        }
    }

    fn resolve_cmd(&self, raw: &str, depth: usize) -> Result<String, ExpandError> {
        let command_line = self.expand_nested(raw, depth)?;

        let (direct, line) = match command_line.strip_prefix(DIRECT_MARKER) {
            Some(rest) => (true, rest),
            None => (false, command_line.as_str()),
        };
        if line.trim().is_empty() {
            log::debug!("Command form expanded to an empty command line; nothing to run.");
            return Ok(String::new());
        }

        let result = if direct {
            self.runner.run_direct(line)
        } else {
            self.runner.run_shell(line)
        };

        match result {
            Ok(mut stdout) => {
                if stdout.ends_with('\n') {
                    stdout.pop();
                }
                Ok(stdout)
            }
            Err(e) => {
                log::error!("error running command: {}", e);
                Ok(String::new())
            }
        }
    }

    fn resolve_script(&self, raw: &str, depth: usize) -> Result<String, ExpandError> {
        let source = self.expand_nested(raw, depth)?;

        let result = match source.strip_prefix(DIRECT_MARKER) {
            Some(path) => self.scripts.eval_file(Path::new(path)),
            None => self.scripts.eval_inline(&source),
        };

        match result {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(e) => {
                log::warn!("Script evaluation failed: {}", e);
                Ok(String::new())
            }
        }
    }

    fn resolve_esc(&self, raw: &str, depth: usize) -> Result<String, ExpandError> {
        let text = self.expand_nested(raw, depth)?;
        Ok(self.escaper.escape(&text))
    }
}

impl fmt::Debug for Expander<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expander")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

fn next_char(input: &str, cursor: usize) -> Option<char> {
    input.get(cursor..).and_then(|rest| rest.chars().next())
}
