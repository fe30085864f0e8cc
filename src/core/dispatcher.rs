//! # Dispatcher
//!
//! Classifies the expansion form that follows a sigil and extracts its raw, unexpanded inner
//! text. Closing markers are found textually: the first occurrence wins and same-class forms
//! are never balanced, so `@(echo )@ )@` ends at the first `)@`.

use crate::constants::BAREWORD_TERMINATORS;
use std::fmt;
use thiserror::Error;

/// The five syntactic shapes recognised after a sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `@{name}`
    Variable,
    /// `@name`, ended by the first terminator character.
    Bareword,
    /// `@(command)@`
    Command,
    /// `@<script>@`
    Script,
    /// `@[text]@`
    Escape,
}

const VARIABLE_CLOSE: &str = "}";
const COMMAND_CLOSE: &str = ")@";
const SCRIPT_CLOSE: &str = ">@";
const ESCAPE_CLOSE: &str = "]@";

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Variable => "variable",
            Self::Bareword => "bareword",
            Self::Command => "command",
            Self::Script => "script",
            Self::Escape => "escape",
        };
        f.write_str(name)
    }
}

/// Why an input could not be expanded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// A delimited form has no closing marker.
    #[error("Unterminated {form} form starting at byte {offset}: expected '{closing}'.")]
    Unterminated {
        /// The form that was opened.
        form: Form,
        /// Byte offset of the opening character in the scanned text.
        offset: usize,
        /// The closing marker that was never found.
        closing: &'static str,
    },
    /// Forms are nested deeper than the configured limit.
    #[error("Maximum expansion depth ({0}) exceeded.")]
    DepthExceeded(usize),
}

/// A form tag plus the raw text strictly between its delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Which handler the text belongs to.
    pub form: Form,
    /// The inner text, not yet expanded.
    pub raw: &'a str,
}

/// The token found at a cursor and the cursor position right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction<'a> {
    /// The extracted token.
    pub token: Token<'a>,
    /// Byte offset where scanning resumes.
    pub next: usize,
}

/// Classifies the form starting at `cursor` (just past the sigil) and locates its end.
///
/// `cursor` must lie on a char boundary of `input`; a cursor at the end of input yields an
/// empty bareword.
pub fn classify_and_extract(input: &str, cursor: usize) -> Result<Extraction<'_>, ExpandError> {
    let rest = input.get(cursor..).unwrap_or("");
    let form = match rest.chars().next() {
        Some('{') => Form::Variable,
        Some('(') => Form::Command,
        Some('<') => Form::Script,
        Some('[') => Form::Escape,
        _ => Form::Bareword,
    };

    match form {
        Form::Bareword => {
            let len = rest.find(is_bareword_terminator).unwrap_or(rest.len());
            Ok(Extraction {
                token: Token {
                    form,
                    raw: rest.get(..len).unwrap_or(""),
                },
                next: cursor + len,
            })
        }
        Form::Variable => extract_delimited(input, cursor, form, VARIABLE_CLOSE),
        Form::Command => extract_delimited(input, cursor, form, COMMAND_CLOSE),
        Form::Script => extract_delimited(input, cursor, form, SCRIPT_CLOSE),
        Form::Escape => extract_delimited(input, cursor, form, ESCAPE_CLOSE),
    }
}

/// Returns `true` for characters that end a bareword reference.
pub fn is_bareword_terminator(c: char) -> bool {
    c.is_whitespace() || BAREWORD_TERMINATORS.contains(&c)
}

fn extract_delimited<'a>(
    input: &'a str,
    cursor: usize,
    form: Form,
    closing: &'static str,
) -> Result<Extraction<'a>, ExpandError> {
    // Every opening character is a single byte.
    let inner_start = cursor + 1;
    let inner = input.get(inner_start..).unwrap_or("");

    match inner.find(closing) {
        Some(len) => Ok(Extraction {
            token: Token {
                form,
                raw: inner.get(..len).unwrap_or(""),
            },
            next: inner_start + len + closing.len(),
        }),
        None => Err(ExpandError::Unterminated {
            form,
            offset: cursor,
            closing,
        }),
    }
}
