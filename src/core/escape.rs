// src/core/escape.rs

use crate::constants::{ESCAPE_CHAR, SIGIL};

/// Turns arbitrary text into text that is safe inside markup.
pub trait Escaper {
    /// Returns the escaped form of `text`.
    fn escape(&self, text: &str) -> String;
}

/// Escapes the five markup-significant characters and stray control characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupEscaper;

impl Escaper for MarkupEscaper {
    fn escape(&self, text: &str) -> String {
        escape_markup(text)
    }
}

/// Escapes `&`, `<`, `>`, `'` and `"` as entities. Control characters that markup cannot carry
/// literally (everything in C0 except tab, newline and carriage return, plus DEL and C1 except
/// NEL) become `&#x..;` references.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c if needs_char_reference(c) => out.push_str(&format!("&#x{:x};", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// Wraps untrusted text so that expanding it yields the text itself, markup-escaped.
///
/// Every `\` and `@` gets an escape character in front, then the result is wrapped in
/// `@[...]@`. An escaped `]\@` never matches the `]@` closing marker. Empty text stays empty.
pub fn quote_literal(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len() + 4);
    out.push(SIGIL);
    out.push('[');
    for ch in text.chars() {
        if ch == ESCAPE_CHAR || ch == SIGIL {
            out.push(ESCAPE_CHAR);
        }
        out.push(ch);
    }
    out.push(']');
    out.push(SIGIL);
    out
}

fn needs_char_reference(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1..=0x8 | 0xb..=0xc | 0xe..=0x1f | 0x7f..=0x84 | 0x86..=0x9f
    )
}
