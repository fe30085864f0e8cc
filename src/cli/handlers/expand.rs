// src/cli/handlers/expand.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::io::{self, BufRead, Write};

use super::commons;
use crate::{
    CancellationToken,
    cli::args::ExpandArgs,
    core::expander::Expander,
    system::{executor::check_for_cancellation, script::LuaEngine},
};

/// The main handler for the `expand` command.
/// Expands the given text, or every line of stdin, and prints the result.
pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let expand_args = ExpandArgs::try_parse_from(&args)?;

    let settings = commons::load_settings(expand_args.config.as_deref())?;
    let registry = commons::build_registry(&settings, &expand_args.var)?;
    let runner = settings.system_runner(cancellation_token.clone());
    let scripts = LuaEngine::new(settings.script_memory_limit)
        .map_err(|e| anyhow!("Could not start the script engine: {}", e))?;
    let expander = Expander::new(&registry, &runner, &scripts).with_max_depth(settings.max_depth);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &expand_args.text {
        Some(text) => emit(&expander, text, expand_args.strict, &mut out)?,
        None => expand_lines(
            &expander,
            io::stdin().lock(),
            expand_args.strict,
            &mut out,
            cancellation_token,
        )?,
    }

    out.flush()?;
    Ok(())
}

/// Expands every line of `input`, stopping early once cancellation is requested.
fn expand_lines(
    expander: &Expander<'_>,
    input: impl BufRead,
    strict: bool,
    out: &mut impl Write,
    cancellation_token: &CancellationToken,
) -> Result<()> {
    for line in input.lines() {
        check_for_cancellation(cancellation_token)?;
        let line = line.context(t!("expand.error.stdin"))?;
        emit(expander, &line, strict, out)?;
    }
    Ok(())
}

/// Expands one input and writes it as one output line.
fn emit(expander: &Expander<'_>, input: &str, strict: bool, out: &mut impl Write) -> Result<()> {
    let expanded = if strict {
        expander
            .try_expand(input)
            .with_context(|| t!("expand.warn.malformed"))?
    } else {
        expander.expand(input)
    };
    writeln!(out, "{}", expanded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{dispatcher::ExpandError, registry::Registry};
    use crate::system::{
        executor::{CommandRunner, ExecutionError},
        script::{ScriptEngine, ScriptError},
    };
    use std::{io::Cursor, path::Path, sync::atomic::Ordering};

    struct NoRunner;

    impl CommandRunner for NoRunner {
        fn run_shell(&self, _: &str) -> Result<String, ExecutionError> {
            Err(ExecutionError::EmptyCommand)
        }

        fn run_direct(&self, _: &str) -> Result<String, ExecutionError> {
            Err(ExecutionError::EmptyCommand)
        }
    }

    struct NoScripts;

    impl ScriptEngine for NoScripts {
        fn eval_inline(&self, _: &str) -> Result<Option<String>, ScriptError> {
            Ok(None)
        }

        fn eval_file(&self, _: &Path) -> Result<Option<String>, ScriptError> {
            Ok(None)
        }
    }

    fn emit_to_string(input: &str, strict: bool) -> Result<String> {
        let mut registry = Registry::new();
        registry.set_str("name", "world");
        let expander = Expander::new(&registry, &NoRunner, &NoScripts);

        let mut buffer = Vec::new();
        emit(&expander, input, strict, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn expand_input(input: &str, strict: bool, token: &CancellationToken) -> (Result<()>, String) {
        let mut registry = Registry::new();
        registry.set_str("name", "world");
        let expander = Expander::new(&registry, &NoRunner, &NoScripts);

        let mut buffer = Vec::new();
        let result = expand_lines(&expander, Cursor::new(input), strict, &mut buffer, token);
        (result, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_expand_lines_one_output_line_per_input_line() {
        let token = CancellationToken::default();
        let (result, output) = expand_input("a @name\n\nb @{name}\nbad @{name\n", false, &token);
        assert!(result.is_ok());
        assert_eq!(output, "a world\n\nb world\n\n");
    }

    #[test]
    fn test_expand_lines_strict_stops_at_first_malformed_line() {
        let token = CancellationToken::default();
        let (result, output) = expand_input("ok @name\nbad @{name\nnever\n", true, &token);
        assert!(result.unwrap_err().downcast_ref::<ExpandError>().is_some());
        assert_eq!(output, "ok world\n");
    }

    #[test]
    fn test_expand_lines_honours_cancellation() {
        let token = CancellationToken::default();
        token.store(true, Ordering::SeqCst);
        let (result, output) = expand_input("one\ntwo\n", false, &token);
        assert!(matches!(
            result.unwrap_err().downcast_ref::<ExecutionError>(),
            Some(ExecutionError::Cancelled)
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn test_emit_writes_one_line() {
        assert_eq!(emit_to_string("hi @name", false).unwrap(), "hi world\n");
        assert_eq!(emit_to_string("hi @name", true).unwrap(), "hi world\n");
    }

    #[test]
    fn test_malformed_input_prints_empty_line() {
        assert_eq!(emit_to_string("hi @{name", false).unwrap(), "\n");
    }

    #[test]
    fn test_strict_mode_keeps_the_expand_error() {
        let err = emit_to_string("hi @{name", true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExpandError>(),
            Some(ExpandError::Unterminated { .. })
        ));
    }
}
