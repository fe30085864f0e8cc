//! Script evaluation for `@<...>@` forms.
//!
//! [`ScriptEngine`] is the seam the expander talks to; [`LuaEngine`] is the bundled
//! implementation. One engine instance is one scripting context: globals defined by an earlier
//! evaluation are visible to later ones.

use crate::constants::{DEFAULT_SCRIPT_MEMORY_LIMIT, INLINE_CHUNK_NAME};
use mlua::{Lua, Result as LuaResult, StdLib, Value};
use std::{fmt, fs, path::Path};
use thiserror::Error;

/// Errors that can occur during script evaluation.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Error from the Lua runtime.
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// The script file could not be read.
    #[error("Could not read script file '{path}': {source}")]
    Io {
        /// The path that was requested.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Evaluates script source in a persistent context.
pub trait ScriptEngine {
    /// Evaluates `source` and returns its result as text, or `None` if it produced no value.
    fn eval_inline(&self, source: &str) -> Result<Option<String>, ScriptError>;

    /// Reads the file at `path` and evaluates its contents like [`ScriptEngine::eval_inline`].
    fn eval_file(&self, path: &Path) -> Result<Option<String>, ScriptError>;
}

/// A sandboxed Lua 5.4 state.
///
/// Only the `table`, `string`, `utf8` and `math` libraries are loaded, and globals that reach
/// the filesystem, the OS or the module loader are removed.
pub struct LuaEngine {
    lua: Lua,
    memory_limit: usize,
}

impl LuaEngine {
    /// Creates a new engine. A `memory_limit` of `0` leaves the state uncapped.
    pub fn new(memory_limit: usize) -> Result<Self, ScriptError> {
        let libs = StdLib::TABLE | StdLib::STRING | StdLib::UTF8 | StdLib::MATH;
        let lua = Lua::new_with(libs, mlua::LuaOptions::default())?;

        if memory_limit > 0 {
            lua.set_memory_limit(memory_limit)?;
        }

        Self::apply_sandbox(&lua)?;

        Ok(Self { lua, memory_limit })
    }

    /// Creates an engine with the default memory cap.
    pub fn sandboxed() -> Result<Self, ScriptError> {
        Self::new(DEFAULT_SCRIPT_MEMORY_LIMIT)
    }

    fn eval_chunk(&self, source: &str, chunk_name: &str) -> Result<Option<String>, ScriptError> {
        let value: Value = self.lua.load(source).set_name(chunk_name).eval()?;

        match value {
            Value::Nil => Ok(None),
            Value::String(s) => Ok(Some(s.to_str()?.to_string())),
            Value::Integer(i) => Ok(Some(i.to_string())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Boolean(b) => Ok(Some(b.to_string())),
            other => {
                log::debug!(
                    "Script produced a {} value, which has no text form; substituting nothing.",
                    other.type_name()
                );
                Ok(None)
            }
        }
    }

    fn apply_sandbox(lua: &Lua) -> LuaResult<()> {
        let globals = lua.globals();
        for name in [
            "dofile",
            "loadfile",
            "load",
            "require",
            "package",
            "io",
            "os",
            "debug",
            "collectgarbage",
        ] {
            globals.set(name, Value::Nil)?;
        }
        Ok(())
    }
}

impl ScriptEngine for LuaEngine {
    fn eval_inline(&self, source: &str) -> Result<Option<String>, ScriptError> {
        self.eval_chunk(source, INLINE_CHUNK_NAME)
    }

    fn eval_file(&self, path: &Path) -> Result<Option<String>, ScriptError> {
        let source = fs::read_to_string(path).map_err(|e| ScriptError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.eval_chunk(&source, &path.display().to_string())
    }
}

impl fmt::Debug for LuaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaEngine")
            .field("memory_limit", &self.memory_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_expression_results_become_text() {
        let engine = LuaEngine::sandboxed().unwrap();
        assert_eq!(engine.eval_inline("1 + 1").unwrap().as_deref(), Some("2"));
        assert_eq!(engine.eval_inline("7 / 2").unwrap().as_deref(), Some("3.5"));
        assert_eq!(
            engine.eval_inline("string.upper('abc')").unwrap().as_deref(),
            Some("ABC")
        );
        assert_eq!(engine.eval_inline("1 < 2").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_statements_yield_no_result() {
        let engine = LuaEngine::sandboxed().unwrap();
        assert_eq!(engine.eval_inline("local x = 1").unwrap(), None);
        assert_eq!(engine.eval_inline("nil").unwrap(), None);
    }

    #[test]
    fn test_context_persists_between_evaluations() {
        let engine = LuaEngine::sandboxed().unwrap();
        assert_eq!(engine.eval_inline("counter = 20").unwrap(), None);
        assert_eq!(engine.eval_inline("counter * 2").unwrap().as_deref(), Some("40"));
    }

    #[test]
    fn test_sandbox_removes_os_and_io() {
        let engine = LuaEngine::sandboxed().unwrap();
        assert_eq!(engine.eval_inline("type(os)").unwrap().as_deref(), Some("nil"));
        assert_eq!(engine.eval_inline("type(io)").unwrap().as_deref(), Some("nil"));
        assert!(engine.eval_inline("os.execute('true')").is_err());
    }

    #[test]
    fn test_non_scalar_results_yield_no_result() {
        let engine = LuaEngine::sandboxed().unwrap();
        assert_eq!(engine.eval_inline("{}").unwrap(), None);
        assert_eq!(engine.eval_inline("{1, 2, 3}").unwrap(), None);
        assert_eq!(engine.eval_inline("function() end").unwrap(), None);
        assert_eq!(engine.eval_inline("string").unwrap(), None);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let engine = LuaEngine::sandboxed().unwrap();
        let err = engine.eval_inline("return (").unwrap_err();
        assert!(matches!(err, ScriptError::Lua(_)));
    }

    #[test]
    fn test_eval_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"local greeting = 'hello'\nreturn greeting .. ' from file'\n")
            .unwrap();
        file.flush().unwrap();

        let engine = LuaEngine::sandboxed().unwrap();
        assert_eq!(
            engine.eval_file(file.path()).unwrap().as_deref(),
            Some("hello from file")
        );
    }

    #[test]
    fn test_eval_missing_file() {
        let engine = LuaEngine::sandboxed().unwrap();
        let err = engine
            .eval_file(Path::new("no_such_script_for_test.lua"))
            .unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }
}
