//! # Executor
//!
//! Spawns the processes behind `@(...)@` forms and captures their standard output.

use crate::CancellationToken;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command as StdCommand, Output, Stdio};
use std::sync::atomic::Ordering;
use thiserror::Error;

/// Errors that can occur while running a command for substitution.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The command line has unbalanced quotes or escapes.
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    /// The command line is empty after trimming.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The command line cannot be passed to the shell as one quoted word.
    #[error("Command '{0}' contains a NUL byte and cannot be quoted for the shell.")]
    Unquotable(String),
    /// The process could not be spawned or waited on.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// The process wrote bytes to stdout that are not UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// The command that was run.
        command: String,
        /// The decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// Cancellation was requested before the process was spawned.
    #[error("Operation was cancelled by the user.")]
    Cancelled,
}

/// Runs command lines synchronously and returns their standard output.
pub trait CommandRunner {
    /// Runs `command_line` through the configured shell interpreter.
    fn run_shell(&self, command_line: &str) -> Result<String, ExecutionError>;

    /// Splits `command_line` into words and runs the program directly, without a shell.
    fn run_direct(&self, command_line: &str) -> Result<String, ExecutionError>;
}

/// Returns an error if cancellation has been requested.
pub fn check_for_cancellation(cancellation_token: &CancellationToken) -> Result<(), ExecutionError> {
    if cancellation_token.load(Ordering::SeqCst) {
        return Err(ExecutionError::Cancelled);
    }
    Ok(())
}

/// Builds the full command line that hands `command_line` to `shell_cmd` as one quoted word,
/// e.g. `/bin/sh -c 'echo hi'`.
pub fn shell_command_line(shell_cmd: &str, command_line: &str) -> Result<String, ExecutionError> {
    let quoted = shlex::try_quote(command_line)
        .map_err(|_| ExecutionError::Unquotable(command_line.to_string()))?;
    Ok(format!("{} {}", shell_cmd, quoted))
}

/// A [`CommandRunner`] that spawns real processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    shell_cmd: String,
    cwd: Option<PathBuf>,
    env: HashMap<String, String>,
    cancellation_token: CancellationToken,
}

impl SystemRunner {
    /// Creates a runner that uses `shell_cmd` as the shell interpreter prefix.
    pub fn new(shell_cmd: impl Into<String>, cancellation_token: CancellationToken) -> Self {
        Self {
            shell_cmd: shell_cmd.into(),
            cwd: None,
            env: HashMap::new(),
            cancellation_token,
        }
    }

    /// Sets the working directory of spawned commands.
    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    /// Adds environment variables to spawned commands.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// The shell interpreter prefix in use.
    pub fn shell_cmd(&self) -> &str {
        &self.shell_cmd
    }

    fn build_command(&self, program: &str, args: &[String]) -> StdCommand {
        let mut command = StdCommand::new(program);
        command
            .args(args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &self.cwd {
            command.current_dir(dunce::simplified(cwd));
        }
        command
    }

    fn spawn_and_capture(&self, command_line: &str) -> Result<Output, ExecutionError> {
        let parts = shlex::split(command_line)
            .ok_or_else(|| ExecutionError::CommandParse(command_line.to_string()))?;
        let (program, args) = parts.split_first().ok_or(ExecutionError::EmptyCommand)?;

        // Fallback for Windows built-ins like `echo`: retry through `cmd /C` on `NotFound`.
        match self.build_command(program, args).output() {
            Ok(output) => Ok(output),
            Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
                log::debug!("Command '{}' not found. Retrying with cmd /C.", program);
                self.build_command("cmd", &["/C".to_string(), command_line.to_string()])
                    .output()
                    .map_err(|e| ExecutionError::CommandFailed(command_line.to_string(), e))
            }
            Err(e) => Err(ExecutionError::CommandFailed(command_line.to_string(), e)),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run_shell(&self, command_line: &str) -> Result<String, ExecutionError> {
        let full_line = shell_command_line(&self.shell_cmd, command_line)?;
        self.run_direct(&full_line)
    }

    /// Stdin is closed and stderr goes to the caller's stderr. A non-zero exit status is
    /// logged, but the captured stdout is still returned.
    fn run_direct(&self, command_line: &str) -> Result<String, ExecutionError> {
        // Pre-flight cancellation check.
        check_for_cancellation(&self.cancellation_token)?;

        let trimmed_command = command_line.trim();
        if trimmed_command.is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }

        log::debug!("Executing for substitution: '{}'", trimmed_command);
        let output = self.spawn_and_capture(trimmed_command)?;

        if !output.status.success() {
            log::warn!(
                "Command '{}' exited with {}; its output is used anyway.",
                trimmed_command,
                output.status
            );
        }

        String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
            command: trimmed_command.to_string(),
            source: e,
        })
    }
}
