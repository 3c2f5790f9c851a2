// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Command execution.
//!
//! Publicist never talks to version control or a package registry directly.
//! Every step of a release is a rendered command string handed to a
//! [`CommandRunner`]. The runner is a capability passed into the
//! [`Publisher`](crate::publish::Publisher), so callers can swap the host shell
//! for anything else that honors the same contract, e.g., a recording fake.

use std::{
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, instrument};

/// Execute rendered commands synchronously.
pub trait CommandRunner {
    /// Run command string to completion, and capture its standard output.
    ///
    /// If `current_dir` is given, then the command runs inside of it.
    /// Otherwise the command inherits the working directory of the current
    /// process.
    ///
    /// # Errors
    ///
    /// - Return [`CommandFailure`] if the command cannot be started, or exits
    ///   with non-zero status.
    fn run(&self, command: &str, current_dir: Option<&Path>) -> Result<String>;
}

impl<T> CommandRunner for &T
where
    T: CommandRunner + ?Sized,
{
    fn run(&self, command: &str, current_dir: Option<&Path>) -> Result<String> {
        (**self).run(command, current_dir)
    }
}

/// Command execution through the host shell.
///
/// Uses `sh -c` on unix-like systems, and `cmd /C` on windows.
#[derive(Debug, Default, Clone)]
pub struct ShellRunner;

impl ShellRunner {
    /// Construct new shell runner.
    pub fn new() -> Self {
        Self
    }

    fn shell(command: &str) -> Command {
        #[cfg(windows)]
        let mut shell = {
            let mut shell = Command::new("cmd");
            shell.arg("/C");
            shell
        };

        #[cfg(not(windows))]
        let mut shell = {
            let mut shell = Command::new("sh");
            shell.arg("-c");
            shell
        };

        shell.arg(command);
        shell
    }
}

impl CommandRunner for ShellRunner {
    #[instrument(skip(self), level = "debug")]
    fn run(&self, command: &str, current_dir: Option<&Path>) -> Result<String> {
        let mut shell = Self::shell(command);
        if let Some(dir) = current_dir {
            shell.current_dir(dir);
        }

        let output = shell.output().map_err(|error| CommandFailure {
            command: command.to_string(),
            output: error.to_string(),
            current_dir: current_dir.map(Path::to_path_buf),
        })?;
        let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
            let mut message = String::new();

            if !stdout.is_empty() {
                message.push_str(stdout.as_str());
            }

            if !stderr.is_empty() {
                if !message.is_empty() && !message.ends_with('\n') {
                    message.push('\n');
                }
                message.push_str(stderr.as_str());
            }

            // INVARIANT: Chomp trailing newlines of diagnostic output.
            let message = message.trim_end_matches(['\r', '\n']).to_string();

            return Err(CommandFailure {
                command: command.to_string(),
                output: message,
                current_dir: current_dir.map(Path::to_path_buf),
            });
        }

        debug!("command {command:?} succeeded");
        Ok(stdout)
    }
}

/// External command cannot be started, or exited with non-zero status.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("command {command:?} failed:\n{output}")]
pub struct CommandFailure {
    /// Fully rendered command string.
    pub command: String,

    /// Captured diagnostic output.
    pub output: String,

    /// Directory the command ran in, if not the current one.
    pub current_dir: Option<PathBuf>,
}

impl CommandFailure {
    /// Construct new failure for command with diagnostic output.
    pub fn new(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            current_dir: None,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = CommandFailure> = std::result::Result<T, E>;

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shell_runner_captures_stdout() -> anyhow::Result<()> {
        let output = ShellRunner::new().run("echo hello world", None)?;
        assert_eq!(output, "hello world\n");

        Ok(())
    }

    #[test]
    fn shell_runner_reports_failure_with_diagnostics() {
        let result = ShellRunner::new().run("echo oops >&2; exit 3", None);
        let expect = CommandFailure::new("echo oops >&2; exit 3", "oops");
        assert_eq!(result, Err(expect));
    }

    #[test]
    fn shell_runner_honors_current_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().canonicalize()?;
        let output = ShellRunner::new().run("pwd", Some(&dir))?;
        assert_eq!(output.trim_end(), dir.to_string_lossy());

        Ok(())
    }
}
