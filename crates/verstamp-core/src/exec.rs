//! Synchronous shell command execution with captured output.
//!
//! The full command line is handed to `sh -c` as a single string; quoting
//! and escaping are the caller's responsibility. The child inherits the
//! calling process's environment verbatim. There is no timeout: a hung
//! command hangs the caller (known limitation, wrap externally if bounded
//! latency is required).

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Captured output of a finished shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Whitespace-trimmed standard output.
    pub stdout: String,

    /// Whitespace-trimmed standard error.
    pub stderr: String,

    /// Process exit code (-1 if terminated by a signal).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Whether the command exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Seam for running shell commands, so callers can substitute a scripted
/// fake in tests.
pub trait CommandRunner {
    /// Run a single command line to completion and capture its output.
    ///
    /// Only failing to spawn the interpreter is an error; a non-zero exit
    /// is an ordinary [`CommandOutput`].
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through the system shell (`sh -c`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        let output = Command::new("sh").args(["-c", command]).output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captures_trimmed_stdout() {
        let out = ShellRunner::new().run("echo '  hello  '").unwrap();
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.stderr, "");
        assert_eq!(out.exit_code, 0);
        assert!(out.succeeded());
    }

    #[test]
    fn run_captures_stderr_and_exit_code() {
        let out = ShellRunner::new()
            .run("echo oops >&2; exit 7")
            .unwrap();
        assert_eq!(out.exit_code, 7);
        assert_eq!(out.stderr, "oops");
        assert_eq!(out.stdout, "");
        assert!(!out.succeeded());
    }

    #[test]
    fn run_passes_whole_string_to_the_shell() {
        // Pipes and substitution are shell semantics, not parsed here.
        let out = ShellRunner::new()
            .run("printf 'a\\nb\\n' | wc -l")
            .unwrap();
        assert_eq!(out.stdout, "2");
    }

    #[test]
    fn run_inherits_process_environment() {
        // HOME is set in any sane test environment.
        let out = ShellRunner::new().run("echo \"$HOME\"").unwrap();
        assert!(out.succeeded());
        assert!(!out.stdout.is_empty());
    }
}
