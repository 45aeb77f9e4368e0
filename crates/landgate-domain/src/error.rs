//! Error types for delegate command execution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of one opaque delegate command.
///
/// Carries what the delegate's command runner captured: the joined command
/// line, the process exit code, and whatever landed on stderr.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("command `{command}` exited with code {exit_code}: {stderr}")]
pub struct CommandError {
    /// Joined command line that failed.
    pub command: String,

    /// Process exit code (-1 when the process never ran or was killed).
    pub exit_code: i32,

    /// Captured stderr.
    pub stderr: String,
}

impl CommandError {
    /// Build an error from the token list handed to the command runner.
    pub fn new(command: &[String], exit_code: i32, stderr: impl Into<String>) -> Self {
        CommandError {
            command: command.join(" "),
            exit_code,
            stderr: stderr.into(),
        }
    }
}
