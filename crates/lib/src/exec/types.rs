//! Types for external command execution.
//!
//! This module defines the command descriptor handed to a runner, the
//! execution configuration, and the errors a single command can produce.

use std::fmt;
use std::io;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// One external command in a workflow.
///
/// Holds the program name and its ordered arguments. Output streams are
/// inherited from the invoking process unless the runner is asked to capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
  /// Human-readable label used in progress output and errors.
  pub description: String,
  pub program: String,
  pub args: Vec<String>,
  /// Bytes written to the child's stdin before waiting on it.
  #[serde(skip)]
  pub stdin: Option<Vec<u8>>,
}

impl Step {
  pub fn new(description: impl Into<String>, program: impl Into<String>) -> Self {
    Self {
      description: description.into(),
      program: program.into(),
      args: Vec::new(),
      stdin: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn stdin(mut self, input: Vec<u8>) -> Self {
    self.stdin = Some(input);
    self
  }

  /// The command line as a user would type it, quoting arguments with spaces.
  pub fn command_line(&self) -> String {
    let mut line = self.program.clone();
    for arg in &self.args {
      line.push(' ');
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        line.push('\'');
        line.push_str(arg);
        line.push('\'');
      } else {
        line.push_str(arg);
      }
    }
    line
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.command_line())
  }
}

/// Configuration shared by every command a runner executes.
#[derive(Debug, Clone, Default)]
pub struct ExecConfig {
  /// Deadline applied to each command individually. `None` waits forever.
  pub timeout: Option<Duration>,
  /// Log commands instead of spawning them.
  pub dry_run: bool,
}

/// Errors from running a single external command.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started at all.
  #[error("failed to spawn {program}")]
  Spawn { program: String, source: io::Error },

  /// The program ran and exited unsuccessfully.
  #[error("command failed with {}: {cmd}", describe_exit(.code))]
  CmdFailed { cmd: String, code: Option<i32> },

  /// The deadline elapsed; the child was killed.
  #[error("command timed out after {timeout:?}: {cmd}")]
  TimedOut { cmd: String, timeout: Duration },

  /// An interrupt arrived while the command was running; the child was killed.
  #[error("command cancelled: {cmd}")]
  Cancelled { cmd: String },

  /// Waiting on the child or feeding its stdin failed.
  #[error("io error while running {cmd}")]
  Io { cmd: String, source: io::Error },
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (terminated by signal)".to_string(),
  }
}
