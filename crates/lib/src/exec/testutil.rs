//! Test doubles for command execution.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::exec::runner::Runner;
use crate::exec::types::{ExecError, Step};

/// Records every step instead of running it.
///
/// Steps whose command line was registered with [`fail_on`](Self::fail_on)
/// fail with exit code 1 (after being recorded).
#[derive(Debug, Default)]
pub struct RecordingRunner {
  calls: RefCell<Vec<Step>>,
  failures: HashSet<String>,
  outputs: HashMap<String, Vec<u8>>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_on(mut self, command_line: &str) -> Self {
    self.failures.insert(command_line.to_string());
    self
  }

  /// Stdout returned by `capture` for the given command line.
  pub fn with_output(mut self, command_line: &str, output: &[u8]) -> Self {
    self.outputs.insert(command_line.to_string(), output.to_vec());
    self
  }

  pub fn calls(&self) -> Vec<Step> {
    self.calls.borrow().clone()
  }

  pub fn command_lines(&self) -> Vec<String> {
    self.calls.borrow().iter().map(Step::command_line).collect()
  }

  fn record(&self, step: &Step) -> Result<(), ExecError> {
    self.calls.borrow_mut().push(step.clone());
    let cmd = step.command_line();
    if self.failures.contains(&cmd) {
      return Err(ExecError::CmdFailed { cmd, code: Some(1) });
    }
    Ok(())
  }
}

impl Runner for RecordingRunner {
  async fn run(&self, step: &Step) -> Result<(), ExecError> {
    self.record(step)
  }

  async fn capture(&self, step: &Step) -> Result<Vec<u8>, ExecError> {
    self.record(step)?;
    Ok(self.outputs.get(&step.command_line()).cloned().unwrap_or_default())
  }
}

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}
