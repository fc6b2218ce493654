//! Process runners.
//!
//! Workflows talk to a [`Runner`] rather than spawning processes directly, so
//! the same step list can be executed for real, printed in a dry run, or
//! recorded in tests.

use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info};

use crate::exec::types::{ExecConfig, ExecError, Step};

/// Executes [`Step`]s.
#[allow(async_fn_in_trait)]
pub trait Runner {
  /// Run a step with stdout/stderr inherited from this process.
  async fn run(&self, step: &Step) -> Result<(), ExecError>;

  /// Run a step and return its stdout. Stderr stays inherited.
  async fn capture(&self, step: &Step) -> Result<Vec<u8>, ExecError>;
}

/// Runs steps as child processes.
///
/// Each child is awaited before the next one starts. A configured timeout or
/// an interrupt (Ctrl-C) kills the child and fails the step.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
  config: ExecConfig,
}

impl SystemRunner {
  pub fn new(config: ExecConfig) -> Self {
    Self { config }
  }

  fn spawn(&self, step: &Step, stdout: Stdio) -> Result<Child, ExecError> {
    let mut command = Command::new(&step.program);
    command
      .args(&step.args)
      .stdout(stdout)
      .stderr(Stdio::inherit())
      .stdin(if step.stdin.is_some() {
        Stdio::piped()
      } else {
        Stdio::inherit()
      })
      .kill_on_drop(true);

    debug!(program = %step.program, args = ?step.args, "spawning process");

    command.spawn().map_err(|source| ExecError::Spawn {
      program: step.program.clone(),
      source,
    })
  }

  /// Await `fut`, enforcing the deadline and listening for an interrupt.
  ///
  /// Dropping `fut` drops the child, which kills it.
  async fn guard<T>(&self, step: &Step, fut: impl Future<Output = io::Result<T>>) -> Result<T, ExecError> {
    tokio::select! {
      result = self.bounded(step, fut) => result,
      _ = tokio::signal::ctrl_c() => Err(ExecError::Cancelled { cmd: step.command_line() }),
    }
  }

  async fn bounded<T>(&self, step: &Step, fut: impl Future<Output = io::Result<T>>) -> Result<T, ExecError> {
    let result = match self.config.timeout {
      Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| ExecError::TimedOut {
        cmd: step.command_line(),
        timeout: limit,
      })?,
      None => fut.await,
    };
    result.map_err(|source| ExecError::Io {
      cmd: step.command_line(),
      source,
    })
  }
}

impl Runner for SystemRunner {
  async fn run(&self, step: &Step) -> Result<(), ExecError> {
    if self.config.dry_run {
      return DryRunRunner.run(step).await;
    }

    info!(cmd = %step, "executing command");
    let mut child = self.spawn(step, Stdio::inherit())?;
    let input = child.stdin.take().zip(step.stdin.as_deref());

    let status = self
      .guard(step, async {
        feed(input).await?;
        child.wait().await
      })
      .await?;

    check_status(step, status)
  }

  async fn capture(&self, step: &Step) -> Result<Vec<u8>, ExecError> {
    if self.config.dry_run {
      return DryRunRunner.capture(step).await;
    }

    info!(cmd = %step, "executing command");
    let mut child = self.spawn(step, Stdio::piped())?;
    let input = child.stdin.take().zip(step.stdin.as_deref());

    // stdout is drained while stdin is written, or a child that echoes more
    // than a pipe buffer blocks on both ends
    let (_, output) = self
      .guard(step, async { tokio::try_join!(feed(input), child.wait_with_output()) })
      .await?;

    check_status(step, output.status)?;
    debug!(bytes = output.stdout.len(), "captured stdout");
    Ok(output.stdout)
  }
}

/// Logs steps without running them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl Runner for DryRunRunner {
  async fn run(&self, step: &Step) -> Result<(), ExecError> {
    info!(cmd = %step, "dry run, not executing");
    Ok(())
  }

  async fn capture(&self, step: &Step) -> Result<Vec<u8>, ExecError> {
    info!(cmd = %step, "dry run, not executing");
    Ok(Vec::new())
  }
}

/// Write `bytes` to the child's stdin and close it.
async fn feed(input: Option<(ChildStdin, &[u8])>) -> io::Result<()> {
  if let Some((mut pipe, bytes)) = input {
    pipe.write_all(bytes).await?;
    pipe.shutdown().await?;
  }
  Ok(())
}

fn check_status(step: &Step, status: ExitStatus) -> Result<(), ExecError> {
  if status.success() {
    return Ok(());
  }
  Err(ExecError::CmdFailed {
    cmd: step.command_line(),
    code: status.code(),
  })
}
