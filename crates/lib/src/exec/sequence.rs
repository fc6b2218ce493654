//! Ordered command sequences.
//!
//! Installation workflows are a fixed list of steps (add repository, update,
//! install, apply). The sequence stops at the first failing step; earlier
//! steps are not rolled back.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::exec::runner::Runner;
use crate::exec::types::{ExecError, Step};

/// A step in a sequence failed and the remaining steps were skipped.
#[derive(Debug, Error)]
#[error("step {} of {total} failed ({description})", .index + 1)]
pub struct SequenceError {
  /// Zero-based position of the failing step.
  pub index: usize,
  pub total: usize,
  pub description: String,
  pub source: ExecError,
}

/// Steps that completed, in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SequenceReport {
  pub completed: Vec<Step>,
}

impl SequenceReport {
  pub fn len(&self) -> usize {
    self.completed.len()
  }

  pub fn is_empty(&self) -> bool {
    self.completed.is_empty()
  }
}

/// Run `steps` in order, aborting on the first failure.
///
/// # Errors
///
/// Returns a [`SequenceError`] naming the failing step. Steps after it never run.
pub async fn run_sequence(runner: &impl Runner, steps: &[Step]) -> Result<SequenceReport, SequenceError> {
  let total = steps.len();
  let mut report = SequenceReport::default();

  for (index, step) in steps.iter().enumerate() {
    info!(step = index + 1, total, "{}", step.description);

    if let Err(source) = runner.run(step).await {
      debug!(step = index + 1, cmd = %step, "step failed, aborting sequence");
      return Err(SequenceError {
        index,
        total,
        description: step.description.clone(),
        source,
      });
    }

    report.completed.push(step.clone());
  }

  Ok(report)
}
