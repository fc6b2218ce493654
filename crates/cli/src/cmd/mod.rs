mod cicd;
mod deploy;
mod flux;
mod policy;
mod secrets;

pub use cicd::cmd_cicd;
pub use deploy::cmd_deploy;
pub use flux::cmd_flux;
pub use policy::cmd_policy;
pub use secrets::cmd_secrets;

use std::time::Instant;

use anyhow::{Context as _, Result};
use tokio::runtime::Runtime;

use troyops_lib::exec::{ExecConfig, SequenceReport};

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_steps};

/// Settings shared by every command.
pub struct Context {
  pub exec: ExecConfig,
  pub output: OutputFormat,
}

/// Commands run one external process at a time, so a single-threaded runtime
/// is enough.
fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}

/// Print the steps of a finished sequence in the selected format.
fn report_sequence(ctx: &Context, report: &SequenceReport, started: Instant) -> Result<()> {
  if ctx.output.is_json() {
    return print_json(&serde_json::json!({
      "dry_run": ctx.exec.dry_run,
      "steps": report.completed,
    }));
  }

  print_steps(&report.completed, ctx.exec.dry_run);
  print_stat("Elapsed", &format_duration(started.elapsed()));
  Ok(())
}
