//! Implementation of the `troyops policy` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context as _, Result};

use troyops_lib::exec::SystemRunner;
use troyops_lib::policy::{PolicyEngine, PolicyOptions, setup};

use crate::cmd::{Context, report_sequence, runtime};
use crate::output::print_success;

pub fn cmd_policy(ctx: &Context, engine: PolicyEngine, directory: Option<PathBuf>) -> Result<()> {
  let started = Instant::now();
  let options = PolicyOptions { engine, directory };
  let runner = SystemRunner::new(ctx.exec.clone());

  let rt = runtime()?;
  let report = rt
    .block_on(setup(&runner, &options))
    .with_context(|| format!("Failed to set up {} policies", engine))?;

  report_sequence(ctx, &report, started)?;
  if !ctx.output.is_json() && !ctx.exec.dry_run {
    print_success(&format!(
      "{} installed and policies applied from {}",
      engine.release().display_name,
      options.directory().display()
    ));
  }
  Ok(())
}
