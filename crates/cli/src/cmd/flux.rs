//! Implementation of the `troyops flux` command and its subcommands.

use std::time::Instant;

use anyhow::{Context as _, Result};

use troyops_lib::exec::SystemRunner;
use troyops_lib::flux::{FluxAction, run};

use crate::cmd::{Context, report_sequence, runtime};
use crate::output::print_success;

pub fn cmd_flux(ctx: &Context, action: FluxAction) -> Result<()> {
  let started = Instant::now();
  let runner = SystemRunner::new(ctx.exec.clone());

  let rt = runtime()?;
  let report = rt
    .block_on(run(&runner, &action))
    .with_context(|| format!("Flux {} failed", action.name()))?;

  report_sequence(ctx, &report, started)?;
  if !ctx.output.is_json() && !ctx.exec.dry_run {
    print_success(&format!("Flux {} completed", action.name()));
  }
  Ok(())
}
