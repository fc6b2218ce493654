//! Implementation of the `troyops deploy` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context as _, Result};

use troyops_lib::deploy::{DeployOptions, Environment, deploy};
use troyops_lib::exec::SystemRunner;

use crate::cmd::{Context, report_sequence, runtime};
use crate::output::print_success;

/// Apply `<overlays_dir>/<environment>` into `namespace`.
pub fn cmd_deploy(ctx: &Context, environment: Environment, namespace: String, overlays_dir: PathBuf) -> Result<()> {
  let started = Instant::now();
  let options = DeployOptions {
    environment,
    namespace,
    overlays_dir,
  };
  let runner = SystemRunner::new(ctx.exec.clone());

  let rt = runtime()?;
  let report = rt
    .block_on(deploy(&runner, &options))
    .with_context(|| format!("Deployment to {} failed", environment))?;

  report_sequence(ctx, &report, started)?;
  if !ctx.output.is_json() && !ctx.exec.dry_run {
    print_success(&format!(
      "Deployed {} to namespace {}",
      environment, options.namespace
    ));
  }
  Ok(())
}
