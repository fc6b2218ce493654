//! Implementation of the `troyops secrets` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context as _, Result, bail};

use troyops_lib::exec::SystemRunner;
use troyops_lib::secrets::{SecretsEngine, SecretsOptions, configure};

use crate::cmd::{Context, runtime};
use crate::output::{format_duration, print_emitted, print_json, print_stat, print_steps, print_success, print_warning};

/// Set up the secrets engine and apply the secrets directory.
///
/// With SOPS, every file is attempted even after a failure; the command still
/// exits non-zero if any file failed.
pub fn cmd_secrets(
  ctx: &Context,
  engine: SecretsEngine,
  directory: Option<PathBuf>,
  sops_config: PathBuf,
  pgp_fingerprint: Option<String>,
) -> Result<()> {
  let started = Instant::now();
  let options = SecretsOptions {
    engine,
    directory,
    sops_config,
    pgp_fingerprint,
  };
  let runner = SystemRunner::new(ctx.exec.clone());

  let rt = runtime()?;
  let report = rt
    .block_on(configure(&runner, &options))
    .with_context(|| format!("Failed to set up {} secrets", engine))?;

  if ctx.output.is_json() {
    print_json(&serde_json::json!({
      "dry_run": ctx.exec.dry_run,
      "report": report,
    }))?;
  } else {
    if let Some(config) = &report.config {
      print_emitted(config);
    }
    print_steps(&report.steps, ctx.exec.dry_run);
    for failed in &report.failed {
      print_warning(&format!("{}: {}", failed.path.display(), failed.error));
    }
    print_stat("Applied", &report.applied.len().to_string());
    print_stat("Elapsed", &format_duration(started.elapsed()));
  }

  if !report.is_success() {
    bail!(
      "{} of {} secret files failed to apply",
      report.failed.len(),
      report.failed.len() + report.applied.len()
    );
  }

  if !ctx.output.is_json() && !ctx.exec.dry_run {
    print_success(&format!("{} secrets applied from {}", engine, report.directory.display()));
  }
  Ok(())
}
