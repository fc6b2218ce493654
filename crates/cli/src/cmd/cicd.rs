//! Implementation of the `troyops cicd` command.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use troyops_lib::cicd::{CiPlatform, CicdOptions, generate};

use crate::cmd::Context;
use crate::output::{print_emitted, print_info, print_json};

/// Write the pipeline file for `platform` into `repo_path`.
///
/// Pipeline generation runs no external commands, so `--dry-run` does not
/// change its behaviour.
pub fn cmd_cicd(ctx: &Context, platform: CiPlatform, repo_path: PathBuf, app_name: String) -> Result<()> {
  let options = CicdOptions {
    platform,
    repo_path,
    app_name,
  };

  let result = generate(&options).with_context(|| format!("Failed to generate {} pipeline", platform))?;

  if ctx.output.is_json() {
    return print_json(&serde_json::json!({
      "platform": platform,
      "app_name": options.app_name,
      "file": result,
    }));
  }

  print_emitted(&result);
  print_info(&format!(
    "Pipeline builds and pushes {}:latest on every push to main",
    options.app_name
  ));
  Ok(())
}
