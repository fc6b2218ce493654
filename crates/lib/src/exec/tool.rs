//! Precondition checks for external tools.
//!
//! Every workflow shells out to binaries the user installs separately. Before
//! anything runs, the required binaries are looked up on `PATH` so a missing
//! tool is reported with an installation link instead of a spawn error halfway
//! through a sequence.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// An external binary and where to get it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
  pub name: &'static str,
  pub install_url: &'static str,
}

pub const FLUX: Tool = Tool {
  name: "flux",
  install_url: "https://fluxcd.io/flux/installation/",
};

pub const HELM: Tool = Tool {
  name: "helm",
  install_url: "https://helm.sh/docs/intro/install/",
};

pub const KUBECTL: Tool = Tool {
  name: "kubectl",
  install_url: "https://kubernetes.io/docs/tasks/tools/",
};

pub const SOPS: Tool = Tool {
  name: "sops",
  install_url: "https://github.com/getsops/sops#installation",
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
  #[error("{tool} is not installed or not on PATH. Installation instructions: {install_url}")]
  NotInstalled { tool: &'static str, install_url: &'static str },
}

/// Look up a tool on `PATH`, returning its resolved location.
///
/// # Errors
///
/// Returns [`ToolError::NotInstalled`] naming the tool and its installation link.
pub fn require(tool: &Tool) -> Result<PathBuf, ToolError> {
  match find_in_path(tool.name) {
    Some(path) => {
      debug!(tool = tool.name, path = %path.display(), "found tool");
      Ok(path)
    }
    None => Err(ToolError::NotInstalled {
      tool: tool.name,
      install_url: tool.install_url,
    }),
  }
}

/// Check several tools, failing on the first one missing.
pub fn require_all(tools: &[Tool]) -> Result<(), ToolError> {
  for tool in tools {
    require(tool)?;
  }
  Ok(())
}

/// Search the directories in `PATH` for an executable named `name`.
pub fn find_in_path(name: &str) -> Option<PathBuf> {
  let path = env::var_os("PATH")?;
  env::split_paths(&path)
    .filter(|dir| !dir.as_os_str().is_empty())
    .find_map(|dir| candidate_in(&dir, name))
}

#[cfg(not(windows))]
fn candidate_in(dir: &Path, name: &str) -> Option<PathBuf> {
  let candidate = dir.join(name);
  is_executable(&candidate).then_some(candidate)
}

#[cfg(windows)]
fn candidate_in(dir: &Path, name: &str) -> Option<PathBuf> {
  let exts = env::var_os("PATHEXT").unwrap_or_else(|| ".COM;.EXE;.BAT;.CMD".into());
  let exact = dir.join(name);
  if is_executable(&exact) && exact.extension().is_some() {
    return Some(exact);
  }
  exts
    .to_string_lossy()
    .split(';')
    .filter(|ext| !ext.is_empty())
    .map(|ext| dir.join(format!("{}{}", name, ext)))
    .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt;

  match path.metadata() {
    Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
    Err(_) => false,
  }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
  path.is_file()
}
