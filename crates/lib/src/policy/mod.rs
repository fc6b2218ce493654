//! Policy engine installation.
//!
//! Installs Kyverno or OPA Gatekeeper with Helm and applies the policy
//! manifests found in a directory. The whole workflow aborts on the first
//! failing step.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::exec::tool::{self, HELM, KUBECTL};
use crate::exec::{Runner, SequenceError, SequenceReport, Step, ToolError, run_sequence};
use crate::kube::{self, HelmRelease};
use crate::types::UnsupportedValue;

const KYVERNO: HelmRelease = HelmRelease {
  display_name: "Kyverno",
  repo_name: "kyverno",
  repo_url: "https://kyverno.github.io/kyverno/",
  release: "kyverno",
  chart: "kyverno/kyverno",
  namespace: "kyverno",
  create_namespace: true,
};

const GATEKEEPER: HelmRelease = HelmRelease {
  display_name: "OPA Gatekeeper",
  repo_name: "gatekeeper",
  repo_url: "https://open-policy-agent.github.io/gatekeeper/charts",
  release: "gatekeeper",
  chart: "gatekeeper/gatekeeper",
  namespace: "gatekeeper-system",
  create_namespace: true,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyEngine {
  #[default]
  Kyverno,
  Opa,
}

impl PolicyEngine {
  pub const NAMES: &'static [&'static str] = &["kyverno", "opa"];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Kyverno => "kyverno",
      Self::Opa => "opa",
    }
  }

  pub fn release(&self) -> &'static HelmRelease {
    match self {
      Self::Kyverno => &KYVERNO,
      Self::Opa => &GATEKEEPER,
    }
  }

  /// `policies/<engine>`
  pub fn default_directory(&self) -> PathBuf {
    Path::new("policies").join(self.as_str())
  }
}

impl FromStr for PolicyEngine {
  type Err = UnsupportedValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "kyverno" => Ok(Self::Kyverno),
      "opa" => Ok(Self::Opa),
      other => Err(UnsupportedValue::new("policy engine", other, Self::NAMES)),
    }
  }
}

impl fmt::Display for PolicyEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum PolicyError {
  #[error("policy directory does not exist: {}", .0.display())]
  DirectoryNotFound(PathBuf),

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error(transparent)]
  Sequence(#[from] SequenceError),
}

#[derive(Debug, Clone)]
pub struct PolicyOptions {
  pub engine: PolicyEngine,
  /// Defaults to [`PolicyEngine::default_directory`]
  pub directory: Option<PathBuf>,
}

impl PolicyOptions {
  pub fn directory(&self) -> PathBuf {
    self
      .directory
      .clone()
      .unwrap_or_else(|| self.engine.default_directory())
  }
}

/// Helm install of the engine followed by `kubectl apply -f <directory>`.
pub fn steps(engine: PolicyEngine, directory: &Path) -> Vec<Step> {
  let release = engine.release();
  let mut steps = release.install_steps();
  steps.push(kube::apply_path(
    format!("Applying {} policies from {}", release.display_name, directory.display()),
    directory,
  ));
  steps
}

/// Install the policy engine and apply its policies.
///
/// # Errors
///
/// Fails before running anything if `helm` or `kubectl` is missing or the
/// policy directory does not exist; otherwise on the first failing step.
pub async fn setup(runner: &impl Runner, options: &PolicyOptions) -> Result<SequenceReport, PolicyError> {
  tool::require_all(&[HELM, KUBECTL])?;

  let directory = options.directory();
  if !directory.is_dir() {
    return Err(PolicyError::DirectoryNotFound(directory));
  }

  info!(engine = %options.engine, directory = %directory.display(), "setting up policy enforcement");
  Ok(run_sequence(runner, &steps(options.engine, &directory)).await?)
}
