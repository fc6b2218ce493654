//! Kustomize overlay deployment.
//!
//! Applies `<overlays_dir>/<environment>` with `kubectl apply -k` into a
//! namespace, against whatever cluster the ambient kubeconfig points at.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::exec::tool::{self, KUBECTL};
use crate::exec::{Runner, SequenceError, SequenceReport, ToolError, run_sequence};
use crate::kube;
use crate::types::{EmptyParameter, UnsupportedValue, require_non_empty};

pub const DEFAULT_OVERLAYS_DIR: &str = "kustomize/overlays";
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Dev,
  Staging,
  Prod,
}

impl Environment {
  pub const NAMES: &'static [&'static str] = &["dev", "staging", "prod"];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Dev => "dev",
      Self::Staging => "staging",
      Self::Prod => "prod",
    }
  }
}

impl FromStr for Environment {
  type Err = UnsupportedValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "dev" => Ok(Self::Dev),
      "staging" => Ok(Self::Staging),
      "prod" => Ok(Self::Prod),
      other => Err(UnsupportedValue::new("environment", other, Self::NAMES)),
    }
  }
}

impl fmt::Display for Environment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum DeployError {
  #[error("overlay for environment '{environment}' does not exist at path: {}", path.display())]
  OverlayNotFound { environment: Environment, path: PathBuf },

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error(transparent)]
  InvalidParameter(#[from] EmptyParameter),

  #[error(transparent)]
  Sequence(#[from] SequenceError),
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
  pub environment: Environment,
  pub namespace: String,
  pub overlays_dir: PathBuf,
}

impl DeployOptions {
  pub fn overlay_path(&self) -> PathBuf {
    self.overlays_dir.join(self.environment.as_str())
  }
}

/// Apply the overlay for the selected environment.
///
/// # Errors
///
/// Fails before running anything if the namespace is empty, `kubectl` is
/// missing or the overlay directory does not exist.
pub async fn deploy(runner: &impl Runner, options: &DeployOptions) -> Result<SequenceReport, DeployError> {
  let namespace = require_non_empty("namespace", &options.namespace)?;
  tool::require(&KUBECTL)?;

  let overlay = options.overlay_path();
  ensure_overlay(options.environment, &overlay)?;

  info!(
    environment = %options.environment,
    namespace,
    overlay = %overlay.display(),
    "deploying overlay"
  );

  let steps = [kube::apply_kustomization(&overlay, namespace)];
  Ok(run_sequence(runner, &steps).await?)
}

fn ensure_overlay(environment: Environment, overlay: &Path) -> Result<(), DeployError> {
  if overlay.is_dir() {
    Ok(())
  } else {
    Err(DeployError::OverlayNotFound {
      environment,
      path: overlay.to_path_buf(),
    })
  }
}
