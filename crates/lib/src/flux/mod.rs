//! Flux CD bootstrap and operations.
//!
//! Every action is a short `flux` CLI sequence run through a [`Runner`]:
//! - bootstrap: pre-flight check, then `flux bootstrap git`
//! - sync: reconcile the Git source, then the Kustomization built from it
//! - check: `flux check`
//! - install: `flux install` without a Git repository

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::exec::tool::{self, FLUX};
use crate::exec::{Runner, SequenceError, SequenceReport, Step, ToolError, run_sequence};
use crate::types::{EmptyParameter, require_non_empty};

pub const DEFAULT_NAMESPACE: &str = "flux-system";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_PATH: &str = "clusters/production";
/// Name Flux gives the GitRepository and Kustomization it bootstraps.
pub const DEFAULT_SOURCE: &str = "flux-system";

#[derive(Debug, Error)]
pub enum FluxError {
  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error(transparent)]
  InvalidParameter(#[from] EmptyParameter),

  #[error(transparent)]
  Sequence(#[from] SequenceError),
}

/// Options for `flux bootstrap git`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapOptions {
  pub repo_url: String,
  pub branch: String,
  pub namespace: String,
  /// Path inside the repository holding the cluster's manifests
  pub path: String,
}

/// A Flux operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FluxAction {
  Bootstrap(BootstrapOptions),
  Sync { namespace: String, source: String },
  Check { namespace: String, pre: bool },
  Install { namespace: String },
}

impl FluxAction {
  /// Validate parameters and build the command sequence.
  pub fn steps(&self) -> Result<Vec<Step>, EmptyParameter> {
    let steps = match self {
      Self::Bootstrap(options) => {
        let url = require_non_empty("repo", &options.repo_url)?;
        let branch = require_non_empty("branch", &options.branch)?;
        let namespace = require_non_empty("namespace", &options.namespace)?;
        let path = require_non_empty("path", &options.path)?;

        vec![
          Step::new("Checking cluster prerequisites", FLUX.name).args(["check", "--pre"]),
          Step::new(format!("Bootstrapping Flux from {}", url), FLUX.name).args([
            "bootstrap",
            "git",
            "--url",
            url,
            "--branch",
            branch,
            "--path",
            path,
            "--namespace",
            namespace,
          ]),
        ]
      }
      Self::Sync { namespace, source } => {
        let namespace = require_non_empty("namespace", namespace)?;
        let source = require_non_empty("source", source)?;

        vec![
          Step::new(format!("Reconciling Git source {}", source), FLUX.name).args([
            "reconcile",
            "source",
            "git",
            source,
            "--namespace",
            namespace,
          ]),
          Step::new(format!("Reconciling Kustomization {}", source), FLUX.name).args([
            "reconcile",
            "kustomization",
            source,
            "--namespace",
            namespace,
          ]),
        ]
      }
      Self::Check { namespace, pre } => {
        let namespace = require_non_empty("namespace", namespace)?;
        let mut check = Step::new("Checking Flux components", FLUX.name).arg("check");
        if *pre {
          check = check.arg("--pre");
        }
        vec![check.args(["--namespace", namespace])]
      }
      Self::Install { namespace } => {
        let namespace = require_non_empty("namespace", namespace)?;
        vec![Step::new("Installing Flux components", FLUX.name).args(["install", "--namespace", namespace])]
      }
    };
    Ok(steps)
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Bootstrap(_) => "bootstrap",
      Self::Sync { .. } => "sync",
      Self::Check { .. } => "check",
      Self::Install { .. } => "install",
    }
  }
}

/// Run a Flux action.
///
/// # Errors
///
/// Fails before running anything if a parameter is empty or `flux` is not on
/// `PATH`; otherwise fails on the first step that fails.
pub async fn run(runner: &impl Runner, action: &FluxAction) -> Result<SequenceReport, FluxError> {
  let steps = action.steps()?;
  tool::require(&FLUX)?;

  info!(action = action.name(), "running flux");
  Ok(run_sequence(runner, &steps).await?)
}
