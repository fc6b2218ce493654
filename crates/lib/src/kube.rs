//! Step builders for Helm and kubectl.

use std::path::Path;

use crate::exec::Step;
use crate::exec::tool::{HELM, KUBECTL};

/// A Helm chart installed from a third-party repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelmRelease {
  /// Display name used in step descriptions.
  pub display_name: &'static str,
  pub repo_name: &'static str,
  pub repo_url: &'static str,
  pub release: &'static str,
  /// Chart reference, `<repo>/<chart>`.
  pub chart: &'static str,
  pub namespace: &'static str,
  pub create_namespace: bool,
}

impl HelmRelease {
  /// Add the repository, refresh indexes, then install or upgrade the release.
  pub fn install_steps(&self) -> Vec<Step> {
    let mut install = Step::new(format!("Installing {}", self.display_name), HELM.name).args([
      "upgrade",
      "--install",
      self.release,
      self.chart,
      "--namespace",
      self.namespace,
    ]);
    if self.create_namespace {
      install = install.arg("--create-namespace");
    }

    vec![
      Step::new(format!("Adding {} Helm repository", self.display_name), HELM.name).args([
        "repo",
        "add",
        self.repo_name,
        self.repo_url,
        "--force-update",
      ]),
      Step::new("Updating Helm repositories", HELM.name).args(["repo", "update"]),
      install,
    ]
  }
}

/// `kubectl apply -f <path>`
pub fn apply_path(description: impl Into<String>, path: &Path) -> Step {
  Step::new(description, KUBECTL.name).args(["apply", "-f"]).arg(path.to_string_lossy())
}

/// `kubectl apply -k <overlay> -n <namespace>`
pub fn apply_kustomization(overlay: &Path, namespace: &str) -> Step {
  Step::new(format!("Applying overlay {}", overlay.display()), KUBECTL.name)
    .args(["apply", "-k"])
    .arg(overlay.to_string_lossy())
    .args(["-n", namespace])
}

/// `kubectl apply -f -`, feeding `manifest` on stdin.
pub fn apply_stdin(description: impl Into<String>, manifest: Vec<u8>) -> Step {
  Step::new(description, KUBECTL.name).args(["apply", "-f", "-"]).stdin(manifest)
}
