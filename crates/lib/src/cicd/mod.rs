//! CI/CD pipeline scaffolding.
//!
//! Writes a GitHub Actions workflow to `.github/workflows/<app>-ci.yml` or a
//! GitLab pipeline to `.gitlab-ci.yml`, relative to the repository root. Both
//! build and push `<app>:latest` and update the Kustomize base with the new
//! image. Existing pipeline files are overwritten.

mod templates;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::template::{EmitError, EmitResult, Vars, WriteMode, emit};
use crate::types::UnsupportedValue;

pub use templates::{GITHUB_WORKFLOW_TEMPLATE, GITLAB_CI_TEMPLATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CiPlatform {
  #[default]
  Github,
  Gitlab,
}

impl CiPlatform {
  pub const NAMES: &'static [&'static str] = &["github", "gitlab"];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Github => "github",
      Self::Gitlab => "gitlab",
    }
  }

  fn template(&self) -> &'static str {
    match self {
      Self::Github => GITHUB_WORKFLOW_TEMPLATE,
      Self::Gitlab => GITLAB_CI_TEMPLATE,
    }
  }
}

impl FromStr for CiPlatform {
  type Err = UnsupportedValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "github" => Ok(Self::Github),
      "gitlab" => Ok(Self::Gitlab),
      other => Err(UnsupportedValue::new("CI platform", other, Self::NAMES)),
    }
  }
}

impl fmt::Display for CiPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum CicdError {
  #[error("invalid application name '{0}': use lowercase letters, digits, '.', '-' or '_'")]
  InvalidAppName(String),

  #[error(transparent)]
  Emit(#[from] EmitError),
}

/// Options for generating a pipeline.
#[derive(Debug, Clone)]
pub struct CicdOptions {
  pub platform: CiPlatform,
  /// Root of the repository the pipeline is written into
  pub repo_path: PathBuf,
  /// Application name, also used as the image name
  pub app_name: String,
}

/// Where the pipeline file for `platform` lives inside `repo_path`.
pub fn pipeline_path(platform: CiPlatform, repo_path: &Path, app_name: &str) -> PathBuf {
  match platform {
    CiPlatform::Github => repo_path
      .join(".github")
      .join("workflows")
      .join(format!("{}-ci.yml", app_name)),
    CiPlatform::Gitlab => repo_path.join(".gitlab-ci.yml"),
  }
}

/// Generate the pipeline file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the application name is unusable in a file name or
/// image reference, or if the file cannot be written.
pub fn generate(options: &CicdOptions) -> Result<EmitResult, CicdError> {
  validate_app_name(&options.app_name)?;

  let path = pipeline_path(options.platform, &options.repo_path, &options.app_name);
  info!(platform = %options.platform, path = %path.display(), "generating pipeline");

  let result = emit(
    &path,
    options.platform.template(),
    &vars(&options.app_name),
    WriteMode::Overwrite,
  )?;
  Ok(result)
}

fn vars(app_name: &str) -> Vars {
  Vars::new().set("app_name", app_name)
}

/// The name becomes a file name and a Docker image name, which must be lowercase.
fn validate_app_name(name: &str) -> Result<(), CicdError> {
  let valid = !name.is_empty()
    && !name.starts_with('.')
    && name
      .chars()
      .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'));
  if valid {
    Ok(())
  } else {
    Err(CicdError::InvalidAppName(name.to_string()))
  }
}
