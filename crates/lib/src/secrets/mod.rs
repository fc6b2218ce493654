//! Secret management setup.
//!
//! Two engines are supported:
//! - `sops`: writes a `.sops.yaml` if none exists, then decrypts every
//!   `.yaml`/`.yml` file under the secrets directory with `sops --decrypt`
//!   and pipes the plaintext into `kubectl apply -f -`. A file that fails is
//!   logged and recorded, and the remaining files are still applied.
//! - `sealed-secrets`: installs the Sealed Secrets controller with Helm and
//!   applies the directory with `kubectl apply -f`, aborting on the first
//!   failing step.

mod templates;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::MANIFEST_EXTENSIONS;
use crate::exec::tool::{self, HELM, KUBECTL, SOPS};
use crate::exec::{ExecError, Runner, SequenceError, Step, ToolError, run_sequence};
use crate::kube::{self, HelmRelease};
use crate::scan::scan;
use crate::template::{EmitError, EmitOutcome, EmitResult, Vars, WriteMode, emit};
use crate::types::UnsupportedValue;

pub use templates::SOPS_CONFIG_TEMPLATE;

/// Fingerprint written to a fresh `.sops.yaml` when none is supplied.
pub const PGP_PLACEHOLDER: &str = "<YOUR_PGP_KEY_FINGERPRINT>";

const SEALED_SECRETS: HelmRelease = HelmRelease {
  display_name: "Sealed Secrets controller",
  repo_name: "sealed-secrets",
  repo_url: "https://bitnami-labs.github.io/sealed-secrets",
  release: "sealed-secrets",
  chart: "sealed-secrets/sealed-secrets",
  namespace: "kube-system",
  create_namespace: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretsEngine {
  #[default]
  Sops,
  SealedSecrets,
}

impl SecretsEngine {
  pub const NAMES: &'static [&'static str] = &["sops", "sealed-secrets"];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sops => "sops",
      Self::SealedSecrets => "sealed-secrets",
    }
  }

  /// `secrets/<engine>`
  pub fn default_directory(&self) -> PathBuf {
    Path::new("secrets").join(self.as_str())
  }
}

impl FromStr for SecretsEngine {
  type Err = UnsupportedValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sops" => Ok(Self::Sops),
      "sealed-secrets" => Ok(Self::SealedSecrets),
      other => Err(UnsupportedValue::new("secrets engine", other, Self::NAMES)),
    }
  }
}

impl fmt::Display for SecretsEngine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum SecretsError {
  #[error("secrets directory does not exist: {}", .0.display())]
  DirectoryNotFound(PathBuf),

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error(transparent)]
  Emit(#[from] EmitError),

  #[error(transparent)]
  Sequence(#[from] SequenceError),
}

#[derive(Debug, Clone)]
pub struct SecretsOptions {
  pub engine: SecretsEngine,
  /// Defaults to [`SecretsEngine::default_directory`]
  pub directory: Option<PathBuf>,
  /// Where the SOPS configuration lives (sops engine only)
  pub sops_config: PathBuf,
  /// PGP fingerprint for a newly created SOPS configuration
  pub pgp_fingerprint: Option<String>,
}

impl SecretsOptions {
  pub fn directory(&self) -> PathBuf {
    self
      .directory
      .clone()
      .unwrap_or_else(|| self.engine.default_directory())
  }
}

/// A secret file that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSecret {
  pub path: PathBuf,
  pub error: String,
}

/// Outcome of a secrets run.
#[derive(Debug, Clone, Serialize)]
pub struct SecretsReport {
  pub engine: SecretsEngine,
  pub directory: PathBuf,
  /// The SOPS configuration file, when the sops engine ran
  pub config: Option<EmitResult>,
  /// Files (sops) or directories (sealed-secrets) applied
  pub applied: Vec<PathBuf>,
  pub failed: Vec<FailedSecret>,
  pub steps: Vec<Step>,
}

impl SecretsReport {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty()
  }
}

/// Configure the selected engine and apply the secrets directory.
///
/// # Errors
///
/// Fails before touching the filesystem or cluster if a required tool is
/// missing or the directory does not exist. Per-file SOPS failures do not
/// produce an error; check [`SecretsReport::is_success`].
pub async fn configure(runner: &impl Runner, options: &SecretsOptions) -> Result<SecretsReport, SecretsError> {
  match options.engine {
    SecretsEngine::Sops => tool::require_all(&[SOPS, KUBECTL])?,
    SecretsEngine::SealedSecrets => tool::require_all(&[HELM, KUBECTL])?,
  }

  let directory = options.directory();
  if !directory.is_dir() {
    return Err(SecretsError::DirectoryNotFound(directory));
  }

  info!(engine = %options.engine, directory = %directory.display(), "setting up secret management");

  match options.engine {
    SecretsEngine::Sops => configure_sops(runner, options, directory).await,
    SecretsEngine::SealedSecrets => configure_sealed_secrets(runner, directory).await,
  }
}

async fn configure_sops(
  runner: &impl Runner,
  options: &SecretsOptions,
  directory: PathBuf,
) -> Result<SecretsReport, SecretsError> {
  let config = write_sops_config(&options.sops_config, &directory, options.pgp_fingerprint.as_deref())?;

  let mut report = SecretsReport {
    engine: SecretsEngine::Sops,
    directory: directory.clone(),
    config: Some(config),
    applied: Vec::new(),
    failed: Vec::new(),
    steps: Vec::new(),
  };

  for entry in scan(&directory, MANIFEST_EXTENSIONS) {
    let path = match entry {
      Ok(path) if same_file(&path, &options.sops_config) => {
        debug!(path = %path.display(), "skipping SOPS configuration");
        continue;
      }
      Ok(path) => path,
      Err(e) => {
        let error = error_chain(&e);
        warn!(path = %e.path.display(), %error, "skipping unreadable entry");
        report.failed.push(FailedSecret { path: e.path, error });
        continue;
      }
    };

    info!(path = %path.display(), "applying secret");
    match apply_encrypted(runner, &path).await {
      Ok(steps) => {
        report.steps.extend(steps);
        report.applied.push(path);
      }
      Err(e) => {
        let error = error_chain(&e);
        warn!(path = %path.display(), %error, "failed to apply secret, continuing");
        report.failed.push(FailedSecret { path, error });
      }
    }
  }

  Ok(report)
}

fn same_file(a: &Path, b: &Path) -> bool {
  match (dunce::canonicalize(a), dunce::canonicalize(b)) {
    (Ok(a), Ok(b)) => a == b,
    _ => a == b,
  }
}

/// `err` followed by each of its sources, colon separated.
fn error_chain(err: &dyn std::error::Error) -> String {
  let mut message = err.to_string();
  let mut source = err.source();
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}

/// Decrypt one file and apply the plaintext. The plaintext never touches disk.
async fn apply_encrypted(runner: &impl Runner, path: &Path) -> Result<Vec<Step>, ExecError> {
  let decrypt = Step::new(format!("Decrypting {}", path.display()), SOPS.name)
    .arg("--decrypt")
    .arg(path.to_string_lossy());
  let plaintext = runner.capture(&decrypt).await?;

  let apply = kube::apply_stdin(format!("Applying {}", path.display()), plaintext);
  runner.run(&apply).await?;

  // Keep the report free of decrypted material
  let apply = Step { stdin: None, ..apply };
  Ok(vec![decrypt, apply])
}

/// Create the SOPS configuration unless one already exists.
pub fn write_sops_config(
  config_path: &Path,
  secrets_dir: &Path,
  pgp_fingerprint: Option<&str>,
) -> Result<EmitResult, EmitError> {
  let vars = Vars::new()
    .set("path_regex", path_regex(config_path, secrets_dir))
    .set("pgp", pgp_fingerprint.unwrap_or(PGP_PLACEHOLDER));

  let result = emit(config_path, SOPS_CONFIG_TEMPLATE, &vars, WriteMode::IfAbsent)?;
  if pgp_fingerprint.is_none() && result.outcome == EmitOutcome::Written {
    warn!(path = %config_path.display(), "created SOPS configuration with a placeholder key; update it with your encryption key");
  }
  Ok(result)
}

/// Regex matching YAML files under `secrets_dir`, relative to the directory
/// holding the configuration when possible.
fn path_regex(config_path: &Path, secrets_dir: &Path) -> String {
  let base = config_path.parent().unwrap_or_else(|| Path::new(""));
  let relative = secrets_dir.strip_prefix(base).unwrap_or(secrets_dir);

  let mut normalized = relative.to_string_lossy().replace('\\', "/");
  while let Some(rest) = normalized.strip_prefix("./") {
    normalized = rest.to_string();
  }
  let normalized = normalized.trim_end_matches('/');
  // Secrets stored next to the configuration
  if normalized.is_empty() || normalized == "." {
    return ".*\\.ya?ml$".to_string();
  }

  let mut escaped = String::with_capacity(normalized.len());
  for c in normalized.chars() {
    if "\\.+*?()|[]{}^$".contains(c) {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  format!("{}/.*\\.ya?ml$", escaped)
}

async fn configure_sealed_secrets(runner: &impl Runner, directory: PathBuf) -> Result<SecretsReport, SecretsError> {
  let mut steps = SEALED_SECRETS.install_steps();
  steps.push(kube::apply_path(
    format!("Applying sealed secrets from {}", directory.display()),
    &directory,
  ));

  let sequence = run_sequence(runner, &steps).await?;

  Ok(SecretsReport {
    engine: SecretsEngine::SealedSecrets,
    directory: directory.clone(),
    config: None,
    applied: vec![directory],
    failed: Vec::new(),
    steps: sequence.completed,
  })
}
