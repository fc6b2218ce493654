//! Writing rendered templates to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::template::placeholder::{Resolver, TemplateError, substitute};

/// Errors that can occur while emitting a file.
#[derive(Debug, Error)]
pub enum EmitError {
  #[error("failed to render template for {}", path.display())]
  Render { path: PathBuf, source: TemplateError },

  #[error("failed to create directory {}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
  /// Replace the file unconditionally.
  Overwrite,
  /// Leave an existing file untouched.
  IfAbsent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitOutcome {
  Written,
  Skipped,
}

/// Result of emitting a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitResult {
  pub path: PathBuf,
  pub outcome: EmitOutcome,
}

/// Render `template` and write it to `path`.
///
/// The template is rendered before anything touches the filesystem, so a bad
/// template leaves no partial output. Parent directories are created as needed.
/// The rendered YAML is not validated.
///
/// # Errors
///
/// Returns an error if rendering, directory creation or the write fails.
pub fn emit(path: &Path, template: &str, vars: &impl Resolver, mode: WriteMode) -> Result<EmitResult, EmitError> {
  if mode == WriteMode::IfAbsent && path.exists() {
    info!(path = %path.display(), "file exists, skipping");
    return Ok(EmitResult {
      path: path.to_path_buf(),
      outcome: EmitOutcome::Skipped,
    });
  }

  let content = substitute(template, vars).map_err(|source| EmitError::Render {
    path: path.to_path_buf(),
    source,
  })?;

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
  }

  fs::write(path, &content).map_err(|source| EmitError::WriteFile {
    path: path.to_path_buf(),
    source,
  })?;

  debug!(path = %path.display(), bytes = content.len(), "wrote file");

  Ok(EmitResult {
    path: path.to_path_buf(),
    outcome: EmitOutcome::Written,
  })
}
