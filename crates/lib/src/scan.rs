//! Lazy directory scanning by file extension.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
#[error("failed to scan {}", path.display())]
pub struct ScanError {
  pub path: PathBuf,
  pub source: walkdir::Error,
}

/// Depth-first iterator over regular files under a root whose extension matches.
///
/// Entries are yielded in the order the OS returns them. Traversal errors are
/// yielded rather than ending iteration, so callers decide whether to continue.
pub struct Scan {
  root: PathBuf,
  walker: walkdir::IntoIter,
  extensions: Vec<String>,
}

/// Scan `root` for files with any of `extensions` (without the leading dot).
pub fn scan(root: &Path, extensions: &[&str]) -> Scan {
  Scan {
    root: root.to_path_buf(),
    walker: WalkDir::new(root).into_iter(),
    extensions: extensions.iter().map(|e| e.to_string()).collect(),
  }
}

impl Scan {
  fn matches(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
  }
}

impl Iterator for Scan {
  type Item = Result<PathBuf, ScanError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      match self.walker.next()? {
        Ok(entry) => {
          if entry.file_type().is_file() && self.matches(entry.path()) {
            return Some(Ok(entry.into_path()));
          }
        }
        Err(source) => {
          let path = source.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
          return Some(Err(ScanError { path, source }));
        }
      }
    }
  }
}
