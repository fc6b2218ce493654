//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own working directory and a private `bin` directory for
/// fake tools. Every fake tool logs its invocation to `calls.log`.
pub struct TestEnv {
  pub temp: TempDir,
  pub bin: PathBuf,
  pub log: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    let bin = root.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let log = root.join("calls.log");
    Self { temp, bin, log }
  }

  /// Environment with tools that log their arguments and succeed.
  pub fn with_tools(tools: &[&str]) -> Self {
    let env = Self::new();
    for tool in tools {
      env.fake_tool(tool, "exit 0");
    }
    env
  }

  /// Install a fake tool. `body` runs after the invocation is logged and sees
  /// the script arguments.
  pub fn fake_tool(&self, name: &str, body: &str) {
    let path = self.bin.join(name);
    let script = format!(
      "#!/bin/sh\necho \"{name} $*\" >> \"{log}\"\n{body}\n",
      log = self.log.display()
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  /// Fake kubectl that also logs manifests piped to `apply -f -`.
  pub fn fake_kubectl(&self) {
    self.fake_tool(
      "kubectl",
      &format!(
        "if [ \"$3\" = \"-\" ]; then cat >> \"{}\"; fi\nexit 0",
        self.log.display()
      ),
    );
  }

  /// Write a file relative to the working directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn mkdir(&self, relative_path: &str) {
    std::fs::create_dir_all(self.temp.path().join(relative_path)).unwrap();
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Everything the fake tools logged, empty if none ran.
  pub fn log(&self) -> String {
    std::fs::read_to_string(&self.log).unwrap_or_default()
  }

  pub fn log_lines(&self) -> Vec<String> {
    self.log().lines().map(str::to_string).collect()
  }

  /// Get a pre-configured Command for the troyops binary.
  ///
  /// Runs in the temp directory with only the fake tools and the system
  /// shell utilities on `PATH`.
  pub fn troyops_cmd(&self) -> Command {
    Command::from_std(self.troyops_process())
  }

  /// Same setup as [`troyops_cmd`](Self::troyops_cmd), for tests that need
  /// to spawn the binary and signal it while it runs.
  pub fn troyops_process(&self) -> std::process::Command {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_troyops"));
    cmd.current_dir(self.temp.path());
    cmd.env("PATH", search_path(&self.bin));
    cmd.env_remove("TROYOPS_DRY_RUN");
    cmd.env_remove("TROYOPS_TIMEOUT");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

fn search_path(bin: &Path) -> String {
  format!("{}:/usr/bin:/bin", bin.display())
}
