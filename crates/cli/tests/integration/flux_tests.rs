//! Flux command integration tests.

use std::process::Stdio;
use std::time::{Duration, Instant};

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn bootstrap_runs_preflight_then_bootstrap() {
  let env = TestEnv::with_tools(&["flux"]);

  env
    .troyops_cmd()
    .args(["flux", "--repo", "https://example.com/fleet.git", "--branch", "release"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Flux bootstrap completed"));

  assert_eq!(
    env.log_lines(),
    vec![
      "flux check --pre",
      "flux bootstrap git --url https://example.com/fleet.git --branch release --path clusters/production --namespace flux-system",
    ]
  );
}

#[test]
fn failed_preflight_stops_bootstrap() {
  let env = TestEnv::new();
  env.fake_tool("flux", "if [ \"$1\" = check ]; then exit 1; fi\nexit 0");

  env
    .troyops_cmd()
    .args(["flux", "--repo", "https://example.com/fleet.git"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("step 1 of 2 failed (Checking cluster prerequisites)"));

  assert_eq!(env.log_lines(), vec!["flux check --pre"]);
}

#[test]
fn sync_reconciles_source_and_kustomization() {
  let env = TestEnv::with_tools(&["flux"]);

  env.troyops_cmd().args(["flux", "sync"]).assert().success();

  assert_eq!(
    env.log_lines(),
    vec![
      "flux reconcile source git flux-system --namespace flux-system",
      "flux reconcile kustomization flux-system --namespace flux-system",
    ]
  );
}

#[test]
fn check_and_install_use_namespace() {
  let env = TestEnv::with_tools(&["flux"]);

  env
    .troyops_cmd()
    .args(["flux", "check", "--namespace", "gitops"])
    .assert()
    .success();
  env
    .troyops_cmd()
    .args(["flux", "install", "--namespace", "gitops"])
    .assert()
    .success();

  assert_eq!(
    env.log_lines(),
    vec!["flux check --namespace gitops", "flux install --namespace gitops"]
  );
}

#[test]
fn dry_run_spawns_nothing() {
  let env = TestEnv::with_tools(&["flux"]);

  env
    .troyops_cmd()
    .args(["--dry-run", "flux", "--repo", "https://example.com/fleet.git"])
    .assert()
    .success()
    .stdout(predicate::str::contains("flux bootstrap git --url https://example.com/fleet.git"));

  assert!(env.log().is_empty());
}

#[test]
fn dry_run_from_environment() {
  let env = TestEnv::with_tools(&["flux"]);

  env
    .troyops_cmd()
    .env("TROYOPS_DRY_RUN", "true")
    .args(["flux", "sync"])
    .assert()
    .success();

  assert!(env.log().is_empty());
}

#[test]
fn hung_command_times_out() {
  let env = TestEnv::new();
  env.fake_tool("flux", "exec sleep 5");

  env
    .troyops_cmd()
    .args(["--timeout", "300ms", "flux", "check"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("timed out"));
}

/// Poll `check` every 20ms until it holds or `limit` passes.
fn wait_for(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
  let deadline = Instant::now() + limit;
  while Instant::now() < deadline {
    if check() {
      return true;
    }
    std::thread::sleep(Duration::from_millis(20));
  }
  check()
}

fn process_alive(pid: &str) -> bool {
  std::process::Command::new("kill")
    .args(["-0", pid])
    .stderr(Stdio::null())
    .status()
    .is_ok_and(|status| status.success())
}

#[test]
fn interrupt_cancels_running_command() {
  let env = TestEnv::new();
  let pid_file = env.path("flux.pid");
  // exec keeps the recorded pid for the sleep itself
  env.fake_tool("flux", &format!("echo $$ > \"{}\"\nexec sleep 5", pid_file.display()));

  let started = Instant::now();
  let child = env
    .troyops_process()
    .args(["flux", "check"])
    .stdout(Stdio::null())
    .stderr(Stdio::piped())
    .spawn()
    .unwrap();

  assert!(
    wait_for(Duration::from_secs(5), || std::fs::read_to_string(&pid_file).is_ok_and(|pid| !pid.trim().is_empty())),
    "fake flux never started"
  );
  // let the runner reach its signal listener
  std::thread::sleep(Duration::from_millis(200));
  let status = std::process::Command::new("kill")
    .args(["-INT", &child.id().to_string()])
    .status()
    .unwrap();
  assert!(status.success());

  let output = child.wait_with_output().unwrap();

  assert!(!output.status.success());
  assert!(started.elapsed() < Duration::from_secs(4), "interrupt did not stop the run");
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("command cancelled: flux check"), "stderr: {stderr}");

  let pid = std::fs::read_to_string(&pid_file).unwrap();
  assert!(
    wait_for(Duration::from_secs(2), || !process_alive(pid.trim())),
    "child process {} outlived the interrupt",
    pid.trim()
  );
}

#[test]
fn json_output_lists_steps() {
  let env = TestEnv::with_tools(&["flux"]);

  let output = env
    .troyops_cmd()
    .args(["--output", "json", "flux", "install"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["dry_run"], false);
  assert_eq!(json["steps"][0]["program"], "flux");
  assert_eq!(json["steps"][0]["args"][0], "install");
}
