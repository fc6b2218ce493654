//! Deploy command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn deploy_applies_overlay_into_namespace() {
  let env = TestEnv::with_tools(&["kubectl"]);
  env.mkdir("kustomize/overlays/staging");

  env
    .troyops_cmd()
    .args(["deploy", "--environment", "staging", "--namespace", "web"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Deployed staging to namespace web"));

  assert_eq!(env.log_lines(), vec!["kubectl apply -k kustomize/overlays/staging -n web"]);
}

#[test]
fn deploy_defaults_to_dev_in_default_namespace() {
  let env = TestEnv::with_tools(&["kubectl"]);
  env.mkdir("kustomize/overlays/dev");

  env.troyops_cmd().arg("deploy").assert().success();

  assert_eq!(env.log_lines(), vec!["kubectl apply -k kustomize/overlays/dev -n default"]);
}

#[test]
fn deploy_custom_overlays_dir() {
  let env = TestEnv::with_tools(&["kubectl"]);
  env.mkdir("deploy/prod");

  env
    .troyops_cmd()
    .args(["deploy", "--environment", "prod", "--overlays-dir", "deploy"])
    .assert()
    .success();

  assert_eq!(env.log_lines(), vec!["kubectl apply -k deploy/prod -n default"]);
}

#[test]
fn deploy_missing_overlay_runs_nothing() {
  let env = TestEnv::with_tools(&["kubectl"]);

  env
    .troyops_cmd()
    .args(["deploy", "--environment", "prod"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("overlay for environment 'prod' does not exist"));

  assert!(env.log().is_empty());
}

#[test]
fn deploy_reports_kubectl_exit_code() {
  let env = TestEnv::new();
  env.fake_tool("kubectl", "exit 3");
  env.mkdir("kustomize/overlays/dev");

  env
    .troyops_cmd()
    .arg("deploy")
    .assert()
    .failure()
    .stderr(predicate::str::contains("exit code 3"));
}
