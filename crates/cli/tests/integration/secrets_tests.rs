//! Secrets command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

/// Fake sops that "decrypts" a file to a manifest naming it.
fn sops_env() -> TestEnv {
  let env = TestEnv::new();
  env.fake_tool("sops", "echo \"decrypted $2\"");
  env.fake_kubectl();
  env
}

#[test]
fn sops_decrypts_and_applies_yaml_files_only() {
  let env = sops_env();
  env.write_file("secrets/sops/db.yaml", "enc");
  env.write_file("secrets/sops/nested/api.yml", "enc");
  env.write_file("secrets/sops/README.txt", "plain");

  env.troyops_cmd().arg("secrets").assert().success();

  let log = env.log();
  assert!(log.contains("sops --decrypt secrets/sops/db.yaml"));
  assert!(log.contains("sops --decrypt secrets/sops/nested/api.yml"));
  assert!(log.contains("decrypted secrets/sops/db.yaml"));
  assert!(log.contains("decrypted secrets/sops/nested/api.yml"));
  assert!(!log.contains("README.txt"));
  assert_eq!(log.matches("kubectl apply -f -").count(), 2);
}

#[test]
fn sops_config_is_created_once() {
  let env = sops_env();
  env.mkdir("secrets/sops");

  env
    .troyops_cmd()
    .arg("secrets")
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote .sops.yaml"))
    .stderr(predicate::str::contains("placeholder key"));

  let config = std::fs::read_to_string(env.path(".sops.yaml")).unwrap();
  assert!(config.contains("path_regex: 'secrets/sops/.*\\.ya?ml$'"));
  assert!(config.contains("<YOUR_PGP_KEY_FINGERPRINT>"));

  env
    .troyops_cmd()
    .arg("secrets")
    .assert()
    .success()
    .stdout(predicate::str::contains("already exists"));

  assert_eq!(std::fs::read_to_string(env.path(".sops.yaml")).unwrap(), config);
}

#[test]
fn sops_config_with_fingerprint() {
  let env = sops_env();
  env.mkdir("secrets/sops");

  env
    .troyops_cmd()
    .args(["secrets", "--pgp-fingerprint", "FBC7B9E2A4F9289AC0C1D4843D16CEE4A27381B4"])
    .assert()
    .success();

  let config = std::fs::read_to_string(env.path(".sops.yaml")).unwrap();
  assert!(config.contains("pgp: 'FBC7B9E2A4F9289AC0C1D4843D16CEE4A27381B4'"));
}

#[test]
fn failed_file_does_not_stop_the_rest() {
  let env = TestEnv::new();
  env.fake_tool(
    "sops",
    "case \"$2\" in *bad.yaml) exit 1;; esac\necho \"decrypted $2\"",
  );
  env.fake_kubectl();
  env.write_file("secrets/sops/bad.yaml", "enc");
  env.write_file("secrets/sops/good.yaml", "enc");

  env
    .troyops_cmd()
    .arg("secrets")
    .assert()
    .failure()
    .stderr(predicate::str::contains("1 of 2 secret files failed to apply"))
    .stderr(predicate::str::contains("bad.yaml"));

  let log = env.log();
  assert!(log.contains("decrypted secrets/sops/good.yaml"));
  assert!(!log.contains("decrypted secrets/sops/bad.yaml"));
}

#[test]
fn missing_secrets_directory_fails_after_tool_check() {
  let env = sops_env();

  env
    .troyops_cmd()
    .arg("secrets")
    .assert()
    .failure()
    .stderr(predicate::str::contains("secrets directory does not exist"));

  assert!(!env.path(".sops.yaml").exists());
  assert!(env.log().is_empty());
}

#[test]
fn sealed_secrets_installs_controller_then_applies() {
  let env = TestEnv::with_tools(&["helm", "kubectl"]);
  env.mkdir("secrets/sealed-secrets");

  env
    .troyops_cmd()
    .args(["secrets", "--engine", "sealed-secrets"])
    .assert()
    .success();

  assert_eq!(
    env.log_lines(),
    vec![
      "helm repo add sealed-secrets https://bitnami-labs.github.io/sealed-secrets --force-update",
      "helm repo update",
      "helm upgrade --install sealed-secrets sealed-secrets/sealed-secrets --namespace kube-system",
      "kubectl apply -f secrets/sealed-secrets",
    ]
  );
  assert!(!env.path(".sops.yaml").exists());
}
