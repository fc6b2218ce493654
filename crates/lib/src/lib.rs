//! troyops-lib: GitOps scaffolding and cluster setup
//!
//! This crate holds the workflows behind the `troyops` CLI:
//! - `cicd`: render CI/CD pipeline files into a repository
//! - `flux`: bootstrap and operate Flux CD
//! - `deploy`: apply a Kustomize overlay per environment
//! - `policy`: install Kyverno or OPA Gatekeeper and apply policies
//! - `secrets`: set up SOPS or Sealed Secrets and apply secret manifests
//!
//! Every workflow that shells out does so through [`exec::Runner`], so the
//! same code path serves real runs, dry runs and tests.

pub mod cicd;
pub mod consts;
pub mod deploy;
pub mod exec;
pub mod flux;
pub mod kube;
pub mod policy;
pub mod scan;
pub mod secrets;
pub mod template;
pub mod types;
