/// Default SOPS configuration file, relative to the working directory
pub const SOPS_CONFIG_FILE: &str = ".sops.yaml";

/// File extensions treated as Kubernetes manifests when scanning directories
pub const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml"];
