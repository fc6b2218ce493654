//! SOPS configuration template for `troyops secrets`.
//!
//! Placeholders:
//! - `$${path_regex}` - files the creation rule applies to
//! - `$${pgp}` - PGP fingerprint used for encryption

/// Encrypts only the `data` and `stringData` fields of Kubernetes Secrets so
/// the rest of each manifest stays reviewable.
pub const SOPS_CONFIG_TEMPLATE: &str = r#"creation_rules:
  - path_regex: '$${path_regex}'
    encrypted_regex: '^(data|stringData)$'
    pgp: '$${pgp}'
"#;
