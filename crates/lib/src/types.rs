//! Shared parameter types.

use thiserror::Error;

/// An option value outside the fixed set a subcommand accepts.
///
/// Returned by the `FromStr` impls of the engine, platform and environment
/// enums, so the CLI rejects the value before any external command runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported {kind}: {value} (supported: {})", .supported.join(", "))]
pub struct UnsupportedValue {
  pub kind: &'static str,
  pub value: String,
  pub supported: &'static [&'static str],
}

impl UnsupportedValue {
  pub fn new(kind: &'static str, value: &str, supported: &'static [&'static str]) -> Self {
    Self {
      kind,
      value: value.to_string(),
      supported,
    }
  }
}

/// Reject empty or whitespace-only parameters that end up in a command line or file.
pub fn require_non_empty<'a>(name: &'static str, value: &'a str) -> Result<&'a str, EmptyParameter> {
  if value.trim().is_empty() {
    return Err(EmptyParameter(name));
  }
  Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter '{0}' must not be empty")]
pub struct EmptyParameter(pub &'static str);
