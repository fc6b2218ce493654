//! Named placeholder parsing and substitution.
//!
//! Templates reference parameters by name, so the order values are supplied in
//! never has to match the order the holes appear in the text.
//!
//! # Placeholder Format
//!
//! - `$${name}` - the value bound to `name`
//!
//! Names are ASCII letters, digits and `_`, starting with a letter or `_`.
//!
//! # Pass-through
//!
//! Single `$` characters pass through unchanged, so shell variables such as
//! `$DOCKER_HUB_USERNAME` and CI expressions such as `${{ secrets.TOKEN }}`
//! need no escaping.
//!
//! # Escaping
//!
//! Use `$$$` before `{` to produce a literal `$${` sequence.
//!
//! # Example
//!
//! ```
//! use troyops_lib::template::{Segment, Vars, parse, substitute};
//!
//! let segments = parse("image: $${app_name}:latest").unwrap();
//! assert_eq!(segments[1], Segment::Placeholder("app_name".to_string()));
//!
//! let vars = Vars::new().set("app_name", "web");
//! assert_eq!(substitute("image: $${app_name}:latest", &vars).unwrap(), "image: web:latest");
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

/// A segment of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A named placeholder to be resolved
  Placeholder(String),
}

/// Errors that can occur during placeholder parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("invalid placeholder name: '{0}'")]
  InvalidName(String),

  #[error("unresolved placeholder: {0}")]
  Unresolved(String),
}

/// Trait for resolving placeholder values during rendering.
pub trait Resolver {
  fn resolve(&self, name: &str) -> Result<&str, TemplateError>;
}

/// Named values for a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars {
  values: BTreeMap<String, String>,
}

impl Vars {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.values.insert(name.into(), value.into());
    self
  }
}

impl Resolver for Vars {
  fn resolve(&self, name: &str) -> Result<&str, TemplateError> {
    self
      .values
      .get(name)
      .map(String::as_str)
      .ok_or_else(|| TemplateError::Unresolved(name.to_string()))
  }
}

/// Parse a template into literal and placeholder segments.
///
/// # Errors
///
/// Returns an error if a placeholder is unclosed or its name is invalid.
pub fn parse(input: &str) -> Result<Vec<Segment>, TemplateError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();

        match chars.peek() {
          Some((_, '$')) => {
            chars.next();

            match chars.peek() {
              Some((_, '{')) => {
                // Escaped: $$${ -> $${ (literal)
                literal.push_str("$${");
                chars.next();
              }
              _ => literal.push_str("$$$"),
            }
          }
          Some((_, '{')) => {
            chars.next();

            if !literal.is_empty() {
              segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            let mut name = String::new();
            let mut found_close = false;

            for (_, c) in chars.by_ref() {
              if c == '}' {
                found_close = true;
                break;
              }
              name.push(c);
            }

            if !found_close {
              return Err(TemplateError::Unclosed(pos));
            }

            validate_name(&name)?;
            segments.push(Segment::Placeholder(name));
          }
          _ => literal.push_str("$$"),
        }
      }
      // A lone $ is literal: shell variables and ${{ }} expressions pass through
      _ => literal.push('$'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

fn validate_name(name: &str) -> Result<(), TemplateError> {
  let mut chars = name.chars();
  let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
  if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
    Ok(())
  } else {
    Err(TemplateError::InvalidName(name.to_string()))
  }
}

/// Parse and substitute all placeholders in one step.
///
/// # Errors
///
/// Returns an error if parsing fails or if any placeholder cannot be resolved.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, TemplateError> {
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

/// Substitute placeholders in pre-parsed segments.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, TemplateError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(name) => result.push_str(resolver.resolve(name)?),
    }
  }

  Ok(result)
}
