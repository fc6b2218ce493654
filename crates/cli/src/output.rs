//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! messages, step listings and JSON.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use troyops_lib::exec::Step;
use troyops_lib::template::{EmitOutcome, EmitResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const SKIP: &str = "-";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One line per step. In a dry run the steps were only planned.
pub fn print_steps(steps: &[Step], dry_run: bool) {
  if dry_run && !steps.is_empty() {
    print_info("Dry run, commands not executed:");
  }
  for step in steps {
    let symbol = if dry_run { symbols::ARROW } else { symbols::SUCCESS };
    println!(
      "  {} {} {}",
      symbol.if_supports_color(Stream::Stdout, |s| s.cyan()),
      step.description,
      format!("({})", step.command_line()).if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
}

pub fn print_emitted(result: &EmitResult) {
  match result.outcome {
    EmitOutcome::Written => print_success(&format!("Wrote {}", result.path.display())),
    EmitOutcome::Skipped => println!(
      "{} {} already exists, leaving it untouched",
      symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      result.path.display()
    ),
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
