//! External command execution.
//!
//! - `tool`: locate required binaries on `PATH`
//! - `runner`: spawn (or skip) individual commands
//! - `sequence`: run an ordered list of commands, aborting on failure

pub mod runner;
pub mod sequence;
pub mod tool;
pub mod types;

#[cfg(test)]
pub mod testutil;

pub use runner::{DryRunRunner, Runner, SystemRunner};
pub use sequence::{SequenceError, SequenceReport, run_sequence};
pub use tool::{Tool, ToolError, require, require_all};
pub use types::{ExecConfig, ExecError, Step};
