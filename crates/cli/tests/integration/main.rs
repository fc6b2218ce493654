//! CLI integration tests driven by fake external tools.
//!
//! Each fake tool is a shell script that appends its command line (and any
//! stdin it receives) to a log file, so the tests can assert exactly what
//! would have run against a cluster.

#![cfg(unix)]

mod common;
mod deploy_tests;
mod flux_tests;
mod secrets_tests;
