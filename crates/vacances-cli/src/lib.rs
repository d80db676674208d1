//! CLI: one-shot status, daemon, configuration
//!
//! This crate provides the `vacances` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{CliError, CliResult};
