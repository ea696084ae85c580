//! status-e2e CLI library
//!
//! Runs the built-in suites against Appium devices, lists their cases and
//! builds or converts Status links.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
pub mod runner;

pub use commands::{
    Cli, ColorArg, Commands, KindArg, LinkArgs, LinkCommand, ListArgs, RunArgs, SchemeArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
