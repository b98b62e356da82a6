//! # mtk-cli
//!
//! Operator tool for the MTK ledger.
//!
//! Provides commands for:
//! - Printing and validating token configuration
//! - Deploying a ledger in memory and driving it with a script of calls
//!
//! A script is the external sequencer: it fixes the order of calls and the
//! clock reading each one sees, so runs are reproducible.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod script;

pub use cli::{Cli, Commands, ConfigCommands, Format, RunArgs};
pub use error::CliError;
pub use output::OutputFormat;
pub use script::{Script, ScriptRunner, Step, StepReport, Summary};
