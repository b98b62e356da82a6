//! Command implementations.

mod config;
mod run;

pub use config::{load_config, ConfigCommand};
pub use run::RunCommand;
