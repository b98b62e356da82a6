//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// MTK ledger operator tool.
#[derive(Parser, Debug, Clone)]
#[command(name = "mtk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Token configuration file (JSON). Defaults apply when omitted.
    #[arg(short, long, env = "MTK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable text.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Token configuration commands.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Deploy a ledger in memory and apply a script of calls to it.
    Run(RunArgs),
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the default configuration.
    Init,

    /// Load and validate the configuration.
    Check,
}

/// Arguments for the run command.
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Script file (JSON) with the owner and the steps to apply.
    #[arg(short, long)]
    pub script: PathBuf,

    /// Stop at the first failing step, print it and the summary, then exit non-zero.
    #[arg(long)]
    pub fail_fast: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_config_init() {
        let cli = Cli::parse_from(["mtk", "config", "init"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Init
            }
        ));
        assert_eq!(cli.format, Format::Table);
    }

    #[test]
    fn test_parses_run_args() {
        let cli = Cli::parse_from([
            "mtk",
            "run",
            "--script",
            "steps.json",
            "--fail-fast",
            "--format",
            "json",
        ]);
        assert_eq!(cli.format, Format::Json);
        assert!(matches!(
            cli.command,
            Commands::Run(RunArgs { script, fail_fast: true }) if script == PathBuf::from("steps.json")
        ));
    }

    #[test]
    fn test_config_flag() {
        let cli = Cli::parse_from(["mtk", "-c", "token.json", "config", "check"]);
        assert_eq!(cli.config, Some(PathBuf::from("token.json")));
    }

    #[test]
    fn test_run_requires_script() {
        assert!(Cli::try_parse_from(["mtk", "run"]).is_err());
    }
}
