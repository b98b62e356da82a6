//! `mtk` binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mtk_cli::cli::{Cli, Commands};
use mtk_cli::commands::{load_config, ConfigCommand, RunCommand};
use mtk_cli::output::OutputFormat;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), mtk_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Config { command } => {
            let cmd = ConfigCommand::new(cli.config);
            cmd.execute(&mut stdout, &format, &command)?;
        }
        Commands::Run(args) => {
            let config = load_config(cli.config.as_deref())?;
            let cmd = RunCommand::new(config);
            cmd.execute(&mut stdout, &format, &args)?;
        }
    }

    Ok(())
}
