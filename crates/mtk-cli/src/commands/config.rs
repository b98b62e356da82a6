//! Configuration command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use mtk_ledger::TokenConfig;

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Load the configuration at `path`, or the defaults when there is none.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the file cannot be read or is invalid.
pub fn load_config(path: Option<&Path>) -> Result<TokenConfig, CliError> {
    match path {
        Some(path) => TokenConfig::load(path).map_err(CliError::Config),
        None => {
            debug!("no config file given, using defaults");
            Ok(TokenConfig::default())
        }
    }
}

/// Config command executor.
pub struct ConfigCommand {
    path: Option<PathBuf>,
}

impl ConfigCommand {
    /// Create a new config command.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Execute a config subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or output fails.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &ConfigCommands,
    ) -> Result<(), CliError> {
        match command {
            ConfigCommands::Init => {
                let json = TokenConfig::default()
                    .to_json_pretty()
                    .map_err(|e| CliError::Format(e.to_string()))?;
                writeln!(writer, "{json}")?;
            }
            ConfigCommands::Check => {
                let config = load_config(self.path.as_deref())?;
                format.write(writer, &config)?;
                if !format.is_json() {
                    writeln!(writer)?;
                    format.write(writer, &Message::success("configuration is valid"))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use std::io::Write as _;

    #[test]
    fn test_init_prints_loadable_json() {
        let mut out = Vec::new();
        ConfigCommand::new(None)
            .execute(&mut out, &OutputFormat::default(), &ConfigCommands::Init)
            .expect("init");
        let config = TokenConfig::from_json(&String::from_utf8(out).expect("utf8")).expect("parse");
        assert_eq!(config, TokenConfig::default());
    }

    #[test]
    fn test_check_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(br#"{ "decimals": 9 }"#).expect("write");

        let cmd = ConfigCommand::new(Some(file.path().to_path_buf()));
        let result = cmd.execute(
            &mut Vec::new(),
            &OutputFormat::new(Format::Json),
            &ConfigCommands::Check,
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_check_defaults() {
        let mut out = Vec::new();
        ConfigCommand::new(None)
            .execute(&mut out, &OutputFormat::default(), &ConfigCommands::Check)
            .expect("check");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("configuration is valid"));
    }
}
