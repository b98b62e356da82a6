//! Script run command implementation.

use std::io::Write;

use tracing::info;

use mtk_ledger::TokenConfig;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::output::OutputFormat;
use crate::script::{Script, ScriptRunner};

/// Run command executor.
pub struct RunCommand {
    config: TokenConfig,
}

impl RunCommand {
    /// Create a run command deploying ledgers with `config`.
    #[must_use]
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Load the script, apply every step and print the results.
    ///
    /// # Errors
    ///
    /// Returns an error if the script is invalid, deployment fails or output
    /// fails. With `--fail-fast`, a rejected step is still printed along with
    /// the summary before [`CliError::StepFailed`] is returned.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        args: &RunArgs,
    ) -> Result<(), CliError> {
        let script = Script::load(&args.script, &self.config)?;
        let mut runner = ScriptRunner::deploy(&script, &self.config)?;
        info!(
            owner = %script.owner,
            contract = %runner.token().contract_address(),
            steps = script.steps.len(),
            "running script"
        );

        let mut failed = 0usize;
        let mut halted = None;
        for (i, step) in script.steps.iter().enumerate() {
            let index = i + 1;
            let (report, rejection) = runner.execute(index, step);
            format.write_line(writer, &report)?;
            if let Some(source) = rejection {
                failed += 1;
                if args.fail_fast {
                    halted = Some(CliError::StepFailed {
                        index,
                        op: report.op,
                        source,
                    });
                    break;
                }
            }
        }

        let summary = runner.summary();
        if format.is_json() {
            format.write_line(writer, &summary)?;
        } else {
            format.write(writer, &summary)?;
        }
        info!(steps = script.steps.len(), failed, "script finished");
        match halted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use std::io::Write as _;
    use std::path::PathBuf;

    const OWNER: &str = "0x1111111111111111111111111111111111111111";

    fn script_file(steps: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "owner": "{OWNER}", "steps": {steps} }}"#).expect("write");
        file
    }

    fn args(path: PathBuf, fail_fast: bool) -> RunArgs {
        RunArgs {
            script: path,
            fail_fast,
        }
    }

    #[test]
    fn test_json_output_one_line_per_step_plus_summary() {
        let file = script_file(
            r#"[
                { "caller": "@owner", "call": { "op": "mint", "to": "@owner", "amount": "1" } },
                { "caller": "@contract", "call": { "op": "claim" } }
            ]"#,
        );
        let mut out = Vec::new();
        RunCommand::new(TokenConfig::default())
            .execute(
                &mut out,
                &OutputFormat::new(Format::Json),
                &args(file.path().to_path_buf(), false),
            )
            .expect("run");

        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let summary: serde_json::Value = serde_json::from_str(lines[2]).expect("summary json");
        assert_eq!(summary["total_supply"], "1001");
    }

    #[test]
    fn test_fail_fast_stops() {
        let file = script_file(
            r#"[
                { "caller": "0x2222222222222222222222222222222222222222", "call": { "op": "withdraw" } },
                { "caller": "@owner", "call": { "op": "set_cooldown", "seconds": 1 } }
            ]"#,
        );
        let mut out = Vec::new();
        let result = RunCommand::new(TokenConfig::default()).execute(
            &mut out,
            &OutputFormat::default(),
            &args(file.path().to_path_buf(), true),
        );
        assert!(matches!(result, Err(CliError::StepFailed { index: 1, .. })));
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("withdraw"));
        assert!(text.contains("FAILED"));
        assert!(!text.contains("set_cooldown"));
        assert!(text.contains("Ledger Summary"));
    }
}
