//! CLI error types.

use mtk_ledger::LedgerError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(LedgerError),

    /// Malformed script.
    #[error("script error: {0}")]
    Script(String),

    /// A step failed under `--fail-fast`.
    #[error("step {index} ({op}) failed: {source}")]
    StepFailed {
        /// One-based step number.
        index: usize,
        /// Operation name.
        op: &'static str,
        /// Ledger rejection.
        #[source]
        source: LedgerError,
    },

    /// Ledger error outside any step (deployment).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a script error.
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script(message.into())
    }
}
