//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use serde::Serialize;

use mtk_ledger::{Event, TokenConfig};

use crate::cli::Format;
use crate::error::CliError;
use crate::script::{StepReport, Summary};

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a value as a pretty JSON document or a table.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }

    /// Write a value as a single JSON line or a table.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_line<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as human-readable text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Generic message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}

impl TableDisplay for TokenConfig {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Token Configuration")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Name:             {}", self.name)?;
        writeln!(writer, "Symbol:           {}", self.symbol)?;
        writeln!(writer, "Decimals:         {}", self.decimals)?;
        writeln!(writer, "Initial Supply:   {} {}", self.initial_supply, self.symbol)?;
        writeln!(writer, "Contract Funding: {} {}", self.contract_funding, self.symbol)?;
        writeln!(writer)?;
        writeln!(writer, "Exchange")?;
        writeln!(writer, "  Rate:           {} {} per unit", self.tokens_per_unit, self.symbol)?;
        writeln!(writer)?;
        writeln!(writer, "Faucet")?;
        writeln!(writer, "  Amount:         {} {}", self.faucet_amount, self.symbol)?;
        writeln!(writer, "  Cooldown:       {}", format_duration(self.claim_cooldown_secs))?;
        Ok(())
    }
}

impl TableDisplay for StepReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match self.error {
            None => writeln!(writer, "#{:<3} {:<18} ok     t={}", self.index, self.op, self.at)?,
            Some(kind) => writeln!(
                writer,
                "#{:<3} {:<18} FAILED t={}  {kind}: {}",
                self.index,
                self.op,
                self.at,
                self.message.as_deref().unwrap_or_default()
            )?,
        }
        for record in &self.events {
            writeln!(writer, "       [{}] {}", record.seq, describe_event(&record.event))?;
        }
        if let Some(payout) = self.payout {
            writeln!(writer, "       payout {payout} to owner")?;
        }
        Ok(())
    }
}

impl TableDisplay for Summary {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer)?;
        writeln!(writer, "Ledger Summary")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Owner:            {}", self.owner)?;
        writeln!(writer, "Contract:         {}", self.contract)?;
        writeln!(writer, "Total Supply:     {} {}", self.total_supply, self.symbol)?;
        writeln!(writer, "Rate:             {} {} per unit", self.tokens_per_unit, self.symbol)?;
        writeln!(writer, "Reserve:          {}", self.reserve)?;
        writeln!(writer, "Withdrawn:        {}", self.withdrawn)?;
        writeln!(writer, "Events:           {}", self.event_count)?;
        writeln!(writer)?;
        if self.balances.is_empty() {
            writeln!(writer, "No balances.")?;
            return Ok(());
        }
        writeln!(writer, "{:<44} BALANCE", "ACCOUNT")?;
        writeln!(writer, "{}", "─".repeat(64))?;
        for (account, balance) in &self.balances {
            writeln!(writer, "{:<44} {balance}", account.to_string())?;
        }
        Ok(())
    }
}

/// One-line description of an event.
#[must_use]
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Transfer { from, to, amount } if from.is_zero() => {
            format!("Transfer (mint) {amount} -> {to}")
        }
        Event::Transfer { from, to, amount } => format!("Transfer {amount} {from} -> {to}"),
        Event::Approval {
            owner,
            spender,
            amount,
        } => format!("Approval {owner} allows {spender} {amount}"),
        Event::TokensPurchased {
            buyer,
            paid_value,
            token_amount,
        } => format!("TokensPurchased {buyer} paid {paid_value} for {token_amount}"),
    }
}

fn format_duration(secs: u64) -> String {
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else {
        format!("{secs}s")
    }
}
