//! Scripted ledger runs.
//!
//! A script names the owner and lists the calls to apply, in order:
//!
//! ```json
//! {
//!   "owner": "0x1111111111111111111111111111111111111111",
//!   "steps": [
//!     { "caller": "@owner", "at": 1000, "call": { "op": "transfer", "to": "@contract", "amount": "500" } },
//!     { "caller": "0x2222222222222222222222222222222222222222", "call": { "op": "claim" } }
//!   ]
//! }
//! ```
//!
//! `@owner` and `@contract` stand for the owner and the ledger's contract
//! account wherever a string is expected. `at` moves the ledger clock before
//! the step runs.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use mtk_ledger::{
    Address, Amount, Call, EventRecord, LedgerError, ManualClock, RecordingTransfer, Timestamp,
    Token, TokenConfig,
};

use crate::error::CliError;

/// Placeholder for the owner address.
pub const OWNER_ALIAS: &str = "@owner";

/// Placeholder for the contract address.
pub const CONTRACT_ALIAS: &str = "@contract";

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Ledger owner.
    pub owner: Address,
    /// Clock reading at deployment.
    #[serde(default)]
    pub start: Timestamp,
    /// Calls to apply.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One call in a script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Identity making the call.
    pub caller: Address,
    /// Clock reading for this step; the clock is left alone when absent.
    #[serde(default)]
    pub at: Option<Timestamp>,
    /// The call itself.
    pub call: Call,
}

impl Script {
    /// Read a script file, resolving aliases against `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>, config: &TokenConfig) -> Result<Self, CliError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let script = Self::from_json(&contents, config)?;
        debug!(path = %path.display(), steps = script.steps.len(), "loaded script");
        Ok(script)
    }

    /// Parse a script, resolving aliases against `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the owner is missing.
    pub fn from_json(json: &str, config: &TokenConfig) -> Result<Self, CliError> {
        let mut value: Value = serde_json::from_str(json)
            .map_err(|e| CliError::script(format!("invalid JSON: {e}")))?;

        let owner = value
            .get("owner")
            .and_then(Value::as_str)
            .ok_or_else(|| CliError::script("missing \"owner\""))?
            .parse::<Address>()
            .map_err(|e| CliError::script(format!("owner: {e}")))?;
        let contract = Address::derive(&owner, &config.symbol);

        resolve_aliases(&mut value, &owner.to_string(), &contract.to_string());
        serde_json::from_value(value).map_err(|e| CliError::script(e.to_string()))
    }
}

fn resolve_aliases(value: &mut Value, owner: &str, contract: &str) {
    match value {
        Value::String(s) if s.as_str() == OWNER_ALIAS => *s = owner.to_string(),
        Value::String(s) if s.as_str() == CONTRACT_ALIAS => *s = contract.to_string(),
        Value::Array(items) => items
            .iter_mut()
            .for_each(|item| resolve_aliases(item, owner, contract)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|item| resolve_aliases(item, owner, contract)),
        _ => {}
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// One-based step number.
    pub index: usize,
    /// Identity that made the call.
    pub caller: Address,
    /// Operation name.
    pub op: &'static str,
    /// Clock reading when the step ran.
    pub at: Timestamp,
    /// Events emitted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventRecord>,
    /// Native value paid out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<Amount>,
    /// Error kind, if the step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    /// Error message, if the step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepReport {
    /// Whether the step succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Ledger state after a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Token symbol.
    pub symbol: String,
    /// Owner identity.
    pub owner: Address,
    /// Contract account.
    pub contract: Address,
    /// Total issued supply.
    pub total_supply: Amount,
    /// Native currency held by the ledger.
    pub reserve: Amount,
    /// Native currency paid out to the owner.
    pub withdrawn: Amount,
    /// Current exchange rate.
    pub tokens_per_unit: u64,
    /// Events emitted since deployment.
    pub event_count: usize,
    /// Non-zero balances.
    pub balances: BTreeMap<Address, Amount>,
}

/// A deployed ledger driven by a script.
#[derive(Debug)]
pub struct ScriptRunner {
    token: Token,
    clock: ManualClock,
    rail: RecordingTransfer,
}

impl ScriptRunner {
    /// Deploy a ledger for `script` with `config`.
    ///
    /// # Errors
    ///
    /// Returns error if deployment fails.
    pub fn deploy(script: &Script, config: &TokenConfig) -> Result<Self, CliError> {
        let clock = ManualClock::new(script.start);
        let token = Token::with_clock(script.owner, config, Arc::new(clock.clone()))?;
        Ok(Self {
            token,
            clock,
            rail: RecordingTransfer::new(),
        })
    }

    /// The ledger being driven.
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Apply one step. Ledger rejections are reported, not returned.
    pub fn apply(&mut self, index: usize, step: &Step) -> StepReport {
        self.execute(index, step).0
    }

    /// Apply one step, handing back the ledger rejection alongside its report.
    pub fn execute(&mut self, index: usize, step: &Step) -> (StepReport, Option<LedgerError>) {
        if let Some(at) = step.at {
            self.clock.set(at);
        }
        let op = step.call.name();
        let at = self.token.now();
        let mut report = StepReport {
            index,
            caller: step.caller,
            op,
            at,
            events: Vec::new(),
            payout: None,
            error: None,
            message: None,
        };

        match self.token.dispatch(&step.caller, &step.call, &mut self.rail) {
            Ok(receipt) => {
                report.events = receipt.events;
                report.payout = receipt.payout;
                (report, None)
            }
            Err(err) => {
                if step.call.is_admin() {
                    warn!(index, op, caller = %step.caller, kind = err.kind(), "admin step rejected");
                } else {
                    debug!(index, op, kind = err.kind(), "step rejected");
                }
                report.error = Some(err.kind());
                report.message = Some(err.to_string());
                (report, Some(err))
            }
        }
    }

    /// Current ledger state.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let token = &self.token;
        let owner = token.owner();
        let summary = Summary {
            symbol: token.symbol().to_string(),
            owner,
            contract: token.contract_address(),
            total_supply: token.total_supply(),
            reserve: token.reserve(),
            withdrawn: self.rail.received_by(&owner),
            tokens_per_unit: token.tokens_per_unit(),
            event_count: token.events().len(),
            balances: token.balances(),
        };
        info!(
            events = summary.event_count,
            total_supply = %summary.total_supply,
            reserve = %summary.reserve,
            "run complete"
        );
        summary
    }
}
