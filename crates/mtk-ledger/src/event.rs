//! Ledger notifications, the event log, and history replay.
//!
//! This module provides:
//! - [`Event`]: the notifications emitted by successful operations
//! - [`EventLog`]: the ordered, sequence-numbered log with live streaming
//! - [`History`]: tables rebuilt purely by replaying the log

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::address::Address;
use crate::amount::Amount;
use crate::clock::Timestamp;
use crate::error::{LedgerError, Result};

/// Default capacity of the live event channel.
pub const DEFAULT_STREAM_BUFFER: usize = 1024;

/// A notification emitted by a successful ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Tokens moved between accounts. Issuance uses the zero address as `from`.
    Transfer {
        /// Debited account.
        from: Address,
        /// Credited account.
        to: Address,
        /// Amount moved.
        amount: Amount,
    },
    /// An allowance was set.
    Approval {
        /// Account whose tokens may be spent.
        owner: Address,
        /// Account allowed to spend.
        spender: Address,
        /// New allowance.
        amount: Amount,
    },
    /// Tokens were bought with native currency.
    TokensPurchased {
        /// Buyer.
        buyer: Address,
        /// Native value paid.
        paid_value: Amount,
        /// Tokens delivered.
        token_amount: Amount,
    },
}

impl Event {
    /// Short name of the event kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
            Self::TokensPurchased { .. } => "TokensPurchased",
        }
    }
}

/// An event with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Sequence number, starting at 1 and increasing by one per event.
    pub seq: u64,
    /// Time of the operation that emitted the event.
    pub timestamp: Timestamp,
    /// The event itself.
    #[serde(flatten)]
    pub event: Event,
}

/// Append-only event log with a live broadcast channel.
#[derive(Debug)]
pub struct EventLog {
    records: Vec<EventRecord>,
    broadcast: broadcast::Sender<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_STREAM_BUFFER)
    }

    /// Create an empty log whose live channel holds `buffer` events.
    #[must_use]
    pub fn with_buffer(buffer: usize) -> Self {
        let (broadcast, _) = broadcast::channel(buffer.max(1));
        Self {
            records: Vec::new(),
            broadcast,
        }
    }

    /// Append the events of one operation and return their records.
    pub fn append(&mut self, events: Vec<Event>, timestamp: Timestamp) -> Vec<EventRecord> {
        let first = self.next_seq();
        let appended: Vec<EventRecord> = events
            .into_iter()
            .zip(first..)
            .map(|(event, seq)| EventRecord {
                seq,
                timestamp,
                event,
            })
            .collect();

        for record in &appended {
            // No subscribers is not an error.
            let _ = self.broadcast.send(record.clone());
        }
        self.records.extend(appended.iter().cloned());
        appended
    }

    /// All records from inception.
    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number strictly greater than `seq`.
    #[must_use]
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq <= seq);
        &self.records[start..]
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subscribe to events appended from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.broadcast.subscribe()
    }

    fn next_seq(&self) -> u64 {
        self.records.last().map_or(1, |r| r.seq + 1)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Ledger tables reconstructed from the event log alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    /// Non-zero balances.
    pub balances: BTreeMap<Address, Amount>,
    /// Non-zero allowances keyed by (owner, spender).
    pub allowances: BTreeMap<(Address, Address), Amount>,
    /// Total issued supply.
    pub total_supply: Amount,
    /// Native value paid across all purchases.
    pub total_paid: Amount,
    /// Tokens delivered across all purchases.
    pub total_purchased: Amount,
    /// Number of purchases.
    pub purchases: u64,
}

impl History {
    /// Replay records in order.
    ///
    /// # Errors
    ///
    /// Returns error if the records describe an impossible history (a debit
    /// below zero or an overflowing total).
    pub fn replay<'a>(records: impl IntoIterator<Item = &'a EventRecord>) -> Result<Self> {
        let mut history = Self::default();
        for record in records {
            history.apply(&record.event)?;
        }
        Ok(history)
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns error if the event cannot follow the current state.
    pub fn apply(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Transfer { from, to, amount } => {
                if from.is_zero() {
                    self.total_supply = self
                        .total_supply
                        .checked_add(*amount)
                        .ok_or_else(|| LedgerError::overflow("replay issuance"))?;
                } else {
                    let have = self.balances.get(from).copied().unwrap_or_default();
                    let remaining =
                        have.checked_sub(*amount)
                            .ok_or(LedgerError::InsufficientBalance {
                                account: *from,
                                have,
                                need: *amount,
                            })?;
                    Self::set_entry(&mut self.balances, *from, remaining);
                }
                let credited = self
                    .balances
                    .get(to)
                    .copied()
                    .unwrap_or_default()
                    .checked_add(*amount)
                    .ok_or_else(|| LedgerError::overflow("replay transfer"))?;
                Self::set_entry(&mut self.balances, *to, credited);
            }
            Event::Approval {
                owner,
                spender,
                amount,
            } => {
                Self::set_entry(&mut self.allowances, (*owner, *spender), *amount);
            }
            Event::TokensPurchased {
                paid_value,
                token_amount,
                ..
            } => {
                self.total_paid = self
                    .total_paid
                    .checked_add(*paid_value)
                    .ok_or_else(|| LedgerError::overflow("replay purchase value"))?;
                self.total_purchased = self
                    .total_purchased
                    .checked_add(*token_amount)
                    .ok_or_else(|| LedgerError::overflow("replay purchase tokens"))?;
                self.purchases += 1;
            }
        }
        Ok(())
    }

    fn set_entry<K: Ord>(map: &mut BTreeMap<K, Amount>, key: K, value: Amount) {
        if value.is_zero() {
            map.remove(&key);
        } else {
            map.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(from: Address, to: Address, tokens: u64) -> Event {
        Event::Transfer {
            from,
            to,
            amount: Amount::from_tokens(tokens),
        }
    }

    #[test]
    fn test_append_assigns_consecutive_sequence_numbers() {
        let mut log = EventLog::new();
        let a = Address::random();
        let first = log.append(vec![transfer(Address::ZERO, a, 10)], 5);
        let second = log.append(
            vec![transfer(a, Address::random(), 1), transfer(a, Address::random(), 2)],
            6,
        );

        assert_eq!(first[0].seq, 1);
        assert_eq!(second[0].seq, 2);
        assert_eq!(second[1].seq, 3);
        assert_eq!(second[1].timestamp, 6);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_since_returns_tail() {
        let mut log = EventLog::new();
        let a = Address::random();
        for _ in 0..5 {
            log.append(vec![transfer(Address::ZERO, a, 1)], 0);
        }
        assert_eq!(log.since(0).len(), 5);
        assert_eq!(log.since(3).len(), 2);
        assert_eq!(log.since(3)[0].seq, 4);
        assert!(log.since(5).is_empty());
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn test_subscribe_receives_new_events() {
        let mut log = EventLog::new();
        let mut rx = log.subscribe();
        let a = Address::random();
        log.append(vec![transfer(Address::ZERO, a, 3)], 1);

        let received = rx.try_recv().expect("event delivered");
        assert_eq!(received.seq, 1);
        assert_eq!(received.event, transfer(Address::ZERO, a, 3));
    }

    #[test]
    fn test_append_without_subscribers() {
        let mut log = EventLog::with_buffer(0);
        log.append(vec![transfer(Address::ZERO, Address::random(), 1)], 0);
        assert!(!log.is_empty());
    }

    #[test]
    fn test_replay_mint_and_transfer() {
        let mut log = EventLog::new();
        let (a, b) = (Address::random(), Address::random());
        log.append(vec![transfer(Address::ZERO, a, 100)], 0);
        log.append(vec![transfer(a, b, 40)], 0);

        let history = History::replay(log.records()).expect("replay");
        assert_eq!(history.total_supply, Amount::from_tokens(100));
        assert_eq!(history.balances.get(&a), Some(&Amount::from_tokens(60)));
        assert_eq!(history.balances.get(&b), Some(&Amount::from_tokens(40)));
    }

    #[test]
    fn test_replay_approval_overwrites() {
        let (owner, spender) = (Address::random(), Address::random());
        let mut history = History::default();
        for tokens in [10, 3] {
            history
                .apply(&Event::Approval {
                    owner,
                    spender,
                    amount: Amount::from_tokens(tokens),
                })
                .expect("apply");
        }
        assert_eq!(
            history.allowances.get(&(owner, spender)),
            Some(&Amount::from_tokens(3))
        );
    }

    #[test]
    fn test_replay_rejects_impossible_debit() {
        let event = transfer(Address::random(), Address::random(), 1);
        let result = History::default().apply(&event);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_replay_zero_transfer_keeps_tables_clean() {
        let (a, b) = (Address::random(), Address::random());
        let mut history = History::default();
        history.apply(&transfer(a, b, 0)).expect("zero transfer");
        assert!(history.balances.is_empty());
    }

    #[test]
    fn test_record_serialization_is_flat() {
        let record = EventRecord {
            seq: 7,
            timestamp: 42,
            event: Event::TokensPurchased {
                buyer: Address::ZERO,
                paid_value: Amount::from_tokens(1),
                token_amount: Amount::from_tokens(1000),
            },
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["event"], "tokens_purchased");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["token_amount"], "1000");

        let parsed: EventRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, record);
    }
}
