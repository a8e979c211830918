//! Account balance effects of lifecycle transitions.
//!
//! Posting applies an entry's lines to running account balances; cancelling or
//! resetting a posted entry reverts them; reversing applies the mirrored
//! reversal entry. The effect is handed to the persistence collaborator, which
//! commits it atomically with the entry's status change.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, JournalEntryId};

use super::types::JournalEntry;

/// Debit/credit movement for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDelta {
    /// The affected account.
    pub account_id: AccountId,
    /// Debit movement.
    pub debit: Decimal,
    /// Credit movement.
    pub credit: Decimal,
}

/// The per-account movements caused by one transition of one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEffect {
    /// The entry whose transition caused the movement.
    pub entry_id: JournalEntryId,
    /// Movements grouped by account, ordered by account id.
    pub deltas: Vec<AccountDelta>,
}

impl BalanceEffect {
    /// An effect that moves nothing.
    #[must_use]
    pub fn none(entry_id: JournalEntryId) -> Self {
        Self {
            entry_id,
            deltas: Vec::new(),
        }
    }

    /// The effect of posting `entry`.
    #[must_use]
    pub fn apply(entry: &JournalEntry) -> Self {
        Self::from_lines(entry, false)
    }

    /// The effect of undoing a previous posting of `entry`.
    #[must_use]
    pub fn revert(entry: &JournalEntry) -> Self {
        Self::from_lines(entry, true)
    }

    fn from_lines(entry: &JournalEntry, swap: bool) -> Self {
        let mut grouped: BTreeMap<AccountId, (Decimal, Decimal)> = BTreeMap::new();
        for line in &entry.lines {
            let (debit, credit) = if swap {
                (line.credit_amount, line.debit_amount)
            } else {
                (line.debit_amount, line.credit_amount)
            };
            let slot = grouped.entry(line.account_id).or_default();
            slot.0 += debit;
            slot.1 += credit;
        }

        Self {
            entry_id: entry.id,
            deltas: grouped
                .into_iter()
                .map(|(account_id, (debit, credit))| AccountDelta {
                    account_id,
                    debit,
                    credit,
                })
                .collect(),
        }
    }

    /// Returns true if the effect moves nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Running debit/credit totals of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Creates an empty balance.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Applies a movement.
    pub fn apply(&mut self, delta: &AccountDelta) {
        self.debit_total += delta.debit;
        self.credit_total += delta.credit;
    }

    /// Net debit balance (debits minus credits).
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}
