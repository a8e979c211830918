//! Double-entry journal entry model.
//!
//! This module implements the ledger side of the lifecycle core:
//! - Journal entries and their lines
//! - The balance invariant (debits equal credits within tolerance)
//! - Hard validation issues
//! - Account balance effects committed per transition

pub mod balance;
pub mod effect;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::BalanceValidator;
pub use effect::{AccountBalance, AccountDelta, BalanceEffect};
pub use types::{EntryStatus, EntryType, JournalEntry, JournalEntryLine};
pub use validation::{ValidationIssue, ValidationResult};
