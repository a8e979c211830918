//! Collaborator ports.
//!
//! The lifecycle core owns no storage. Entries, payment terms, account
//! balances and event delivery live behind these traits:
//! - `EntryRepository` - fetch entries and commit transitions atomically
//! - `PaymentTermsRepository` - fetch payment terms
//! - `EventPublisher` - forward domain events to a dispatcher

pub mod events;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use tally_shared::types::{JournalEntryId, PaymentTermId};

use crate::ledger::{BalanceEffect, JournalEntry};
use crate::terms::PaymentTerm;
use crate::workflow::{DomainEvent, TransitionError};

pub use events::ChannelPublisher;
pub use memory::MemoryStore;

/// Errors reported by collaborator implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The stored entry changed since it was read.
    #[error("Version conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Version read before the transition.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// The entry does not exist.
    #[error("Entry {0} not found")]
    NotFound(JournalEntryId),

    /// The backing store or channel is unavailable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "CONFLICT",
            Self::NotFound(_) => "ENTRY_NOT_FOUND",
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Maps the error into the lifecycle error space.
    #[must_use]
    pub fn into_transition_error(self, entry_id: JournalEntryId) -> TransitionError {
        match self {
            Self::Conflict { .. } => TransitionError::Conflict {
                entry_id,
                message: self.to_string(),
            },
            Self::NotFound(id) => TransitionError::NotFound(id),
            Self::Unavailable(message) => TransitionError::Collaborator(message),
        }
    }
}

/// Everything one transition writes, committed atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryCommit {
    /// The updated entry.
    pub entry: JournalEntry,
    /// Version the entry had when it was read.
    pub expected_version: u64,
    /// Entries created by the transition (reversals).
    pub created_entries: Vec<JournalEntry>,
    /// Account balance movements.
    pub balance_effect: BalanceEffect,
}

/// Entry storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Fetches an entry by id.
    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, StoreError>;

    /// Commits a transition and returns the entry's new version.
    ///
    /// Implementations must reject the commit with [`StoreError::Conflict`]
    /// when the stored version differs from `expected_version`, and must
    /// apply the entry, the created entries and the balance effect together
    /// or not at all.
    async fn commit(&self, commit: EntryCommit) -> Result<u64, StoreError>;
}

/// Payment terms storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentTermsRepository: Send + Sync {
    /// Fetches payment terms by id.
    async fn find_payment_term(&self, id: PaymentTermId) -> Result<Option<PaymentTerm>, StoreError>;
}

/// Domain event sink.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes an event that has already been committed.
    async fn publish(&self, event: DomainEvent) -> Result<(), StoreError>;
}
