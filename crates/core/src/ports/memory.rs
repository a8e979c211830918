//! In-memory collaborator implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tally_shared::types::{AccountId, JournalEntryId, PaymentTermId};

use super::{EntryCommit, EntryRepository, PaymentTermsRepository, StoreError};
use crate::ledger::{AccountBalance, JournalEntry};
use crate::terms::PaymentTerm;

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<JournalEntryId, JournalEntry>,
    terms: HashMap<PaymentTermId, PaymentTerm>,
    balances: HashMap<AccountId, AccountBalance>,
}

/// Entry, payment terms and account balance store held in memory.
///
/// Commits are serialized by a single lock, so a commit either lands
/// completely or not at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with entries and payment terms.
    #[must_use]
    pub fn with_data(entries: Vec<JournalEntry>, terms: Vec<PaymentTerm>) -> Self {
        let state = MemoryState {
            entries: entries.into_iter().map(|e| (e.id, e)).collect(),
            terms: terms.into_iter().map(|t| (t.id, t)).collect(),
            balances: HashMap::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Inserts or replaces an entry as-is.
    pub async fn insert_entry(&self, entry: JournalEntry) {
        self.state.lock().await.entries.insert(entry.id, entry);
    }

    /// Inserts or replaces payment terms.
    pub async fn insert_term(&self, term: PaymentTerm) {
        self.state.lock().await.terms.insert(term.id, term);
    }

    /// Returns a stored entry.
    pub async fn entry(&self, id: JournalEntryId) -> Option<JournalEntry> {
        self.state.lock().await.entries.get(&id).cloned()
    }

    /// Returns every stored entry.
    pub async fn entries(&self) -> Vec<JournalEntry> {
        self.state.lock().await.entries.values().cloned().collect()
    }

    /// Returns the running balance of an account.
    pub async fn balance(&self, account_id: AccountId) -> AccountBalance {
        self.state
            .lock()
            .await
            .balances
            .get(&account_id)
            .cloned()
            .unwrap_or_else(|| AccountBalance::new(account_id))
    }
}

#[async_trait]
impl EntryRepository for MemoryStore {
    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self.entry(id).await)
    }

    async fn commit(&self, commit: EntryCommit) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let id = commit.entry.id;

        let actual = state
            .entries
            .get(&id)
            .map(|stored| stored.version)
            .ok_or(StoreError::NotFound(id))?;
        if actual != commit.expected_version {
            return Err(StoreError::Conflict {
                expected: commit.expected_version,
                actual,
            });
        }

        let version = actual + 1;
        let mut entry = commit.entry;
        entry.version = version;
        state.entries.insert(id, entry);

        for created in commit.created_entries {
            state.entries.insert(created.id, created);
        }

        for delta in &commit.balance_effect.deltas {
            state
                .balances
                .entry(delta.account_id)
                .or_insert_with(|| AccountBalance::new(delta.account_id))
                .apply(delta);
        }

        Ok(version)
    }
}

#[async_trait]
impl PaymentTermsRepository for MemoryStore {
    async fn find_payment_term(&self, id: PaymentTermId) -> Result<Option<PaymentTerm>, StoreError> {
        Ok(self.state.lock().await.terms.get(&id).cloned())
    }
}
