//! Applies one lifecycle operation to many entries.
//!
//! A run has two passes:
//! 1. Dry run: every id is fetched and validated. Hard failures, unforced
//!    warnings and repeated ids are skipped; unknown ids fail.
//! 2. Apply: the remaining entries are transitioned one at a time, in request
//!    order. Each commit is atomic; a failing commit is recorded and the run
//!    moves on.

use std::collections::HashSet;
use std::sync::Arc;

use tally_shared::types::{JournalEntryId, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::BulkError;
use super::types::{BulkItemError, BulkResult};
use crate::ledger::JournalEntry;
use crate::ports::{EntryCommit, EntryRepository, EventPublisher};
use crate::workflow::{EntryLifecycleManager, Operation, PolicyWarning, TransitionError, TransitionOutcome};

/// Default upper bound on ids per request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Drives [`EntryLifecycleManager`] over stored entries.
pub struct BulkOperationOrchestrator {
    repository: Arc<dyn EntryRepository>,
    publisher: Arc<dyn EventPublisher>,
    manager: EntryLifecycleManager,
    max_batch_size: usize,
}

impl BulkOperationOrchestrator {
    /// Creates an orchestrator with the default lifecycle manager and batch limit.
    #[must_use]
    pub fn new(repository: Arc<dyn EntryRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            repository,
            publisher,
            manager: EntryLifecycleManager::new(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Replaces the lifecycle manager.
    #[must_use]
    pub fn with_manager(mut self, manager: EntryLifecycleManager) -> Self {
        self.manager = manager;
        self
    }

    /// Sets the maximum number of ids per request.
    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    async fn fetch(&self, entry_id: JournalEntryId) -> Result<JournalEntry, TransitionError> {
        self.repository
            .find_entry(entry_id)
            .await
            .map_err(|e| e.into_transition_error(entry_id))?
            .ok_or(TransitionError::NotFound(entry_id))
    }

    /// Validates `operation` against a stored entry without changing it.
    ///
    /// Returns the warnings `force` waived.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotFound`] for unknown ids, otherwise the
    /// lifecycle validation error.
    pub async fn validate_transition(
        &self,
        entry_id: JournalEntryId,
        operation: &Operation,
    ) -> Result<Vec<PolicyWarning>, TransitionError> {
        let entry = self.fetch(entry_id).await?;
        self.manager.validate(&entry, operation)
    }

    /// Applies `operation` to a stored entry, commits it and publishes the event.
    ///
    /// # Errors
    ///
    /// Returns the lifecycle error, or [`TransitionError::Conflict`] if the
    /// entry changed while the transition was being computed.
    pub async fn apply_transition(
        &self,
        entry_id: JournalEntryId,
        operation: &Operation,
        actor: UserId,
    ) -> Result<TransitionOutcome, TransitionError> {
        let entry = self.fetch(entry_id).await?;
        self.commit_transition(&entry, operation, actor).await
    }

    pub(super) async fn commit_transition(
        &self,
        entry: &JournalEntry,
        operation: &Operation,
        actor: UserId,
    ) -> Result<TransitionOutcome, TransitionError> {
        let outcome = self.manager.apply(entry, operation, actor)?;

        let version = self
            .repository
            .commit(EntryCommit {
                entry: outcome.entry.clone(),
                expected_version: entry.version,
                created_entries: outcome.created_entry.iter().cloned().collect(),
                balance_effect: outcome.balance_effect.clone(),
            })
            .await
            .map_err(|e| e.into_transition_error(entry.id))?;

        let outcome = outcome.with_version(version);
        if let Err(e) = self.publisher.publish(outcome.event.clone()).await {
            warn!(entry_id = %entry.id, error = %e, "Transition committed but event was not published");
        }

        Ok(outcome)
    }

    /// Runs `operation` over `entry_ids` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::BatchTooLarge`] if more ids than allowed are
    /// requested. Per-entry problems never abort the run.
    pub async fn run(
        &self,
        operation: &Operation,
        entry_ids: &[JournalEntryId],
        actor: UserId,
    ) -> Result<BulkResult, BulkError> {
        self.run_with_cancellation(operation, entry_ids, actor, &CancellationToken::new())
            .await
    }

    /// Like [`Self::run`], checking `cancel` before each entry is applied.
    ///
    /// Entries not yet applied when the token fires are skipped with code
    /// `CANCELLED`. An entry whose commit already happened is never undone.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::BatchTooLarge`] if more ids than allowed are
    /// requested.
    pub async fn run_with_cancellation(
        &self,
        operation: &Operation,
        entry_ids: &[JournalEntryId],
        actor: UserId,
        cancel: &CancellationToken,
    ) -> Result<BulkResult, BulkError> {
        if entry_ids.len() > self.max_batch_size {
            return Err(BulkError::BatchTooLarge {
                requested: entry_ids.len(),
                max: self.max_batch_size,
            });
        }

        let kind = operation.kind();
        let mut result = BulkResult::new(kind, entry_ids.len());

        info!(
            operation = %kind,
            requested = entry_ids.len(),
            force = operation.force(),
            "Starting bulk operation"
        );

        let mut seen = HashSet::with_capacity(entry_ids.len());
        let mut ready = Vec::with_capacity(entry_ids.len());

        for &entry_id in entry_ids {
            if !seen.insert(entry_id) {
                debug!(entry_id = %entry_id, "Skipping repeated id");
                result.skip(BulkItemError::new(
                    entry_id,
                    "DUPLICATE_ID",
                    "Entry appears more than once in the request",
                ));
                continue;
            }

            let entry = match self.fetch(entry_id).await {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(entry_id = %entry_id, error = %e, "Bulk item could not be loaded");
                    result.fail(BulkItemError::from_transition(entry_id, &e));
                    continue;
                }
            };

            match self.manager.validate(&entry, operation) {
                Ok(_) => ready.push(entry),
                Err(e) => {
                    debug!(entry_id = %entry_id, code = e.error_code(), "Skipping bulk item");
                    result.skip(BulkItemError::from_transition(entry_id, &e));
                }
            }
        }

        for (index, entry) in ready.iter().enumerate() {
            if cancel.is_cancelled() {
                result.cancelled = true;
                for remaining in &ready[index..] {
                    result.skip(BulkItemError::new(
                        remaining.id,
                        "CANCELLED",
                        "Bulk operation was cancelled",
                    ));
                }
                warn!(operation = %kind, skipped = result.total_skipped, "Bulk operation cancelled");
                break;
            }

            match self.commit_transition(entry, operation, actor).await {
                Ok(outcome) => result.succeed(entry.id, outcome.created_entry),
                Err(e) => {
                    warn!(entry_id = %entry.id, error = %e, "Bulk item failed");
                    result.fail(BulkItemError::from_transition(entry.id, &e));
                }
            }
        }

        info!(
            operation = %kind,
            processed = result.total_processed,
            skipped = result.total_skipped,
            failed = result.total_failed,
            "Bulk operation finished"
        );

        Ok(result)
    }
}
