//! Bulk operation result types.

use serde::Serialize;
use tally_shared::types::JournalEntryId;

use crate::ledger::JournalEntry;
use crate::workflow::{OperationKind, TransitionError};

/// Why one entry of a batch was skipped or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemError {
    /// The entry.
    pub entry_id: JournalEntryId,
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl BulkItemError {
    /// Creates an item error from an explicit code and message.
    #[must_use]
    pub fn new(entry_id: JournalEntryId, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entry_id,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an item error from a transition error.
    #[must_use]
    pub fn from_transition(entry_id: JournalEntryId, error: &TransitionError) -> Self {
        Self::new(entry_id, error.error_code(), error.to_string())
    }
}

/// Aggregated outcome of a bulk operation.
///
/// Every requested id lands in exactly one of `successful_ids`,
/// `failed_items` or `skipped_items`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResult {
    /// The operation that was run.
    pub operation: OperationKind,
    /// Number of ids requested.
    pub total_requested: usize,
    /// Number of entries transitioned.
    pub total_processed: usize,
    /// Number of entries skipped by validation.
    pub total_skipped: usize,
    /// Number of entries that failed while being applied.
    pub total_failed: usize,
    /// Transitioned entries, in request order.
    pub successful_ids: Vec<JournalEntryId>,
    /// Entries that failed while being applied.
    pub failed_items: Vec<BulkItemError>,
    /// Entries skipped by validation or cancellation.
    pub skipped_items: Vec<BulkItemError>,
    /// Reversal entries created; only present for reverse operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_reversal_entries: Option<Vec<JournalEntry>>,
    /// True if the run was cancelled before every item was attempted.
    pub cancelled: bool,
}

impl BulkResult {
    pub(crate) fn new(operation: OperationKind, total_requested: usize) -> Self {
        Self {
            operation,
            total_requested,
            total_processed: 0,
            total_skipped: 0,
            total_failed: 0,
            successful_ids: Vec::new(),
            failed_items: Vec::new(),
            skipped_items: Vec::new(),
            created_reversal_entries: (operation == OperationKind::Reverse).then(Vec::new),
            cancelled: false,
        }
    }

    pub(crate) fn succeed(&mut self, entry_id: JournalEntryId, created: Option<JournalEntry>) {
        self.total_processed += 1;
        self.successful_ids.push(entry_id);
        if let (Some(created), Some(reversals)) = (created, self.created_reversal_entries.as_mut()) {
            reversals.push(created);
        }
    }

    pub(crate) fn skip(&mut self, item: BulkItemError) {
        self.total_skipped += 1;
        self.skipped_items.push(item);
    }

    pub(crate) fn fail(&mut self, item: BulkItemError) {
        self.total_failed += 1;
        self.failed_items.push(item);
    }

    /// Returns true if every requested entry was transitioned.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.total_processed == self.total_requested
    }
}
