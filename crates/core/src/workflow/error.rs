//! Lifecycle error types.
//!
//! Every failed transition is reported as a [`TransitionError`]. Only
//! [`TransitionError::Policy`] can be waived with `force`; everything else is
//! a hard failure.

use serde::Serialize;
use thiserror::Error;
use tally_shared::types::JournalEntryId;

use super::types::{OperationKind, PolicyWarning};
use crate::ledger::{EntryStatus, ValidationIssue};

/// Broad error category, as surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input or ledger invariant violated.
    Validation,
    /// The operation is not allowed from the current status.
    IllegalTransition,
    /// The entry changed concurrently.
    Conflict,
    /// The entry does not exist.
    NotFound,
    /// Advisory warnings require `force`.
    Policy,
    /// A collaborator failed.
    Collaborator,
}

/// Errors that can occur while validating or applying a transition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// A ledger invariant is violated.
    #[error(transparent)]
    Validation(#[from] ValidationIssue),

    /// The operation needs a non-empty reason.
    #[error("A reason is required to {0}")]
    ReasonRequired(OperationKind),

    /// The operation is not allowed from the entry's status.
    #[error("Cannot {operation} an entry in status {status}")]
    IllegalTransition {
        /// The attempted operation.
        operation: OperationKind,
        /// The entry's current status.
        status: EntryStatus,
    },

    /// The entry already has a reversal.
    #[error("Entry {0} has already been reversed")]
    AlreadyReversed(JournalEntryId),

    /// Reversal entries cannot be reversed.
    #[error("Entry {0} is itself a reversal")]
    ReversalOfReversal(JournalEntryId),

    /// Advisory warnings block the operation unless forced.
    #[error("Operation requires force: {}", warning_codes(.warnings))]
    Policy {
        /// The blocking warnings.
        warnings: Vec<PolicyWarning>,
    },

    /// The entry changed since it was read.
    #[error("Entry {entry_id} was modified concurrently: {message}")]
    Conflict {
        /// The entry.
        entry_id: JournalEntryId,
        /// Collaborator detail.
        message: String,
    },

    /// The entry does not exist.
    #[error("Entry {0} not found")]
    NotFound(JournalEntryId),

    /// A collaborator failed.
    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

fn warning_codes(warnings: &[PolicyWarning]) -> String {
    warnings
        .iter()
        .map(PolicyWarning::code)
        .collect::<Vec<_>>()
        .join(", ")
}

impl TransitionError {
    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::ReasonRequired(_) => ErrorKind::Validation,
            Self::IllegalTransition { .. }
            | Self::AlreadyReversed(_)
            | Self::ReversalOfReversal(_) => ErrorKind::IllegalTransition,
            Self::Policy { .. } => ErrorKind::Policy,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Collaborator(_) => ErrorKind::Collaborator,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::IllegalTransition => 400,
            ErrorKind::Policy => 422,
            ErrorKind::Conflict => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::Collaborator => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(issue) => issue.error_code(),
            Self::ReasonRequired(_) => "REASON_REQUIRED",
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::ReversalOfReversal(_) => "REVERSAL_OF_REVERSAL",
            Self::Policy { .. } => "POLICY_WARNING",
            Self::Conflict { .. } => "CONFLICT",
            Self::NotFound(_) => "ENTRY_NOT_FOUND",
            Self::Collaborator(_) => "COLLABORATOR_ERROR",
        }
    }

    /// Returns true if `force` would clear this error.
    #[must_use]
    pub fn is_force_resolvable(&self) -> bool {
        matches!(self, Self::Policy { .. })
    }

    /// Returns true if re-reading the entry and retrying may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
