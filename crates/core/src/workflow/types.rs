//! Lifecycle operations, advisory warnings and transition outcomes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{EventId, JournalEntryId};

use super::error::TransitionError;
use crate::ledger::{BalanceEffect, JournalEntry};

/// The kind of a lifecycle operation, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Draft → Pending.
    Submit,
    /// Draft/Pending → Approved.
    Approve,
    /// Approved → Posted.
    Post,
    /// Any non-cancelled status → Cancelled.
    Cancel,
    /// Posted entry gets a mirrored reversal entry.
    Reverse,
    /// Approved/Posted/Cancelled → Draft.
    ResetToDraft,
}

impl OperationKind {
    /// Every operation, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Submit,
        Self::Approve,
        Self::Post,
        Self::Cancel,
        Self::Reverse,
        Self::ResetToDraft,
    ];

    /// Returns the string representation of the operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Post => "post",
            Self::Cancel => "cancel",
            Self::Reverse => "reverse",
            Self::ResetToDraft => "reset_to_draft",
        }
    }

    /// Parses an operation from a string (case-insensitive, `-` or `_`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "submit" => Some(Self::Submit),
            "approve" => Some(Self::Approve),
            "post" => Some(Self::Post),
            "cancel" => Some(Self::Cancel),
            "reverse" => Some(Self::Reverse),
            "reset_to_draft" => Some(Self::ResetToDraft),
            _ => None,
        }
    }

    /// Returns true if the operation needs a non-empty reason.
    #[must_use]
    pub fn requires_reason(&self) -> bool {
        matches!(self, Self::Cancel | Self::Reverse | Self::ResetToDraft)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A requested lifecycle operation with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operation {
    /// Submit a draft for approval.
    Submit,
    /// Approve a draft or pending entry.
    Approve {
        /// Optional approval note.
        #[serde(default)]
        reason: Option<String>,
    },
    /// Post an approved entry.
    Post {
        /// Optional posting note.
        #[serde(default)]
        reason: Option<String>,
    },
    /// Cancel an entry.
    Cancel {
        /// Why the entry is cancelled.
        reason: String,
        /// Waive advisory warnings.
        #[serde(default)]
        force: bool,
    },
    /// Reverse a posted entry.
    Reverse {
        /// Why the entry is reversed.
        reason: String,
        /// Accounting date of the reversal entry.
        reversal_date: NaiveDate,
        /// Waive advisory warnings.
        #[serde(default)]
        force: bool,
    },
    /// Send an entry back to draft.
    ResetToDraft {
        /// Why the entry is reset.
        reason: String,
        /// Waive advisory warnings.
        #[serde(default)]
        force: bool,
    },
}

impl Operation {
    /// Returns the operation kind.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Submit => OperationKind::Submit,
            Self::Approve { .. } => OperationKind::Approve,
            Self::Post { .. } => OperationKind::Post,
            Self::Cancel { .. } => OperationKind::Cancel,
            Self::Reverse { .. } => OperationKind::Reverse,
            Self::ResetToDraft { .. } => OperationKind::ResetToDraft,
        }
    }

    /// Returns the trimmed reason, if a non-blank one was given.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        let reason = match self {
            Self::Submit => None,
            Self::Approve { reason } | Self::Post { reason } => reason.as_deref(),
            Self::Cancel { reason, .. }
            | Self::Reverse { reason, .. }
            | Self::ResetToDraft { reason, .. } => Some(reason.as_str()),
        };
        reason.map(str::trim).filter(|r| !r.is_empty())
    }

    /// Returns true if advisory warnings should be waived.
    #[must_use]
    pub fn force(&self) -> bool {
        match self {
            Self::Cancel { force, .. }
            | Self::Reverse { force, .. }
            | Self::ResetToDraft { force, .. } => *force,
            Self::Submit | Self::Approve { .. } | Self::Post { .. } => false,
        }
    }
}

/// An advisory condition that blocks a transition unless forced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyWarning {
    /// A settleable line of a posted entry has already been partly paid.
    PartiallySettled {
        /// Zero-based line index.
        line: usize,
        /// The line amount.
        original_amount: Decimal,
        /// The amount still open.
        outstanding_amount: Decimal,
    },
    /// The entry being reset has been posted to the ledger.
    PostedReset,
    /// The reversal would be dated before the entry it reverses.
    ReversalBeforeEntryDate {
        /// Date of the original entry.
        entry_date: NaiveDate,
        /// Requested reversal date.
        reversal_date: NaiveDate,
    },
}

impl PolicyWarning {
    /// Returns the warning code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PartiallySettled { .. } => "PARTIALLY_SETTLED",
            Self::PostedReset => "POSTED_RESET",
            Self::ReversalBeforeEntryDate { .. } => "REVERSAL_BEFORE_ENTRY_DATE",
        }
    }
}

impl fmt::Display for PolicyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartiallySettled {
                line,
                original_amount,
                outstanding_amount,
            } => write!(
                f,
                "Line {line} is partially settled ({outstanding_amount} of {original_amount} outstanding)"
            ),
            Self::PostedReset => write!(f, "Entry is posted"),
            Self::ReversalBeforeEntryDate {
                entry_date,
                reversal_date,
            } => write!(f, "Reversal date {reversal_date} is before entry date {entry_date}"),
        }
    }
}

/// Dry-run result of checking one operation against one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionCheck {
    /// Hard failures; no override waives them.
    pub errors: Vec<TransitionError>,
    /// Advisory warnings; waived by `force`.
    pub warnings: Vec<PolicyWarning>,
}

impl TransitionCheck {
    /// Returns true if nothing blocks the transition.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Collapses the check into a single outcome.
    ///
    /// Hard errors always win. Warnings block unless `force` is set, in which
    /// case they are returned as waived.
    ///
    /// # Errors
    ///
    /// Returns the first hard error, or [`TransitionError::Policy`] when
    /// warnings remain and `force` is false.
    pub fn into_result(mut self, force: bool) -> Result<Vec<PolicyWarning>, TransitionError> {
        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }
        if !self.warnings.is_empty() && !force {
            return Err(TransitionError::Policy {
                warnings: self.warnings,
            });
        }
        Ok(self.warnings)
    }
}

/// Domain event type, one per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryEventType {
    /// Entry submitted.
    Submitted,
    /// Entry approved.
    Approved,
    /// Entry posted.
    Posted,
    /// Entry cancelled.
    Cancelled,
    /// Entry reversed.
    Reversed,
    /// Entry reset to draft.
    ResetToDraft,
}

impl From<OperationKind> for EntryEventType {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Submit => Self::Submitted,
            OperationKind::Approve => Self::Approved,
            OperationKind::Post => Self::Posted,
            OperationKind::Cancel => Self::Cancelled,
            OperationKind::Reverse => Self::Reversed,
            OperationKind::ResetToDraft => Self::ResetToDraft,
        }
    }
}

/// Emitted for every applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Event id.
    pub id: EventId,
    /// What happened.
    pub event_type: EntryEventType,
    /// The entry the transition applied to.
    pub entry_id: JournalEntryId,
    /// Snapshot of the entry after the transition.
    pub entry: JournalEntry,
    /// Reason given with the operation.
    pub reason: Option<String>,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
}

/// Result of applying one operation to one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The updated entry.
    pub entry: JournalEntry,
    /// The event describing the transition.
    pub event: DomainEvent,
    /// Entry created by the transition (the reversal of a reverse).
    pub created_entry: Option<JournalEntry>,
    /// Account balance movements to commit with the entry.
    pub balance_effect: BalanceEffect,
    /// Advisory warnings that were waived by `force`.
    pub waived_warnings: Vec<PolicyWarning>,
}

impl TransitionOutcome {
    /// Stamps the committed version on the entry and its event snapshot.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.entry.version = version;
        self.event.entry.version = version;
        self
    }
}
