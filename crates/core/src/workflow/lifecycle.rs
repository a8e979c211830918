//! The journal entry state machine.
//!
//! Valid transitions:
//! - Draft → Pending (submit)
//! - Draft/Pending → Approved (approve, entry must balance)
//! - Approved → Posted (post, entry must balance)
//! - Draft/Pending/Approved/Posted → Cancelled (cancel, reason required)
//! - Posted → Posted + new REVERSAL entry (reverse, reason required)
//! - Approved/Posted/Cancelled → Draft (reset to draft, reason required)

use chrono::Utc;
use tally_shared::types::{EventId, UserId};

use super::error::TransitionError;
use super::reversal::ReversalService;
use super::types::{
    DomainEvent, Operation, OperationKind, PolicyWarning, TransitionCheck, TransitionOutcome,
};
use crate::ledger::{BalanceEffect, BalanceValidator, EntryStatus, JournalEntry};

/// Owns the per-entry state machine.
///
/// The manager is pure: it never mutates the entry it is given and never
/// performs I/O. Every successful transition returns a new entry snapshot,
/// the domain event describing it, and the balance effect to commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryLifecycleManager {
    validator: BalanceValidator,
}

impl EntryLifecycleManager {
    /// Creates a manager with the standard balance tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager using a custom balance validator.
    #[must_use]
    pub fn with_validator(validator: BalanceValidator) -> Self {
        Self { validator }
    }

    /// Returns true if `operation` may start from `status`.
    ///
    /// This only checks the status table; reversal links and balance are
    /// checked by [`Self::check`].
    #[must_use]
    pub fn is_valid_transition(status: EntryStatus, operation: OperationKind) -> bool {
        use EntryStatus::{Approved, Cancelled, Draft, Pending, Posted};

        match operation {
            OperationKind::Submit => status == Draft,
            OperationKind::Approve => matches!(status, Draft | Pending),
            OperationKind::Post => status == Approved,
            OperationKind::Cancel => matches!(status, Draft | Pending | Approved | Posted),
            OperationKind::Reverse => status == Posted,
            OperationKind::ResetToDraft => matches!(status, Approved | Posted | Cancelled),
        }
    }

    /// Hard guards that do not depend on the operation payload.
    fn structural_errors(&self, entry: &JournalEntry, kind: OperationKind) -> Vec<TransitionError> {
        if !Self::is_valid_transition(entry.status, kind) {
            return vec![TransitionError::IllegalTransition {
                operation: kind,
                status: entry.status,
            }];
        }

        match kind {
            OperationKind::Approve | OperationKind::Post => self
                .validator
                .validate(entry)
                .errors
                .into_iter()
                .map(TransitionError::from)
                .collect(),
            OperationKind::Reverse if entry.is_reversal() => {
                vec![TransitionError::ReversalOfReversal(entry.id)]
            }
            OperationKind::Reverse if entry.is_reversed() => {
                vec![TransitionError::AlreadyReversed(entry.id)]
            }
            _ => Vec::new(),
        }
    }

    /// Advisory warnings for the operation.
    fn warnings(entry: &JournalEntry, operation: &Operation) -> Vec<PolicyWarning> {
        match operation {
            Operation::Cancel { .. } if entry.status == EntryStatus::Posted => entry
                .lines
                .iter()
                .enumerate()
                .filter(|(_, line)| line.is_partially_settled())
                .map(|(index, line)| PolicyWarning::PartiallySettled {
                    line: index,
                    original_amount: line.amount(),
                    outstanding_amount: line.outstanding(),
                })
                .collect(),
            Operation::ResetToDraft { .. } if entry.status == EntryStatus::Posted => {
                vec![PolicyWarning::PostedReset]
            }
            Operation::Reverse { reversal_date, .. } if *reversal_date < entry.entry_date => {
                vec![PolicyWarning::ReversalBeforeEntryDate {
                    entry_date: entry.entry_date,
                    reversal_date: *reversal_date,
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Balance movement of taking `entry` out of the ledger.
    ///
    /// Only a POSTED entry has moved balances, and a reversed one has already
    /// been neutralised by its posted reversal.
    fn withdrawal_effect(entry: &JournalEntry) -> BalanceEffect {
        if entry.status == EntryStatus::Posted && !entry.is_reversed() {
            BalanceEffect::revert(entry)
        } else {
            BalanceEffect::none(entry.id)
        }
    }

    /// Dry-runs `operation` against `entry` and reports every hard error and
    /// advisory warning found.
    #[must_use]
    pub fn check(&self, entry: &JournalEntry, operation: &Operation) -> TransitionCheck {
        let kind = operation.kind();
        let mut errors = Vec::new();

        if kind.requires_reason() && operation.reason().is_none() {
            errors.push(TransitionError::ReasonRequired(kind));
        }
        errors.extend(self.structural_errors(entry, kind));

        TransitionCheck {
            errors,
            warnings: Self::warnings(entry, operation),
        }
    }

    /// Validates `operation` against `entry`, honoring the operation's `force`.
    ///
    /// Returns the warnings that were waived.
    ///
    /// # Errors
    ///
    /// Returns the first hard error, or [`TransitionError::Policy`] when
    /// advisory warnings remain and the operation is not forced.
    pub fn validate(
        &self,
        entry: &JournalEntry,
        operation: &Operation,
    ) -> Result<Vec<PolicyWarning>, TransitionError> {
        self.check(entry, operation).into_result(operation.force())
    }

    /// Applies `operation` to `entry` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::validate`]. The input entry is never
    /// modified.
    pub fn apply(
        &self,
        entry: &JournalEntry,
        operation: &Operation,
        actor: UserId,
    ) -> Result<TransitionOutcome, TransitionError> {
        let waived_warnings = self.validate(entry, operation)?;
        let kind = operation.kind();
        let reason = operation.reason().map(str::to_string);
        let now = Utc::now();

        let mut updated = entry.clone();
        let mut created_entry = None;
        let mut balance_effect = BalanceEffect::none(entry.id);

        match operation {
            Operation::Submit => {
                updated.status = EntryStatus::Pending;
            }
            Operation::Approve { .. } => {
                updated.status = EntryStatus::Approved;
                updated.approved_by = Some(actor);
                updated.approved_at = Some(now);
            }
            Operation::Post { .. } => {
                updated.status = EntryStatus::Posted;
                updated.posted_by = Some(actor);
                updated.posted_at = Some(now);
                updated.locked = true;
                balance_effect = BalanceEffect::apply(&updated);
            }
            Operation::Cancel { .. } => {
                balance_effect = Self::withdrawal_effect(entry);
                updated.status = EntryStatus::Cancelled;
                updated.cancelled_by = Some(actor);
                updated.cancelled_at = Some(now);
                updated.status_reason.clone_from(&reason);
            }
            Operation::Reverse { reversal_date, .. } => {
                let reversal = ReversalService::create_reversal_entry(
                    entry,
                    reason.as_deref().unwrap_or_default(),
                    *reversal_date,
                    actor,
                    now,
                );
                updated.reversal_entry_id = Some(reversal.id);
                updated.status_reason.clone_from(&reason);
                balance_effect = BalanceEffect::apply(&reversal);
                created_entry = Some(reversal);
            }
            Operation::ResetToDraft { .. } => {
                balance_effect = Self::withdrawal_effect(entry);
                updated.status = EntryStatus::Draft;
                updated.approved_by = None;
                updated.approved_at = None;
                updated.posted_by = None;
                updated.posted_at = None;
                updated.cancelled_by = None;
                updated.cancelled_at = None;
                updated.locked = false;
                updated.status_reason.clone_from(&reason);
            }
        }

        let event = DomainEvent {
            id: EventId::new(),
            event_type: kind.into(),
            entry_id: updated.id,
            entry: updated.clone(),
            reason,
            timestamp: now,
        };

        Ok(TransitionOutcome {
            entry: updated,
            event,
            created_entry,
            balance_effect,
            waived_warnings,
        })
    }

    /// Lists the operations whose hard guards pass for `entry`.
    ///
    /// Reason requirements and advisory warnings are not considered; they
    /// depend on what the caller supplies.
    #[must_use]
    pub fn available_operations(&self, entry: &JournalEntry) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| self.structural_errors(entry, *kind).is_empty())
            .collect()
    }
}
