//! Reversal entry creation.
//!
//! Reversing a posted entry leaves the original untouched and books a new
//! posted entry of type REVERSAL whose lines swap debits and credits.

use chrono::{DateTime, NaiveDate, Utc};
use tally_shared::types::{JournalEntryId, UserId};

use crate::ledger::{EntryStatus, EntryType, JournalEntry, JournalEntryLine};

/// Stateless service for building reversal entries.
pub struct ReversalService;

impl ReversalService {
    /// Mirrors a line: debit and credit swap, the description gets a
    /// "Reversal: " prefix (or is just "Reversal"), and settlement data is
    /// dropped.
    #[must_use]
    pub fn mirror_line(line: &JournalEntryLine) -> JournalEntryLine {
        JournalEntryLine {
            account_id: line.account_id,
            debit_amount: line.credit_amount,
            credit_amount: line.debit_amount,
            description: Some(match line.description.as_deref().map(str::trim) {
                Some(description) if !description.is_empty() => format!("Reversal: {description}"),
                _ => "Reversal".to_string(),
            }),
            third_party_id: line.third_party_id,
            cost_center_id: line.cost_center_id,
            payment_terms_id: None,
            invoice_date: None,
            due_date: None,
            payment_schedule: None,
            outstanding_amount: None,
        }
    }

    /// Builds the posted reversal entry for `original`.
    #[must_use]
    pub fn create_reversal_entry(
        original: &JournalEntry,
        reason: &str,
        reversal_date: NaiveDate,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            number: format!("REV-{}", original.number),
            entry_date: reversal_date,
            entry_type: EntryType::Reversal,
            status: EntryStatus::Posted,
            lines: original.lines.iter().map(Self::mirror_line).collect(),
            reference: original.reference.clone(),
            notes: Some(format!(
                "Reversal of entry {}. Reason: {reason}",
                original.number
            )),
            approved_by: Some(actor),
            approved_at: Some(at),
            posted_by: Some(actor),
            posted_at: Some(at),
            cancelled_by: None,
            cancelled_at: None,
            status_reason: Some(reason.to_string()),
            reversed_entry_id: Some(original.id),
            reversal_entry_id: None,
            locked: true,
            version: 0,
        }
    }
}
