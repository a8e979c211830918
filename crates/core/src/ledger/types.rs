//! Journal entry domain types.
//!
//! A journal entry is a dated set of lines whose debits and credits must
//! balance. Entries are value objects: the lifecycle manager never mutates an
//! entry in place, it returns a new snapshot for every transition.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{
    AccountId, CostCenterId, JournalEntryId, PaymentTermId, ThirdPartyId, UserId,
};

use crate::terms::PaymentScheduleItem;

/// Journal entry status in the lifecycle workflow.
///
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Draft/Pending → Approved (approve)
/// - Approved → Posted (post)
/// - Draft/Pending/Approved/Posted → Cancelled (cancel)
/// - Approved/Posted/Cancelled → Draft (reset to draft)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry has been submitted for approval.
    Pending,
    /// Entry has been approved and is ready for posting.
    Approved,
    /// Entry has been posted to the ledger.
    Posted,
    /// Entry has been cancelled.
    Cancelled,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Posted => "POSTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "POSTED" => Some(Self::Posted),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the entry lines can still be edited by authors.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }

    /// Returns true if the persistence layer may physically delete the entry.
    #[must_use]
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Journal entry type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// Entry typed in by a user.
    Manual,
    /// Entry generated by another module (invoicing, payroll, ...).
    Automatic,
    /// Period-end adjustment.
    Adjustment,
    /// Opening balances.
    Opening,
    /// Period or year closing.
    Closing,
    /// Reversal of a previously posted entry.
    Reversal,
}

impl EntryType {
    /// Returns the string representation of the entry type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "MANUAL",
            Self::Automatic => "AUTOMATIC",
            Self::Adjustment => "ADJUSTMENT",
            Self::Opening => "OPENING",
            Self::Closing => "CLOSING",
            Self::Reversal => "REVERSAL",
        }
    }

    /// Parses an entry type from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MANUAL" => Some(Self::Manual),
            "AUTOMATIC" => Some(Self::Automatic),
            "ADJUSTMENT" => Some(Self::Adjustment),
            "OPENING" => Some(Self::Opening),
            "CLOSING" => Some(Self::Closing),
            "REVERSAL" => Some(Self::Reversal),
            _ => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single line of a journal entry.
///
/// By convention exactly one of `debit_amount` / `credit_amount` is non-zero;
/// this is not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount (0 for credit lines).
    #[serde(default)]
    pub debit_amount: Decimal,
    /// Credit amount (0 for debit lines).
    #[serde(default)]
    pub credit_amount: Decimal,
    /// Optional line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Customer or supplier the line is settled against.
    #[serde(default)]
    pub third_party_id: Option<ThirdPartyId>,
    /// Cost center for analytic reporting.
    #[serde(default)]
    pub cost_center_id: Option<CostCenterId>,
    /// Payment terms used to compute the installment schedule.
    #[serde(default)]
    pub payment_terms_id: Option<PaymentTermId>,
    /// Invoice date the schedule is computed from.
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    /// Manually entered due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Computed installment schedule.
    #[serde(default)]
    pub payment_schedule: Option<Vec<PaymentScheduleItem>>,
    /// Amount still open for settlement, maintained by the settlement
    /// collaborator. `None` means nothing has been applied yet.
    #[serde(default)]
    pub outstanding_amount: Option<Decimal>,
}

impl JournalEntryLine {
    fn new(account_id: AccountId, debit_amount: Decimal, credit_amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount,
            credit_amount,
            description: None,
            third_party_id: None,
            cost_center_id: None,
            payment_terms_id: None,
            invoice_date: None,
            due_date: None,
            payment_schedule: None,
            outstanding_amount: None,
        }
    }

    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, amount, Decimal::ZERO)
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, Decimal::ZERO, amount)
    }

    /// Sets the third party the line is settled against.
    #[must_use]
    pub fn with_third_party(mut self, third_party_id: ThirdPartyId) -> Self {
        self.third_party_id = Some(third_party_id);
        self
    }

    /// Sets the payment terms and invoice date used for the schedule.
    #[must_use]
    pub fn with_payment_terms(mut self, payment_terms_id: PaymentTermId, invoice_date: NaiveDate) -> Self {
        self.payment_terms_id = Some(payment_terms_id);
        self.invoice_date = Some(invoice_date);
        self
    }

    /// Sets a manual due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the absolute line amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        (self.debit_amount - self.credit_amount).abs()
    }

    /// Returns true if the line represents an open item against a third party.
    #[must_use]
    pub fn is_settleable(&self) -> bool {
        self.third_party_id.is_some()
    }

    /// Returns the amount still open for settlement.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.outstanding_amount.unwrap_or_else(|| self.amount())
    }

    /// Returns true if part of the line has already been settled.
    #[must_use]
    pub fn is_partially_settled(&self) -> bool {
        self.is_settleable() && self.outstanding() != self.amount()
    }
}

/// A double-entry journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Human-readable entry number.
    pub number: String,
    /// Accounting date of the entry.
    pub entry_date: NaiveDate,
    /// Entry type.
    pub entry_type: EntryType,
    /// Current lifecycle status.
    pub status: EntryStatus,
    /// Ordered entry lines.
    #[serde(default)]
    pub lines: Vec<JournalEntryLine>,
    /// External reference (invoice number, ...).
    #[serde(default)]
    pub reference: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// User who approved the entry.
    #[serde(default)]
    pub approved_by: Option<UserId>,
    /// When the entry was approved.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// User who posted the entry.
    #[serde(default)]
    pub posted_by: Option<UserId>,
    /// When the entry was posted.
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    /// User who cancelled the entry.
    #[serde(default)]
    pub cancelled_by: Option<UserId>,
    /// When the entry was cancelled.
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Reason given for the latest transition that carried one.
    #[serde(default)]
    pub status_reason: Option<String>,
    /// On a reversal entry: the entry it reverses.
    #[serde(default)]
    pub reversed_entry_id: Option<JournalEntryId>,
    /// On a reversed entry: the reversal created for it.
    #[serde(default)]
    pub reversal_entry_id: Option<JournalEntryId>,
    /// Lines are locked against external editing (set on posting).
    #[serde(default)]
    pub locked: bool,
    /// Optimistic concurrency version maintained by the persistence layer.
    #[serde(default)]
    pub version: u64,
}

impl JournalEntry {
    /// Creates a new draft entry, as an authoring collaborator would.
    #[must_use]
    pub fn draft(
        number: impl Into<String>,
        entry_date: NaiveDate,
        entry_type: EntryType,
        lines: Vec<JournalEntryLine>,
    ) -> Self {
        Self {
            id: JournalEntryId::new(),
            number: number.into(),
            entry_date,
            entry_type,
            status: EntryStatus::Draft,
            lines,
            reference: None,
            notes: None,
            approved_by: None,
            approved_at: None,
            posted_by: None,
            posted_at: None,
            cancelled_by: None,
            cancelled_at: None,
            status_reason: None,
            reversed_entry_id: None,
            reversal_entry_id: None,
            locked: false,
            version: 0,
        }
    }

    /// Sum of all debit amounts.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit_amount).sum()
    }

    /// Sum of all credit amounts.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit_amount).sum()
    }

    /// Returns total debit minus total credit.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit() - self.total_credit()
    }

    /// Returns true if this entry was created by a reverse operation.
    #[must_use]
    pub fn is_reversal(&self) -> bool {
        self.entry_type == EntryType::Reversal
    }

    /// Returns true if a reversal has already been created for this entry.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversal_entry_id.is_some()
    }
}
