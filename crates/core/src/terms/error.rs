//! Payment schedule error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::types::{JournalEntryId, PaymentTermId};

use crate::ports::StoreError;

/// Errors raised while validating a template or computing a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The template has no rows.
    #[error("Schedule template is empty")]
    EmptyTemplate,

    /// Template percentages do not add up to 100.
    #[error("Schedule template percentages sum to {total}, expected 100")]
    PercentageSum {
        /// The actual sum.
        total: Decimal,
    },

    /// A template row has a zero or negative percentage.
    #[error("Installment {sequence} has a non-positive percentage")]
    NonPositivePercentage {
        /// The offending sequence.
        sequence: u32,
    },

    /// Two template rows share a sequence number.
    #[error("Installment sequence {sequence} appears more than once")]
    DuplicateSequence {
        /// The repeated sequence.
        sequence: u32,
    },

    /// Day offsets go backwards when ordered by sequence.
    #[error("Installment {sequence} falls due before the previous installment")]
    DecreasingDaysOffset {
        /// The offending sequence.
        sequence: u32,
    },

    /// The line has payment terms but no invoice date.
    #[error("Invoice date is required to compute a payment schedule")]
    MissingInvoiceDate,

    /// The amount to split is zero.
    #[error("Amount is required to compute a payment schedule")]
    MissingAmount,

    /// The amount to split is negative.
    #[error("Cannot compute a payment schedule for negative amount {0}")]
    NegativeAmount(Decimal),

    /// The payment date overflows the supported calendar.
    #[error("Payment date of installment {sequence} is out of range")]
    DateOutOfRange {
        /// The offending sequence.
        sequence: u32,
    },
}

impl ScheduleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTemplate
            | Self::PercentageSum { .. }
            | Self::NonPositivePercentage { .. }
            | Self::DuplicateSequence { .. }
            | Self::DecreasingDaysOffset { .. } => "INVALID_SCHEDULE_TEMPLATE",
            Self::MissingInvoiceDate => "MISSING_INVOICE_DATE",
            Self::MissingAmount => "MISSING_AMOUNT",
            Self::NegativeAmount(_) => "INVALID_AMOUNT",
            Self::DateOutOfRange { .. } => "DATE_OUT_OF_RANGE",
        }
    }
}

/// Errors raised while refreshing the schedules of a stored entry.
#[derive(Debug, Error)]
pub enum ScheduleServiceError {
    /// Schedule computation failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A line references payment terms that do not exist.
    #[error("Payment terms {0} not found")]
    UnknownTerm(PaymentTermId),

    /// The entry is posted and its lines may not change.
    #[error("Entry {0} is locked")]
    EntryLocked(JournalEntryId),

    /// The terms store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ScheduleServiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schedule(e) => e.error_code(),
            Self::UnknownTerm(_) => "PAYMENT_TERM_NOT_FOUND",
            Self::EntryLocked(_) => "ENTRY_LOCKED",
            Self::Store(e) => e.error_code(),
        }
    }
}
