//! Effective due dates of lines and entries.
//!
//! A computed payment schedule always wins over a manually entered due date.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{EntryStatus, JournalEntry, JournalEntryLine};

/// The effective due date of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDueDate {
    /// The date.
    pub date: NaiveDate,
    /// True if the date comes from a computed schedule.
    pub is_calculated: bool,
}

/// Due status of an entry relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DueStatus {
    /// The entry is posted.
    Paid,
    /// The earliest due date is in the past.
    Overdue {
        /// Days until the due date (negative).
        days_delta: i64,
    },
    /// The earliest due date is today.
    DueToday,
    /// The earliest due date is in the future.
    Pending {
        /// Days until the due date (positive).
        days_delta: i64,
    },
    /// No line carries a due date.
    NoDate,
}

impl DueStatus {
    /// Days between the reference day and the due date, if there is one.
    #[must_use]
    pub fn days_delta(&self) -> Option<i64> {
        match self {
            Self::Overdue { days_delta } | Self::Pending { days_delta } => Some(*days_delta),
            Self::DueToday => Some(0),
            Self::Paid | Self::NoDate => None,
        }
    }

    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Overdue { .. } => "overdue",
            Self::DueToday => "due-today",
            Self::Pending { .. } => "pending",
            Self::NoDate => "no-date",
        }
    }
}

/// The one place due dates are derived.
pub struct DueDateResolver;

impl DueDateResolver {
    /// Resolves the effective due date of a line.
    ///
    /// A line with payment terms and a computed schedule is due on its last
    /// installment; otherwise the manual due date applies.
    #[must_use]
    pub fn resolve_line_due_date(line: &JournalEntryLine) -> Option<LineDueDate> {
        let calculated = line
            .payment_terms_id
            .and(line.payment_schedule.as_ref())
            .and_then(|schedule| schedule.iter().map(|item| item.payment_date).max());

        match (calculated, line.due_date) {
            (Some(date), _) => Some(LineDueDate {
                date,
                is_calculated: true,
            }),
            (None, Some(date)) => Some(LineDueDate {
                date,
                is_calculated: false,
            }),
            (None, None) => None,
        }
    }

    /// Returns the earliest effective due date across the entry's lines.
    #[must_use]
    pub fn earliest_due_date(entry: &JournalEntry) -> Option<NaiveDate> {
        entry
            .lines
            .iter()
            .filter_map(Self::resolve_line_due_date)
            .map(|due| due.date)
            .min()
    }

    /// Resolves the due status of an entry as seen on `today`.
    ///
    /// Posted entries are reported as paid.
    #[must_use]
    pub fn resolve_entry_due_status(entry: &JournalEntry, today: NaiveDate) -> DueStatus {
        if entry.status == EntryStatus::Posted {
            return DueStatus::Paid;
        }

        let Some(due) = Self::earliest_due_date(entry) else {
            return DueStatus::NoDate;
        };

        let days_delta = (due - today).num_days();
        match days_delta {
            d if d < 0 => DueStatus::Overdue { days_delta: d },
            0 => DueStatus::DueToday,
            d => DueStatus::Pending { days_delta: d },
        }
    }

    /// Resolves the due status of an entry as seen today (UTC).
    #[must_use]
    pub fn resolve_entry_due_status_now(entry: &JournalEntry) -> DueStatus {
        Self::resolve_entry_due_status(entry, Utc::now().date_naive())
    }
}
