//! Debit/credit balance checks for a single entry.

use rust_decimal::Decimal;

use super::types::JournalEntry;
use super::validation::{ValidationIssue, ValidationResult};

/// Side-effect free validator for the balance invariant.
///
/// An entry is balanced when `|total_debit - total_credit| <= tolerance`.
/// The default tolerance is 0.01.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceValidator {
    tolerance: Decimal,
}

impl Default for BalanceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceValidator {
    /// Creates a validator with the standard 0.01 tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
        }
    }

    /// Creates a validator with a custom tolerance.
    #[must_use]
    pub fn with_tolerance(tolerance: Decimal) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// Returns the configured tolerance.
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    /// Returns true if the entry's debits and credits balance.
    #[must_use]
    pub fn is_balanced(&self, entry: &JournalEntry) -> bool {
        entry.difference().abs() <= self.tolerance
    }

    /// Validates the balance invariant, reporting the difference when it fails.
    #[must_use]
    pub fn validate(&self, entry: &JournalEntry) -> ValidationResult {
        if self.is_balanced(entry) {
            return ValidationResult::default();
        }

        vec![ValidationIssue::UnbalancedEntry {
            total_debit: entry.total_debit(),
            total_credit: entry.total_credit(),
            difference: entry.difference(),
        }]
        .into()
    }

    /// Validates that every computed payment schedule adds up to its line amount.
    ///
    /// Lines without a schedule are ignored. This is a reconciliation report;
    /// it does not gate approval or posting.
    #[must_use]
    pub fn validate_schedules(&self, entry: &JournalEntry) -> ValidationResult {
        entry
            .lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let schedule = line.payment_schedule.as_ref().filter(|s| !s.is_empty())?;
                let schedule_total: Decimal = schedule.iter().map(|item| item.amount).sum();
                (schedule_total != line.amount()).then(|| ValidationIssue::ScheduleMismatch {
                    line: index,
                    line_amount: line.amount(),
                    schedule_total,
                })
            })
            .collect::<Vec<_>>()
            .into()
    }

}
