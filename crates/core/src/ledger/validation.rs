//! Hard ledger invariants that no override can waive.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// A violated ledger invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationIssue {
    /// Total debits and total credits differ by more than the tolerance.
    #[error("Entry is not balanced. Debit: {total_debit}, Credit: {total_credit}, Difference: {difference}")]
    UnbalancedEntry {
        /// Sum of debit amounts.
        total_debit: Decimal,
        /// Sum of credit amounts.
        total_credit: Decimal,
        /// Debit minus credit.
        difference: Decimal,
    },

    /// A line's computed installments do not add up to the line amount.
    #[error("Line {line}: payment schedule totals {schedule_total} but line amount is {line_amount}")]
    ScheduleMismatch {
        /// Zero-based line index.
        line: usize,
        /// The line amount.
        line_amount: Decimal,
        /// Sum of the installment amounts.
        schedule_total: Decimal,
    },
}

impl ValidationIssue {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::ScheduleMismatch { .. } => "SCHEDULE_MISMATCH",
        }
    }
}

/// Outcome of validating an entry against the ledger invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Violated invariants, empty when the entry is valid.
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns true if no invariant is violated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Appends the issues of another result.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }
}

impl From<Vec<ValidationIssue>> for ValidationResult {
    fn from(errors: Vec<ValidationIssue>) -> Self {
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let unbalanced = ValidationIssue::UnbalancedEntry {
            total_debit: dec!(100),
            total_credit: dec!(90),
            difference: dec!(10),
        };
        assert_eq!(unbalanced.error_code(), "UNBALANCED_ENTRY");

        let mismatch = ValidationIssue::ScheduleMismatch {
            line: 0,
            line_amount: dec!(100),
            schedule_total: dec!(99.99),
        };
        assert_eq!(mismatch.error_code(), "SCHEDULE_MISMATCH");
    }

    #[test]
    fn test_error_display() {
        let err = ValidationIssue::UnbalancedEntry {
            total_debit: dec!(100.00),
            total_credit: dec!(50.00),
            difference: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Entry is not balanced. Debit: 100.00, Credit: 50.00, Difference: 50.00"
        );
    }

    #[test]
    fn test_serializes_with_code_tag() {
        let err = ValidationIssue::UnbalancedEntry {
            total_debit: dec!(1),
            total_credit: dec!(0),
            difference: dec!(1),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "UNBALANCED_ENTRY");
    }

    #[test]
    fn test_merge() {
        let mut result = ValidationResult::default();
        assert!(result.is_valid());

        result.merge(ValidationResult::from(vec![ValidationIssue::ScheduleMismatch {
            line: 1,
            line_amount: dec!(10),
            schedule_total: dec!(9),
        }]));
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 1);
    }
}
