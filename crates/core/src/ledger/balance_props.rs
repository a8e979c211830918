//! Property-based tests for the balance invariant and balance effects.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::balance::BalanceValidator;
use super::effect::BalanceEffect;
use super::types::{EntryType, JournalEntry, JournalEntryLine};
use super::validation::ValidationIssue;

/// Strategy to generate a positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Builds a balanced entry where each debit amount is matched by one credit line.
fn balanced_entry(amounts: &[Decimal]) -> JournalEntry {
    let total: Decimal = amounts.iter().sum();
    let mut lines: Vec<JournalEntryLine> = amounts
        .iter()
        .map(|amount| JournalEntryLine::debit(AccountId::new(), *amount))
        .collect();
    lines.push(JournalEntryLine::credit(AccountId::new(), total));

    JournalEntry::draft(
        "JE-PROP",
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default(),
        EntryType::Manual,
        lines,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any entry built from matching debits and credits is balanced.
    #[test]
    fn prop_matching_lines_are_balanced(
        amounts in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let entry = balanced_entry(&amounts);
        let validator = BalanceValidator::new();

        prop_assert!(validator.is_balanced(&entry));
        prop_assert!(validator.validate(&entry).is_valid());
    }

    /// An imbalance above the tolerance is always reported with its difference.
    #[test]
    fn prop_imbalance_reports_difference(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        extra_cents in 2i64..1_000_000i64,
    ) {
        let mut entry = balanced_entry(&amounts);
        let extra = Decimal::new(extra_cents, 2);
        entry.lines[0].debit_amount += extra;

        let result = BalanceValidator::new().validate(&entry);
        prop_assert_eq!(result.errors.len(), 1);
        match &result.errors[0] {
            ValidationIssue::UnbalancedEntry { difference, .. } => {
                prop_assert_eq!(*difference, extra);
            }
            other => prop_assert!(false, "unexpected issue {:?}", other),
        }
    }

    /// Applying then reverting an entry's effect nets every account to zero.
    #[test]
    fn prop_revert_undoes_apply(
        amounts in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let entry = balanced_entry(&amounts);
        let applied = BalanceEffect::apply(&entry);
        let reverted = BalanceEffect::revert(&entry);

        prop_assert_eq!(applied.deltas.len(), reverted.deltas.len());
        for (a, r) in applied.deltas.iter().zip(reverted.deltas.iter()) {
            prop_assert_eq!(a.account_id, r.account_id);
            prop_assert_eq!(a.debit - a.credit + r.debit - r.credit, Decimal::ZERO);
        }
    }
}
