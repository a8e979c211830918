//! Property-based tests for ReversalService.
//!
//! A reversal must mirror its original exactly: same accounts, same amounts,
//! debit and credit swapped.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, UserId};

use crate::ledger::{BalanceEffect, EntryStatus, EntryType, JournalEntry, JournalEntryLine};
use crate::workflow::lifecycle::EntryLifecycleManager;
use crate::workflow::reversal::ReversalService;
use crate::workflow::types::Operation;

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating a posted, balanced entry with 2 to 8 lines.
fn arb_posted_entry() -> impl Strategy<Value = JournalEntry> {
    (
        prop::collection::vec(arb_amount(), 1..4),
        prop::option::of("[a-zA-Z ]{0,20}"),
    )
        .prop_map(|(amounts, memo)| {
            let mut lines = Vec::new();
            for amount in amounts {
                let mut debit = JournalEntryLine::debit(AccountId::new(), amount);
                debit.description.clone_from(&memo);
                lines.push(debit);
                lines.push(JournalEntryLine::credit(AccountId::new(), amount));
            }
            let mut entry = JournalEntry::draft(
                "JE-PROP",
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
                EntryType::Manual,
                lines,
            );
            entry.status = EntryStatus::Posted;
            entry
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reversal lines swap debits and credits and keep accounts.
    #[test]
    fn prop_reversal_mirrors_lines(original in arb_posted_entry()) {
        let reversal = ReversalService::create_reversal_entry(
            &original,
            "Test",
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap_or_default(),
            UserId::new(),
            Utc::now(),
        );

        prop_assert_eq!(reversal.lines.len(), original.lines.len());
        for (line, mirrored) in original.lines.iter().zip(reversal.lines.iter()) {
            prop_assert_eq!(line.account_id, mirrored.account_id);
            prop_assert_eq!(line.debit_amount, mirrored.credit_amount);
            prop_assert_eq!(line.credit_amount, mirrored.debit_amount);
            prop_assert!(mirrored.description.as_deref().unwrap_or_default().starts_with("Reversal"));
        }
        prop_assert_eq!(reversal.total_debit(), original.total_credit());
        prop_assert_eq!(reversal.total_credit(), original.total_debit());
    }

    /// Posting then reversing nets every account back to zero.
    #[test]
    fn prop_reversal_nets_balances(original in arb_posted_entry()) {
        let outcome = EntryLifecycleManager::new()
            .apply(
                &original,
                &Operation::Reverse {
                    reason: "Test".to_string(),
                    reversal_date: original.entry_date,
                    force: false,
                },
                UserId::new(),
            )
            .unwrap();

        let posted = BalanceEffect::apply(&original);
        prop_assert_eq!(posted.deltas.len(), outcome.balance_effect.deltas.len());
        for (p, r) in posted.deltas.iter().zip(outcome.balance_effect.deltas.iter()) {
            prop_assert_eq!(p.account_id, r.account_id);
            prop_assert_eq!(p.debit, r.credit);
            prop_assert_eq!(p.credit, r.debit);
        }
    }

    /// A reversal can never itself be reversed, forced or not.
    #[test]
    fn prop_reversal_not_reversible(original in arb_posted_entry(), force in any::<bool>()) {
        let outcome = EntryLifecycleManager::new()
            .apply(
                &original,
                &Operation::Reverse {
                    reason: "First".to_string(),
                    reversal_date: original.entry_date,
                    force: false,
                },
                UserId::new(),
            )
            .unwrap();
        let reversal = outcome.created_entry.unwrap();

        let again = EntryLifecycleManager::new().apply(
            &reversal,
            &Operation::Reverse {
                reason: "Second".to_string(),
                reversal_date: reversal.entry_date,
                force,
            },
            UserId::new(),
        );
        prop_assert!(again.is_err());

        let original_again = EntryLifecycleManager::new().apply(
            &outcome.entry,
            &Operation::Reverse {
                reason: "Second".to_string(),
                reversal_date: original.entry_date,
                force,
            },
            UserId::new(),
        );
        prop_assert!(original_again.is_err());
    }
}
