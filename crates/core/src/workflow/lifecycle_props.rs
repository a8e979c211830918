//! Property-based tests for EntryLifecycleManager.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, UserId};

use crate::ledger::{EntryStatus, EntryType, JournalEntry, JournalEntryLine};
use crate::workflow::error::TransitionError;
use crate::workflow::lifecycle::EntryLifecycleManager;
use crate::workflow::types::{Operation, OperationKind};

/// Strategy for generating random EntryStatus values.
fn arb_status() -> impl Strategy<Value = EntryStatus> {
    prop_oneof![
        Just(EntryStatus::Draft),
        Just(EntryStatus::Pending),
        Just(EntryStatus::Approved),
        Just(EntryStatus::Posted),
        Just(EntryStatus::Cancelled),
    ]
}

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating non-empty reasons.
fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

/// Strategy for generating operations with valid payloads.
fn arb_operation() -> impl Strategy<Value = Operation> {
    (arb_reason(), any::<bool>(), 0u64..60).prop_flat_map(|(reason, force, offset)| {
        let reversal_date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.checked_add_days(chrono::Days::new(offset)))
            .unwrap_or_default();
        prop_oneof![
            Just(Operation::Submit),
            Just(Operation::Approve { reason: None }),
            Just(Operation::Post {
                reason: Some(reason.clone())
            }),
            Just(Operation::Cancel {
                reason: reason.clone(),
                force
            }),
            Just(Operation::Reverse {
                reason: reason.clone(),
                reversal_date,
                force
            }),
            Just(Operation::ResetToDraft { reason, force }),
        ]
    })
}

fn entry(status: EntryStatus, debit: Decimal, credit: Decimal) -> JournalEntry {
    let mut entry = JournalEntry::draft(
        "JE-PROP",
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
        EntryType::Manual,
        vec![
            JournalEntryLine::debit(AccountId::new(), debit),
            JournalEntryLine::credit(AccountId::new(), credit),
        ],
    );
    entry.status = status;
    entry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Operations outside the status table are always illegal transitions.
    #[test]
    fn prop_table_rejects_illegal_operations(
        status in arb_status(),
        operation in arb_operation(),
        amount in arb_amount(),
    ) {
        let kind = operation.kind();
        prop_assume!(!EntryLifecycleManager::is_valid_transition(status, kind));

        let result = EntryLifecycleManager::new().apply(&entry(status, amount, amount), &operation, UserId::new());
        let is_illegal = matches!(result, Err(TransitionError::IllegalTransition { .. }));
        prop_assert!(is_illegal, "expected illegal transition, got {:?}", result);
    }

    /// No entry ever reaches APPROVED or POSTED while unbalanced.
    #[test]
    fn prop_unbalanced_never_approved_or_posted(
        status in arb_status(),
        debit in arb_amount(),
        gap in 2i64..10_000i64,
    ) {
        let unbalanced = entry(status, debit, debit + Decimal::new(gap, 2));
        let manager = EntryLifecycleManager::new();

        for operation in [Operation::Approve { reason: None }, Operation::Post { reason: None }] {
            prop_assert!(manager.apply(&unbalanced, &operation, UserId::new()).is_err());
        }
    }

    /// Applying never mutates the input and only changes status through the table.
    #[test]
    fn prop_apply_respects_table(
        status in arb_status(),
        operation in arb_operation(),
        amount in arb_amount(),
    ) {
        let original = entry(status, amount, amount);
        let snapshot = original.clone();

        if let Ok(outcome) = EntryLifecycleManager::new().apply(&original, &operation, UserId::new()) {
            prop_assert!(EntryLifecycleManager::is_valid_transition(status, operation.kind()));
            let expected = match operation.kind() {
                OperationKind::Submit => EntryStatus::Pending,
                OperationKind::Approve => EntryStatus::Approved,
                OperationKind::Post | OperationKind::Reverse => EntryStatus::Posted,
                OperationKind::Cancel => EntryStatus::Cancelled,
                OperationKind::ResetToDraft => EntryStatus::Draft,
            };
            prop_assert_eq!(outcome.entry.status, expected);
            prop_assert_eq!(outcome.event.entry_id, original.id);
        }
        prop_assert_eq!(original, snapshot);
    }

    /// Force only ever turns a policy error into success.
    #[test]
    fn prop_force_only_waives_policy(
        status in arb_status(),
        reason in arb_reason(),
        amount in arb_amount(),
    ) {
        let target = entry(status, amount, amount);
        let manager = EntryLifecycleManager::new();
        let plain = Operation::ResetToDraft { reason: reason.clone(), force: false };
        let forced = Operation::ResetToDraft { reason, force: true };

        match manager.validate(&target, &plain) {
            Ok(_) => prop_assert!(manager.validate(&target, &forced).is_ok()),
            Err(err) if err.is_force_resolvable() => {
                prop_assert!(manager.validate(&target, &forced).is_ok());
            }
            Err(err) => prop_assert_eq!(manager.validate(&target, &forced), Err(err)),
        }
    }
}
