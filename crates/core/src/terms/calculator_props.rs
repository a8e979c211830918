//! Property-based tests for payment schedule calculation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::PaymentScheduleCalculator;
use super::types::ScheduleTemplateItem;

/// Strategy to generate a positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate templates whose percentages sum to exactly 100.
///
/// Weights are turned into whole-hundredth percentages; the last row takes
/// whatever is left.
fn template() -> impl Strategy<Value = Vec<ScheduleTemplateItem>> {
    prop::collection::vec((1u32..100, 0u32..60), 1..8).prop_map(|rows| {
        let weight: u32 = rows.iter().map(|(w, _)| w).sum();
        let count = rows.len();
        let mut used = Decimal::ZERO;
        let mut days = 0u32;

        rows.iter()
            .enumerate()
            .map(|(index, (w, gap))| {
                days += gap;
                let percentage = if index + 1 == count {
                    Decimal::ONE_HUNDRED - used
                } else {
                    (Decimal::from(10_000 * w / weight) / Decimal::ONE_HUNDRED).max(Decimal::new(1, 2))
                };
                used += percentage;
                let sequence = u32::try_from(index).unwrap_or(0) + 1;
                ScheduleTemplateItem::new(sequence, days, percentage)
            })
            .collect()
    })
}

fn invoice_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.checked_add_days(chrono::Days::new(offset)))
            .unwrap_or_default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Installments always add up to the total exactly.
    #[test]
    fn prop_schedule_reconciles(
        total in positive_amount(),
        template in template(),
        date in invoice_date(),
    ) {
        prop_assume!(template.iter().all(|row| row.percentage > Decimal::ZERO));

        let items = PaymentScheduleCalculator::new().calculate(date, total, &template).unwrap();
        let sum: Decimal = items.iter().map(|i| i.amount).sum();

        prop_assert_eq!(sum, total);
        prop_assert_eq!(items.len(), template.len());
    }

    /// Every installment but the last is rounded to cents, and dates never go backwards.
    #[test]
    fn prop_installments_rounded_and_ordered(
        total in positive_amount(),
        template in template(),
        date in invoice_date(),
    ) {
        prop_assume!(template.iter().all(|row| row.percentage > Decimal::ZERO));

        let items = PaymentScheduleCalculator::new().calculate(date, total, &template).unwrap();

        for item in &items {
            prop_assert!(item.amount.scale() <= 2);
            prop_assert!(item.payment_date >= date);
        }
        for pair in items.windows(2) {
            prop_assert!(pair[0].sequence < pair[1].sequence);
            prop_assert!(pair[0].payment_date <= pair[1].payment_date);
        }
    }
}
