//! Payment schedule calculation.
//!
//! Splits an amount into installments following a payment terms template:
//! 1. Every installment except the last gets `round(total * percentage / 100)`
//! 2. The last installment gets `total - sum(previous)`, so the schedule always
//!    adds up to the total exactly
//! 3. Each payment date is the invoice date plus the row's day offset

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::ScheduleError;
use super::types::{PaymentScheduleItem, PaymentTerm, ScheduleTemplateItem};
use crate::ledger::JournalEntryLine;

/// Pure schedule calculator.
///
/// Installment amounts are rounded half away from zero to `scale` decimal
/// places (2 by default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentScheduleCalculator {
    scale: u32,
}

impl Default for PaymentScheduleCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentScheduleCalculator {
    /// Creates a calculator rounding to cents.
    #[must_use]
    pub fn new() -> Self {
        Self { scale: 2 }
    }

    /// Creates a calculator rounding to `scale` decimal places.
    #[must_use]
    pub fn with_scale(scale: u32) -> Self {
        Self { scale }
    }

    /// Returns the rounding scale.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Validates a template and returns its rows sorted by sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the template is empty, repeats a sequence,
    /// has a non-positive percentage, has decreasing day offsets, or its
    /// percentages do not sum to 100 within 0.01.
    pub fn validate_template(
        template: &[ScheduleTemplateItem],
    ) -> Result<Vec<ScheduleTemplateItem>, ScheduleError> {
        if template.is_empty() {
            return Err(ScheduleError::EmptyTemplate);
        }

        let mut rows = template.to_vec();
        rows.sort_by_key(|row| row.sequence);

        for pair in rows.windows(2) {
            if pair[0].sequence == pair[1].sequence {
                return Err(ScheduleError::DuplicateSequence {
                    sequence: pair[1].sequence,
                });
            }
            if pair[1].days_offset < pair[0].days_offset {
                return Err(ScheduleError::DecreasingDaysOffset {
                    sequence: pair[1].sequence,
                });
            }
        }

        if let Some(row) = rows.iter().find(|row| row.percentage <= Decimal::ZERO) {
            return Err(ScheduleError::NonPositivePercentage {
                sequence: row.sequence,
            });
        }

        let total: Decimal = rows.iter().map(|row| row.percentage).sum();
        if (total - Decimal::ONE_HUNDRED).abs() > Decimal::new(1, 2) {
            return Err(ScheduleError::PercentageSum { total });
        }

        Ok(rows)
    }

    /// Computes the installments for `total` invoiced on `invoice_date`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the template is invalid, the total is
    /// negative, or a payment date overflows the calendar.
    pub fn calculate(
        &self,
        invoice_date: NaiveDate,
        total: Decimal,
        template: &[ScheduleTemplateItem],
    ) -> Result<Vec<PaymentScheduleItem>, ScheduleError> {
        if total < Decimal::ZERO {
            return Err(ScheduleError::NegativeAmount(total));
        }

        let rows = Self::validate_template(template)?;
        let count = rows.len();
        let mut allocated = Decimal::ZERO;

        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                let amount = if index + 1 == count {
                    total - allocated
                } else {
                    let share = (total * row.percentage / Decimal::ONE_HUNDRED)
                        .round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero);
                    allocated += share;
                    share
                };

                let payment_date = invoice_date
                    .checked_add_days(Days::new(u64::from(row.days_offset)))
                    .ok_or(ScheduleError::DateOutOfRange {
                        sequence: row.sequence,
                    })?;

                Ok(PaymentScheduleItem {
                    sequence: row.sequence,
                    days: row.days_offset,
                    percentage: row.percentage,
                    amount,
                    payment_date,
                    description: format!(
                        "Installment {} of {} ({}% at {} days)",
                        row.sequence,
                        count,
                        row.percentage.normalize(),
                        row.days_offset
                    ),
                })
            })
            .collect()
    }

    /// Computes the schedule of an entry line under `term`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingInvoiceDate`] if the line has no
    /// invoice date, [`ScheduleError::MissingAmount`] if its amount is zero,
    /// or any error of [`Self::calculate`].
    pub fn calculate_for_line(
        &self,
        line: &JournalEntryLine,
        term: &PaymentTerm,
    ) -> Result<Vec<PaymentScheduleItem>, ScheduleError> {
        let invoice_date = line.invoice_date.ok_or(ScheduleError::MissingInvoiceDate)?;
        let amount = line.amount();
        if amount.is_zero() {
            return Err(ScheduleError::MissingAmount);
        }

        self.calculate(invoice_date, amount, &term.schedule_template)
    }
}
