//! Payment terms and computed installment types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::PaymentTermId;

use super::calculator::PaymentScheduleCalculator;
use super::error::ScheduleError;

/// One row of a payment terms template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTemplateItem {
    /// Position of the installment (1-based).
    pub sequence: u32,
    /// Calendar days after the invoice date.
    pub days_offset: u32,
    /// Share of the total, in percent.
    pub percentage: Decimal,
}

impl ScheduleTemplateItem {
    /// Creates a template row.
    #[must_use]
    pub fn new(sequence: u32, days_offset: u32, percentage: Decimal) -> Self {
        Self {
            sequence,
            days_offset,
            percentage,
        }
    }
}

/// Named payment terms, e.g. "30/60/90".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTerm {
    /// Unique identifier.
    pub id: PaymentTermId,
    /// Short code (e.g. "NET30").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Installment template, ordered by sequence.
    pub schedule_template: Vec<ScheduleTemplateItem>,
}

impl PaymentTerm {
    /// Creates payment terms with a fresh id.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        schedule_template: Vec<ScheduleTemplateItem>,
    ) -> Self {
        Self {
            id: PaymentTermId::new(),
            code: code.into(),
            name: name.into(),
            schedule_template,
        }
    }

    /// Checks the template invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated template rule.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        PaymentScheduleCalculator::validate_template(&self.schedule_template).map(|_| ())
    }
}

/// A computed installment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheduleItem {
    /// Position of the installment (1-based).
    pub sequence: u32,
    /// Calendar days after the invoice date.
    pub days: u32,
    /// Share of the total, in percent.
    pub percentage: Decimal,
    /// Installment amount.
    pub amount: Decimal,
    /// Date the installment falls due.
    pub payment_date: NaiveDate,
    /// Human-readable label.
    pub description: String,
}
