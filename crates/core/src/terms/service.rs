//! Fills entry lines with schedules computed from stored payment terms.

use std::collections::HashMap;
use std::sync::Arc;

use tally_shared::types::PaymentTermId;
use tracing::debug;

use super::calculator::PaymentScheduleCalculator;
use super::error::ScheduleServiceError;
use super::types::PaymentTerm;
use crate::ledger::JournalEntry;
use crate::ports::PaymentTermsRepository;

/// Computes line schedules using payment terms fetched from the terms store.
pub struct ScheduleService {
    terms: Arc<dyn PaymentTermsRepository>,
    calculator: PaymentScheduleCalculator,
}

impl ScheduleService {
    /// Creates a schedule service.
    #[must_use]
    pub fn new(terms: Arc<dyn PaymentTermsRepository>, calculator: PaymentScheduleCalculator) -> Self {
        Self { terms, calculator }
    }

    /// Returns a copy of `entry` whose lines carry freshly computed schedules.
    ///
    /// Lines without payment terms get no schedule. Each payment term is
    /// fetched once per call.
    ///
    /// # Errors
    ///
    /// Fails if the entry is locked, a referenced payment term does not exist,
    /// the terms store fails, or a schedule cannot be computed.
    pub async fn refresh_entry_schedules(
        &self,
        entry: &JournalEntry,
    ) -> Result<JournalEntry, ScheduleServiceError> {
        if entry.locked {
            return Err(ScheduleServiceError::EntryLocked(entry.id));
        }

        let mut fetched: HashMap<PaymentTermId, PaymentTerm> = HashMap::new();
        let mut updated = entry.clone();

        for line in &mut updated.lines {
            let Some(term_id) = line.payment_terms_id else {
                line.payment_schedule = None;
                continue;
            };

            if !fetched.contains_key(&term_id) {
                let term = self
                    .terms
                    .find_payment_term(term_id)
                    .await?
                    .ok_or(ScheduleServiceError::UnknownTerm(term_id))?;
                fetched.insert(term_id, term);
            }

            let term = fetched
                .get(&term_id)
                .ok_or(ScheduleServiceError::UnknownTerm(term_id))?;
            line.payment_schedule = Some(self.calculator.calculate_for_line(line, term)?);
        }

        debug!(
            entry_id = %entry.id,
            terms = fetched.len(),
            "Refreshed payment schedules"
        );

        Ok(updated)
    }
}
