//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use tally_core::bulk::BulkOperationOrchestrator;
use tally_core::ledger::{BalanceValidator, JournalEntry};
use tally_core::ports::{ChannelPublisher, MemoryStore};
use tally_core::terms::{DueDateResolver, PaymentScheduleCalculator, PaymentTerm, ScheduleService};
use tally_core::workflow::{EntryLifecycleManager, Operation, OperationKind};
use tally_shared::AppConfig;
use tally_shared::types::{JournalEntryId, UserId};

/// Arguments of a bulk run.
pub struct BulkRequest {
    pub operation: OperationKind,
    pub ids: Vec<JournalEntryId>,
    pub reason: Option<String>,
    pub reversal_date: Option<NaiveDate>,
    pub force: bool,
    pub actor: UserId,
}

impl BulkRequest {
    /// Builds the operation payload. A missing reason is passed on blank so
    /// the lifecycle rejects it per entry.
    fn to_operation(&self, today: NaiveDate) -> Operation {
        let reason = self.reason.clone();
        match self.operation {
            OperationKind::Submit => Operation::Submit,
            OperationKind::Approve => Operation::Approve { reason },
            OperationKind::Post => Operation::Post { reason },
            OperationKind::Cancel => Operation::Cancel {
                reason: reason.unwrap_or_default(),
                force: self.force,
            },
            OperationKind::Reverse => Operation::Reverse {
                reason: reason.unwrap_or_default(),
                reversal_date: self.reversal_date.unwrap_or(today),
                force: self.force,
            },
            OperationKind::ResetToDraft => Operation::ResetToDraft {
                reason: reason.unwrap_or_default(),
                force: self.force,
            },
        }
    }
}

#[derive(Serialize)]
struct DueStatusRow<'a> {
    entry_id: JournalEntryId,
    number: &'a str,
    due_date: Option<NaiveDate>,
    #[serde(flatten)]
    status: tally_core::terms::DueStatus,
}

#[derive(Serialize)]
struct RefreshFailure {
    entry_id: JournalEntryId,
    code: &'static str,
    message: String,
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs a bulk operation over the entries in `entries_path`.
pub async fn bulk(config: &AppConfig, entries_path: &Path, request: BulkRequest) -> anyhow::Result<()> {
    let entries: Vec<JournalEntry> = read_json(entries_path).await?;
    let ids = if request.ids.is_empty() {
        entries.iter().map(|e| e.id).collect()
    } else {
        request.ids.clone()
    };

    let store = Arc::new(MemoryStore::with_data(entries, Vec::new()));
    let (publisher, mut events) = ChannelPublisher::new();

    let drain = tokio::spawn(async move {
        let mut published = 0usize;
        while let Some(event) = events.recv().await {
            info!(
                event_id = %event.id,
                entry_id = %event.entry_id,
                event_type = ?event.event_type,
                "Domain event"
            );
            published += 1;
        }
        published
    });

    let manager = EntryLifecycleManager::with_validator(BalanceValidator::with_tolerance(
        config.ledger.balance_tolerance,
    ));
    let orchestrator = BulkOperationOrchestrator::new(store, Arc::new(publisher))
        .with_manager(manager)
        .with_max_batch_size(config.bulk.max_batch_size);

    let operation = request.to_operation(Utc::now().date_naive());
    let result = orchestrator.run(&operation, &ids, request.actor).await;
    drop(orchestrator);

    let published = drain.await.context("Event drain task failed")?;
    let result = match result {
        Ok(result) => result,
        Err(e) => bail!("{}: {e}", e.error_code()),
    };

    info!(
        processed = result.total_processed,
        skipped = result.total_skipped,
        failed = result.total_failed,
        published,
        "Bulk run complete"
    );

    print_json(&result)
}

/// Prints the installments of `amount` under the payment term `code`.
pub async fn schedule(
    config: &AppConfig,
    terms_path: &Path,
    code: &str,
    invoice_date: NaiveDate,
    amount: Decimal,
) -> anyhow::Result<()> {
    let terms: Vec<PaymentTerm> = read_json(terms_path).await?;
    let Some(term) = terms.iter().find(|t| t.code == code) else {
        bail!("Payment term '{code}' not found in {}", terms_path.display());
    };

    let items = PaymentScheduleCalculator::with_scale(config.ledger.amount_scale)
        .calculate(invoice_date, amount, &term.schedule_template)
        .map_err(|e| anyhow::anyhow!("{}: {e}", e.error_code()))?;

    print_json(&items)
}

/// Recomputes line schedules and prints the refreshed entries and failures.
pub async fn refresh(config: &AppConfig, entries_path: &Path, terms_path: &Path) -> anyhow::Result<()> {
    let entries: Vec<JournalEntry> = read_json(entries_path).await?;
    let terms: Vec<PaymentTerm> = read_json(terms_path).await?;

    let store = Arc::new(MemoryStore::with_data(Vec::new(), terms));
    let service = ScheduleService::new(
        store,
        PaymentScheduleCalculator::with_scale(config.ledger.amount_scale),
    );

    let mut refreshed = Vec::with_capacity(entries.len());
    let mut failures = Vec::new();
    for entry in &entries {
        match service.refresh_entry_schedules(entry).await {
            Ok(entry) => refreshed.push(entry),
            Err(e) => {
                warn!(entry_id = %entry.id, error = %e, "Schedule refresh failed");
                failures.push(RefreshFailure {
                    entry_id: entry.id,
                    code: e.error_code(),
                    message: e.to_string(),
                });
            }
        }
    }

    print_json(&serde_json::json!({
        "entries": refreshed,
        "failures": failures,
    }))
}

/// Prints the due status of every entry relative to `today`.
pub async fn due_status(entries_path: &Path, today: Option<NaiveDate>) -> anyhow::Result<()> {
    let entries: Vec<JournalEntry> = read_json(entries_path).await?;
    let today = today.unwrap_or_else(|| Utc::now().date_naive());

    let rows: Vec<DueStatusRow<'_>> = entries
        .iter()
        .map(|entry| DueStatusRow {
            entry_id: entry.id,
            number: &entry.number,
            due_date: DueDateResolver::earliest_due_date(entry),
            status: DueDateResolver::resolve_entry_due_status(entry, today),
        })
        .collect();

    print_json(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(operation: OperationKind, reason: Option<&str>) -> BulkRequest {
        BulkRequest {
            operation,
            ids: Vec::new(),
            reason: reason.map(str::to_string),
            reversal_date: None,
            force: true,
            actor: UserId::new(),
        }
    }

    #[test]
    fn test_reverse_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let op = request(OperationKind::Reverse, Some("duplicate")).to_operation(today);

        assert_eq!(
            op,
            Operation::Reverse {
                reason: "duplicate".to_string(),
                reversal_date: today,
                force: true,
            }
        );
    }

    #[test]
    fn test_missing_reason_is_blank() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let op = request(OperationKind::Cancel, None).to_operation(today);

        assert_eq!(op.kind(), OperationKind::Cancel);
        assert_eq!(op.reason(), None);
        assert!(op.force());
    }

    #[test]
    fn test_submit_ignores_force() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let op = request(OperationKind::Submit, Some("ignored")).to_operation(today);

        assert_eq!(op, Operation::Submit);
        assert!(!op.force());
    }
}
