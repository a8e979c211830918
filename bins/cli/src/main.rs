//! Tally CLI
//!
//! Runs lifecycle operations, payment schedules and due-date checks over
//! journal entries loaded from JSON files.

mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tally_core::workflow::OperationKind;
use tally_shared::AppConfig;
use tally_shared::types::{JournalEntryId, UserId};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Journal entry lifecycle and payment schedule tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply one lifecycle operation to many entries
    Bulk {
        /// JSON file holding an array of journal entries
        #[arg(long)]
        entries: PathBuf,

        /// Operation: submit, approve, post, cancel, reverse or reset_to_draft
        #[arg(long, value_parser = parse_operation)]
        operation: OperationKind,

        /// Entry ids to process (default: every entry in the file)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<JournalEntryId>,

        /// Reason recorded with the transition
        #[arg(long)]
        reason: Option<String>,

        /// Accounting date of reversal entries (default: today)
        #[arg(long)]
        reversal_date: Option<NaiveDate>,

        /// Waive advisory warnings
        #[arg(long)]
        force: bool,

        /// User performing the operation
        #[arg(long, env = "TALLY_ACTOR")]
        actor: Option<UserId>,
    },

    /// Compute the installments of an amount under a payment term
    Schedule {
        /// JSON file holding an array of payment terms
        #[arg(long)]
        terms: PathBuf,

        /// Payment term code
        #[arg(long)]
        code: String,

        /// Invoice date (YYYY-MM-DD)
        #[arg(long)]
        invoice_date: NaiveDate,

        /// Amount to split
        #[arg(long)]
        amount: Decimal,
    },

    /// Recompute the payment schedules of every entry line
    Refresh {
        /// JSON file holding an array of journal entries
        #[arg(long)]
        entries: PathBuf,

        /// JSON file holding an array of payment terms
        #[arg(long)]
        terms: PathBuf,
    },

    /// Report the due status of every entry
    DueStatus {
        /// JSON file holding an array of journal entries
        #[arg(long)]
        entries: PathBuf,

        /// Reference date (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn parse_operation(s: &str) -> Result<OperationKind, String> {
    OperationKind::parse(s).ok_or_else(|| format!("unknown operation '{s}'"))
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());
    let json = config.logging.json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(&config);

    match cli.command {
        Command::Bulk {
            entries,
            operation,
            ids,
            reason,
            reversal_date,
            force,
            actor,
        } => {
            let request = commands::BulkRequest {
                operation,
                ids,
                reason,
                reversal_date,
                force,
                actor: actor.unwrap_or_default(),
            };
            commands::bulk(&config, &entries, request).await
        }
        Command::Schedule {
            terms,
            code,
            invoice_date,
            amount,
        } => commands::schedule(&config, &terms, &code, invoice_date, amount).await,
        Command::Refresh { entries, terms } => commands::refresh(&config, &entries, &terms).await,
        Command::DueStatus { entries, today } => commands::due_status(&entries, today).await,
    }
}
