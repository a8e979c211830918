//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger rules configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Bulk operation configuration.
    #[serde(default)]
    pub bulk: BulkConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Maximum allowed difference between total debits and total credits.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Number of decimal places installment amounts are rounded to.
    #[serde(default = "default_amount_scale")]
    pub amount_scale: u32,
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_amount_scale() -> u32 {
    2
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_balance_tolerance(),
            amount_scale: default_amount_scale(),
        }
    }
}

/// Bulk operation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkConfig {
    /// Maximum number of entry ids accepted by a single bulk run.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_max_batch_size() -> usize {
    500
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`
    /// and `TALLY__*` environment variables (e.g. `TALLY__BULK__MAX_BATCH_SIZE`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
