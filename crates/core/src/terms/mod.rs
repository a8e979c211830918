//! Payment terms, installment schedules and due dates.
//!
//! # Modules
//!
//! - `types` - Payment terms templates and computed installments
//! - `calculator` - Splits an amount into reconciled installments
//! - `due_date` - Effective due dates and entry due status
//! - `service` - Refreshes entry schedules from stored payment terms
//! - `error` - Schedule error types

pub mod calculator;
pub mod due_date;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::PaymentScheduleCalculator;
pub use due_date::{DueDateResolver, DueStatus, LineDueDate};
pub use error::{ScheduleError, ScheduleServiceError};
pub use service::ScheduleService;
pub use types::{PaymentScheduleItem, PaymentTerm, ScheduleTemplateItem};
