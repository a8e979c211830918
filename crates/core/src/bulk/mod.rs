//! Bulk lifecycle operations with partial-failure semantics.

pub mod error;
pub mod orchestrator;
pub mod types;


pub use error::BulkError;
pub use orchestrator::{BulkOperationOrchestrator, DEFAULT_MAX_BATCH_SIZE};
pub use types::{BulkItemError, BulkResult};
