//! Journal entry lifecycle management.
//!
//! This module implements the entry state machine, the advisory policy
//! rules that `force` can waive, and reversal entry creation.
//!
//! # Modules
//!
//! - `types` - Operations, warnings, events and transition outcomes
//! - `error` - Lifecycle error types
//! - `lifecycle` - State transition logic
//! - `reversal` - Reversal entry creation

pub mod error;
pub mod lifecycle;
pub mod reversal;
pub mod types;

#[cfg(test)]
mod lifecycle_props;
#[cfg(test)]
mod reversal_props;

pub use error::{ErrorKind, TransitionError};
pub use lifecycle::EntryLifecycleManager;
pub use reversal::ReversalService;
pub use types::{
    DomainEvent, EntryEventType, Operation, OperationKind, PolicyWarning, TransitionCheck,
    TransitionOutcome,
};
