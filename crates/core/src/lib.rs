//! Core business logic for Tally.
//!
//! This crate holds the journal entry lifecycle: pure domain rules plus the
//! async orchestration that drives them over storage ports. It owns no
//! database or transport.
//!
//! # Modules
//!
//! - `ledger` - Journal entries, the balance invariant and balance effects
//! - `terms` - Payment terms, installment schedules and due dates
//! - `workflow` - The entry state machine and reversals
//! - `ports` - Storage and event collaborator traits, in-memory store
//! - `bulk` - Bulk operations over many entries

pub mod bulk;
pub mod ledger;
pub mod ports;
pub mod terms;
pub mod workflow;
