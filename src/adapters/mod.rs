//! Adapters: concrete implementations of the domain ports.

pub mod memory_ledger;

pub use memory_ledger::InMemoryLedger;
