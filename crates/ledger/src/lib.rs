//! Balance ledger engine (pure domain logic: no IO, no locking).
//!
//! - [`graph`]: the netted store of directed debts.
//! - [`simplify`]: read-time transitive chain collapse.
//! - [`balances`]: snapshots served to callers.
//! - [`ledger`]: the aggregate tying them together behind commands/events.

pub mod balances;
pub mod graph;
pub mod ledger;
pub mod simplify;

pub use balances::{BalanceSheet, Debt, UserBalances};
pub use graph::{DebtGraph, ParticipantIndex};
pub use ledger::{
    ExpenseRecorded, Ledger, LedgerCommand, LedgerEvent, RecordExpense, SetSimplification,
    SimplificationToggled,
};
pub use simplify::{Simplification, SimplifyOptions, collapse_chains, net_pairs};
