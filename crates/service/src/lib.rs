//! `tally-service`: the shared expense-sharing service.
//!
//! Wraps the ledger aggregate and the expense book behind a single
//! reader/writer lock: mutations are serialized, reads run concurrently with
//! each other but never alongside a write. Accepted changes are published as
//! [`tally_events::EventEnvelope`]s after the lock is released.

pub mod config;
pub mod error;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use service::{LedgerEnvelope, SharingService};
