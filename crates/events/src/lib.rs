//! Ledger events and their distribution.
//!
//! Events describe accepted ledger changes as immutable facts. They are
//! wrapped in an [`EventEnvelope`] carrying stream position and published on
//! an [`EventBus`] so that observers (audit logs, notifiers) can follow the
//! ledger without reaching into it.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
