//! Tracing subscriber initialization.
//!
//! Logs are written as JSON lines with timestamps. The filter comes from
//! `RUST_LOG` when set, otherwise from the given default directive.

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Later calls keep the first subscriber.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
    {
        tracing::event!(Level::DEBUG, "tracing subscriber installed");
    }
}
