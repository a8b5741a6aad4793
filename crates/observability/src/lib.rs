//! Process-wide logging setup.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init(subscriber::DEFAULT_FILTER);
}

/// Subscriber configuration (filters, formatting).
pub mod subscriber;
