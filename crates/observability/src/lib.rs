//! Process-wide tracing setup shared by the promo binaries.

/// Subscriber configuration (filters, output format).
pub mod subscriber;

pub use subscriber::{LogFormat, UnknownLogFormat};

/// Initialize tracing with the format named by `PROMO_LOG_FORMAT`
/// (JSON when unset).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    subscriber::init(LogFormat::from_env());
}
