//! # Telemetry
//!
//! Installs the global tracing subscriber.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages everywhere
//! - `RUST_LOG=ud_engine=trace` - Trace the engine only
//! - Default: the `[logging] filter` of [`EngineConfig`](crate::EngineConfig)

use tracing_subscriber::EnvFilter;

/// Initializes structured logging.
///
/// `RUST_LOG` wins over `default_filter`. Calling this twice is harmless: the
/// second call leaves the first subscriber in place and returns `false`.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
