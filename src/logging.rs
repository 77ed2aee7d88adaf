//! Structured logging setup.
//!
//! The library itself only emits `tracing` events:
//!
//! - **INFO**: run start and completion, replication batches
//! - **DEBUG**: service starts and replication seeds
//! - **TRACE**: every processed event (very verbose)
//! - **ERROR**: broken engine invariants, with the run's parameters, clock and event counts
//!
//! Binaries install a subscriber with one of the functions below. `RUST_LOG` takes precedence over the level passed
//! in, e.g. `RUST_LOG=mmc_sim=trace`.

use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info` level.
pub fn init_logging() {
    init_logging_with_level("info");
}

/// Initialize logging with a specific default level: "trace", "debug", "info", "warn" or "error".
///
/// Logs go to stderr so that stdout stays free for results. Calling this more than once is harmless; only the first
/// subscriber is installed.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| format!("mmc_sim={level}").into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("logging initialized at level: {}", level);
    }
}
