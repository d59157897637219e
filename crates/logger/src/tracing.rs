use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing at `INFO`, overridable through `RUST_LOG`.
pub fn init_tracing() {
    initialize_tracing(LevelFilter::INFO);
}

/// Initialize tracing with an explicit default level, used by `--verbose`.
pub fn init(level: LevelFilter) {
    initialize_tracing(level);
}

/// Install the global subscriber.
///
/// `RUST_LOG_FORMAT=json` emits one JSON object per event, which keeps the
/// probe fields (`url`, `category`, `duration_ms`, ...) machine readable.
/// Anything else falls back to the compact human format. Calling this twice
/// is harmless: the second subscriber is silently discarded.
fn initialize_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT")
        .inspect_err(|error| {
            warn!("Failed to read RUST_LOG_FORMAT, falling back to default: {error}")
        })
        .unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    let _ = tracing_subscriber::registry().with(log_layer).try_init();
}
