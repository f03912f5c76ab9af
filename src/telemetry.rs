//! Structured logging setup.

use crate::config::TelemetryConfig;

/// Builds the filter directive: `RUST_LOG` when set and non-empty, otherwise
/// this crate at `level`.
pub fn filter_directive(level: &str, rust_log: Option<&str>) -> String {
    rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("checkout_gateway={}", level.to_ascii_lowercase()))
}

/// Installs the global `tracing` subscriber.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = EnvFilter::new(filter_directive(level, rust_log.as_deref()));

    let result = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    if result.is_ok() {
        tracing::debug!(level, json, "Tracing initialized");
    }
}

/// Installs the subscriber described by `config`.
pub fn init(config: &TelemetryConfig) {
    init_tracing(&config.level, config.json);
}
