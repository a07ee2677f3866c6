//! Logging setup utilities for the Tunebox binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// Both the library crates and the binary log at `default_log_level` unless
/// `RUST_LOG` says otherwise.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "tunebox-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use tunebox_shared::logger::setup_logger;
///
/// setup_logger("tunebox-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the filter directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary = binary_name.replace('-', "_");
    format!(
        "tunebox_shared={level},tunebox_server={level},tunebox_client={level},{binary}={level},tower_http={level}",
        level = default_log_level,
    )
}
