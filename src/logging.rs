//! Diagnostic logging
//!
//! Diagnostics go to stderr through `tracing`. Stdout carries only the
//! configuration banner and the results report.

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// `RUST_LOG` is respected. Without it the level is `info`, or `debug` when
/// `debug` is set.
pub fn init_subscriber(debug: bool) {
    let fmt_layer = fmt::layer()
        .with_target(debug)
        .with_writer(std::io::stderr);

    let filter_layer = EnvFilter::builder()
        .with_default_directive(default_level(debug).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// Install a subscriber for the current test thread only
///
/// Dropping the returned guard restores the previous default.
pub fn init_test_subscriber() -> tracing::subscriber::DefaultGuard {
    let fmt_layer = fmt::layer().with_target(true).with_test_writer();

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .set_default()
}

fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}
