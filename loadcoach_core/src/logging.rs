//! Logging setup shared by the Loadcoach binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging from a `-v` count: 0 → warn, 1 → info, 2+ → debug
///
/// `RUST_LOG` overrides the level picked here.
pub fn init_for_verbosity(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    init_with_level(level)
}

/// Initialize logging with a specific default level
///
/// Logs go to stderr so stdout carries only command output (e.g. `--json`).
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for tests (output captured per test)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
