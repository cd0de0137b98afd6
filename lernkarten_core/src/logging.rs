//! Tracing setup shared by the lernkarten binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging from a `-v` count: 0 → warn, 1 → info, 2 → debug, 3+ → trace.
///
/// Card listings and drill prompts go to stdout, so the default stays quiet.
/// `RUST_LOG` always wins.
pub fn init_for_verbosity(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_with_level(level)
}

/// Initialize logging with a specific default level
///
/// # Arguments
/// * `default_level` - Default log level (trace, debug, info, warn, error)
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so piping `list` or `export` output stays clean.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for unit tests (output captured per test)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
