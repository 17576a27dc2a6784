//! Tracing subscriber set-up.
//!
//! Logs go to stderr so rendered pages on stdout stay clean. `RUST_LOG`
//! wins over the verbosity flag when it is set.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Filter directive for a `-v` count: warn, info, then debug.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber. Fails when one is already installed.
pub fn init(verbosity: u8) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
}
