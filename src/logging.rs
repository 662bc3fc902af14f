//! Diagnostic logging.
//!
//! Log records go to stderr so they never interleave with the report on
//! stdout. `FILE_JANITOR_LOG` takes any `EnvFilter` directive and wins over
//! the verbosity flag.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV_VAR: &str = "FILE_JANITOR_LOG";

/// Default level for a `-v` count.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    // Ignored: a subscriber is already installed (e.g. by a test harness).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
