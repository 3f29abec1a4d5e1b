// Logging setup
// tracing everywhere in the library; the binary decides where it goes.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Level comes from `RUST_LOG` (default: `info`), e.g.
/// `RUST_LOG=roster_reconcile=debug` to see every resolution decision.
/// Output goes to stderr so stdout only carries the run summary.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Subscriber for tests: debug level, captured by the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
