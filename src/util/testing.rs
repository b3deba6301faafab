//! Logging setup shared by unit and integration tests

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Install a global subscriber once per test binary.
///
/// `RUST_LOG` wins if set; otherwise everything from this crate down to trace.
/// Output goes through the test writer, so it only shows for failing tests.
pub fn init_test_setup() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("subway=trace"));
        let layer = fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_filter(filter);

        // another harness may already own the global dispatcher
        if let Err(e) = tracing_subscriber::registry().with(layer).try_init() {
            eprintln!("test logging not installed: {e}");
        }
        tracing::debug!("test logging ready");
    });
}
