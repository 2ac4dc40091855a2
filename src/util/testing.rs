//! Tracing setup shared by unit and integration tests

use std::sync::Once;

use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

/// Log targets left out of test output; both log every entry or coordinate.
const QUIET_TARGETS: [&str; 2] = ["proj4rs", "zip"];

static INIT: Once = Once::new();

/// Install a subscriber writing through the test harness, once per binary.
///
/// `SHASON_LOG` selects the filter. Without it only warnings are shown.
pub fn init_test_setup() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("SHASON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        let layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter_fn(|metadata| !is_quiet(metadata.target())))
            .with_filter(filter);

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}

fn is_quiet(target: &str) -> bool {
    QUIET_TARGETS.iter().any(|prefix| target.starts_with(prefix))
}
