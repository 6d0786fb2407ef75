//! Diagnostic tracing.
//!
//! Operator output (progress, warnings, reports) goes to stdout through
//! `println!`. This module only wires `tracing` diagnostics to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `warn`, or `debug` for
/// this crate when `verbose` is set.
///
/// # Example
/// ```bash
/// RUST_LOG=cxml_pipeline=trace cxml-pipeline build
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,cxml_pipeline=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (e.g. several flows in one test process) is not an error.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
