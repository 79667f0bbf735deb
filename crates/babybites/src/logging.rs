//! Subscriber setup shared by the `babybites` binaries.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_directive` (e.g. `"info"` or
/// `"babybites=debug,tower_http=debug"`) when `RUST_LOG` is unset or invalid.
/// Logs go to stderr so stdout stays clean for `--json` output.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
