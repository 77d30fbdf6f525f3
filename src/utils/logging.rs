// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the fmt subscriber. `RUST_LOG` wins when set; otherwise the
/// level is "info", or "debug" when `debug` is on. Events go to stderr so the
/// run summary on stdout stays clean.
pub fn setup_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Subscriber already installed, keeping it");
    } else {
        tracing::debug!("Logging setup complete.");
    }
}
