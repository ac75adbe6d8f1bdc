//! Internal diagnostics for the crate itself.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: events about callflow's own behaviour
//!   (sessions started, failures suppressed), via `RUST_LOG`, to stderr.
//!
//! - **Emitter (`application::emitter`)**: the user-facing decorated lines
//!   on stdout, gated by log categories and unaffected by `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber for internal logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format. Calling it twice is harmless.
///
/// # Example
/// ```bash
/// RUST_LOG=callflow=debug cargo run -- --levels info
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
