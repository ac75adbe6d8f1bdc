//! Main library entry point for Callflow.
//!
//! Level-gated, decorated log lines; scoped entry/exit flow logging; and
//! capture of a traced invocation's runtime call graph, rendered as an
//! indented tree.
//!
//! ```no_run
//! use callflow::Diagnostics;
//!
//! fn work(diag: &Diagnostics) {
//!     let _flow = callflow::flow_check!(diag => 42);
//!     callflow::log_info!(diag => "working");
//! }
//!
//! let diag = Diagnostics::new();
//! diag.configure(["info", "flow_checker"]);
//! let tree = diag.run_traced(|| work(&diag));
//! print!("{tree}");
//! ```

#[macro_use]
mod macros;

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod ports;

pub use application::recorder::{Recorder, SamplingMode, TraceReport};
pub use application::tracer::FlowGuard;
pub use application::{Diagnostics, DiagnosticsBuilder};
pub use config::CallflowConfig;
pub use domain::level::{LevelGate, LogCategory};
pub use error::{ConfigError, TracedFailure};

use std::sync::OnceLock;

static GLOBAL: OnceLock<Diagnostics> = OnceLock::new();

/// The process-wide instance used by the macros' short forms.
///
/// Created on first use from `CALLFLOW_LEVELS` and defaults.
pub fn global() -> &'static Diagnostics {
    GLOBAL.get_or_init(|| {
        let mut config = CallflowConfig::default();
        config.apply_env();
        Diagnostics::from_config(&config)
    })
}

/// Install `diagnostics` as the process-wide instance.
///
/// Fails, handing the value back, if [`global`] was already initialized.
pub fn set_global(diagnostics: Diagnostics) -> Result<(), Diagnostics> {
    GLOBAL.set(diagnostics)
}
