use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a [`crate::config::CallflowConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid callflow config")]
    Parse(#[from] toml::de::Error),
}

/// Why a traced invocation did not complete normally.
///
/// `run_traced` discards these; `run_traced_report` hands them back next to
/// the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TracedFailure {
    #[error("traced invocation panicked: {message}")]
    Panicked { message: String },
    /// Another session was active, so this invocation ran untraced. A panic
    /// it raised is still caught and kept here.
    #[error(
        "another traced invocation was already running; this one ran untraced{}",
        panic_suffix(.panicked)
    )]
    SessionBusy { panicked: Option<String> },
}

fn panic_suffix(panicked: &Option<String>) -> String {
    panicked
        .as_ref()
        .map(|message| format!(" and panicked: {message}"))
        .unwrap_or_default()
}
