//! Error types for resolution and process supervision.

use thiserror::Error;

/// Errors that can occur while supervising sync processes.
///
/// None of these end the loop on their own: resolution and launch failures
/// skip the current cycle, termination failures are only logged. The one
/// exception is a listener that cannot be launched at startup.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// Group or own hostname could not be resolved.
    #[error("could not resolve {name}: {reason}")]
    Resolution { name: String, reason: String },

    /// Sync tool binary is missing or not executable.
    #[error("could not launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Best-effort kill failed, usually because the process already exited.
    #[error("could not terminate {label}: {reason}")]
    Termination { label: String, reason: String },

    /// Sync listener could not be started.
    #[error("sync listener failed to start: {0}")]
    Listener(String),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] volsync_core::CoreError),
}

impl SupervisorError {
    /// Resolution failure for `name`.
    pub fn resolution(name: &str, reason: impl ToString) -> Self {
        Self::Resolution {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
