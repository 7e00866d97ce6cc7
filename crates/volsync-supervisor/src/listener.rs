//! Inbound sync listener supervision.
//!
//! The listener serves every peer that selects this node. Without it the
//! node can only push, so its death ends the loop.

use tracing::{info, warn};
use volsync_core::CommandLine;

use crate::error::SupervisorError;
use crate::process::{terminate, ManagedProcess, ProcessSpawner};
use crate::Result;

/// The one running sync listener.
///
/// [`ListenerHandle::stop`] consumes the handle, so it runs at most once.
pub struct ListenerHandle {
    process: Box<dyn ManagedProcess>,
    command: CommandLine,
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("pid", &self.process.id())
            .field("command", &self.command)
            .finish()
    }
}

impl ListenerHandle {
    /// Launch the listener.
    pub fn start(spawner: &dyn ProcessSpawner, command: CommandLine) -> Result<Self> {
        let process = spawner
            .spawn(&command)
            .map_err(|e| SupervisorError::Listener(e.to_string()))?;
        info!(pid = ?process.id(), command = %command, "sync listener started");
        Ok(Self { process, command })
    }

    /// OS process id while known.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.process.id()
    }

    /// Non-blocking liveness check. A listener whose state cannot be
    /// queried counts as dead.
    pub fn is_alive(&mut self) -> bool {
        match self.process.try_wait() {
            Ok(None) => true,
            Ok(Some(exit)) => {
                warn!(
                    exit = %exit,
                    command = %self.command,
                    "sync listener is not running anymore"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "could not poll sync listener");
                false
            }
        }
    }

    /// Terminate the listener, tolerating one that already died.
    pub async fn stop(mut self) {
        if terminate(self.process.as_mut(), "sync listener").await.is_ok() {
            info!("sync listener stopped");
        }
    }
}
