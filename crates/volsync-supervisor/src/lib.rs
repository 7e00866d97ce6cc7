//! Peer resolution, sync process supervision and the volsync cycle loop.
//!
//! # Architecture
//!
//! ```text
//! Supervisor (one task, explicit state)
//!   Starting:     clean tool metadata -> start listener -> warm-up
//!   Waiting:      sleep max(0, interval - since last sync) -> listener alive?
//!   Syncing:      GroupResolver -> PeerSelector -> SyncRunner (sequential)
//!   ShuttingDown: stop listener
//! ```
//!
//! Processes are reached only through [`ProcessSpawner`] and
//! [`ManagedProcess`], so the runner and the loop run unchanged against
//! [`SystemSpawner`] in production and against fakes in tests.

pub mod error;
pub mod listener;
pub mod process;
pub mod resolver;
pub mod runner;
pub mod shutdown;
pub mod supervisor;

#[cfg(test)]
mod testing;

// Re-exports for convenience.
pub use error::SupervisorError;
pub use listener::ListenerHandle;
pub use process::{terminate, ManagedProcess, ProcessSpawner, SystemSpawner};
pub use resolver::{DnsGroupResolver, GroupResolver};
pub use runner::{CycleReport, SyncOutcome, SyncRunner};
pub use shutdown::ShutdownSignal;
pub use supervisor::{LoopState, Supervisor};

/// Result type for supervisor operations.
pub type Result<T> = std::result::Result<T, SupervisorError>;
