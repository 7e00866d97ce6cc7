//! Outbound sync execution.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use volsync_core::{ProcessExit, SyncTask, SyncTool};

use crate::process::{terminate, ProcessSpawner};
use crate::shutdown::ShutdownSignal;

/// Result of one sync attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The tool exited on its own.
    Completed {
        /// How it exited
        exit: ProcessExit,
    },
    /// The wait bound ran out and the tool was killed.
    TimedOut {
        /// The bound that was exceeded
        after: Duration,
    },
    /// The tool could not be started.
    LaunchFailed {
        /// Launch error
        reason: String,
    },
    /// The tool started but could not be awaited; it was killed.
    Lost {
        /// Wait error
        reason: String,
    },
}

impl SyncOutcome {
    /// True only for a zero exit code
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { exit } if exit.success())
    }
}

/// Counters for one cycle's tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Targets chosen by the selector
    pub selected: usize,
    /// Exited with code 0
    pub succeeded: usize,
    /// Exited non-zero, by signal, or could not be awaited
    pub failed: usize,
    /// Killed after the wait bound
    pub timed_out: usize,
    /// Could not be started
    pub launch_failed: usize,
    /// Not attempted because of shutdown or a launch failure
    pub skipped: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Completed { exit } if exit.success() => self.succeeded += 1,
            SyncOutcome::Completed { .. } | SyncOutcome::Lost { .. } => self.failed += 1,
            SyncOutcome::TimedOut { .. } => self.timed_out += 1,
            SyncOutcome::LaunchFailed { .. } => self.launch_failed += 1,
        }
    }
}

/// Runs sync tasks one at a time.
pub struct SyncRunner<'a> {
    spawner: &'a dyn ProcessSpawner,
    tool: &'a SyncTool,
}

impl<'a> SyncRunner<'a> {
    /// Runner launching `tool` through `spawner`
    #[must_use]
    pub fn new(spawner: &'a dyn ProcessSpawner, tool: &'a SyncTool) -> Self {
        Self { spawner, tool }
    }

    /// Run one task to completion, timeout or launch failure.
    pub async fn run(&self, task: &SyncTask) -> SyncOutcome {
        let command = self.tool.client_command(task);
        info!(peer = %task.target, timeout = ?task.timeout, command = %command, "running sync");

        let mut child = match self.spawner.spawn(&command) {
            Ok(child) => child,
            Err(e) => {
                error!(peer = %task.target, error = %e, "could not start sync");
                return SyncOutcome::LaunchFailed {
                    reason: e.to_string(),
                };
            }
        };

        let started = Instant::now();
        let waited = match task.timeout {
            Some(limit) => {
                let bounded = tokio::time::timeout(limit, child.wait()).await;
                if let Ok(waited) = bounded {
                    waited
                } else {
                    warn!(
                        peer = %task.target,
                        timeout = ?limit,
                        "could not finish sync in timeout"
                    );
                    terminate(child.as_mut(), "sync client").await.ok();
                    return SyncOutcome::TimedOut { after: limit };
                }
            }
            None => child.wait().await,
        };
        let elapsed_ms = started.elapsed().as_millis();
        if waited.is_ok() {
            child.collect_output().await;
        }

        match waited {
            Ok(exit) if exit.success() => {
                info!(peer = %task.target, elapsed_ms, "sync finished");
                SyncOutcome::Completed { exit }
            }
            Ok(exit) => {
                warn!(
                    peer = %task.target,
                    exit = %exit,
                    elapsed_ms,
                    output = ?child.output_tail(),
                    "sync failed"
                );
                SyncOutcome::Completed { exit }
            }
            Err(e) => {
                warn!(peer = %task.target, error = %e, "lost track of sync process");
                terminate(child.as_mut(), "sync client").await.ok();
                SyncOutcome::Lost {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Run `tasks` in order.
    ///
    /// Checks `shutdown` before every task and skips the rest once it is
    /// raised; a running task always gets its full wait. A launch failure
    /// skips the rest too, since every later target would fail the same way.
    pub async fn run_all(&self, tasks: &[SyncTask], shutdown: &ShutdownSignal) -> CycleReport {
        let mut report = CycleReport {
            selected: tasks.len(),
            ..CycleReport::default()
        };

        for (i, task) in tasks.iter().enumerate() {
            if shutdown.is_triggered() {
                report.skipped = tasks.len() - i;
                info!(skipped = report.skipped, "shutdown requested, skipping remaining targets");
                break;
            }

            let outcome = self.run(task).await;
            debug!(peer = %task.target, outcome = ?outcome, "sync attempt done");
            report.record(&outcome);

            if matches!(outcome, SyncOutcome::LaunchFailed { .. }) {
                report.skipped = tasks.len() - i - 1;
                if report.skipped > 0 {
                    warn!(
                        skipped = report.skipped,
                        "sync tool unavailable, skipping remaining targets"
                    );
                }
                break;
            }
        }

        report
    }
}
