//! The volsync cycle loop.

use std::io;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use volsync_core::{GroupView, PeerAddress, PeerSelector, SyncConfig, SyncTask, SyncTool};

use crate::listener::ListenerHandle;
use crate::process::ProcessSpawner;
use crate::resolver::GroupResolver;
use crate::runner::{CycleReport, SyncRunner};
use crate::shutdown::ShutdownSignal;
use crate::Result;

/// Phase of the supervisor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Cleaning metadata, starting the listener, warming up
    Starting,
    /// Sleeping until the next cycle is due
    Waiting,
    /// Running one sync cycle
    Syncing,
    /// Stopping the listener
    ShuttingDown,
    /// Terminal
    Stopped,
}

/// Drives one node: listener, periodic sync cycles and shutdown.
///
/// All loop state lives here and is threaded through the phases by
/// [`Supervisor::run`]. Only one task touches it.
pub struct Supervisor<R, S> {
    config: SyncConfig,
    tool: SyncTool,
    extra_args: Vec<String>,
    selector: PeerSelector,
    resolver: R,
    spawner: S,
    shutdown: ShutdownSignal,
    listener: Option<ListenerHandle>,
    last_sync: Option<Instant>,
    state: LoopState,
    cycles: u64,
    last_report: Option<CycleReport>,
}

impl<R, S> Supervisor<R, S>
where
    R: GroupResolver,
    S: ProcessSpawner,
{
    /// Build a supervisor from a merged configuration.
    ///
    /// Fails when the configuration does not validate, e.g. when the extra
    /// arguments have unbalanced quotes.
    pub fn new(
        config: SyncConfig,
        resolver: R,
        spawner: S,
        shutdown: ShutdownSignal,
    ) -> Result<Self> {
        config.validate()?;
        let extra_args = config.extra_args()?;

        Ok(Self {
            tool: config.sync_tool(),
            selector: PeerSelector::new(config.strategy),
            extra_args,
            config,
            resolver,
            spawner,
            shutdown,
            listener: None,
            last_sync: None,
            state: LoopState::Starting,
            cycles: 0,
            last_report: None,
        })
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Number of sync cycles entered so far, skipped ones included.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Report of the most recent completed cycle.
    #[must_use]
    pub const fn last_report(&self) -> Option<CycleReport> {
        self.last_report
    }

    /// The resolver this supervisor discovers peers with.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Handle to raise shutdown from outside the loop.
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run until shutdown.
    ///
    /// Returns `Ok` on every controlled shutdown, listener death included.
    /// The only error is a listener that cannot be launched.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            group = %self.config.group,
            strategy = %self.config.strategy,
            interval = ?self.config.interval(),
            timeout = ?self.config.timeout(),
            folder = %self.config.folder,
            port = self.config.port,
            "volsync starting"
        );

        loop {
            self.state = match self.state {
                LoopState::Starting => match self.start().await {
                    Ok(next) => next,
                    Err(e) => {
                        self.state = LoopState::Stopped;
                        return Err(e);
                    }
                },
                LoopState::Waiting => self.wait().await,
                LoopState::Syncing => self.sync_cycle().await,
                LoopState::ShuttingDown => self.shut_down().await,
                LoopState::Stopped => return Ok(()),
            };
        }
    }

    async fn start(&mut self) -> Result<LoopState> {
        self.clean_state_dir().await;

        let command = self.tool.listener_command(self.config.port);
        self.listener = Some(ListenerHandle::start(&self.spawner, command)?);

        let warmup = self.config.warmup();
        if !warmup.is_zero() {
            info!(warmup = ?warmup, "waiting before first sync");
        }
        if !self.shutdown.sleep(warmup).await {
            return Ok(LoopState::ShuttingDown);
        }

        self.last_sync = Some(Instant::now());
        Ok(LoopState::Waiting)
    }

    /// Remove metadata left by a previous run of the tool.
    async fn clean_state_dir(&self) {
        let Some(dir) = self.config.state_dir.as_deref() else {
            return;
        };

        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => info!(path = %dir.display(), "removed stale sync metadata"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %dir.display(), "no stale sync metadata");
            }
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "could not remove sync metadata");
            }
        }
    }

    async fn wait(&mut self) -> LoopState {
        let elapsed = self.last_sync.map_or(Duration::ZERO, |at| at.elapsed());
        let remaining = self.config.interval().saturating_sub(elapsed);
        if !remaining.is_zero() {
            debug!(remaining_ms = remaining.as_millis(), "waiting for next cycle");
        }

        if !self.shutdown.sleep(remaining).await {
            return LoopState::ShuttingDown;
        }

        match self.listener.as_mut().map(ListenerHandle::is_alive) {
            Some(true) => LoopState::Syncing,
            _ => {
                self.shutdown.trigger();
                LoopState::ShuttingDown
            }
        }
    }

    async fn sync_cycle(&mut self) -> LoopState {
        // Taken before any task runs so an overrun shortens the next wait.
        self.last_sync = Some(Instant::now());
        self.cycles += 1;
        let cycle = self.cycles;

        let (own, group) = match self.resolve().await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(
                    cycle,
                    group = %self.config.group,
                    error = %e,
                    "could not resolve sync group, skipping cycle"
                );
                return LoopState::Waiting;
            }
        };
        debug!(cycle, own = %own, group = %group, "resolved sync group");

        let selection = self.selector.select(&group, own);
        if selection.is_empty() {
            info!(cycle, "no peers to sync");
            self.last_report = Some(CycleReport::default());
            return LoopState::Waiting;
        }

        let tasks: Vec<SyncTask> = selection
            .targets
            .iter()
            .map(|target| self.config.task_for(*target, &self.extra_args))
            .collect();

        let report = SyncRunner::new(&self.spawner, &self.tool)
            .run_all(&tasks, &self.shutdown)
            .await;

        info!(
            cycle,
            selected = report.selected,
            succeeded = report.succeeded,
            failed = report.failed,
            timed_out = report.timed_out,
            launch_failed = report.launch_failed,
            skipped = report.skipped,
            "sync cycle finished"
        );
        self.last_report = Some(report);
        LoopState::Waiting
    }

    async fn resolve(&self) -> Result<(PeerAddress, GroupView)> {
        let own = self.resolver.self_address().await?;
        let group = self.resolver.resolve(&self.config.group).await?;
        Ok((own, group))
    }

    async fn shut_down(&mut self) -> LoopState {
        if let Some(listener) = self.listener.take() {
            listener.stop().await;
        }
        info!(cycles = self.cycles, "volsync stopped");
        LoopState::Stopped
    }
}
