//! CLI argument parsing and node startup.

pub mod args;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::info;
#[cfg(not(unix))]
use tracing::warn;
use tracing_subscriber::EnvFilter;
use volsync_supervisor::{DnsGroupResolver, ShutdownSignal, Supervisor, SystemSpawner};

use crate::config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug_enabled());

    // Merge file, environment and flags
    let config = config::load(&cli)?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let shutdown = ShutdownSignal::new();
    // Registered before the listener exists, so no signal takes the default action.
    let signals = ShutdownSignals::install().context("could not install signal handlers")?;
    tokio::spawn(signals.forward(shutdown.clone()));

    let mut supervisor = Supervisor::new(
        config,
        DnsGroupResolver::new(),
        SystemSpawner,
        shutdown,
    )?;

    supervisor.run().await.context("volsync stopped with an error")
}

/// Log filter: `RUST_LOG` when set, else debug or info.
fn init_tracing(debug: bool) {
    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// SIGINT and SIGTERM handlers, registered at construction.
#[cfg(unix)]
struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Raise `shutdown` on the first signal received.
    async fn forward(mut self, shutdown: ShutdownSignal) {
        tokio::select! {
            _ = self.interrupt.recv() => info!("interrupt received, stopping"),
            _ = self.terminate.recv() => info!("SIGTERM received, stopping"),
        }
        shutdown.trigger();
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    #[allow(clippy::unnecessary_wraps)]
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn forward(self, shutdown: ShutdownSignal) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not listen for interrupt");
            return;
        }
        info!("interrupt received, stopping");
        shutdown.trigger();
    }
}
