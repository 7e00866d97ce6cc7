//! Configuration layering.
//!
//! Values come from, in order of precedence: command-line flags, environment
//! variables (both resolved by clap), the TOML file named by `--config`, and
//! built-in defaults.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use volsync_core::{SyncConfig, SyncStrategy};

use crate::cli::args::{is_set, Cli};

/// Name of the sync tool's metadata directory under the home directory.
const STATE_DIR_NAME: &str = ".unison";

/// Build the effective configuration for this run.
pub fn load(cli: &Cli) -> Result<SyncConfig> {
    let base = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            SyncConfig::load(path)
                .with_context(|| format!("could not load config file {}", path.display()))?
        }
        None => SyncConfig::default(),
    };

    let config = merge(base, cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Overlay the values given on the command line or in the environment.
#[must_use]
pub fn merge(mut config: SyncConfig, cli: &Cli) -> SyncConfig {
    if let Some(interval) = cli.interval {
        config.interval_secs = interval;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    if let Some(group) = &cli.group {
        config.group.clone_from(group);
    }
    if let Some(sync_type) = &cli.sync_type {
        config.strategy = SyncStrategy::parse_lenient(sync_type);
    }
    if let Some(warmup) = cli.warmup {
        config.warmup_secs = warmup;
    }
    if let Some(folder) = &cli.folder {
        config.folder.clone_from(folder);
    }
    if let Some(extra_args) = &cli.extra_args {
        config.extra_args.clone_from(extra_args);
    }
    if is_set(cli.only_extra_args.as_deref()) {
        config.only_extra_args = true;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(tool) = &cli.tool {
        config.tool.clone_from(tool);
    }
    if let Some(state_dir) = &cli.state_dir {
        config.state_dir = Some(state_dir.clone());
    }
    if config.state_dir.is_none() {
        config.state_dir = default_state_dir();
    }
    config
}

/// `$HOME/.unison`, when a home directory is known.
#[must_use]
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(STATE_DIR_NAME))
}
