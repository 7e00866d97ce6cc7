//! Sync node configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};
use crate::types::{PeerAddress, SyncStrategy, SyncTask, SyncTool, DEFAULT_PORT, DEFAULT_TOOL};

/// Configuration for one volsync node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum seconds between the starts of two cycles (0: back to back).
    pub interval_secs: u64,

    /// Per-task wait bound in seconds; absent or negative waits forever.
    pub timeout_secs: Option<i64>,

    /// DNS name every group member is registered under.
    pub group: String,

    /// Target selection strategy.
    pub strategy: SyncStrategy,

    /// Seconds to wait after starting the listener before the first cycle.
    pub warmup_secs: u64,

    /// Folder kept in sync, locally and on every peer.
    pub folder: String,

    /// Extra tool arguments, tokenized like a shell would.
    pub extra_args: String,

    /// Drop the default client arguments and pass only `extra_args`.
    pub only_extra_args: bool,

    /// Port of the listener on every node.
    pub port: u16,

    /// Sync tool binary.
    pub tool: String,

    /// Tool metadata directory removed at startup (default: `~/.unison`).
    pub state_dir: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 0,
            timeout_secs: None,
            group: String::from("sync"),
            strategy: SyncStrategy::default(),
            warmup_secs: default_warmup(),
            folder: String::from("/volumes"),
            extra_args: String::new(),
            only_extra_args: false,
            port: DEFAULT_PORT,
            tool: String::from(DEFAULT_TOOL),
            state_dir: None,
        }
    }
}

impl SyncConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from TOML text; missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Wait between cycle starts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Warm-up delay before the first cycle.
    #[must_use]
    pub const fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    /// Per-task wait bound, `None` for unbounded.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }

    /// Tokenize [`SyncConfig::extra_args`].
    pub fn extra_args(&self) -> Result<Vec<String>> {
        shlex::split(&self.extra_args).ok_or_else(|| {
            CoreError::ExtraArgs(format!("unbalanced quoting in `{}`", self.extra_args))
        })
    }

    /// The tool with its client base arguments.
    #[must_use]
    pub fn sync_tool(&self) -> SyncTool {
        if self.only_extra_args {
            SyncTool::bare(&self.tool)
        } else {
            SyncTool::new(&self.tool)
        }
    }

    /// Build the task for one target.
    #[must_use]
    pub fn task_for(&self, target: PeerAddress, extra_args: &[String]) -> SyncTask {
        SyncTask {
            path: self.folder.clone(),
            target,
            port: self.port,
            timeout: self.timeout(),
            extra_args: extra_args.to_vec(),
        }
    }

    /// Check values that can only be validated after merging all sources.
    pub fn validate(&self) -> Result<()> {
        self.extra_args()?;
        if self.group.trim().is_empty() {
            return Err(CoreError::Config("group hostname must not be empty".into()));
        }
        if self.tool.trim().is_empty() {
            return Err(CoreError::Config("sync tool must not be empty".into()));
        }
        Ok(())
    }
}

// Default value functions for serde.
const fn default_warmup() -> u64 {
    10
}
