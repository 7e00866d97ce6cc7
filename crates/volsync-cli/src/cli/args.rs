//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// Keep a shared volume in sync across a group of peer containers.
///
/// Every node runs a sync listener and periodically pushes to peers
/// discovered through a common DNS name. Each option can also be given
/// through the environment variable shown next to it.
#[derive(Parser, Debug, Default)]
#[command(name = "volsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file; flags and environment override its values
    #[arg(short, long, env = "VOLSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum seconds between two sync cycles
    #[arg(long, env = "SYNC_INTERVAL", value_name = "SECS")]
    pub interval: Option<u64>,

    /// Seconds one sync may run before it is killed; negative waits forever
    #[arg(long, env = "SYNC_TIMEOUT", value_name = "SECS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// DNS name resolving to every member of the group
    #[arg(long, env = "HOSTNAME", value_name = "NAME")]
    pub group: Option<String>,

    /// Target selection: NEXT, FIRST or ALL (anything else means NEXT)
    #[arg(long, env = "SYNC_TYPE", value_name = "TYPE")]
    pub sync_type: Option<String>,

    /// Seconds to wait after starting the listener before the first sync
    #[arg(long, env = "WAIT_BEFORE_SYNC", value_name = "SECS")]
    pub warmup: Option<u64>,

    /// Folder to keep in sync, locally and on every peer
    #[arg(long, env = "SYNC_FOLDER", value_name = "PATH")]
    pub folder: Option<String>,

    /// Extra sync tool arguments, quoted like in a shell
    #[arg(long, env = "ADDITIONAL_OPTIONS", value_name = "ARGS", allow_hyphen_values = true)]
    pub extra_args: Option<String>,

    /// Pass only the extra arguments, without the default client flags
    #[arg(
        long,
        env = "ONLY_ADDITIONAL_OPTIONS",
        value_name = "ANY",
        num_args = 0..=1,
        default_missing_value = "1"
    )]
    pub only_extra_args: Option<String>,

    /// Port of the sync listener on every node
    #[arg(long, env = "SYNC_PORT")]
    pub port: Option<u16>,

    /// Sync tool binary
    #[arg(long, env = "SYNC_TOOL", value_name = "PROGRAM")]
    pub tool: Option<String>,

    /// Tool metadata removed at startup [default: ~/.unison]
    #[arg(long, env = "SYNC_STATE_DIR", value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, env = "DEBUG", value_name = "ANY", num_args = 0..=1, default_missing_value = "1")]
    pub debug: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Whether debug logging was requested.
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        is_set(self.debug.as_deref())
    }
}

/// Switch-style variables count as set when present with any non-empty value.
#[must_use]
pub fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "volsync",
            "--interval",
            "30",
            "--timeout",
            "-1",
            "--sync-type",
            "all",
            "--extra-args",
            "-batch -prefer newer",
            "--only-extra-args",
            "--debug",
        ])
        .unwrap();

        assert_eq!(cli.interval, Some(30));
        assert_eq!(cli.timeout, Some(-1));
        assert_eq!(cli.sync_type.as_deref(), Some("all"));
        assert_eq!(cli.extra_args.as_deref(), Some("-batch -prefer newer"));
        assert!(is_set(cli.only_extra_args.as_deref()));
        assert!(cli.debug_enabled());
        assert!(!cli.print_config);
    }

    #[test]
    fn test_switch_values() {
        assert!(!is_set(None));
        assert!(!is_set(Some("")));
        assert!(is_set(Some("0")));
        assert!(is_set(Some("yes")));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["volsync", "--port", "70000"]).is_err());
    }
}
