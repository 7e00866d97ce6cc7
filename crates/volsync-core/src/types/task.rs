use std::fmt;
use std::time::Duration;

use super::PeerAddress;

/// Base arguments of every outbound sync invocation: non-interactive,
/// newest side wins, no confirmation prompts for large deletes or merges.
pub const DEFAULT_CLIENT_ARGS: [&str; 10] = [
    "-auto",
    "-batch",
    "-fastcheck",
    "-group",
    "-owner",
    "-prefer=newer",
    "-silent",
    "-times",
    "-confirmbigdel=false",
    "-confirmmerge=false",
];

/// Default sync tool binary
pub const DEFAULT_TOOL: &str = "unison";

/// Default port the listener binds and peers connect to
pub const DEFAULT_PORT: u16 = 2222;

/// A program invocation, ready to hand to a process spawner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Binary name or path
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Pipe stdout/stderr back to the supervisor instead of inheriting them
    pub capture_output: bool,
}

impl CommandLine {
    /// Command with no arguments, inheriting output
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_output: false,
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Capture output for diagnostics
    #[must_use]
    pub const fn captured(mut self) -> Self {
        self.capture_output = true;
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The external sync tool and its fixed client arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTool {
    /// Binary name or path
    pub program: String,
    /// Arguments placed before any operator-supplied extras
    pub base_args: Vec<String>,
}

impl Default for SyncTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl SyncTool {
    /// Tool with the default client arguments
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: DEFAULT_CLIENT_ARGS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Tool whose client invocation carries only the extra arguments
    #[must_use]
    pub fn bare(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// `<tool> -socket <port>`
    #[must_use]
    pub fn listener_command(&self, port: u16) -> CommandLine {
        CommandLine::new(&self.program)
            .arg("-socket")
            .arg(port.to_string())
    }

    /// `<tool> <base args> <extra args> <path> socket://<ip>:<port>/<path>`
    #[must_use]
    pub fn client_command(&self, task: &SyncTask) -> CommandLine {
        CommandLine::new(&self.program)
            .args(self.base_args.iter().cloned())
            .args(task.extra_args.iter().cloned())
            .arg(task.path.clone())
            .arg(task.target_url())
            .captured()
    }
}

/// One outbound sync attempt against one peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTask {
    /// Local folder, also used as the remote folder
    pub path: String,
    /// Peer to sync with
    pub target: PeerAddress,
    /// Port of the peer's listener
    pub port: u16,
    /// Wait bound, `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Operator-supplied tool arguments
    pub extra_args: Vec<String>,
}

impl SyncTask {
    /// Remote root in the tool's socket syntax
    #[must_use]
    pub fn target_url(&self) -> String {
        format!("socket://{}:{}/{}", self.target, self.port, self.path)
    }
}
