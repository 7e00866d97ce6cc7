//! Child process capability: spawn, poll, wait, kill.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use volsync_core::{CommandLine, ProcessExit};

use crate::error::SupervisorError;
use crate::Result;

/// Lines of captured output kept per process for diagnostics.
const OUTPUT_TAIL_LINES: usize = 20;

/// How long to wait for output readers after the child has exited.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// A running (or finished) child process.
#[async_trait]
pub trait ManagedProcess: Send {
    /// OS process id, if still known.
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness poll: `None` while running.
    fn try_wait(&mut self) -> io::Result<Option<ProcessExit>>;

    /// Wait for the process to exit. Captured output may still be in
    /// flight; see [`ManagedProcess::collect_output`].
    async fn wait(&mut self) -> io::Result<ProcessExit>;

    /// After exit, let captured output settle into the tail. Bounded, but
    /// not part of the wait a timeout applies to.
    async fn collect_output(&mut self) {}

    /// Forcibly kill the process and reap it.
    async fn kill(&mut self) -> io::Result<()>;

    /// Last captured output lines, oldest first.
    fn output_tail(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Launches processes.
pub trait ProcessSpawner: Send + Sync {
    /// Start `command`. Fails with [`SupervisorError::Launch`] when the
    /// binary cannot be executed.
    fn spawn(&self, command: &CommandLine) -> Result<Box<dyn ManagedProcess>>;
}

/// Kill `process`, tolerating one that already exited.
///
/// Failures are logged at info and returned as
/// [`SupervisorError::Termination`] for callers that care; they are never
/// fatal.
pub async fn terminate(process: &mut dyn ManagedProcess, label: &str) -> Result<()> {
    let pid = process.id();
    match process.kill().await {
        Ok(()) => {
            debug!(label, pid = ?pid, "process terminated");
            Ok(())
        }
        Err(e) => {
            info!(label, pid = ?pid, error = %e, "could not terminate process");
            Err(SupervisorError::Termination {
                label: label.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Spawns real OS processes through tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, command: &CommandLine) -> Result<Box<dyn ManagedProcess>> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if command.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|source| SupervisorError::Launch {
            program: command.program.clone(),
            source,
        })?;

        let tail = OutputTail::default();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, "stdout", &command.program, &tail));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, "stderr", &command.program, &tail));
        }

        debug!(pid = ?child.id(), command = %command, "process started");

        Ok(Box::new(SystemProcess {
            child,
            tail,
            readers,
        }))
    }
}

/// A tokio child plus its captured output.
struct SystemProcess {
    child: Child,
    tail: OutputTail,
    readers: Vec<JoinHandle<()>>,
}

impl SystemProcess {
    /// Let output readers flush what the child wrote before exiting.
    async fn drain_output(&mut self) {
        for reader in self.readers.drain(..) {
            if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, reader).await.is_err() {
                debug!("output reader still open after exit");
            }
        }
    }
}

#[async_trait]
impl ManagedProcess for SystemProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_wait(&mut self) -> io::Result<Option<ProcessExit>> {
        Ok(self.child.try_wait()?.map(ProcessExit::from))
    }

    async fn wait(&mut self) -> io::Result<ProcessExit> {
        Ok(self.child.wait().await?.into())
    }

    async fn collect_output(&mut self) {
        self.drain_output().await;
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }

    fn output_tail(&self) -> Vec<String> {
        self.tail.lines()
    }
}

/// Bounded ring of the most recent output lines.
#[derive(Debug, Default, Clone)]
struct OutputTail {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl OutputTail {
    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == OUTPUT_TAIL_LINES {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Log every line of `reader` at debug and keep it in `tail`.
fn forward_lines<R>(
    reader: R,
    stream: &'static str,
    program: &str,
    tail: &OutputTail,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let program = program.to_string();
    let tail = tail.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(program = %program, stream, "{line}");
            tail.push(line);
        }
    })
}
