//! Fake resolver and process spawner for driving the runner and loop
//! without DNS or real processes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use volsync_core::{CommandLine, GroupView, PeerAddress, ProcessExit};

use crate::error::SupervisorError;
use crate::process::{ManagedProcess, ProcessSpawner};
use crate::resolver::GroupResolver;
use crate::Result;

/// Scripted behavior of one fake process.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Exit with `code` after `after`.
    Exit { code: i32, after: Duration },
    /// Run until killed.
    Hang,
    /// Fail to launch.
    FailLaunch,
    /// Report alive for `polls` liveness polls, then exit 0.
    Listener { polls: usize },
}

impl Behavior {
    pub const fn exit(code: i32, after_secs: u64) -> Self {
        Self::Exit {
            code,
            after: Duration::from_secs(after_secs),
        }
    }
}

#[derive(Debug)]
struct SpawnerState {
    script: VecDeque<Behavior>,
    client_default: Behavior,
    listener: Behavior,
    clients: Vec<(CommandLine, Instant)>,
    listeners: usize,
    attempts: usize,
    kills: usize,
}

/// Spawner whose children follow scripted behaviors.
///
/// Commands containing `-socket` are listeners; everything else is a
/// client and consumes the script, then `client_default`.
#[derive(Debug, Clone)]
pub struct FakeSpawner {
    state: Arc<Mutex<SpawnerState>>,
}

impl FakeSpawner {
    pub fn new(client_default: Behavior) -> Self {
        Self {
            state: Arc::new(Mutex::new(SpawnerState {
                script: VecDeque::new(),
                client_default,
                listener: Behavior::Listener { polls: usize::MAX },
                clients: Vec::new(),
                listeners: 0,
                attempts: 0,
                kills: 0,
            })),
        }
    }

    pub fn with_listener(self, listener: Behavior) -> Self {
        self.state.lock().unwrap().listener = listener;
        self
    }

    pub fn script(&self, behaviors: impl IntoIterator<Item = Behavior>) {
        self.state.lock().unwrap().script.extend(behaviors);
    }

    pub fn client_commands(&self) -> Vec<CommandLine> {
        let state = self.state.lock().unwrap();
        state.clients.iter().map(|(cmd, _)| cmd.clone()).collect()
    }

    pub fn client_starts(&self) -> Vec<Instant> {
        let state = self.state.lock().unwrap();
        state.clients.iter().map(|(_, at)| *at).collect()
    }

    pub fn listeners(&self) -> usize {
        self.state.lock().unwrap().listeners
    }

    pub fn spawn_attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }

    pub fn kills(&self) -> usize {
        self.state.lock().unwrap().kills
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, command: &CommandLine) -> Result<Box<dyn ManagedProcess>> {
        let mut state = self.state.lock().unwrap();
        let is_listener = command.args.iter().any(|a| a == "-socket");

        let behavior = if is_listener {
            state.listener
        } else {
            state.attempts += 1;
            let fallback = state.client_default;
            state.script.pop_front().unwrap_or(fallback)
        };

        if matches!(behavior, Behavior::FailLaunch) {
            return Err(SupervisorError::Launch {
                program: command.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }

        if is_listener {
            state.listeners += 1;
        } else {
            state.clients.push((command.clone(), Instant::now()));
        }

        Ok(Box::new(FakeProcess {
            behavior,
            polls: 0,
            exited: None,
            spawner: Arc::clone(&self.state),
        }))
    }
}

struct FakeProcess {
    behavior: Behavior,
    polls: usize,
    exited: Option<ProcessExit>,
    spawner: Arc<Mutex<SpawnerState>>,
}

#[async_trait]
impl ManagedProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        self.exited.is_none().then_some(4242)
    }

    fn try_wait(&mut self) -> io::Result<Option<ProcessExit>> {
        if self.exited.is_none() {
            if let Behavior::Listener { polls } = self.behavior {
                self.polls += 1;
                if self.polls > polls {
                    self.exited = Some(ProcessExit::code(0));
                }
            }
        }
        Ok(self.exited)
    }

    async fn wait(&mut self) -> io::Result<ProcessExit> {
        if let Some(exit) = self.exited {
            return Ok(exit);
        }
        match self.behavior {
            Behavior::Exit { code, after } => {
                tokio::time::sleep(after).await;
                self.exited = Some(ProcessExit::code(code));
                Ok(ProcessExit::code(code))
            }
            _ => std::future::pending().await,
        }
    }

    async fn kill(&mut self) -> io::Result<()> {
        if self.exited.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid argument: can't kill an exited process",
            ));
        }
        self.exited = Some(ProcessExit::signaled());
        self.spawner.lock().unwrap().kills += 1;
        Ok(())
    }
}

/// Resolver returning scripted views, then a fixed one.
#[derive(Debug)]
pub struct FakeResolver {
    own: PeerAddress,
    fallback: GroupView,
    script: Mutex<VecDeque<Result<GroupView>>>,
    lookups: Mutex<usize>,
}

impl FakeResolver {
    pub fn new(own: &str, group: &[&str]) -> Self {
        Self {
            own: own.parse().unwrap(),
            fallback: view(group),
            script: Mutex::new(VecDeque::new()),
            lookups: Mutex::new(0),
        }
    }

    pub fn then_fail(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(SupervisorError::resolution("sync.", "scripted failure")));
        self
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl GroupResolver for FakeResolver {
    async fn resolve(&self, _group: &str) -> Result<GroupView> {
        *self.lookups.lock().unwrap() += 1;
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    async fn self_address(&self) -> Result<PeerAddress> {
        Ok(self.own)
    }
}

pub fn view(addrs: &[&str]) -> GroupView {
    addrs.iter().map(|a| a.parse::<PeerAddress>().unwrap()).collect()
}
