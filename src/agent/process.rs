//! Process Runner
//!
//! Capability interface for running a command with an environment and a
//! deadline. The invoker only depends on `ProcessRunner`, so its outcome
//! classification is tested against a scripted fake without spawning.
//!
//! `TokioProcessRunner` is the real implementation:
//! - stdin is closed, stdout/stderr are captured in memory (not streamed)
//! - the environment is replaced wholesale by the `AgentEnvironment`
//! - on Unix the child leads its own process group; on timeout the whole
//!   group is killed and the child is reaped before `run` returns
//! - groups of agents still running are tracked, so an interrupted run can
//!   kill them with `kill_all` before exiting

use async_trait::async_trait;
use std::collections::HashSet;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::debug;

use super::{AgentEnvironment, CommandLine};

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (`None` when terminated by a signal)
    pub code: Option<i32>,
    /// Exit status was zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Failure of the process capability itself
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("command not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Run a command to completion, bounded by a timeout
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        command: &CommandLine,
        env: &AgentEnvironment,
        timeout: Duration,
    ) -> Result<ProcessOutput, ProcessError>;
}

/// Shared runner type for concurrent access across invocation tasks
pub type SharedRunner = Arc<dyn ProcessRunner>;

/// `ProcessRunner` backed by `tokio::process`
///
/// Clones share the registry of live process groups.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    live: Arc<LiveGroups>,
}

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRunner {
        Arc::new(Self::new())
    }

    /// SIGKILL every process group spawned by this runner that is still
    /// running; returns how many groups were signalled
    pub fn kill_all(&self) -> usize {
        let groups = self.live.lock();
        for pgid in groups.iter() {
            kill_group(*pgid);
        }
        groups.len()
    }
}

/// Process group ids of agents whose `run` has not returned yet
#[derive(Debug, Default)]
struct LiveGroups(Mutex<HashSet<u32>>);

impl LiveGroups {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<u32>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn track(&self, pgid: Option<u32>) -> GroupGuard<'_> {
        if let Some(pgid) = pgid {
            self.lock().insert(pgid);
        }
        GroupGuard { live: self, pgid }
    }
}

/// Removes a group from the registry when its `run` ends, however it ends
struct GroupGuard<'a> {
    live: &'a LiveGroups,
    pgid: Option<u32>,
}

impl Drop for GroupGuard<'_> {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid {
            self.live.lock().remove(&pgid);
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: &CommandLine,
        env: &AgentEnvironment,
        timeout: Duration,
    ) -> Result<ProcessOutput, ProcessError> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .env_clear()
            .envs(env.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProcessError::NotFound(command.program().to_string()),
            _ => ProcessError::Io(e),
        })?;

        // The leader may be reaped before a timeout fires while other group
        // members still hold the pipes, so the id is captured now
        let pgid = child.id();
        let _tracked = self.live.track(pgid);

        debug!(
            "Spawned {} (pid={:?}, timeout={:?})",
            command.program(),
            pgid,
            timeout
        );

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain both pipes while waiting so a chatty child cannot block on a full pipe
        let completed = tokio::time::timeout(timeout, async {
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_stream(stdout), read_stream(stderr));
            Ok::<_, std::io::Error>((status?, stdout?, stderr?))
        })
        .await;

        match completed {
            Ok(Ok((status, stdout, stderr))) => Ok(ProcessOutput {
                code: status.code(),
                success: status.success(),
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            }),
            Ok(Err(e)) => {
                terminate(&mut child, pgid).await;
                Err(ProcessError::Io(e))
            }
            Err(_) => {
                terminate(&mut child, pgid).await;
                Err(ProcessError::TimedOut(timeout))
            }
        }
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// SIGKILL a whole process group
#[cfg(unix)]
fn kill_group(pgid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
        debug!("killpg({}) failed: {}", pgid, e);
    }
}

/// Children share the caller's group off Unix; only the child itself is killed
#[cfg(not(unix))]
fn kill_group(_pgid: u32) {}

/// Kill the child and its process group, then reap it
async fn terminate(child: &mut Child, pgid: Option<u32>) {
    if let Some(pgid) = pgid {
        kill_group(pgid);
    }

    // No-op when the leader was already reaped
    if let Err(e) = child.start_kill() {
        debug!("start_kill failed: {}", e);
    }
    if let Err(e) = child.wait().await {
        debug!("Failed to reap killed process: {}", e);
    }
}
