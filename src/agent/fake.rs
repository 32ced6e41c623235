//! Scripted `ProcessRunner` for tests; never spawns a process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{AgentEnvironment, CommandLine, ProcessError, ProcessOutput, ProcessRunner};

#[derive(Debug, Clone)]
pub(crate) enum FakeBehavior {
    Succeed { stdout: String },
    Exit { code: i32, stderr: String },
    TimeOut,
    NotFound,
    IoError(String),
    Panic(String),
}

impl FakeBehavior {
    pub(crate) fn succeed(stdout: &str) -> Self {
        Self::Succeed {
            stdout: stdout.to_string(),
        }
    }

    pub(crate) fn exit(code: i32, stderr: &str) -> Self {
        Self::Exit {
            code,
            stderr: stderr.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Script {
    behavior: FakeBehavior,
    writes: Vec<PathBuf>,
    delay: Duration,
}

/// Programs without a script behave as if missing from PATH
#[derive(Debug, Default)]
pub(crate) struct FakeRunner {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<CommandLine>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, program: &str, behavior: FakeBehavior) -> Self {
        self.scripts.insert(
            program.to_string(),
            Script {
                behavior,
                writes: Vec::new(),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Simulate the agent writing a file before it exits
    pub(crate) fn writing(mut self, program: &str, path: impl Into<PathBuf>) -> Self {
        if let Some(script) = self.scripts.get_mut(program) {
            script.writes.push(path.into());
        }
        self
    }

    pub(crate) fn delayed(mut self, program: &str, delay: Duration) -> Self {
        if let Some(script) = self.scripts.get_mut(program) {
            script.delay = delay;
        }
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.program() == program)
            .count()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn run(
        &self,
        command: &CommandLine,
        _env: &AgentEnvironment,
        timeout: Duration,
    ) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());

        let Some(script) = self.scripts.get(command.program()).cloned() else {
            return Err(ProcessError::NotFound(command.program().to_string()));
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        for path in &script.writes {
            std::fs::write(path, format!("# review by {}\n", command.program()))?;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script.behavior {
            FakeBehavior::Succeed { stdout } => Ok(ProcessOutput {
                code: Some(0),
                success: true,
                stdout,
                stderr: String::new(),
            }),
            FakeBehavior::Exit { code, stderr } => Ok(ProcessOutput {
                code: Some(code),
                success: false,
                stdout: String::new(),
                stderr,
            }),
            FakeBehavior::TimeOut => Err(ProcessError::TimedOut(timeout)),
            FakeBehavior::NotFound => Err(ProcessError::NotFound(command.program().to_string())),
            FakeBehavior::IoError(message) => Err(ProcessError::Io(std::io::Error::other(message))),
            FakeBehavior::Panic(message) => panic!("{}", message),
        }
    }
}
