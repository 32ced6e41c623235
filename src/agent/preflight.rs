//! Pre-flight Checks
//!
//! Probes every agent executable with `<command> --version` before a long
//! run. Probes run concurrently, each bounded by a short timeout, and reuse
//! the same `ProcessRunner` and environment as real invocations.

use futures::future::join_all;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::{AgentEnvironment, AgentSpec, CommandLine, ProcessError, SharedRunner};
use crate::types::diagnostic_line;

const VERSION_CHARS: usize = 80;

/// Result of probing one agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub command: String,
    pub passed: bool,
    /// Reported version on success, cause on failure
    pub message: String,
    pub duration_ms: u64,
}

/// Availability probe over a set of agents
pub struct PreflightCheck {
    runner: SharedRunner,
    timeout: Duration,
}

impl PreflightCheck {
    pub fn new(runner: SharedRunner, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Probe every agent; results keep the order of `agents`
    pub async fn check_agents(
        &self,
        agents: &[(String, AgentSpec)],
        env: &AgentEnvironment,
    ) -> Vec<CheckResult> {
        info!("Running pre-flight checks for {} agents", agents.len());

        let results =
            join_all(agents.iter().map(|(label, agent)| self.probe(label, agent, env))).await;

        let failed = results.iter().filter(|r| !r.passed).count();
        if failed == 0 {
            info!("Pre-flight checks passed ({} checks)", results.len());
        } else {
            warn!("Pre-flight checks failed: {} unavailable", failed);
        }
        results
    }

    async fn probe(&self, label: &str, agent: &AgentSpec, env: &AgentEnvironment) -> CheckResult {
        let start = Instant::now();
        let command = CommandLine::new(agent.command.clone(), vec!["--version".to_string()]);
        let outcome = self.runner.run(&command, env, self.timeout).await;

        let (passed, message) = match outcome {
            Ok(output) if output.success => (
                true,
                diagnostic_line(
                    output.stdout.lines().next().unwrap_or_default(),
                    VERSION_CHARS,
                    "available",
                ),
            ),
            Ok(output) => {
                let fallback = output.code.map_or_else(
                    || "terminated by signal".to_string(),
                    |code| format!("exited with status {}", code),
                );
                (
                    false,
                    diagnostic_line(&output.stderr, VERSION_CHARS, &fallback),
                )
            }
            Err(ProcessError::NotFound(cmd)) => (false, format!("command not found: {}", cmd)),
            Err(e) => (false, e.to_string()),
        };

        CheckResult {
            name: label.to_string(),
            command: agent.command.clone(),
            passed,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
