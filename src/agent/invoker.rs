//! Agent Invoker
//!
//! Runs one agent once and classifies the outcome. `invoke` is infallible by
//! signature: timeouts, missing executables, non-zero exits, runner errors and
//! even runner panics all come back as a failed `InvocationResult`.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{AgentEnvironment, AgentSpec, InvocationResult, ProcessError, SharedRunner};
use crate::constants::diagnostics;
use crate::types::InvocationFailure;

/// Single-shot agent execution over a `ProcessRunner`
#[derive(Clone)]
pub struct AgentInvoker {
    runner: SharedRunner,
}

impl AgentInvoker {
    pub fn new(runner: SharedRunner) -> Self {
        Self { runner }
    }

    /// Invoke `agent` with `prompt`, bounded by `timeout`
    pub async fn invoke(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        env: &AgentEnvironment,
        timeout: Duration,
    ) -> InvocationResult {
        let command = agent.command_line(prompt);
        info!("Starting {} ({})", agent.name, agent.command);
        debug!("{}: {}", agent.name, command.preview(80));

        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.runner.run(&command, env, timeout))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(Ok(output)) if output.success => {
                InvocationResult::succeeded(&agent.name, output.stdout, output.stderr, elapsed)
            }
            Ok(Ok(output)) => InvocationResult::exited(
                &agent.name,
                output.code,
                output.stdout,
                output.stderr,
                elapsed,
            ),
            Ok(Err(e)) => InvocationResult::failed(&agent.name, classify(e), elapsed),
            Err(panic) => InvocationResult::failed(
                &agent.name,
                InvocationFailure::Unexpected {
                    message: panic_message(&*panic),
                },
                elapsed,
            ),
        };

        log_outcome(&result);
        result
    }
}

fn classify(err: ProcessError) -> InvocationFailure {
    match err {
        ProcessError::TimedOut(timeout) => InvocationFailure::TimedOut { timeout },
        ProcessError::NotFound(command) => InvocationFailure::CommandNotFound { command },
        ProcessError::Io(e) => InvocationFailure::Unexpected {
            message: e.to_string(),
        },
    }
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn log_outcome(result: &InvocationResult) {
    match &result.failure {
        None => info!(
            "{} finished in {:.1}s",
            result.agent,
            result.elapsed.as_secs_f64()
        ),
        Some(failure) => warn!(
            "{} failed [{}]: {}",
            result.agent,
            failure.kind(),
            result
                .failure_summary(diagnostics::REVIEW_FAILURE_CHARS)
                .unwrap_or_default()
        ),
    }
}
