//! Optimization Runner
//!
//! Invokes the designated optimization agent once with the consolidated
//! prompt. The caller decides whether to run it at all; this step never
//! re-checks the review files and never returns an error.

use std::time::Duration;
use tracing::{info, warn};

use crate::agent::{AgentEnvironment, AgentInvoker, AgentSpec};
use crate::config::OptimizerConfig;
use crate::constants::diagnostics;
use crate::prompt::build_optimize_prompt;

use super::ReviewTarget;

/// Outcome of the optimization step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationResult {
    pub success: bool,
    /// Human-readable outcome (truncated cause on failure)
    pub message: String,
    pub elapsed: Duration,
}

/// Single-shot optimization pass
pub struct Optimizer {
    invoker: AgentInvoker,
    config: OptimizerConfig,
    timeout: Duration,
}

impl Optimizer {
    pub fn new(invoker: AgentInvoker, config: OptimizerConfig, timeout: Duration) -> Self {
        Self {
            invoker,
            config,
            timeout,
        }
    }

    pub fn agent(&self) -> &AgentSpec {
        &self.config.agent
    }

    /// Render the optimize prompt for `target` listing `reviewers`' files
    pub fn prompt(&self, target: ReviewTarget<'_>, reviewers: &[AgentSpec]) -> String {
        build_optimize_prompt(
            target.topic,
            target.content_path,
            target.output_path,
            reviewers,
            &self.config,
        )
    }

    /// Run the optimization agent; `target.output_path` is the reviews directory
    pub async fn run_optimization(
        &self,
        target: ReviewTarget<'_>,
        reviewers: &[AgentSpec],
        env: &AgentEnvironment,
    ) -> OptimizationResult {
        info!(
            "Optimizing {} from {} review files",
            target.content_path,
            reviewers.len()
        );
        let prompt = self.prompt(target, reviewers);
        let result = self
            .invoker
            .invoke(&self.config.agent, &prompt, env, self.timeout)
            .await;

        match result.failure_summary(diagnostics::OPTIMIZE_FAILURE_CHARS) {
            None => {
                info!("Optimization complete");
                OptimizationResult {
                    success: true,
                    message: "optimization complete".to_string(),
                    elapsed: result.elapsed,
                }
            }
            Some(cause) => {
                warn!("Optimization failed: {}", cause);
                OptimizationResult {
                    success: false,
                    message: cause,
                    elapsed: result.elapsed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fake::{FakeBehavior, FakeRunner};
    use crate::config::default_agents;
    use std::sync::Arc;

    const TARGET: ReviewTarget<'static> = ReviewTarget {
        topic: "rust",
        content_path: "/content",
        output_path: "/reviews",
    };

    async fn optimize_with(runner: FakeRunner) -> (OptimizationResult, Arc<FakeRunner>) {
        let runner = Arc::new(runner);
        let optimizer = Optimizer::new(
            AgentInvoker::new(runner.clone()),
            OptimizerConfig::default(),
            Duration::from_secs(900),
        );
        let result = optimizer
            .run_optimization(TARGET, &default_agents(), &AgentEnvironment::default())
            .await;
        (result, runner)
    }

    #[tokio::test]
    async fn test_success_invokes_designated_agent_once() {
        let (result, runner) =
            optimize_with(FakeRunner::new().with("claude", FakeBehavior::succeed("done"))).await;

        assert!(result.success);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        let prompt = &calls[0].args()[1];
        assert!(prompt.contains("/reviews/summary.md"));
        assert!(prompt.contains("review-gemini.md"));
    }

    #[tokio::test]
    async fn test_failure_message_is_truncated() {
        let noisy = "e".repeat(2000);
        let (result, _) =
            optimize_with(FakeRunner::new().with("claude", FakeBehavior::exit(1, &noisy))).await;

        assert!(!result.success);
        assert_eq!(result.message.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_timeout_and_missing_command_are_failures() {
        let (timed_out, _) =
            optimize_with(FakeRunner::new().with("claude", FakeBehavior::TimeOut)).await;
        assert!(!timed_out.success);
        assert!(timed_out.message.contains("900s"));

        let (missing, _) = optimize_with(FakeRunner::new()).await;
        assert!(!missing.success);
        assert!(missing.message.contains("command not found: claude"));
    }
}
