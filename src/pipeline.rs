//! Review Pipeline
//!
//! Top-level run state machine:
//!
//! ```text
//! check content path → create output dir → parallel reviews → settle + file check
//!     → optimize (unless skipped or no review file exists) → summary
//! ```
//!
//! Only a missing content path (or an I/O failure creating the output
//! directory) aborts a run. Every per-agent problem ends up in the summary.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::{AgentEnvironment, AgentInvoker, AgentSpec, CommandLine, SharedRunner};
use crate::config::Config;
use crate::prompt::build_review_prompt;
use crate::review::{
    OptimizationStatus, Optimizer, ResultVerifier, ReviewCoordinator, ReviewTarget, RunSummary,
    SkipReason, existing_count,
};
use crate::types::{Result, ReviewError};

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub topic: String,
    /// Tutorial directory (or file) to review and rewrite
    pub content_path: PathBuf,
    /// Directory receiving review files and optimization artifacts
    pub output_path: PathBuf,
    pub skip_optimize: bool,
}

impl RunRequest {
    fn check_preconditions(&self) -> Result<()> {
        if !self.content_path.exists() {
            return Err(ReviewError::ContentNotFound {
                path: self.content_path.clone(),
            });
        }
        Ok(())
    }
}

/// One invocation a dry run would perform
#[derive(Debug, Clone)]
pub struct PlannedInvocation {
    pub agent: String,
    pub command: CommandLine,
    pub prompt: String,
}

/// Decide whether the optimization step runs
pub fn optimization_gate(skip_optimize: bool, existing_files: usize) -> Option<SkipReason> {
    if skip_optimize {
        Some(SkipReason::Disabled)
    } else if existing_files == 0 {
        Some(SkipReason::NoReviewFiles)
    } else {
        None
    }
}

pub struct ReviewPipeline {
    agents: Vec<AgentSpec>,
    env: Arc<AgentEnvironment>,
    coordinator: ReviewCoordinator,
    verifier: ResultVerifier,
    optimizer: Optimizer,
}

impl ReviewPipeline {
    /// Build a pipeline reviewing with `agents` (already filtered from `config`)
    pub fn new(
        config: &Config,
        agents: Vec<AgentSpec>,
        runner: SharedRunner,
        env: AgentEnvironment,
    ) -> Self {
        let invoker = AgentInvoker::new(runner);
        let env = Arc::new(env);

        Self {
            coordinator: ReviewCoordinator::new(
                invoker.clone(),
                Arc::clone(&env),
                config.timeouts.review(),
                config.concurrency.clone(),
            ),
            verifier: ResultVerifier::new(config.timeouts.settle_delay()),
            optimizer: Optimizer::new(
                invoker,
                config.optimizer.clone(),
                config.timeouts.optimize(),
            ),
            agents,
            env,
        }
    }

    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    /// Execute a full run
    pub async fn run(&self, request: &RunRequest) -> Result<RunSummary> {
        let started_at = Utc::now();
        request.check_preconditions()?;
        tokio::fs::create_dir_all(&request.output_path).await?;

        let content = request.content_path.to_string_lossy();
        let output = request.output_path.to_string_lossy();
        let target = ReviewTarget {
            topic: &request.topic,
            content_path: &content,
            output_path: &output,
        };

        info!("Starting review run for '{}'", request.topic);
        debug!("Content: {}, output: {}", content, output);

        let reviews = self.coordinator.run_reviews(target, &self.agents).await;
        let files = self
            .verifier
            .verify(&request.output_path, &self.agents)
            .await;

        let optimization =
            match optimization_gate(request.skip_optimize, existing_count(&files)) {
                Some(SkipReason::Disabled) => {
                    info!("Optimization skipped (--skip-optimize)");
                    OptimizationStatus::Skipped(SkipReason::Disabled)
                }
                Some(SkipReason::NoReviewFiles) => {
                    warn!("No review files were produced; skipping optimization");
                    OptimizationStatus::Skipped(SkipReason::NoReviewFiles)
                }
                None => OptimizationStatus::Completed(
                    self.optimizer
                        .run_optimization(target, &self.agents, &self.env)
                        .await,
                ),
            };

        Ok(RunSummary {
            topic: request.topic.clone(),
            content_path: request.content_path.clone(),
            output_path: request.output_path.clone(),
            started_at,
            finished_at: Utc::now(),
            reviews,
            files,
            optimization,
        })
    }

    /// Render every prompt and command line a run would use, without invoking anything
    pub fn plan(&self, request: &RunRequest) -> Result<Vec<PlannedInvocation>> {
        request.check_preconditions()?;

        let content = request.content_path.to_string_lossy();
        let output = request.output_path.to_string_lossy();
        let target = ReviewTarget {
            topic: &request.topic,
            content_path: &content,
            output_path: &output,
        };

        let mut planned: Vec<PlannedInvocation> = self
            .agents
            .iter()
            .map(|agent| {
                let prompt = build_review_prompt(&request.topic, &content, &output, agent);
                PlannedInvocation {
                    agent: agent.name.clone(),
                    command: agent.command_line(&prompt),
                    prompt,
                }
            })
            .collect();

        if !request.skip_optimize {
            let agent = self.optimizer.agent();
            let prompt = self.optimizer.prompt(target, &self.agents);
            planned.push(PlannedInvocation {
                agent: format!("{} (optimizer)", agent.name),
                command: agent.command_line(&prompt),
                prompt,
            });
        }

        Ok(planned)
    }
}

/// Make `path` absolute against the current directory without touching the filesystem
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fake::{FakeBehavior, FakeRunner};
    use crate::review::RunOutcome;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        content: PathBuf,
        output: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("week-03");
        std::fs::create_dir_all(&content).unwrap();
        std::fs::write(content.join("README.md"), "# Week 3").unwrap();
        let output = content.join("reviews");
        Fixture {
            _dir: dir,
            content,
            output,
        }
    }

    fn request(fx: &Fixture, skip_optimize: bool) -> RunRequest {
        RunRequest {
            topic: "quantum physics".into(),
            content_path: fx.content.clone(),
            output_path: fx.output.clone(),
            skip_optimize,
        }
    }

    fn pipeline(runner: &Arc<FakeRunner>) -> ReviewPipeline {
        let mut config = Config::default();
        config.timeouts.settle_delay_ms = 0;
        let agents = config.agents.clone();
        ReviewPipeline::new(
            &config,
            agents,
            runner.clone(),
            AgentEnvironment::default(),
        )
    }

    /// Every reviewer succeeds and writes its file
    fn writing_runner(fx: &Fixture) -> FakeRunner {
        FakeRunner::new()
            .with("claude", FakeBehavior::succeed("ok"))
            .writing("claude", fx.output.join("review-claude.md"))
            .with("codex", FakeBehavior::succeed("ok"))
            .writing("codex", fx.output.join("review-codex.md"))
            .with("gemini", FakeBehavior::succeed("ok"))
            .writing("gemini", fx.output.join("review-gemini.md"))
    }

    #[test]
    fn test_optimization_gate() {
        assert_eq!(optimization_gate(true, 3), Some(SkipReason::Disabled));
        assert_eq!(optimization_gate(false, 0), Some(SkipReason::NoReviewFiles));
        assert_eq!(optimization_gate(false, 1), None);
    }

    #[tokio::test]
    async fn test_full_success_runs_optimizer() {
        let fx = fixture();
        let runner = Arc::new(writing_runner(&fx));

        let summary = pipeline(&runner).run(&request(&fx, false)).await.unwrap();

        assert_eq!(summary.outcome(), RunOutcome::AllSucceeded);
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.existing_files(), 3);
        assert_eq!(summary.optimization.succeeded(), Some(true));
        // Three reviews plus the optimizer, which is also the claude command
        assert_eq!(runner.calls().len(), 4);
        assert_eq!(runner.calls_to("claude"), 2);
    }

    #[tokio::test]
    async fn test_missing_content_aborts_before_any_invocation() {
        let fx = fixture();
        let runner = Arc::new(writing_runner(&fx));
        let mut req = request(&fx, false);
        req.content_path = fx.content.join("does-not-exist");

        let err = pipeline(&runner).run(&req).await.unwrap_err();

        assert!(matches!(err, ReviewError::ContentNotFound { .. }));
        assert!(runner.calls().is_empty());
        assert!(!fx.output.exists());
    }

    #[tokio::test]
    async fn test_skip_optimize() {
        let fx = fixture();
        let runner = Arc::new(writing_runner(&fx));

        let summary = pipeline(&runner).run(&request(&fx, true)).await.unwrap();

        assert_eq!(
            summary.optimization,
            OptimizationStatus::Skipped(SkipReason::Disabled)
        );
        assert_eq!(runner.calls().len(), 3);
        assert_eq!(summary.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_no_review_files_skips_optimization() {
        let fx = fixture();
        let runner = Arc::new(
            FakeRunner::new()
                .with("claude", FakeBehavior::succeed("ok"))
                .with("codex", FakeBehavior::succeed("ok"))
                .with("gemini", FakeBehavior::succeed("ok")),
        );

        let summary = pipeline(&runner).run(&request(&fx, false)).await.unwrap();

        assert!(fx.output.is_dir());
        assert_eq!(summary.existing_files(), 0);
        assert_eq!(
            summary.optimization,
            OptimizationStatus::Skipped(SkipReason::NoReviewFiles)
        );
        // Exit status only reflects review exit codes
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(runner.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_partial_success_still_optimizes() {
        let fx = fixture();
        let runner = Arc::new(
            FakeRunner::new()
                .with("claude", FakeBehavior::succeed("ok"))
                .writing("claude", fx.output.join("review-claude.md"))
                .with("gemini", FakeBehavior::TimeOut),
        );

        let summary = pipeline(&runner).run(&request(&fx, false)).await.unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.exit_code(), 2);
        assert_eq!(summary.existing_files(), 1);
        assert_eq!(summary.optimization.succeeded(), Some(true));
    }

    #[tokio::test]
    async fn test_failed_agent_file_still_counts() {
        let fx = fixture();
        let runner = Arc::new(
            FakeRunner::new()
                .with("codex", FakeBehavior::exit(1, "crashed after writing"))
                .writing("codex", fx.output.join("review-codex.md")),
        );

        let summary = pipeline(&runner).run(&request(&fx, false)).await.unwrap();

        assert_eq!(summary.exit_code(), 1);
        assert!(summary.files["codex"].exists);
        // Optimizer is the missing claude command
        assert_eq!(summary.optimization.succeeded(), Some(false));
    }

    #[test]
    fn test_plan_renders_without_invoking() {
        let fx = fixture();
        let runner = Arc::new(writing_runner(&fx));

        let planned = pipeline(&runner).plan(&request(&fx, false)).unwrap();

        assert_eq!(planned.len(), 4);
        assert_eq!(planned[3].agent, "claude (optimizer)");
        assert!(planned[1].prompt.contains("review-codex.md"));
        assert_eq!(planned[1].command.args()[1], planned[1].prompt);
        assert!(runner.calls().is_empty());
        assert!(!fx.output.exists());

        let skipped = pipeline(&runner).plan(&request(&fx, true)).unwrap();
        assert_eq!(skipped.len(), 3);
    }

    #[test]
    fn test_absolutize_relative_path() {
        let abs = absolutize(Path::new("reviews")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("reviews"));
    }
}
