//! Run Command
//!
//! Review content with every configured agent, then merge the reviews and
//! optimize the content.
//!
//! Usage:
//!   ai-review run --topic <TOPIC> --content-path <DIR> --output-path <DIR>
//!                 [--skip-optimize] [--timeout <SECS>] [--agent <NAME>]... [--dry-run]

use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::agent::{AgentEnvironment, TokioProcessRunner};
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::constants::{diagnostics, exit_codes};
use crate::pipeline::{PlannedInvocation, ReviewPipeline, RunRequest, absolutize};
use crate::review::{OptimizationStatus, RunOutcome, RunSummary, SkipReason};
use crate::types::{Result, ReviewError};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub topic: String,
    pub content_path: PathBuf,
    pub output_path: PathBuf,
    pub skip_optimize: bool,
    /// Per-review timeout override (seconds)
    pub timeout: Option<u64>,
    /// Restrict the fan-out to these agents (empty = all)
    pub agents: Vec<String>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
}

/// Execute the run and return the process exit code
pub fn run(options: RunOptions) -> Result<u8> {
    let mut config = ConfigLoader::new().with_file(options.config.clone()).load()?;
    if let Some(secs) = options.timeout {
        if secs == 0 {
            return Err(ReviewError::config("--timeout must be greater than 0"));
        }
        config.timeouts.review_secs = secs;
    }

    let agents = config.select_agents(&options.agents)?;
    let request = RunRequest {
        topic: options.topic,
        content_path: absolutize(&options.content_path)?,
        output_path: absolutize(&options.output_path)?,
        skip_optimize: options.skip_optimize,
    };
    debug!("Resolved request: {:?}", request);

    let env = AgentEnvironment::from_current(&config.proxy);
    let runner = TokioProcessRunner::new();
    let pipeline = ReviewPipeline::new(&config, agents, Arc::new(runner.clone()), env);

    let out = Output::new();
    out.header("AI Review");
    out.field("Topic", &request.topic);
    out.field("Content", &request.content_path.display().to_string());
    out.field("Output", &request.output_path.display().to_string());
    let names: Vec<&str> = pipeline.agents().iter().map(|a| a.name.as_str()).collect();
    out.field("Agents", &names.join(", "));

    if options.dry_run {
        let planned = pipeline.plan(&request)?;
        print_plan(&out, &planned);
        return Ok(exit_codes::SUCCESS);
    }

    let rt = Runtime::new()?;
    let summary = rt.block_on(async {
        tokio::select! {
            summary = pipeline.run(&request) => summary.map(Some),
            killed = kill_agents_after(ctrl_c(), &runner) => {
                out.blank();
                out.warning(&format!(
                    "Interrupted: killed {} running agent(s), no summary written",
                    killed
                ));
                Ok(None)
            }
        }
    })?;

    match summary {
        Some(summary) => {
            print_summary(&out, &summary);
            Ok(summary.exit_code())
        }
        None => Ok(exit_codes::INTERRUPTED),
    }
}

/// Kill every agent group still running once `signal` resolves
///
/// Agents lead their own process groups, so the terminal's SIGINT never
/// reaches them.
async fn kill_agents_after(
    signal: impl Future<Output = ()>,
    runner: &TokioProcessRunner,
) -> usize {
    signal.await;
    let killed = runner.kill_all();
    warn!("Interrupted, killed {} agent process group(s)", killed);
    killed
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_plan(out: &Output, planned: &[PlannedInvocation]) {
    out.section("Dry run (no agent invoked)");
    for invocation in planned {
        out.blank();
        out.info(&invocation.agent);
        out.field("Command", &invocation.command.preview(60));
        out.blank();
        for line in invocation.prompt.lines() {
            out.line(&format!("    {}", line));
        }
    }
}

fn print_summary(out: &Output, summary: &RunSummary) {
    out.section("Run Summary");

    out.line("Reviews:");
    for review in summary.reviews_by_agent() {
        let label = format!("{} ({:.1}s)", review.agent, review.elapsed.as_secs_f64());
        let cause = review.failure_summary(diagnostics::SUMMARY_ERROR_CHARS);
        out.status(review.success, &label, cause.as_deref());
    }

    out.blank();
    out.line("Review files:");
    for file in summary.files.values() {
        out.status(file.exists, &file.file, None);
    }

    out.blank();
    match &summary.optimization {
        OptimizationStatus::Skipped(SkipReason::Disabled) => {
            out.info("Optimization: skipped (--skip-optimize)")
        }
        OptimizationStatus::Skipped(SkipReason::NoReviewFiles) => {
            out.warning("Optimization: skipped (no review files were produced)")
        }
        OptimizationStatus::Completed(result) => out.status(
            result.success,
            &format!("Optimization ({:.1}s)", result.elapsed.as_secs_f64()),
            (!result.success).then_some(result.message.as_str()),
        ),
    }

    out.blank();
    out.field("Started", &summary.started_at.to_rfc3339());
    out.field("Finished", &summary.finished_at.to_rfc3339());
    out.field(
        "Duration",
        &format!("{}s", summary.duration().num_seconds()),
    );
    out.blank();

    let counts = format!("{}/{} reviews succeeded", summary.succeeded(), summary.total());
    match summary.outcome() {
        RunOutcome::AllSucceeded => out.success(&counts),
        RunOutcome::Partial => out.warning(&counts),
        RunOutcome::AllFailed => out.error(&counts),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::agent::{CommandLine, ProcessRunner};
    use std::time::{Duration, Instant};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_interrupt_kills_running_agents() {
        let dir = tempfile::tempdir().unwrap();
        let started = dir.path().join("started");
        let script = format!("touch {}; sleep 30", started.display());
        let command = CommandLine::new("sh", vec!["-c".to_string(), script]);
        let env = AgentEnvironment::from_vars(std::env::var_os("PATH").map(|p| ("PATH", p)));

        let runner = TokioProcessRunner::new();
        let agent = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run(&command, &env, Duration::from_secs(60)).await })
        };

        let (tx, rx) = oneshot::channel::<()>();
        let interrupt = kill_agents_after(
            async {
                let _ = rx.await;
            },
            &runner,
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while !started.exists() {
            assert!(Instant::now() < deadline, "agent never started");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tx.send(()).unwrap();
        assert_eq!(interrupt.await, 1);

        let output = tokio::time::timeout(Duration::from_secs(5), agent)
            .await
            .expect("agent kept running after interrupt")
            .unwrap()
            .unwrap();
        assert_eq!(output.code, None);
    }
}
