//! Review Coordinator
//!
//! Fans out one review invocation per agent over a bounded worker pool and
//! waits for every one of them (settle-all, never fail-fast). The returned
//! list is in completion order and always holds exactly one result per
//! agent: a task that panics or is cancelled becomes a synthesized
//! `TaskAborted` result attributed to its agent.

use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tracing::{info, warn};

use crate::agent::{AgentEnvironment, AgentInvoker, AgentSpec, InvocationResult, panic_message};
use crate::config::ConcurrencyConfig;
use crate::prompt::build_review_prompt;
use crate::types::InvocationFailure;

/// Paths and topic shared by every review prompt of a run
#[derive(Debug, Clone, Copy)]
pub struct ReviewTarget<'a> {
    pub topic: &'a str,
    pub content_path: &'a str,
    pub output_path: &'a str,
}

/// Concurrent review fan-out
pub struct ReviewCoordinator {
    invoker: AgentInvoker,
    env: Arc<AgentEnvironment>,
    timeout: Duration,
    concurrency: ConcurrencyConfig,
}

impl ReviewCoordinator {
    pub fn new(
        invoker: AgentInvoker,
        env: Arc<AgentEnvironment>,
        timeout: Duration,
        concurrency: ConcurrencyConfig,
    ) -> Self {
        Self {
            invoker,
            env,
            timeout,
            concurrency,
        }
    }

    /// Review `target` with every agent and collect all results
    pub async fn run_reviews(
        &self,
        target: ReviewTarget<'_>,
        agents: &[AgentSpec],
    ) -> Vec<InvocationResult> {
        let workers = self.concurrency.workers_for(agents.len());
        info!(
            "Starting {} reviews ({} workers, timeout {}s)",
            agents.len(),
            workers,
            self.timeout.as_secs()
        );

        // Tasks are spawned lazily as buffer slots free up, which bounds concurrency
        let mut stream = futures::stream::iter(agents.iter().cloned())
            .map(|agent| {
                let prompt = build_review_prompt(
                    target.topic,
                    target.content_path,
                    target.output_path,
                    &agent,
                );
                let invoker = self.invoker.clone();
                let env = Arc::clone(&self.env);
                let timeout = self.timeout;
                let name = agent.name.clone();

                async move {
                    let started = Instant::now();
                    let handle = tokio::spawn(async move {
                        invoker.invoke(&agent, &prompt, &env, timeout).await
                    });
                    // Runner panics are already caught inside `invoke`; a JoinError
                    // here means the invoker itself panicked or the task was cancelled
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => aborted(&name, e, started.elapsed()),
                    }
                }
            })
            .buffer_unordered(workers);

        let mut results = Vec::with_capacity(agents.len());
        while let Some(result) = stream.next().await {
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        info!("Reviews complete: {}/{} succeeded", succeeded, results.len());
        results
    }
}

fn aborted(agent: &str, err: JoinError, elapsed: Duration) -> InvocationResult {
    let message = if err.is_panic() {
        panic_message(&*err.into_panic())
    } else {
        err.to_string()
    };
    warn!("{} review task aborted: {}", agent, message);
    InvocationResult::failed(agent, InvocationFailure::TaskAborted { message }, elapsed)
}
