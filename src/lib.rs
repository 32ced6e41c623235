//! ai-review - Parallel AI Content Review
//!
//! Sends the same content to several AI CLI agents (Claude, Codex, Gemini
//! by default) in parallel, checks which review files they produced, and
//! then asks one designated agent to merge the reviews and rewrite the
//! content.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ai_review::{AgentEnvironment, Config, ReviewPipeline, RunRequest, TokioProcessRunner};
//!
//! let config = Config::default();
//! let env = AgentEnvironment::from_current(&config.proxy);
//! let pipeline = ReviewPipeline::new(
//!     &config,
//!     config.agents.clone(),
//!     TokioProcessRunner::shared(),
//!     env,
//! );
//! let summary = pipeline.run(&request).await?;
//! std::process::exit(summary.exit_code() as i32);
//! ```
//!
//! ## Modules
//!
//! - [`agent`]: agent specs, process capability, single invocation
//! - [`prompt`]: review and optimize prompt templates
//! - [`review`]: fan-out, file verification, optimization, summary
//! - [`pipeline`]: the top-level run
//! - [`config`]: layered configuration

pub mod agent;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod prompt;
pub mod review;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::{InvocationFailure, Result, ReviewError};

pub use agent::{
    AgentEnvironment, AgentInvoker, AgentSpec, InvocationResult, ProcessRunner, SharedRunner,
    TokioProcessRunner,
};
pub use pipeline::{ReviewPipeline, RunRequest};
pub use review::{OptimizationStatus, RunOutcome, RunSummary};
