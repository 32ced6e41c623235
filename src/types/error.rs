//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Layers
//!
//! - **ReviewError**: run-level failures (bad config, missing content path,
//!   filesystem errors). Only these abort a run.
//! - **InvocationFailure**: per-agent outcome of a failed invocation. Never
//!   propagated with `?`; carried as a value inside `InvocationResult` so one
//!   agent cannot take down its siblings.
//! - **ProcessError** (in `agent::process`): raw failure of the process
//!   capability, converted into `InvocationFailure` at the invoker boundary.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Invocation Failure
// =============================================================================

/// Why a single agent invocation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationFailure {
    /// Deadline elapsed; the process was killed
    TimedOut { timeout: Duration },
    /// Executable not found on PATH
    CommandNotFound { command: String },
    /// Process ran and exited with a non-zero status (`None` if killed by a signal)
    NonZeroExit { code: Option<i32> },
    /// Anything else that went wrong while launching or waiting
    Unexpected { message: String },
    /// The supervising task itself panicked or was cancelled
    TaskAborted { message: String },
}

impl std::fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut { timeout } => write!(f, "timed out after {}s", timeout.as_secs()),
            Self::CommandNotFound { command } => write!(f, "command not found: {}", command),
            Self::NonZeroExit { code: Some(code) } => write!(f, "exited with status {}", code),
            Self::NonZeroExit { code: None } => write!(f, "terminated by signal"),
            Self::Unexpected { message } => write!(f, "unexpected error: {}", message),
            Self::TaskAborted { message } => write!(f, "task aborted: {}", message),
        }
    }
}

impl InvocationFailure {
    /// Short machine-friendly label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimedOut { .. } => "TIMEOUT",
            Self::CommandNotFound { .. } => "NOT_FOUND",
            Self::NonZeroExit { .. } => "NON_ZERO_EXIT",
            Self::Unexpected { .. } => "UNEXPECTED",
            Self::TaskAborted { .. } => "ABORTED",
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ReviewError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Run Errors
    // -------------------------------------------------------------------------
    /// Content to review does not exist; fatal before any agent starts
    #[error("Content path does not exist: {}", path.display())]
    ContentNotFound { path: PathBuf },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown agent '{name}' (configured: {available})")]
    UnknownAgent { name: String, available: String },
}

pub type Result<T> = std::result::Result<T, ReviewError>;

impl ReviewError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// =============================================================================
// Tests
// =============================================================================
