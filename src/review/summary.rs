//! Run Summarizer
//!
//! Aggregates the review results, file checks and optimization outcome of a
//! run and derives the process exit code. Only review exit statuses decide
//! the code; missing files and a failed optimization never change it.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::agent::InvocationResult;
use crate::constants::exit_codes;

use super::{FileCheckResult, OptimizationResult};

/// Aggregate outcome of the review phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    AllSucceeded,
    Partial,
    AllFailed,
}

impl RunOutcome {
    pub fn from_counts(succeeded: usize, total: usize) -> Self {
        if succeeded == 0 {
            Self::AllFailed
        } else if succeeded < total {
            Self::Partial
        } else {
            Self::AllSucceeded
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::AllSucceeded => exit_codes::SUCCESS,
            Self::Partial => exit_codes::PARTIAL,
            Self::AllFailed => exit_codes::FAILURE,
        }
    }
}

/// Why optimization did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `--skip-optimize`
    Disabled,
    /// No review file exists to optimize from
    NoReviewFiles,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationStatus {
    Skipped(SkipReason),
    Completed(OptimizationResult),
}

impl OptimizationStatus {
    /// `None` when optimization was not attempted
    pub fn succeeded(&self) -> Option<bool> {
        match self {
            Self::Skipped(_) => None,
            Self::Completed(result) => Some(result.success),
        }
    }
}

/// Everything a finished run reports
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub topic: String,
    pub content_path: PathBuf,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Review results in completion order
    pub reviews: Vec<InvocationResult>,
    /// Expected review files keyed by agent name
    pub files: BTreeMap<String, FileCheckResult>,
    pub optimization: OptimizationStatus,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reviews.iter().filter(|r| r.success).count()
    }

    pub fn total(&self) -> usize {
        self.reviews.len()
    }

    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::from_counts(self.succeeded(), self.total())
    }

    pub fn exit_code(&self) -> u8 {
        self.outcome().exit_code()
    }

    pub fn existing_files(&self) -> usize {
        self.files.values().filter(|f| f.exists).count()
    }

    /// Review results sorted by agent name for stable display
    pub fn reviews_by_agent(&self) -> Vec<&InvocationResult> {
        let mut reviews: Vec<&InvocationResult> = self.reviews.iter().collect();
        reviews.sort_by(|a, b| a.agent.cmp(&b.agent));
        reviews
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
