//! Review Phases
//!
//! - `coordinator`: concurrent review fan-out (settle-all)
//! - `verifier`: expected review file checks
//! - `optimizer`: single optimization pass over the reviews
//! - `summary`: run aggregation and exit code

mod coordinator;
mod optimizer;
mod summary;
mod verifier;

pub use coordinator::{ReviewCoordinator, ReviewTarget};
pub use optimizer::{OptimizationResult, Optimizer};
pub use summary::{OptimizationStatus, RunOutcome, RunSummary, SkipReason};
pub use verifier::{FileCheckResult, ResultVerifier, check_output_files, existing_count};
