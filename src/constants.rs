//! Global Constants
//!
//! Centralized defaults for the review pipeline.
//! All magic numbers and fixed file names should be defined here with documentation.

/// Timeout constants
pub mod timeouts {
    /// Per-agent review timeout (seconds)
    pub const REVIEW_SECS: u64 = 600;

    /// Optimization pass timeout (seconds)
    pub const OPTIMIZE_SECS: u64 = 900;

    /// Delay between the review barrier and the output file check (milliseconds)
    pub const SETTLE_DELAY_MS: u64 = 2000;

    /// Timeout for `<command> --version` probes (seconds)
    pub const PREFLIGHT_SECS: u64 = 15;
}

/// Local proxy endpoints injected into every agent environment
pub mod proxy {
    pub const HTTP_PROXY: &str = "http://127.0.0.1:10080";
    pub const HTTPS_PROXY: &str = "http://127.0.0.1:10080";
    pub const ALL_PROXY: &str = "socks5://127.0.0.1:10081";
}

/// Agent registry defaults
pub mod agents {
    /// Placeholder token replaced by the rendered prompt
    pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

    /// Tools granted to the Claude CLI
    pub const CLAUDE_ALLOWED_TOOLS: &str = "Read,Write,Bash";
}

/// Files written by the optimization agent
pub mod artifacts {
    /// Merged review summary
    pub const SUMMARY_FILE: &str = "summary.md";

    /// Final optimization report
    pub const REPORT_FILE: &str = "optimization-report.md";

    /// Top-level description file kept in sync with the content
    pub const README_FILE: &str = "README.md";
}

/// Diagnostic output limits (characters)
pub mod diagnostics {
    /// Cause shown when a review invocation fails
    pub const REVIEW_FAILURE_CHARS: usize = 200;

    /// Cause shown when the optimization invocation fails
    pub const OPTIMIZE_FAILURE_CHARS: usize = 500;

    /// Error shown per agent in the run summary
    pub const SUMMARY_ERROR_CHARS: usize = 100;
}

/// Process exit codes
pub mod exit_codes {
    /// Every reviewing agent succeeded
    pub const SUCCESS: u8 = 0;

    /// No agent succeeded, or the run could not start
    pub const FAILURE: u8 = 1;

    /// Some but not all agents succeeded
    pub const PARTIAL: u8 = 2;

    /// Run stopped by Ctrl-C (128 + SIGINT)
    pub const INTERRUPTED: u8 = 130;
}
