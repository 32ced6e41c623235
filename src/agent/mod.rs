//! Agent Invocation Layer
//!
//! External AI CLIs are black boxes: they take a prompt as a single argument,
//! do unspecified work, and optionally write files. This module describes them
//! (`AgentSpec`), builds the environment they run in, and turns one bounded
//! execution into an `InvocationResult` that never carries an error upward.
//!
//! ## Modules
//!
//! - `environment`: inherited environment plus proxy overlay
//! - `process`: `ProcessRunner` capability and the tokio implementation
//! - `invoker`: single-agent invocation with outcome classification
//! - `preflight`: `--version` availability probes

mod environment;
mod invoker;
mod preflight;
pub mod process;

#[cfg(test)]
pub(crate) mod fake;

pub use environment::AgentEnvironment;
pub use invoker::AgentInvoker;
pub(crate) use invoker::panic_message;
pub use preflight::{CheckResult, PreflightCheck};
pub use process::{ProcessError, ProcessOutput, ProcessRunner, SharedRunner, TokioProcessRunner};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::agents::PROMPT_PLACEHOLDER;
use crate::types::{InvocationFailure, diagnostic_line};

// =============================================================================
// Agent Specification
// =============================================================================

/// Identity of one external agent
///
/// `args` is an ordered template: every token is passed literally except the
/// single `{prompt}` placeholder, which receives the rendered prompt as one
/// argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Agent identifier used in logs, summaries and `--agent` filters
    pub name: String,
    /// Executable looked up on PATH
    pub command: String,
    /// Argument template
    pub args: Vec<String>,
    /// File the agent is expected to write inside the output directory
    pub output_file: String,
}

impl AgentSpec {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        args: &[&str],
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            output_file: output_file.into(),
        }
    }

    /// Number of `{prompt}` tokens in the template (valid specs have exactly one)
    pub fn placeholder_count(&self) -> usize {
        self.args
            .iter()
            .filter(|arg| arg.as_str() == PROMPT_PLACEHOLDER)
            .count()
    }

    /// Resolve the concrete command line for a prompt
    pub fn command_line(&self, prompt: &str) -> CommandLine {
        let args = self
            .args
            .iter()
            .map(|arg| {
                if arg == PROMPT_PLACEHOLDER {
                    prompt.to_string()
                } else {
                    arg.clone()
                }
            })
            .collect();
        CommandLine::new(self.command.clone(), args)
    }

    /// Name with the first letter capitalized, for prompt headings
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Fully resolved program + arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shell-like rendering for logs and dry runs; long arguments are elided
    pub fn preview(&self, max_arg_chars: usize) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            if arg.chars().count() > max_arg_chars {
                rendered.push_str(&format!(
                    "'{}…'",
                    crate::types::truncate_chars(arg, max_arg_chars)
                ));
            } else if arg.contains(char::is_whitespace) {
                rendered.push_str(&format!("'{}'", arg));
            } else {
                rendered.push_str(arg);
            }
        }
        rendered
    }
}

// =============================================================================
// Invocation Result
// =============================================================================

/// Outcome of one agent invocation; write-once, never mutated after creation
#[derive(Debug, Clone)]
pub struct InvocationResult {
    /// Agent identity
    pub agent: String,
    /// True iff the process exited with status zero within its deadline
    pub success: bool,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error, or a synthesized message when nothing ran
    pub stderr: String,
    /// Failure classification (`None` on success)
    pub failure: Option<InvocationFailure>,
    /// Wall time spent in the invocation
    pub elapsed: Duration,
}

impl InvocationResult {
    pub fn succeeded(
        agent: impl Into<String>,
        stdout: String,
        stderr: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            agent: agent.into(),
            success: true,
            stdout,
            stderr,
            failure: None,
            elapsed,
        }
    }

    /// Process ran to completion but reported failure
    pub fn exited(
        agent: impl Into<String>,
        code: Option<i32>,
        stdout: String,
        stderr: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            agent: agent.into(),
            success: false,
            stdout,
            stderr,
            failure: Some(InvocationFailure::NonZeroExit { code }),
            elapsed,
        }
    }

    /// Nothing usable ran; stderr carries the synthesized message
    pub fn failed(agent: impl Into<String>, failure: InvocationFailure, elapsed: Duration) -> Self {
        Self {
            agent: agent.into(),
            success: false,
            stdout: String::new(),
            stderr: failure.to_string(),
            failure: Some(failure),
            elapsed,
        }
    }

    /// Truncated one-line cause, `None` on success
    pub fn failure_summary(&self, max_chars: usize) -> Option<String> {
        let failure = self.failure.as_ref()?;
        let fallback = failure.to_string();
        Some(diagnostic_line(&self.stderr, max_chars, &fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claude() -> AgentSpec {
        AgentSpec::new(
            "claude",
            "claude",
            &["-p", "{prompt}", "--allowedTools", "Read,Write,Bash"],
            "review-claude.md",
        )
    }

    #[test]
    fn test_command_line_substitutes_only_placeholder() {
        let line = claude().command_line("review this please");
        assert_eq!(line.program(), "claude");
        assert_eq!(
            line.args(),
            &[
                "-p".to_string(),
                "review this please".to_string(),
                "--allowedTools".to_string(),
                "Read,Write,Bash".to_string(),
            ]
        );
    }

    #[test]
    fn test_command_line_keeps_prompt_as_single_argument() {
        let prompt = "line one\nline two with {prompt} inside";
        let line = claude().command_line(prompt);
        assert_eq!(line.args().len(), 4);
        assert_eq!(line.args()[1], prompt);
    }

    #[test]
    fn test_placeholder_count() {
        assert_eq!(claude().placeholder_count(), 1);
        let none = AgentSpec::new("x", "x", &["-p"], "x.md");
        assert_eq!(none.placeholder_count(), 0);
        let two = AgentSpec::new("x", "x", &["{prompt}", "{prompt}"], "x.md");
        assert_eq!(two.placeholder_count(), 2);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(claude().display_name(), "Claude");
        let empty = AgentSpec::new("", "x", &[], "x.md");
        assert_eq!(empty.display_name(), "");
    }

    #[test]
    fn test_preview_elides_long_arguments() {
        let line = claude().command_line(&"x".repeat(100));
        let preview = line.preview(10);
        assert!(preview.starts_with("claude -p 'xxxxxxxxxx…'"));
        assert!(preview.ends_with("--allowedTools Read,Write,Bash"));
    }

    #[test]
    fn test_failed_result_synthesizes_stderr() {
        let result = InvocationResult::failed(
            "gemini",
            InvocationFailure::CommandNotFound {
                command: "gemini".into(),
            },
            Duration::ZERO,
        );
        assert!(!result.success);
        assert_eq!(result.stderr, "command not found: gemini");
        assert_eq!(
            result.failure_summary(100).as_deref(),
            Some("command not found: gemini")
        );
    }

    #[test]
    fn test_exited_result_falls_back_to_failure_text() {
        let result = InvocationResult::exited(
            "codex",
            Some(2),
            String::new(),
            "  \n".to_string(),
            Duration::ZERO,
        );
        assert_eq!(
            result.failure_summary(100).as_deref(),
            Some("exited with status 2")
        );
        let ok = InvocationResult::succeeded("codex", "done".into(), String::new(), Duration::ZERO);
        assert!(ok.failure_summary(100).is_none());
    }
}
