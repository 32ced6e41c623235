//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/ai-review/) and project (.ai-review/) level configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::agent::AgentSpec;
use crate::constants::{agents as agent_constants, artifacts, proxy, timeouts};
use crate::types::{Result, ReviewError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Reviewing agents, in fan-out order
    pub agents: Vec<AgentSpec>,

    /// Designated optimization agent and its artifacts
    pub optimizer: OptimizerConfig,

    /// Proxy variables injected into every agent environment
    pub proxy: ProxyConfig,

    /// Phase deadlines
    pub timeouts: TimeoutConfig,

    /// Review fan-out limits
    pub concurrency: ConcurrencyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            agents: default_agents(),
            optimizer: OptimizerConfig::default(),
            proxy: ProxyConfig::default(),
            timeouts: TimeoutConfig::default(),
            concurrency: ConcurrencyConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ReviewError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(ReviewError::config("At least one agent must be configured"));
        }

        let mut names = HashSet::new();
        for agent in &self.agents {
            validate_agent(agent, "agent")?;
            if !names.insert(agent.name.as_str()) {
                return Err(ReviewError::config(format!(
                    "Duplicate agent name: {}",
                    agent.name
                )));
            }
        }

        validate_agent(&self.optimizer.agent, "optimizer")?;

        if self.optimizer.summary_file.trim().is_empty()
            || self.optimizer.report_file.trim().is_empty()
        {
            return Err(ReviewError::config(
                "optimizer summary_file and report_file must not be empty",
            ));
        }

        if self.timeouts.review_secs == 0 || self.timeouts.optimize_secs == 0 {
            return Err(ReviewError::config(
                "timeouts.review_secs and timeouts.optimize_secs must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Look up a configured reviewing agent by name
    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Restrict the reviewing agents to `names`, preserving configured order.
    /// An empty filter selects every agent.
    pub fn select_agents(&self, names: &[String]) -> Result<Vec<AgentSpec>> {
        if names.is_empty() {
            return Ok(self.agents.clone());
        }

        for name in names {
            if self.agent(name).is_none() {
                return Err(ReviewError::UnknownAgent {
                    name: name.clone(),
                    available: self.agent_names().join(", "),
                });
            }
        }

        Ok(self
            .agents
            .iter()
            .filter(|a| names.contains(&a.name))
            .cloned()
            .collect())
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }
}

fn validate_agent(agent: &AgentSpec, role: &str) -> Result<()> {
    if agent.name.trim().is_empty() || agent.command.trim().is_empty() {
        return Err(ReviewError::config(format!(
            "{} entries need a non-empty name and command",
            role
        )));
    }
    if agent.placeholder_count() != 1 {
        return Err(ReviewError::config(format!(
            "{} '{}' args must contain exactly one {} token (found {})",
            role,
            agent.name,
            agent_constants::PROMPT_PLACEHOLDER,
            agent.placeholder_count()
        )));
    }
    if agent.output_file.trim().is_empty() {
        return Err(ReviewError::config(format!(
            "{} '{}' needs an output_file",
            role, agent.name
        )));
    }
    Ok(())
}

/// Claude, Codex and Gemini CLIs, each writing its own review file
pub fn default_agents() -> Vec<AgentSpec> {
    vec![
        claude_spec("review-claude.md"),
        AgentSpec::new("codex", "codex", &["-p", "{prompt}"], "review-codex.md"),
        AgentSpec::new("gemini", "gemini", &["-p", "{prompt}"], "review-gemini.md"),
    ]
}

fn claude_spec(output_file: &str) -> AgentSpec {
    AgentSpec::new(
        "claude",
        "claude",
        &[
            "-p",
            "{prompt}",
            "--allowedTools",
            agent_constants::CLAUDE_ALLOWED_TOOLS,
        ],
        output_file,
    )
}

// =============================================================================
// Optimizer Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Agent run once after the review phase; its `output_file` is the report
    pub agent: AgentSpec,

    /// Merged review summary written next to the reviews
    pub summary_file: String,

    /// Completion report written next to the reviews
    pub report_file: String,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            agent: claude_spec(artifacts::REPORT_FILE),
            summary_file: artifacts::SUMMARY_FILE.to_string(),
            report_file: artifacts::REPORT_FILE.to_string(),
        }
    }
}

// =============================================================================
// Proxy Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Inject the proxy variables at all
    pub enabled: bool,
    pub http_proxy: String,
    pub https_proxy: String,
    /// SOCKS endpoint
    pub all_proxy: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            http_proxy: proxy::HTTP_PROXY.to_string(),
            https_proxy: proxy::HTTPS_PROXY.to_string(),
            all_proxy: proxy::ALL_PROXY.to_string(),
        }
    }
}

impl ProxyConfig {
    /// Variables to overlay on the inherited environment (empty when disabled)
    pub fn variables(&self) -> Vec<(String, String)> {
        if !self.enabled {
            return Vec::new();
        }
        vec![
            ("https_proxy".to_string(), self.https_proxy.clone()),
            ("http_proxy".to_string(), self.http_proxy.clone()),
            ("all_proxy".to_string(), self.all_proxy.clone()),
        ]
    }
}

// =============================================================================
// Timeout Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-agent review deadline in seconds
    pub review_secs: u64,

    /// Optimization deadline in seconds
    pub optimize_secs: u64,

    /// Pause before checking review files, in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            review_secs: timeouts::REVIEW_SECS,
            optimize_secs: timeouts::OPTIMIZE_SECS,
            settle_delay_ms: timeouts::SETTLE_DELAY_MS,
        }
    }
}

impl TimeoutConfig {
    pub fn review(&self) -> Duration {
        Duration::from_secs(self.review_secs)
    }

    pub fn optimize(&self) -> Duration {
        Duration::from_secs(self.optimize_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// =============================================================================
// Concurrency Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Maximum reviews in flight; 0 means one worker per agent
    pub max_parallel_reviews: usize,
}

impl ConcurrencyConfig {
    /// Worker count for a fan-out over `agent_count` agents (at least 1)
    pub fn workers_for(&self, agent_count: usize) -> usize {
        let cap = if self.max_parallel_reviews == 0 {
            agent_count
        } else {
            self.max_parallel_reviews.min(agent_count)
        };
        cap.max(1)
    }
}

// =============================================================================
// Tests
// =============================================================================
