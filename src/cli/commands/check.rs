//! Check Command
//!
//! Verify that every configured agent CLI is installed.
//!
//! Usage:
//!   ai-review check

use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::agent::{AgentEnvironment, PreflightCheck, TokioProcessRunner};
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::constants::{exit_codes, timeouts};
use crate::types::Result;

/// Probe all agents and the optimizer; returns the process exit code
pub fn run(config: Option<PathBuf>) -> Result<u8> {
    let config = ConfigLoader::new().with_file(config).load()?;

    let mut agents: Vec<_> = config
        .agents
        .iter()
        .map(|a| (a.name.clone(), a.clone()))
        .collect();
    agents.push((
        format!("{} (optimizer)", config.optimizer.agent.name),
        config.optimizer.agent.clone(),
    ));

    let env = AgentEnvironment::from_current(&config.proxy);
    let check = PreflightCheck::new(
        TokioProcessRunner::shared(),
        Duration::from_secs(timeouts::PREFLIGHT_SECS),
    );

    let rt = Runtime::new()?;
    let results = rt.block_on(check.check_agents(&agents, &env));

    let out = Output::new();
    out.section("Agent availability");
    for result in &results {
        out.status(
            result.passed,
            &format!(
                "{} ({}, {}ms)",
                result.name, result.command, result.duration_ms
            ),
            Some(&result.message),
        );
    }

    let available = results.iter().filter(|r| r.passed).count();
    out.blank();
    if available == results.len() {
        out.success(&format!("All {} agents available", results.len()));
        Ok(exit_codes::SUCCESS)
    } else {
        out.error(&format!(
            "{}/{} agents available",
            available,
            results.len()
        ));
        Ok(exit_codes::FAILURE)
    }
}
