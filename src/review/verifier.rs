//! Result Verifier
//!
//! Checks which expected review files exist after the review phase. File
//! presence is recorded independently of each agent's exit status: an agent
//! may succeed without writing its file, or fail after writing it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::agent::AgentSpec;

/// Presence of one agent's expected output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheckResult {
    pub agent: String,
    /// File name relative to the output directory
    pub file: String,
    pub path: PathBuf,
    pub exists: bool,
}

/// Check every agent's expected file under `output_dir`, keyed by agent name
pub fn check_output_files(
    output_dir: &Path,
    agents: &[AgentSpec],
) -> BTreeMap<String, FileCheckResult> {
    agents
        .iter()
        .map(|agent| {
            let path = output_dir.join(&agent.output_file);
            let exists = path.exists();
            debug!("{}: {} exists={}", agent.name, path.display(), exists);
            (
                agent.name.clone(),
                FileCheckResult {
                    agent: agent.name.clone(),
                    file: agent.output_file.clone(),
                    path,
                    exists,
                },
            )
        })
        .collect()
}

/// Number of review files that exist
pub fn existing_count(files: &BTreeMap<String, FileCheckResult>) -> usize {
    files.values().filter(|f| f.exists).count()
}

/// Post-review file check with a settle delay for late filesystem writes
#[derive(Debug, Clone)]
pub struct ResultVerifier {
    settle_delay: Duration,
}

impl ResultVerifier {
    pub fn new(settle_delay: Duration) -> Self {
        Self { settle_delay }
    }

    pub async fn verify(
        &self,
        output_dir: &Path,
        agents: &[AgentSpec],
    ) -> BTreeMap<String, FileCheckResult> {
        if !self.settle_delay.is_zero() {
            debug!("Waiting {:?} for review files to settle", self.settle_delay);
            tokio::time::sleep(self.settle_delay).await;
        }

        let files = check_output_files(output_dir, agents);
        info!(
            "Review files present: {}/{}",
            existing_count(&files),
            files.len()
        );
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_agents;
    use tempfile::TempDir;

    #[test]
    fn test_reports_each_agent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("review-codex.md"), "# notes").unwrap();

        let files = check_output_files(dir.path(), &default_agents());

        assert_eq!(files.len(), 3);
        assert!(files["codex"].exists);
        assert!(!files["claude"].exists);
        assert!(!files["gemini"].exists);
        assert_eq!(files["codex"].file, "review-codex.md");
        assert_eq!(files["codex"].path, dir.path().join("review-codex.md"));
        assert_eq!(existing_count(&files), 1);
    }

    #[test]
    fn test_missing_directory_means_no_files() {
        let dir = TempDir::new().unwrap();
        let files = check_output_files(&dir.path().join("nope"), &default_agents());
        assert_eq!(existing_count(&files), 0);
    }

    #[tokio::test]
    async fn test_verify_sees_files_written_before_check() {
        let dir = TempDir::new().unwrap();
        let agents = default_agents();
        for agent in &agents {
            std::fs::write(dir.path().join(&agent.output_file), "review").unwrap();
        }

        let files = ResultVerifier::new(Duration::from_millis(10))
            .verify(dir.path(), &agents)
            .await;
        assert_eq!(existing_count(&files), 3);
    }
}
