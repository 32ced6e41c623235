//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/ai-review/config.toml)
//! 3. Project config (.ai-review/config.toml)
//! 4. Explicit `--config` file
//! 5. Environment variables (AI_REVIEW_* prefix, `__` between sections)
//!
//! CLI flags are applied by the commands on top of the extracted config.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, ReviewError};

const APP_DIR: &str = "ai-review";
const PROJECT_DIR: &str = ".ai-review";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "AI_REVIEW_";

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    global: Option<PathBuf>,
    project: PathBuf,
    explicit: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            global: Self::global_config_path(),
            project: Self::project_config_path(),
            explicit: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an explicit config file merged above global and project files
    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    #[cfg(test)]
    fn isolated(project: PathBuf, env_prefix: &str) -> Self {
        Self {
            global: None,
            project,
            explicit: None,
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Load configuration with full resolution chain:
    /// defaults → global → project → explicit file → env vars
    pub fn load(&self) -> Result<Config> {
        let config: Config = self
            .figment()?
            .extract()
            .map_err(|e| ReviewError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = &self.global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if self.project.exists() {
            debug!("Loading project config from: {}", self.project.display());
            figment = figment.merge(Toml::file(&self.project));
        }

        if let Some(explicit) = &self.explicit {
            if !explicit.exists() {
                return Err(ReviewError::Config(format!(
                    "Config file not found: {}",
                    explicit.display()
                )));
            }
            debug!("Loading config from: {}", explicit.display());
            figment = figment.merge(Toml::file(explicit));
        }

        // e.g. AI_REVIEW_TIMEOUTS__REVIEW_SECS -> timeouts.review_secs
        Ok(figment.merge(
            Env::prefixed(&self.env_prefix)
                .split("__")
                .lowercase(true),
        ))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/ai-review/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join(APP_DIR))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join(CONFIG_FILE)
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Describe each config file location and whether it exists
    pub fn describe_paths(&self) -> Vec<(&'static str, Option<PathBuf>, bool)> {
        let mut paths = vec![
            (
                "Global",
                self.global.clone(),
                self.global.as_deref().is_some_and(Path::exists),
            ),
            ("Project", Some(self.project.clone()), self.project.exists()),
        ];
        if let Some(explicit) = &self.explicit {
            paths.push(("Explicit", Some(explicit.clone()), explicit.exists()));
        }
        paths
    }

    /// Render the effective configuration
    pub fn render(&self, as_json: bool) -> Result<String> {
        let config = self.load()?;

        if as_json {
            Ok(serde_json::to_string_pretty(&config)?)
        } else {
            toml::to_string_pretty(&config).map_err(|e| ReviewError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            ReviewError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir.join(CONFIG_FILE), force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_default(&Self::project_config_path(), force)
    }

    fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() || force {
            fs::write(path, Self::default_config_text()?)?;
            info!("Created config: {}", path.display());
        } else {
            info!("Config exists: {}", path.display());
        }

        Ok(path.to_path_buf())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Default config content (TOML) with a short header
    fn default_config_text() -> Result<String> {
        let body = toml::to_string_pretty(&Config::default())
            .map_err(|e| ReviewError::Config(e.to_string()))?;
        Ok(format!(
            "# ai-review configuration\n\
             # Project settings in .ai-review/config.toml override the global file.\n\
             # Each agent's args must contain exactly one \"{{prompt}}\" token.\n\n{}",
            body
        ))
    }
}
