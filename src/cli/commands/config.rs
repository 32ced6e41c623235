//! Config Command
//!
//! Manage ai-review configuration.
//!
//! Usage:
//!   ai-review config show [-f json]
//!   ai-review config path
//!   ai-review config init [-g] [--force]

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the effective configuration (merged from all sources)
pub fn show(config: Option<PathBuf>, format: &str) -> Result<()> {
    let rendered = ConfigLoader::new()
        .with_file(config)
        .render(format == "json")?;
    println!("{}", rendered);
    Ok(())
}

/// Show configuration paths
pub fn path(config: Option<PathBuf>) -> Result<()> {
    println!("Configuration paths:");
    println!();

    for (label, path, exists) in ConfigLoader::new().with_file(config).describe_paths() {
        let mark = if exists { "✓" } else { "✗" };
        match path {
            Some(path) => println!("  {:<9} {} {}", format!("{}:", label), mark, path.display()),
            None => println!("  {:<9} (not available)", format!("{}:", label)),
        }
    }
    Ok(())
}

/// Write the default configuration file
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };

    let scope = if global { "global" } else { "project" };
    Output::new().success(&format!("Initialized {} configuration", scope));
    println!("  Config: {}", path.display());
    Ok(())
}
