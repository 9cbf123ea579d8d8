//! CLI command implementations.

pub mod check;
pub mod list_checks;
pub mod output;
pub mod resolve;

use anyhow::{Context, Result};
use tree_lint_core::Config;

use crate::config_resolver::ConfigSource;

/// Loads the configuration named by `source`, if any.
pub fn load_config(source: &ConfigSource) -> Result<Option<Config>> {
    let Some(path) = source.path() else {
        return Ok(None);
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    Ok(Some(config))
}
