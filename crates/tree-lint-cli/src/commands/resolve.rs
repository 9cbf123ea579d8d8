//! Resolve command implementation.
//!
//! Prints the configuration after property resolution: every property with
//! its final value, then each check and filter as the analyzer will see them.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tree_lint_core::{CheckConfig, Config, FilterConfig};

use crate::config_resolver::ConfigSource;

#[derive(Debug, Serialize)]
struct ResolvedView<'a> {
    properties: &'a BTreeMap<String, String>,
    checks: &'a [CheckConfig],
    filters: &'a [FilterConfig],
}

/// Runs the resolve command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let Some(config) = super::load_config(source)? else {
        println!("No configuration found; nothing to resolve.");
        return Ok(());
    };

    // miette renders the diagnostic code and help of configuration errors.
    let resolved = config
        .resolved()
        .map_err(|e| anyhow!("{:?}", miette::Report::new(e)))?;

    println!("{}", render(&resolved)?);
    Ok(())
}

fn render(config: &Config) -> Result<String> {
    let view = ResolvedView {
        properties: &config.properties,
        checks: &config.checks,
        filters: &config.filters,
    };
    Ok(serde_json::to_string_pretty(&view)?)
}
