//! Check presets and the built-in registry.

use crate::{empty_block, method_count, nesting_depth, todo_comment};
use crate::{EmptyBlock, MethodCount, NestingDepth, TodoComment};
use tree_lint_core::{
    CheckBox, CheckConfig, CheckRegistry, Config, FilterConfig, NearbyCommentConfig, Severity,
    SuppressionCommentConfig,
};

/// Preset configurations for tree-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended checks with sensible defaults.
    Recommended,
    /// Stricter limits, every check enabled.
    Strict,
}

impl Preset {
    /// Returns the configuration for this preset.
    #[must_use]
    pub fn config(self) -> Config {
        match self {
            Self::Recommended => recommended_config(),
            Self::Strict => strict_config(),
        }
    }

    /// Parses a preset name as used on the command line.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "recommended" => Some(Self::Recommended),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Registers every built-in check in `registry`.
pub fn register_builtin_checks(registry: &mut CheckRegistry) {
    registry
        .register(nesting_depth::NAME, NestingDepth::from_options)
        .register(todo_comment::NAME, TodoComment::from_options)
        .register(empty_block::NAME, EmptyBlock::from_options)
        .register(method_count::NAME, MethodCount::from_options);
    tracing::debug!("Registered {} built-in checks", registry.len());
}

/// Returns a registry holding every built-in check.
#[must_use]
pub fn builtin_registry() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    register_builtin_checks(&mut registry);
    registry
}

/// Returns one default instance of every built-in check.
#[must_use]
pub fn all_checks() -> Vec<CheckBox> {
    vec![
        Box::new(NestingDepth::new()),
        Box::new(TodoComment::new()),
        Box::new(EmptyBlock::new()),
        Box::new(MethodCount::new()),
    ]
}

fn default_filters() -> Vec<FilterConfig> {
    vec![
        FilterConfig::SuppressionComment(SuppressionCommentConfig::default()),
        FilterConfig::NearbyComment(NearbyCommentConfig::default()),
    ]
}

/// Returns the recommended configuration.
///
/// Includes:
/// - `NestingDepth` with a limit of 3
/// - `MethodCount` with a limit of 100
/// - `EmptyBlock` as a warning
/// - Both comment filters with their default formats
#[must_use]
pub fn recommended_config() -> Config {
    Config {
        checks: vec![
            CheckConfig::new(nesting_depth::NAME),
            CheckConfig::new(method_count::NAME),
            CheckConfig::new(empty_block::NAME),
        ],
        filters: default_filters(),
        ..Config::default()
    }
}

/// Returns the strict configuration.
///
/// Tighter limits shared through the `limit` property, and `TodoComment`
/// reported as a warning.
#[must_use]
pub fn strict_config() -> Config {
    let mut todo = CheckConfig::new(todo_comment::NAME);
    todo.severity = Some(Severity::Warning);
    let mut empty = CheckConfig::new(empty_block::NAME);
    empty.severity = Some(Severity::Error);

    Config {
        properties: [
            ("limit".to_string(), "2".to_string()),
            ("methods".to_string(), "${limit}0".to_string()),
        ]
        .into_iter()
        .collect(),
        checks: vec![
            CheckConfig::new(nesting_depth::NAME).with_option("max", "${limit}"),
            CheckConfig::new(method_count::NAME).with_option("max", "${methods}"),
            empty,
            todo,
        ],
        filters: default_filters(),
        ..Config::default()
    }
}
