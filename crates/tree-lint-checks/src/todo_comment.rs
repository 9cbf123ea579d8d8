//! Check for TODO-style markers in comments.
//!
//! Works on comment nodes, so the engine splices comments into the tree
//! whenever this check is registered.
//!
//! # Configuration
//!
//! - `format`: Pattern searched in every comment body (default: `TODO:`)

use regex::Regex;
use std::sync::LazyLock;
use tree_lint_core::{
    CheckBox, CheckOptions, CheckResult, ConfigError, FileContext, Node, Reporter, Severity,
    TokenKind,
};

/// Check name for todo-comment.
pub const NAME: &str = "TodoComment";

/// Message key reported for a matching comment.
pub const MSG_KEY: &str = "todo.match";

const DEFAULT_FORMAT: &str = "TODO:";

#[allow(clippy::expect_used)]
static DEFAULT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_FORMAT).expect("default format is valid"));

/// Flags comments matching a configurable pattern.
#[derive(Debug, Clone)]
pub struct TodoComment {
    format: Regex,
}

impl TodoComment {
    /// Creates a new check searching for `TODO:`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            format: DEFAULT_PATTERN.clone(),
        }
    }

    /// Creates a check searching for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if the pattern does not compile.
    pub fn with_format(pattern: &str) -> Result<Self, ConfigError> {
        let format = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { format })
    }

    /// Builds the check from configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for a bad `format`.
    pub fn from_options(options: &CheckOptions) -> Result<CheckBox, ConfigError> {
        Ok(Box::new(Self::with_format(
            &options.get_str("format", DEFAULT_FORMAT)?,
        )?))
    }
}

impl Default for TodoComment {
    fn default() -> Self {
        Self::new()
    }
}

impl tree_lint_core::Check for TodoComment {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags comments containing TODO markers"
    }

    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[TokenKind::CommentContent]
    }

    fn required_tokens(&self) -> &[TokenKind] {
        &[TokenKind::CommentContent]
    }

    fn is_comment_nodes_required(&self) -> bool {
        true
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Comment matches to-do format '{0}'.")]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        // Stateless between nodes.
        Ok(())
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        if self.format.is_match(node.text()) {
            reporter.log(node, MSG_KEY, &[&self.format.as_str()]);
        }
        Ok(())
    }
}
