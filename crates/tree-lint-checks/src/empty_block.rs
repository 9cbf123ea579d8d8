//! Check for blocks with no statements.
//!
//! # Detected Patterns
//!
//! - Statement lists (`{}` bodies of methods, loops, branches) holding only
//!   their braces
//! - Empty type bodies
//!
//! Comment nodes inside a block are skipped, so a block holding only comments
//! is empty whether or not another check had comments spliced into the tree.

use tree_lint_core::{
    CheckBox, CheckOptions, CheckResult, ConfigError, FileContext, Node, Reporter, Severity,
    TokenKind,
};

/// Check name for empty-block.
pub const NAME: &str = "EmptyBlock";

/// Message key reported for an empty block.
pub const MSG_KEY: &str = "block.empty";

/// Flags blocks that contain nothing besides their braces.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBlock;

impl EmptyBlock {
    /// Creates a new check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the check. It takes no options.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the registry factory.
    pub fn from_options(_options: &CheckOptions) -> Result<CheckBox, ConfigError> {
        Ok(Box::new(Self))
    }

    fn is_empty(node: Node<'_>) -> bool {
        node.children().all(|c| {
            matches!(
                c.kind(),
                TokenKind::Lcurly
                    | TokenKind::Rcurly
                    | TokenKind::SingleLineComment
                    | TokenKind::BlockCommentBegin
            )
        })
    }
}

impl tree_lint_core::Check for EmptyBlock {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags blocks without statements"
    }

    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[TokenKind::Slist, TokenKind::ObjBlock]
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Empty {0} block.")]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        Ok(())
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        if Self::is_empty(node) {
            reporter.log(node, MSG_KEY, &[&node.kind()]);
        }
        Ok(())
    }
}
