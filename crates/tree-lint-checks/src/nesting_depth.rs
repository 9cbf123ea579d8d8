//! Check limiting how deeply control structures nest.
//!
//! # Rationale
//!
//! Deeply nested branches and loops are hard to follow. Past a few levels
//! the body usually wants to be split into smaller methods.
//!
//! # Detected Patterns
//!
//! - `if`, `for`, `while`, `do`, `switch` and `try` nested deeper than `max`
//! - `else if` chains count as one level, not one per branch
//!
//! # Configuration
//!
//! - `max`: Maximum allowed depth (default: 3)

use tree_lint_core::{
    CheckBox, CheckOptions, CheckResult, ConfigError, FileContext, Node, Reporter, TokenKind,
};

/// Check name for nesting-depth.
pub const NAME: &str = "NestingDepth";

/// Message key reported when the depth exceeds the limit.
pub const MSG_KEY: &str = "nesting.depth";

const TOKENS: &[TokenKind] = &[
    TokenKind::LiteralIf,
    TokenKind::LiteralFor,
    TokenKind::LiteralWhile,
    TokenKind::LiteralDo,
    TokenKind::LiteralSwitch,
    TokenKind::LiteralTry,
];

/// Limits the nesting depth of control structures.
#[derive(Debug, Clone)]
pub struct NestingDepth {
    max: usize,
    depth: usize,
    counted: Vec<bool>,
}

impl Default for NestingDepth {
    fn default() -> Self {
        Self::new()
    }
}

impl NestingDepth {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max: 3,
            depth: 0,
            counted: Vec::new(),
        }
    }

    /// Sets the maximum allowed depth.
    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    /// Builds the check from configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if `max` is not a
    /// non-negative integer.
    pub fn from_options(options: &CheckOptions) -> Result<CheckBox, ConfigError> {
        Ok(Box::new(Self::new().max(options.get_usize("max", 3)?)))
    }

    fn is_else_if(node: Node<'_>) -> bool {
        node.kind() == TokenKind::LiteralIf
            && node
                .parent()
                .is_some_and(|p| p.kind() == TokenKind::LiteralElse)
    }
}

impl tree_lint_core::Check for NestingDepth {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Limits the nesting depth of control structures"
    }

    fn acceptable_tokens(&self) -> &[TokenKind] {
        TOKENS
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Nesting depth is {0} (max allowed is {1}).")]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        self.depth = 0;
        self.counted.clear();
        Ok(())
    }

    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        let counts = !Self::is_else_if(node);
        self.counted.push(counts);
        if counts {
            self.depth += 1;
            if self.depth > self.max {
                reporter.log(node, MSG_KEY, &[&self.depth, &self.max]);
            }
        }
        Ok(())
    }

    fn leave_token(&mut self, _node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        if self.counted.pop() == Some(true) {
            self.depth = self.depth.saturating_sub(1);
        }
        Ok(())
    }
}
