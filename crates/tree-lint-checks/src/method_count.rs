//! Check limiting the number of methods declared by one type.
//!
//! Nested types keep their own count: methods of an inner class do not add
//! to the enclosing class.
//!
//! # Configuration
//!
//! - `max`: Maximum methods per type (default: 100)

use tree_lint_core::{
    CheckBox, CheckOptions, CheckResult, ConfigError, FileContext, Node, Reporter, TokenKind,
};

/// Check name for method-count.
pub const NAME: &str = "MethodCount";

/// Message key reported for a type with too many methods.
pub const MSG_KEY: &str = "too.many.methods";

const DEFAULT_MAX: usize = 100;

/// Limits how many methods a single type may declare.
#[derive(Debug, Clone)]
pub struct MethodCount {
    max: usize,
    counters: Vec<usize>,
}

impl Default for MethodCount {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodCount {
    /// Creates a new check with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max: DEFAULT_MAX,
            counters: Vec::new(),
        }
    }

    /// Sets the maximum number of methods per type.
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
        Ok(Box::new(Self::new().max(options.get_usize("max", DEFAULT_MAX)?)))
    }
}

impl tree_lint_core::Check for MethodCount {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Limits the number of methods per type"
    }

    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[
            TokenKind::ClassDef,
            TokenKind::InterfaceDef,
            TokenKind::EnumDef,
            TokenKind::RecordDef,
            TokenKind::MethodDef,
        ]
    }

    fn required_tokens(&self) -> &[TokenKind] {
        &[TokenKind::MethodDef]
    }

    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[(MSG_KEY, "Type declares {0} methods (max allowed is {1}).")]
    }

    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        self.counters.clear();
        Ok(())
    }

    fn visit_token(&mut self, node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        if node.kind() == TokenKind::MethodDef {
            // Methods outside any type (tolerated in partial trees) are not counted.
            if let Some(count) = self.counters.last_mut() {
                *count += 1;
            }
        } else {
            self.counters.push(0);
        }
        Ok(())
    }

    fn leave_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        if node.kind() == TokenKind::MethodDef {
            return Ok(());
        }
        if let Some(count) = self.counters.pop() {
            if count > self.max {
                reporter.log(node, MSG_KEY, &[&count, &self.max]);
            }
        }
        Ok(())
    }
}
