//! The check contract.
//!
//! A check is an independent rule module. The engine owns its lifecycle for
//! every file: [`Check::begin_file`] once, then [`Check::visit_token`] and
//! [`Check::leave_token`] around every node whose kind is in the check's
//! effective token set, then [`Check::end_file`] once. Violations go to the
//! engine-owned [`Reporter`]; checks never format output or filter.

use crate::config::ConfigError;
use crate::context::FileContext;
use crate::kind::TokenKind;
use crate::tree::Node;
use crate::types::{Location, Severity, Violation};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

/// Error raised by a check hook. Aborts processing of the current file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CheckError {
    message: String,
}

impl CheckError {
    /// Creates a new check error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type of check hooks.
pub type CheckResult = Result<(), CheckError>;

/// Lifecycle hook of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// [`Check::begin_file`].
    BeginFile,
    /// [`Check::visit_token`].
    VisitToken,
    /// [`Check::leave_token`].
    LeaveToken,
    /// [`Check::end_file`].
    EndFile,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BeginFile => "begin_file",
            Self::VisitToken => "visit_token",
            Self::LeaveToken => "leave_token",
            Self::EndFile => "end_file",
        })
    }
}

/// A rule module driven by the tree walker.
///
/// Instances are created once per configuration and reused across files, so
/// all per-file state must be reset in [`Check::begin_file`]. That hook has
/// no default body on purpose: every check states what it resets.
///
/// # Example
///
/// ```ignore
/// use tree_lint_core::{Check, CheckResult, FileContext, Node, Reporter, TokenKind};
///
/// #[derive(Default)]
/// pub struct ReturnCount { count: usize }
///
/// impl Check for ReturnCount {
///     fn name(&self) -> &'static str { "ReturnCount" }
///     fn acceptable_tokens(&self) -> &[TokenKind] { &[TokenKind::LiteralReturn] }
///
///     fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
///         self.count = 0;
///         Ok(())
///     }
///
///     fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
///         self.count += 1;
///         if self.count > 3 {
///             reporter.log(node, "return.count", &[&self.count]);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Check: Send {
    /// Name used in configuration and reports (e.g., "NestingDepth").
    fn name(&self) -> &'static str;

    /// Brief description of what the check reports.
    fn description(&self) -> &'static str {
        ""
    }

    /// Kinds this check is able to handle.
    fn acceptable_tokens(&self) -> &[TokenKind];

    /// Kinds handled when the configuration does not override them.
    fn default_tokens(&self) -> &[TokenKind] {
        self.acceptable_tokens()
    }

    /// Kinds that must stay in the effective set.
    fn required_tokens(&self) -> &[TokenKind] {
        &[]
    }

    /// Whether comment nodes must be spliced into the tree before traversal.
    fn is_comment_nodes_required(&self) -> bool {
        false
    }

    /// Severity used when the configuration does not override it.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Message templates as `(key, template)` pairs. Templates use `{0}`,
    /// `{1}`, ... placeholders for the reported arguments.
    fn messages(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Resets all per-file state. Called once before the first node.
    ///
    /// # Errors
    ///
    /// An error abandons the file.
    fn begin_file(&mut self, ctx: &FileContext<'_>) -> CheckResult;

    /// Called on pre-order entry to every node of an interesting kind.
    ///
    /// # Errors
    ///
    /// An error abandons the file.
    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult;

    /// Called on post-order exit, after every descendant has been left.
    ///
    /// # Errors
    ///
    /// An error abandons the file.
    fn leave_token(&mut self, _node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        Ok(())
    }

    /// Called once after the last node has been left.
    ///
    /// # Errors
    ///
    /// An error abandons the file.
    fn end_file(&mut self, _reporter: &mut Reporter<'_>) -> CheckResult {
        Ok(())
    }
}

/// Type alias for boxed Check trait objects.
pub type CheckBox = Box<dyn Check>;

/// The three token sets a check declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInterest {
    /// Kinds the check can handle.
    pub acceptable: Vec<TokenKind>,
    /// Kinds used without configuration.
    pub default: Vec<TokenKind>,
    /// Kinds that must be in the effective set.
    pub required: Vec<TokenKind>,
}

impl TokenInterest {
    /// Captures the declared sets of `check`.
    #[must_use]
    pub fn of(check: &dyn Check) -> Self {
        Self {
            acceptable: check.acceptable_tokens().to_vec(),
            default: check.default_tokens().to_vec(),
            required: check.required_tokens().to_vec(),
        }
    }

    /// Computes the effective token set.
    ///
    /// The configured set replaces the default set when present. Duplicates
    /// are removed while keeping first occurrences.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnacceptableTokens`] if a configured kind is not
    /// acceptable, and [`ConfigError::MissingRequiredTokens`] if a required
    /// kind is absent from the effective set.
    pub fn effective(
        &self,
        check: &str,
        configured: Option<&[TokenKind]>,
    ) -> Result<Vec<TokenKind>, ConfigError> {
        let requested = configured.unwrap_or(&self.default);

        let unacceptable: Vec<TokenKind> = requested
            .iter()
            .filter(|k| !self.acceptable.contains(k))
            .copied()
            .collect();
        if !unacceptable.is_empty() {
            return Err(ConfigError::UnacceptableTokens {
                check: check.to_string(),
                tokens: join_kinds(&unacceptable),
            });
        }

        let missing: Vec<TokenKind> = self
            .required
            .iter()
            .filter(|k| !requested.contains(k))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequiredTokens {
                check: check.to_string(),
                tokens: join_kinds(&missing),
            });
        }

        let mut effective = Vec::with_capacity(requested.len());
        for kind in requested {
            if !effective.contains(kind) {
                effective.push(*kind);
            }
        }
        Ok(effective)
    }
}

fn join_kinds(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Identity and reporting settings of one registered check instance.
#[derive(Debug, Clone)]
pub(crate) struct CheckMeta {
    pub(crate) name: &'static str,
    pub(crate) id: Option<String>,
    pub(crate) severity: Severity,
    pub(crate) order: usize,
    pub(crate) messages: BTreeMap<String, String>,
}

impl CheckMeta {
    fn render(&self, key: &str, args: &[String]) -> String {
        match self.messages.get(key) {
            Some(template) => render_template(template, args),
            None if args.is_empty() => key.to_string(),
            None => format!("{key}: {}", args.join(", ")),
        }
    }
}

/// Replaces `{n}` placeholders with the matching argument. Unknown indices
/// and unbalanced braces are kept verbatim.
#[must_use]
pub fn render_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let arg = after.find('}').and_then(|close| {
            after[..close]
                .parse::<usize>()
                .ok()
                .and_then(|i| args.get(i))
                .map(|a| (a, close))
        });
        match arg {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}

/// Engine-owned sink for the violations of one check on one file.
pub struct Reporter<'a> {
    file: &'a Path,
    meta: &'a CheckMeta,
    sink: &'a mut Vec<(usize, Violation)>,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(
        file: &'a Path,
        meta: &'a CheckMeta,
        sink: &'a mut Vec<(usize, Violation)>,
    ) -> Self {
        Self { file, meta, sink }
    }

    /// Reports a violation at `node`.
    pub fn log(&mut self, node: Node<'_>, key: &str, args: &[&dyn Display]) {
        self.log_at(node.line(), node.column(), key, args);
    }

    /// Reports a violation at a 1-based line and 0-based column.
    pub fn log_at(&mut self, line: usize, column: usize, key: &str, args: &[&dyn Display]) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let message = self.meta.render(key, &args);
        let mut violation = Violation::new(
            self.meta.name,
            self.meta.severity,
            Location::new(self.file, line, column + 1),
            key,
            message,
        )
        .with_args(args);
        violation.id.clone_from(&self.meta.id);
        self.sink.push((self.meta.order, violation));
    }

    /// Name of the reporting check.
    #[must_use]
    pub fn check_name(&self) -> &str {
        self.meta.name
    }
}
