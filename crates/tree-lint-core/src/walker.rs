//! Tree traversal and check dispatch.
//!
//! The walker owns a set of registered checks and drives them over one file
//! at a time. Dispatch goes through an index from token kind to the checks
//! interested in it, built once at registration. Traversal keeps an explicit
//! stack of open ancestors, so input depth is bounded only by memory.

use crate::check::{CheckBox, CheckError, CheckMeta, Phase, Reporter, TokenInterest};
use crate::config::{CheckConfig, ConfigError};
use crate::context::{FileContext, SourceFile};
use crate::kind::TokenKind;
use crate::tree::{Node, SyntaxTree};
use crate::types::{FileFailure, Severity, Violation};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-instance settings applied at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSettings {
    /// Instance id stamped on violations.
    pub id: Option<String>,
    /// Severity override.
    pub severity: Option<Severity>,
    /// Token set overriding the check's defaults.
    pub tokens: Option<Vec<TokenKind>>,
    /// Message template overrides by key.
    pub messages: BTreeMap<String, String>,
}

impl CheckSettings {
    /// Extracts the settings of a check configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownToken`] for an unknown token name.
    pub fn from_config(config: &CheckConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            id: config.id.clone(),
            severity: config.severity,
            tokens: config.token_kinds()?,
            messages: config.messages.clone(),
        })
    }
}

/// A check that failed while processing a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: check {check} failed in {phase}: {source}", file.display())]
pub struct CheckExecutionError {
    /// File being processed.
    pub file: PathBuf,
    /// Name of the failing check.
    pub check: String,
    /// Hook that failed.
    pub phase: Phase,
    /// Line of the node being dispatched, if any.
    pub line: Option<usize>,
    /// Column (1-based) of the node being dispatched, if any.
    pub column: Option<usize>,
    /// What the check reported.
    pub source: CheckError,
}

impl From<CheckExecutionError> for FileFailure {
    fn from(e: CheckExecutionError) -> Self {
        Self {
            file: e.file,
            check: e.check,
            phase: e.phase.to_string(),
            line: e.line,
            column: e.column,
            message: e.source.message().to_string(),
        }
    }
}

/// Result of walking one file.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Violations collected, sorted by line, column and registration order.
    /// Kept even when a check failed part way.
    pub violations: Vec<Violation>,
    /// The check failure that cut processing short, if any.
    pub failure: Option<CheckExecutionError>,
}

impl WalkOutcome {
    /// Returns true if every hook ran to completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

struct Registered {
    check: CheckBox,
    meta: CheckMeta,
}

/// Drives registered checks over syntax trees.
pub struct TreeWalker {
    checks: Vec<Registered>,
    dispatch: Vec<Vec<usize>>,
    comments_required: bool,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field(
                "checks",
                &self.checks.iter().map(|r| r.meta.name).collect::<Vec<_>>(),
            )
            .field("comments_required", &self.comments_required)
            .finish_non_exhaustive()
    }
}

impl TreeWalker {
    /// Creates a walker with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            dispatch: vec![Vec::new(); TokenKind::COUNT],
            comments_required: false,
        }
    }

    /// Registers a check with its default settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the check's own token sets are
    /// inconsistent.
    pub fn register(&mut self, check: CheckBox) -> Result<&mut Self, ConfigError> {
        self.register_with(check, &CheckSettings::default())
    }

    /// Registers a check with instance settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnacceptableTokens`] or
    /// [`ConfigError::MissingRequiredTokens`] if the configured token set is
    /// invalid for this check.
    pub fn register_with(
        &mut self,
        check: CheckBox,
        settings: &CheckSettings,
    ) -> Result<&mut Self, ConfigError> {
        let name = check.name();
        let tokens =
            TokenInterest::of(check.as_ref()).effective(name, settings.tokens.as_deref())?;

        let mut messages: BTreeMap<String, String> = check
            .messages()
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        messages.extend(settings.messages.clone());

        let order = self.checks.len();
        for kind in &tokens {
            self.dispatch[kind.index()].push(order);
        }
        self.comments_required |= check.is_comment_nodes_required();

        debug!(
            "Registered check {} (#{}) for {} token kind(s)",
            name,
            order,
            tokens.len()
        );

        let meta = CheckMeta {
            name,
            id: settings.id.clone(),
            severity: settings.severity.unwrap_or_else(|| check.default_severity()),
            order,
            messages,
        };
        self.checks.push(Registered { check, meta });
        Ok(self)
    }

    /// Number of registered checks.
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Names of the registered checks, in registration order.
    pub fn check_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|r| r.meta.name)
    }

    /// Returns true if any registered check needs comment nodes.
    #[must_use]
    pub fn is_comment_nodes_required(&self) -> bool {
        self.comments_required
    }

    /// Checks registered for `kind`, as registration indexes.
    #[must_use]
    pub fn checks_for(&self, kind: TokenKind) -> &[usize] {
        &self.dispatch[kind.index()]
    }

    /// Runs every registered check over one file.
    ///
    /// Splices comments into the tree first if any check needs comment
    /// nodes. A failing check abandons the rest of the file, including the
    /// remaining `end_file` hooks; violations reported before the failure are
    /// kept.
    pub fn process(&mut self, file: &mut SourceFile) -> WalkOutcome {
        if self.comments_required {
            file.splice_comments();
        }
        debug!("Walking {}", file.path.display());

        let mut sink = Vec::new();
        let failure = self.walk(&file.path, &file.tree, &mut sink).err();

        sink.sort_by_key(|(order, v)| (v.location.line, v.location.column, *order));
        WalkOutcome {
            violations: sink.into_iter().map(|(_, v)| v).collect(),
            failure,
        }
    }

    fn walk(
        &mut self,
        path: &Path,
        tree: &SyntaxTree,
        sink: &mut Vec<(usize, Violation)>,
    ) -> Result<(), CheckExecutionError> {
        let ctx = FileContext::new(path, tree);
        for reg in &mut self.checks {
            reg.check
                .begin_file(&ctx)
                .map_err(|e| execution_error(path, reg, Phase::BeginFile, None, e))?;
        }

        let mut ancestors: Vec<Node<'_>> = Vec::new();
        let mut current = tree.root();

        while let Some(node) = current {
            self.dispatch(Phase::VisitToken, node, path, sink)?;

            if let Some(child) = node.first_child() {
                ancestors.push(node);
                current = Some(child);
                continue;
            }

            let mut finished = node;
            current = loop {
                self.dispatch(Phase::LeaveToken, finished, path, sink)?;
                if let Some(next) = finished.next_sibling() {
                    break Some(next);
                }
                match ancestors.pop() {
                    Some(parent) => finished = parent,
                    None => break None,
                }
            };
        }

        for reg in &mut self.checks {
            let mut reporter = Reporter::new(path, &reg.meta, sink);
            reg.check
                .end_file(&mut reporter)
                .map_err(|e| execution_error(path, reg, Phase::EndFile, None, e))?;
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        phase: Phase,
        node: Node<'_>,
        path: &Path,
        sink: &mut Vec<(usize, Violation)>,
    ) -> Result<(), CheckExecutionError> {
        let Self {
            checks, dispatch, ..
        } = self;

        for &index in &dispatch[node.kind().index()] {
            let reg = &mut checks[index];
            let mut reporter = Reporter::new(path, &reg.meta, sink);
            let result = match phase {
                Phase::LeaveToken => reg.check.leave_token(node, &mut reporter),
                _ => reg.check.visit_token(node, &mut reporter),
            };
            result.map_err(|e| execution_error(path, reg, phase, Some(node), e))?;
        }
        Ok(())
    }
}

fn execution_error(
    path: &Path,
    reg: &Registered,
    phase: Phase,
    node: Option<Node<'_>>,
    source: CheckError,
) -> CheckExecutionError {
    CheckExecutionError {
        file: path.to_path_buf(),
        check: reg.meta.name.to_string(),
        phase,
        line: node.map(|n| n.line()),
        column: node.map(|n| n.column() + 1),
        source,
    }
}

/// Registers `checks` in order and walks one file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a check's token sets are inconsistent.
/// Check failures are reported in [`WalkOutcome::failure`] instead.
pub fn run_tree_walker(
    file: &mut SourceFile,
    checks: Vec<CheckBox>,
) -> Result<WalkOutcome, ConfigError> {
    let mut walker = TreeWalker::new();
    for check in checks {
        walker.register(check)?;
    }
    Ok(walker.process(file))
}
