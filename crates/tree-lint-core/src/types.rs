//! Core types for violations and run results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File the violation belongs to.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// A violation reported by a check.
///
/// Immutable once the engine hands it out; filters only drop violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Name of the check that reported it (e.g., "NestingDepth").
    pub check: String,
    /// Configured id of the check instance, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Severity of this violation.
    pub severity: Severity,
    /// Where it was reported.
    pub location: Location,
    /// Message key the check reported (e.g., "nesting.depth").
    pub message_key: String,
    /// Ordered interpolation values for the message template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<String>,
    /// Rendered message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation with a pre-rendered message.
    #[must_use]
    pub fn new(
        check: impl Into<String>,
        severity: Severity,
        location: Location,
        message_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check: check.into(),
            id: None,
            severity,
            location,
            message_key: message_key.into(),
            message_args: Vec::new(),
            message: message.into(),
        }
    }

    /// Sets the configured check id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the interpolation arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.message_args = args;
        self
    }

    /// Identity used for suppression: the configured id, else the check name.
    #[must_use]
    pub fn source_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.check)
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} at {}:{}:{}\n",
            self.check,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(id) = &self.id {
            let _ = writeln!(output, "  = id: {id}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.source_id(),
            self.message
        )
    }
}

/// A file whose processing was abandoned because a check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// File that was being processed.
    pub file: PathBuf,
    /// Name of the failing check.
    pub check: String,
    /// Lifecycle hook that failed (e.g., "visit_token").
    pub phase: String,
    /// Line of the node being dispatched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Column (1-indexed) of the node being dispatched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    /// Error reported by the check.
    pub message: String,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, ":{line}:{column}")?;
        }
        write!(
            f,
            ": check {} failed in {}: {}",
            self.check, self.phase, self.message
        )
    }
}

/// Result of running analysis over a set of files.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations that survived filtering.
    pub violations: Vec<Violation>,
    /// Number of files processed.
    pub files_checked: usize,
    /// Files whose processing was cut short by a failing check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.violations
            .iter()
            .fold((0, 0, 0), |(e, w, i), v| match v.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Formats every violation followed by a summary line.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for violation in &self.violations {
            let _ = writeln!(report, "{}", violation.format());
        }
        for failure in &self.failures {
            let _ = writeln!(report, "{failure}");
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = write!(
            report,
            "Found {} error(s), {} warning(s), {} info(s) in {} file(s)",
            errors, warnings, infos, self.files_checked
        );
        if !self.failures.is_empty() {
            let _ = write!(report, ", {} file(s) failed", self.failures.len());
        }

        report
    }
}
