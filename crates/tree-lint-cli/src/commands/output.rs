//! Report rendering for the check command.

use anyhow::Result;
use std::path::Path;
use tree_lint_core::{LintResult, Severity};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(result, true)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Compact => print!("{}", render_compact(result)),
    }
    Ok(())
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn severity_code(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "31",
        Severity::Warning => "33",
        Severity::Info => "34",
    }
}

/// Violations grouped under a header per file, then failures and a summary.
fn render_text(result: &LintResult, color: bool) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let mut current: Option<&Path> = None;
    for violation in &result.violations {
        let file = violation.location.file.as_path();
        if current != Some(file) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", file.display());
            current = Some(file);
        }
        let _ = writeln!(
            out,
            "  {:>4}:{:<3} {:<7} {} [{}]",
            violation.location.line,
            violation.location.column,
            paint(
                &violation.severity.to_string(),
                severity_code(violation.severity),
                color
            ),
            violation.message,
            violation.source_id(),
        );
    }

    if !result.failures.is_empty() {
        out.push('\n');
        for failure in &result.failures {
            let _ = writeln!(out, "{} {failure}", paint("failed", "31", color));
        }
    }

    let (errors, warnings, infos) = result.count_by_severity();
    let code = if errors > 0 || !result.failures.is_empty() {
        "31"
    } else if warnings > 0 {
        "33"
    } else {
        "32"
    };
    if !out.is_empty() {
        out.push('\n');
    }
    let summary = format!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    );
    let _ = writeln!(out, "{}", paint(&summary, code, color));
    out
}

fn render_compact(result: &LintResult) -> String {
    let mut out = String::new();
    for line in result
        .violations
        .iter()
        .map(ToString::to_string)
        .chain(result.failures.iter().map(ToString::to_string))
    {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
