//! Integration test: comment-driven suppression over walker output.

use tree_lint_core::{
    apply_suppression_filter, run_tree_walker, Check, CheckResult, CommentSpan, CommentToken,
    FileContext, Location, Node, NodeSpec, Reporter, Severity, SourceFile, SyntaxTree, TokenKind,
    Violation,
};

fn violation(check: &str, line: usize) -> Violation {
    Violation::new(
        check,
        Severity::Error,
        Location::new("Sample.java", line, 1),
        "key",
        "message",
    )
}

fn spans(comments: &[(&str, usize)]) -> Vec<CommentSpan> {
    comments
        .iter()
        .map(|(text, line)| CommentSpan::from_token(&CommentToken::single_line(*text, *line, 0)))
        .collect()
}

fn surviving(violations: &[Violation]) -> Vec<(&str, usize)> {
    violations
        .iter()
        .map(|v| (v.check.as_str(), v.location.line))
        .collect()
}

#[test]
fn wildcard_region_drops_everything_between_off_and_on() {
    let comments = spans(&[(" OFF-ALL", 5), (" ON-ALL", 10)]);
    let kept = apply_suppression_filter(
        vec![
            violation("RuleX", 4),
            violation("RuleX", 7),
            violation("RuleY", 7),
            violation("RuleY", 12),
        ],
        &comments,
        r"OFF-(\w+)",
        r"ON-(\w+)",
    )
    .unwrap();
    assert_eq!(surviving(&kept), vec![("RuleX", 4), ("RuleY", 12)]);
}

#[test]
fn unclosed_keyed_region_runs_to_end_of_file() {
    let comments = spans(&[(" OFF: RuleX", 3)]);
    let kept = apply_suppression_filter(
        vec![violation("RuleX", 49), violation("RuleY", 49)],
        &comments,
        r"OFF: (\w+)",
        r"ON: (\w+)",
    )
    .unwrap();
    assert_eq!(surviving(&kept), vec![("RuleY", 49)]);
}

#[test]
fn region_boundaries_are_inclusive() {
    let comments = spans(&[(" OFF: RuleX", 3), (" ON: RuleX", 6)]);
    let kept = apply_suppression_filter(
        (2..=7).map(|line| violation("RuleX", line)).collect(),
        &comments,
        r"OFF: (\w+)",
        r"ON: (\w+)",
    )
    .unwrap();
    assert_eq!(surviving(&kept), vec![("RuleX", 2), ("RuleX", 7)]);
}

#[test]
fn format_keys_match_by_pattern() {
    let comments = spans(&[(" OFF: Rule[XY]", 1)]);
    let kept = apply_suppression_filter(
        vec![violation("RuleX", 2), violation("RuleY", 2), violation("RuleZ", 2)],
        &comments,
        r"OFF: (\S+)",
        r"ON: (\S+)",
    )
    .unwrap();
    assert_eq!(surviving(&kept), vec![("RuleZ", 2)]);
}

#[test]
fn invalid_patterns_are_rejected() {
    assert!(apply_suppression_filter(Vec::new(), &[], "OFF(", "ON").is_err());
}

/// Reports every identifier.
struct Names;

impl Check for Names {
    fn name(&self) -> &'static str {
        "Names"
    }
    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[TokenKind::Ident]
    }
    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        Ok(())
    }
    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        reporter.log(node, "name", &[&node.text()]);
        Ok(())
    }
}

#[test]
fn walker_output_filters_against_the_file_comments() {
    let specs: Vec<NodeSpec> = (1..=6)
        .map(|line| NodeSpec::new(TokenKind::Ident, format!("n{line}"), line, 4))
        .collect();
    let mut file = SourceFile::new("Sample.java", SyntaxTree::from_specs(&specs)).with_comments(
        vec![
            CommentToken::block(" OFF: Names\n   still off ", 2, 10),
            CommentToken::single_line(" ON: Names", 5, 10),
        ],
    );

    let outcome = run_tree_walker(&mut file, vec![Box::new(Names)]).unwrap();
    let kept = apply_suppression_filter(
        outcome.violations,
        &file.comment_spans(),
        r"OFF: (\w+)",
        r"ON: (\w+)",
    )
    .unwrap();
    let lines: Vec<usize> = kept.iter().map(|v| v.location.line).collect();
    assert_eq!(lines, vec![1, 6]);
}
