//! Single-comment suppression of nearby lines.
//!
//! ```text
//! // tree-lint: allow(NestingDepth, EmptyBlock)
//! if (a) { if (b) { if (c) { if (d) {} } } }
//! ```

use super::{
    comment_lines, compile, compile_opt, default_check_format, expand_captures, KeyMatcher,
    Target, ViolationFilter,
};
use crate::comment::CommentSpan;
use crate::config::{ConfigError, NearbyCommentConfig};
use crate::types::Violation;

use regex::Regex;
use std::sync::LazyLock;

const DEFAULT_COMMENT_FORMAT: &str = r"tree-lint: allow\(([^)]*)\)";

#[allow(clippy::expect_used)]
static DEFAULT_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_COMMENT_FORMAT).expect("default comment format is valid"));

/// Drops violations on the line of a matching comment and the lines it
/// influences.
///
/// The expanded check key may list several checks separated by commas. A
/// positive `influence` covers that many lines after the comment, a negative
/// one that many lines before it.
#[derive(Debug, Clone)]
pub struct NearbyCommentFilter {
    comment: Regex,
    check_format: String,
    id_format: Option<String>,
    message: Option<Regex>,
    influence: i64,
    check_c_style: bool,
    check_cpp_style: bool,
}

#[derive(Debug)]
struct Allowance {
    targets: Vec<Target>,
    first_line: usize,
    last_line: usize,
}

impl NearbyCommentFilter {
    /// Creates a filter with the default comment format.
    #[must_use]
    pub fn new() -> Self {
        Self {
            comment: DEFAULT_COMMENT.clone(),
            check_format: "$1".to_string(),
            id_format: None,
            message: None,
            influence: 1,
            check_c_style: true,
            check_cpp_style: true,
        }
    }

    /// Creates a filter from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile.
    pub fn from_config(config: &NearbyCommentConfig) -> Result<Self, ConfigError> {
        let comment = compile(config.comment_format.as_deref().unwrap_or(DEFAULT_COMMENT_FORMAT))?;
        let check_format = config
            .check_format
            .clone()
            .unwrap_or_else(|| default_check_format(&comment).to_string());

        Ok(Self {
            comment,
            check_format,
            id_format: config.id_format.clone(),
            message: compile_opt(config.message_format.as_deref())?,
            influence: config.influence,
            check_c_style: config.check_c_style,
            check_cpp_style: config.check_cpp_style,
        })
    }

    /// Sets how many lines the comment covers.
    #[must_use]
    pub fn influence(mut self, lines: i64) -> Self {
        self.influence = lines;
        self
    }

    fn allowances(&self, comments: &[CommentSpan]) -> Vec<Allowance> {
        comment_lines(comments, self.check_c_style, self.check_cpp_style)
            .into_iter()
            .filter_map(|line| {
                let caps = self.comment.captures(line.text)?;
                let id = self
                    .id_format
                    .as_deref()
                    .map(|f| KeyMatcher::new(&expand_captures(&caps, f)));
                let targets = split_keys(&expand_captures(&caps, &self.check_format))
                    .map(|key| Target {
                        check: KeyMatcher::new(key),
                        id: id.clone(),
                    })
                    .collect::<Vec<_>>();
                if targets.is_empty() {
                    return None;
                }

                let reach = usize::try_from(self.influence.unsigned_abs()).unwrap_or(usize::MAX);
                let (first_line, last_line) = if self.influence >= 0 {
                    (line.line, line.line.saturating_add(reach))
                } else {
                    (line.line.saturating_sub(reach), line.line)
                };
                Some(Allowance {
                    targets,
                    first_line,
                    last_line,
                })
            })
            .collect()
    }
}

impl Default for NearbyCommentFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn split_keys(keys: &str) -> impl Iterator<Item = &str> {
    keys.split(',').map(str::trim).filter(|k| !k.is_empty())
}

impl ViolationFilter for NearbyCommentFilter {
    fn name(&self) -> &'static str {
        "nearby-comment"
    }

    fn filter(&self, violations: Vec<Violation>, comments: &[CommentSpan]) -> Vec<Violation> {
        let allowances = self.allowances(comments);
        if allowances.is_empty() {
            return violations;
        }

        violations
            .into_iter()
            .filter(|v| {
                let line = v.location.line;
                !allowances.iter().any(|a| {
                    (a.first_line..=a.last_line).contains(&line)
                        && a.targets
                            .iter()
                            .any(|t| t.applies_to(v, self.message.as_ref()))
                })
            })
            .collect()
    }
}
