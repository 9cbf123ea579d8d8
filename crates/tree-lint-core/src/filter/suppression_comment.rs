//! Off/on comment regions.
//!
//! ```text
//! // tree-lint:off NestingDepth
//! ...violations from NestingDepth are dropped here...
//! // tree-lint:on NestingDepth
//! ```

use super::{
    comment_lines, compile, compile_opt, default_check_format, expand_captures, KeyMatcher,
    Target, ViolationFilter,
};
use crate::comment::CommentSpan;
use crate::config::{ConfigError, SuppressionCommentConfig};
use crate::types::Violation;

use regex::Regex;
use tracing::debug;

const DEFAULT_OFF_FORMAT: &str = r"tree-lint:off(?:\s+([\w.*|-]+))?";
const DEFAULT_ON_FORMAT: &str = r"tree-lint:on(?:\s+([\w.*|-]+))?";

/// Drops violations inside regions opened by an "off" comment and closed by
/// a matching "on" comment.
///
/// Regions are line based and inclusive at both ends. A region never closed
/// runs to the end of the file; an "on" comment with no open region is
/// ignored. An "on" comment closes every open region whose key it matches.
#[derive(Debug, Clone)]
pub struct SuppressionCommentFilter {
    off: Regex,
    on: Regex,
    check_format: String,
    id_format: Option<String>,
    message: Option<Regex>,
    check_c_style: bool,
    check_cpp_style: bool,
}

#[derive(Debug)]
struct Region {
    target: Target,
    start_line: usize,
    end_line: Option<usize>,
}

impl Region {
    fn covers(&self, line: usize) -> bool {
        line >= self.start_line && self.end_line.map_or(true, |end| line <= end)
    }
}

impl SuppressionCommentFilter {
    /// Creates a filter from "off" and "on" patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile.
    pub fn new(off_format: &str, on_format: &str) -> Result<Self, ConfigError> {
        Self::from_config(&SuppressionCommentConfig {
            off_format: Some(off_format.to_string()),
            on_format: Some(on_format.to_string()),
            ..SuppressionCommentConfig::default()
        })
    }

    /// Creates a filter from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile.
    pub fn from_config(config: &SuppressionCommentConfig) -> Result<Self, ConfigError> {
        let off = compile(config.off_format.as_deref().unwrap_or(DEFAULT_OFF_FORMAT))?;
        let on = compile(config.on_format.as_deref().unwrap_or(DEFAULT_ON_FORMAT))?;
        let check_format = config
            .check_format
            .clone()
            .unwrap_or_else(|| default_check_format(&off).to_string());

        Ok(Self {
            off,
            on,
            check_format,
            id_format: config.id_format.clone(),
            message: compile_opt(config.message_format.as_deref())?,
            check_c_style: config.check_c_style,
            check_cpp_style: config.check_cpp_style,
        })
    }

    fn regions(&self, comments: &[CommentSpan]) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();

        for line in comment_lines(comments, self.check_c_style, self.check_cpp_style) {
            if let Some(caps) = self.off.captures(line.text) {
                let target = Target {
                    check: KeyMatcher::new(&expand_captures(&caps, &self.check_format)),
                    id: self
                        .id_format
                        .as_deref()
                        .map(|f| KeyMatcher::new(&expand_captures(&caps, f))),
                };
                debug!(
                    "Suppression region for {:?} opens at line {}",
                    target.check.raw(),
                    line.line
                );
                regions.push(Region {
                    target,
                    start_line: line.line,
                    end_line: None,
                });
            } else if let Some(caps) = self.on.captures(line.text) {
                let key = KeyMatcher::new(&expand_captures(&caps, &self.check_format));
                for region in regions.iter_mut().filter(|r| r.end_line.is_none()) {
                    if closes(&key, &region.target.check) {
                        region.end_line = Some(line.line);
                    }
                }
            }
        }

        regions
    }
}

/// A wildcard "on" closes everything. A wildcard region only closes on a
/// wildcard "on"; other regions close when either key matches the other.
fn closes(on: &KeyMatcher, open: &KeyMatcher) -> bool {
    if on.is_wildcard() {
        return true;
    }
    if open.is_wildcard() {
        return false;
    }
    open.matches(on.raw()) || on.matches(open.raw())
}

impl ViolationFilter for SuppressionCommentFilter {
    fn name(&self) -> &'static str {
        "suppression-comment"
    }

    fn filter(&self, violations: Vec<Violation>, comments: &[CommentSpan]) -> Vec<Violation> {
        let regions = self.regions(comments);
        if regions.is_empty() {
            return violations;
        }

        violations
            .into_iter()
            .filter(|v| {
                !regions.iter().any(|r| {
                    r.covers(v.location.line) && r.target.applies_to(v, self.message.as_ref())
                })
            })
            .collect()
    }
}

/// Drops violations inside off/on comment regions.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile.
pub fn apply_suppression_filter(
    violations: Vec<Violation>,
    comments: &[CommentSpan],
    off_format: &str,
    on_format: &str,
) -> Result<Vec<Violation>, ConfigError> {
    let filter = SuppressionCommentFilter::new(off_format, on_format)?;
    Ok(filter.filter(violations, comments))
}
