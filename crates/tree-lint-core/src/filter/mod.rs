//! Violation filters driven by source comments.
//!
//! Filters run after the walker, once per file, over the file's comment
//! spans. They are pure: the same violations and comments always give the
//! same result, and no state is carried between files.

mod nearby_comment;
mod suppression_comment;

pub use nearby_comment::NearbyCommentFilter;
pub use suppression_comment::{apply_suppression_filter, SuppressionCommentFilter};

use crate::comment::{CommentSpan, CommentStyle};
use crate::config::{ConfigError, FilterConfig};
use crate::types::Violation;

use regex::{Captures, Regex};

/// A post-processing step that drops violations.
pub trait ViolationFilter: Send + Sync {
    /// Filter name used in logs (e.g., "suppression-comment").
    fn name(&self) -> &'static str;

    /// Returns the violations that survive, in their original order.
    fn filter(&self, violations: Vec<Violation>, comments: &[CommentSpan]) -> Vec<Violation>;
}

/// Type alias for boxed filter trait objects.
pub type FilterBox = Box<dyn ViolationFilter>;

impl FilterConfig {
    /// Compiles this configuration into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a pattern does not compile.
    pub fn build(&self) -> Result<FilterBox, ConfigError> {
        Ok(match self {
            Self::SuppressionComment(c) => Box::new(SuppressionCommentFilter::from_config(c)?),
            Self::NearbyComment(c) => Box::new(NearbyCommentFilter::from_config(c)?),
        })
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::invalid_pattern(pattern, e))
}

pub(crate) fn compile_opt(pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    pattern.map(compile).transpose()
}

/// Key template used when none is configured: the first capture group if the
/// comment pattern has one, otherwise every check.
pub(crate) fn default_check_format(pattern: &Regex) -> &'static str {
    if pattern.captures_len() > 1 {
        "$1"
    } else {
        ".*"
    }
}

/// Expands `$1`, `${name}` style references against a comment match.
pub(crate) fn expand_captures(caps: &Captures<'_>, template: &str) -> String {
    let mut out = String::new();
    caps.expand(template, &mut out);
    out
}

/// One physical comment line, with the line number it sits on.
pub(crate) struct CommentLine<'a> {
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) text: &'a str,
}

/// Lines of the comments of the enabled styles, in source order.
pub(crate) fn comment_lines(
    comments: &[CommentSpan],
    block: bool,
    single_line: bool,
) -> Vec<CommentLine<'_>> {
    let mut lines: Vec<CommentLine<'_>> = comments
        .iter()
        .filter(|c| match c.style() {
            CommentStyle::Block => block,
            CommentStyle::SingleLine => single_line,
        })
        .flat_map(|c| {
            c.text().iter().enumerate().map(move |(i, text)| CommentLine {
                line: c.start_line() + i,
                column: if i == 0 { c.start_column() } else { 0 },
                text,
            })
        })
        .collect();
    lines.sort_by_key(|l| (l.line, l.column));
    lines
}

/// Matches a check identity against a key taken from a comment.
///
/// `*`, `.*`, `all` and the empty key match every check. Any other key
/// matches by string equality or as an anchored regular expression.
#[derive(Debug, Clone)]
pub(crate) struct KeyMatcher {
    raw: String,
    wildcard: bool,
    pattern: Option<Regex>,
}

impl KeyMatcher {
    pub(crate) fn new(key: &str) -> Self {
        let raw = key.trim().to_string();
        let wildcard = matches!(raw.as_str(), "" | "*" | ".*") || raw.eq_ignore_ascii_case("all");
        let pattern = if wildcard {
            None
        } else {
            Regex::new(&format!("^(?:{raw})$")).ok()
        };
        Self {
            raw,
            wildcard,
            pattern,
        }
    }

    pub(crate) fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn matches(&self, identity: &str) -> bool {
        self.wildcard
            || self.raw == identity
            || self.pattern.as_ref().is_some_and(|p| p.is_match(identity))
    }

    /// Returns true if this key matches the check that reported `violation`,
    /// by name or by configured id.
    pub(crate) fn matches_violation(&self, violation: &Violation) -> bool {
        self.matches(&violation.check) || violation.id.as_deref().is_some_and(|id| self.matches(id))
    }

    /// Returns true if `violation` carries an id this key matches.
    pub(crate) fn matches_id(&self, violation: &Violation) -> bool {
        violation.id.as_deref().is_some_and(|id| self.matches(id))
    }
}

/// Check and id keys extracted from one comment, plus the optional message
/// pattern shared by the filter.
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub(crate) check: KeyMatcher,
    pub(crate) id: Option<KeyMatcher>,
}

impl Target {
    pub(crate) fn applies_to(&self, violation: &Violation, message: Option<&Regex>) -> bool {
        let identity = match &self.id {
            Some(id) => id.matches_id(violation),
            None => self.check.matches_violation(violation),
        };
        identity && message.map_or(true, |m| m.is_match(&violation.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Severity};

    fn violation(check: &str, id: Option<&str>) -> Violation {
        let v = Violation::new(
            check,
            Severity::Error,
            Location::new("A.java", 1, 1),
            "key",
            "message",
        );
        match id {
            Some(id) => v.with_id(id),
            None => v,
        }
    }

    #[test]
    fn wildcard_keys_match_everything() {
        for key in ["*", ".*", "all", "ALL", ""] {
            let matcher = KeyMatcher::new(key);
            assert!(matcher.is_wildcard(), "{key}");
            assert!(matcher.matches("Anything"));
        }
    }

    #[test]
    fn keys_match_literally_or_as_anchored_regex() {
        let literal = KeyMatcher::new("NestingDepth");
        assert!(literal.matches("NestingDepth"));
        assert!(!literal.matches("NestingDepthX"));

        let pattern = KeyMatcher::new("Nesting.*|EmptyBlock");
        assert!(pattern.matches("NestingDepth"));
        assert!(pattern.matches("EmptyBlock"));
        assert!(!pattern.matches("MethodCount"));

        let broken = KeyMatcher::new("Weird(");
        assert!(broken.matches("Weird("));
        assert!(!broken.matches("Weird"));
    }

    #[test]
    fn violation_identity_includes_configured_id() {
        let key = KeyMatcher::new("deep");
        assert!(key.matches_violation(&violation("NestingDepth", Some("deep"))));
        assert!(!key.matches_violation(&violation("NestingDepth", None)));
        assert!(!key.matches_id(&violation("deep", None)));
    }

    #[test]
    fn comment_lines_follow_source_order_and_styles() {
        let spans = vec![
            CommentSpan::from_token(&crate::comment::CommentToken::block("a\nb", 4, 2)),
            CommentSpan::from_token(&crate::comment::CommentToken::single_line(" x", 1, 0)),
        ];
        let all: Vec<_> = comment_lines(&spans, true, true)
            .iter()
            .map(|l| (l.line, l.text.to_string()))
            .collect();
        assert_eq!(
            all,
            vec![
                (1, "// x".to_string()),
                (4, "/*a".to_string()),
                (5, "b*/".to_string())
            ]
        );
        assert_eq!(comment_lines(&spans, false, true).len(), 1);
        assert_eq!(comment_lines(&spans, true, false).len(), 2);
    }

    #[test]
    fn filter_config_builds_or_rejects_patterns() {
        let good = FilterConfig::SuppressionComment(crate::config::SuppressionCommentConfig {
            off_format: Some("OFF".to_string()),
            ..Default::default()
        });
        assert_eq!(good.build().unwrap().name(), "suppression-comment");

        let bad = FilterConfig::NearbyComment(crate::config::NearbyCommentConfig {
            comment_format: Some("allow(".to_string()),
            ..Default::default()
        });
        assert!(matches!(bad.build(), Err(ConfigError::InvalidPattern { .. })));
    }
}
