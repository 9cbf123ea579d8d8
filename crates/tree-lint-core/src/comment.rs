//! Comment inventory types.
//!
//! Comments reach the engine either as raw [`CommentToken`]s supplied next to
//! the tree, or as synthetic comment nodes already spliced into it. Both forms
//! reduce to [`CommentSpan`]s, which is what suppression filters consume.

use serde::{Deserialize, Serialize};

/// Delimiter style of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentStyle {
    /// `// ...` up to the end of the line.
    SingleLine,
    /// `/* ... */`, possibly spanning lines.
    Block,
}

/// A raw comment as produced by the lexer.
///
/// `text` holds the comment body without its delimiters. `line` is 1-based,
/// `column` is the 0-based character offset of the opening delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentToken {
    /// Delimiter style.
    pub style: CommentStyle,
    /// Body text without delimiters.
    #[serde(default)]
    pub text: String,
    /// Line of the opening delimiter (1-based).
    pub line: usize,
    /// Column of the opening delimiter (0-based).
    #[serde(default)]
    pub column: usize,
}

impl CommentToken {
    /// Creates a `//` comment token.
    #[must_use]
    pub fn single_line(text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            style: CommentStyle::SingleLine,
            text: text.into(),
            line,
            column,
        }
    }

    /// Creates a `/* */` comment token.
    #[must_use]
    pub fn block(text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            style: CommentStyle::Block,
            text: text.into(),
            line,
            column,
        }
    }
}

/// Rejected [`CommentSpan`] bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("comment span ends at {end_line}:{end_column} before it starts at {start_line}:{start_column}")]
pub struct InvalidCommentSpan {
    /// Requested start line.
    pub start_line: usize,
    /// Requested start column.
    pub start_column: usize,
    /// Requested end line.
    pub end_line: usize,
    /// Requested end column.
    pub end_column: usize,
}

/// Source extent and text of one comment.
///
/// `text` has one entry per physical line, delimiters included. The end
/// column is inclusive: it is the column of the comment's last character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSpan {
    text: Vec<String>,
    start_line: usize,
    start_column: usize,
    end_line: usize,
    end_column: usize,
}

impl CommentSpan {
    /// Creates a span with explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCommentSpan`] if the end precedes the start.
    pub fn new(
        text: Vec<String>,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Result<Self, InvalidCommentSpan> {
        if (end_line, end_column) < (start_line, start_column) {
            return Err(InvalidCommentSpan {
                start_line,
                start_column,
                end_line,
                end_column,
            });
        }
        Ok(Self {
            text,
            start_line,
            start_column,
            end_line,
            end_column,
        })
    }

    /// Derives the span covered by a raw comment token.
    #[must_use]
    pub fn from_token(token: &CommentToken) -> Self {
        match token.style {
            CommentStyle::SingleLine => Self {
                text: vec![format!("//{}", token.text)],
                start_line: token.line,
                start_column: token.column,
                end_line: token.line,
                end_column: token.column + 1 + token.text.chars().count(),
            },
            CommentStyle::Block => {
                let mut text: Vec<String> = split_lines(&token.text)
                    .into_iter()
                    .map(String::from)
                    .collect();
                if let Some(first) = text.first_mut() {
                    first.insert_str(0, "/*");
                }
                if let Some(last) = text.last_mut() {
                    last.push_str("*/");
                }
                let (end_line, close_column) =
                    position_after(&token.text, token.line, token.column + 2);
                Self {
                    text,
                    start_line: token.line,
                    start_column: token.column,
                    end_line,
                    end_column: close_column + 1,
                }
            }
        }
    }

    /// Comment text, one entry per physical line.
    #[must_use]
    pub fn text(&self) -> &[String] {
        &self.text
    }

    /// First line (1-based).
    #[must_use]
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    /// Column of the opening delimiter (0-based).
    #[must_use]
    pub fn start_column(&self) -> usize {
        self.start_column
    }

    /// Last line (1-based).
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.end_line
    }

    /// Column of the last character (0-based, inclusive).
    #[must_use]
    pub fn end_column(&self) -> usize {
        self.end_column
    }

    /// Style inferred from the opening delimiter.
    #[must_use]
    pub fn style(&self) -> CommentStyle {
        match self.text.first() {
            Some(first) if first.starts_with("//") => CommentStyle::SingleLine,
            _ => CommentStyle::Block,
        }
    }

    /// Returns true if this comment overlaps the given source rectangle.
    ///
    /// Positions are compared in reading order, bounds inclusive on both
    /// sides, so a span always intersects its own bounds.
    #[must_use]
    pub fn intersects(
        &self,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> bool {
        (self.end_line, self.end_column) >= (start_line, start_column)
            && (end_line, end_column) >= (self.start_line, self.start_column)
    }
}

/// Position reached after `text` when it starts at `line`/`column`.
///
/// `\n`, `\r` and `\r\n` each count as exactly one line break.
pub(crate) fn position_after(text: &str, line: usize, column: usize) -> (usize, usize) {
    let mut line = line;
    let mut column = column;
    let mut pending_cr = false;

    for c in text.chars() {
        if c == '\n' {
            pending_cr = false;
            line += 1;
            column = 0;
            continue;
        }
        if pending_cr {
            pending_cr = false;
            line += 1;
            column = 0;
        }
        if c == '\r' {
            pending_cr = true;
        } else {
            column += 1;
        }
    }
    if pending_cr {
        line += 1;
        column = 0;
    }

    (line, column)
}

/// Splits on `\n`, `\r` and `\r\n` alike. Always yields at least one entry.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&text[start..]);

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_after_single_line() {
        assert_eq!(position_after("abc", 3, 4), (3, 7));
        assert_eq!(position_after("", 3, 4), (3, 4));
    }

    #[test]
    fn position_after_treats_crlf_as_one_break() {
        assert_eq!(position_after("a\r\nbc", 1, 2), (2, 2));
        assert_eq!(position_after("a\nbc", 1, 2), (2, 2));
        assert_eq!(position_after("a\rbc", 1, 2), (2, 2));
    }

    #[test]
    fn position_after_trailing_breaks() {
        assert_eq!(position_after("a\r", 1, 0), (2, 0));
        assert_eq!(position_after("a\r\n", 1, 0), (2, 0));
        assert_eq!(position_after("\r\r\n\n", 1, 0), (4, 0));
    }

    #[test]
    fn split_lines_mixed_breaks() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("x\n"), vec!["x", ""]);
    }

    #[test]
    fn single_line_span() {
        let span = CommentSpan::from_token(&CommentToken::single_line(" OFF", 5, 4));
        assert_eq!(span.text(), ["// OFF"]);
        assert_eq!((span.start_line(), span.start_column()), (5, 4));
        // "// OFF" occupies columns 4..=9
        assert_eq!((span.end_line(), span.end_column()), (5, 9));
    }

    #[test]
    fn block_span_on_one_line() {
        let span = CommentSpan::from_token(&CommentToken::block("ab", 1, 0));
        assert_eq!(span.text(), ["/*ab*/"]);
        assert_eq!((span.end_line(), span.end_column()), (1, 5));
    }

    #[test]
    fn block_span_over_lines() {
        let span = CommentSpan::from_token(&CommentToken::block(" one\r\n two ", 2, 8));
        assert_eq!(span.text(), ["/* one", " two */"]);
        assert_eq!((span.start_line(), span.start_column()), (2, 8));
        assert_eq!((span.end_line(), span.end_column()), (3, 6));
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        assert!(CommentSpan::new(vec![], 3, 0, 2, 9).is_err());
        assert!(CommentSpan::new(vec![], 3, 5, 3, 4).is_err());
        assert!(CommentSpan::new(vec![], 3, 5, 3, 5).is_ok());
    }

    #[test]
    fn intersects_own_bounds() {
        let span = CommentSpan::from_token(&CommentToken::block("x\ny", 4, 2));
        assert!(span.intersects(
            span.start_line(),
            span.start_column(),
            span.end_line(),
            span.end_column()
        ));
    }

    #[test]
    fn intersects_rectangles() {
        // occupies 10:4 ..= 10:9
        let span = CommentSpan::from_token(&CommentToken::single_line(" abc", 10, 4));
        assert!(span.intersects(10, 9, 12, 0));
        assert!(span.intersects(1, 0, 10, 4));
        assert!(span.intersects(10, 5, 10, 6));
        assert!(!span.intersects(10, 10, 11, 0));
        assert!(!span.intersects(9, 0, 10, 3));
    }
}
