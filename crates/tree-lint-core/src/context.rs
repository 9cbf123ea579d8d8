//! Per-file inputs and the context handed to checks.

use crate::comment::{CommentSpan, CommentToken};
use crate::tree::{NodeSpec, SyntaxTree};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file ready for analysis: its tree plus its comment inventory.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Path used in reports.
    pub path: PathBuf,
    /// Syntax tree produced by the parser.
    pub tree: SyntaxTree,
    /// Raw comments, in any order. May be empty when the tree already embeds
    /// comment nodes.
    pub comments: Vec<CommentToken>,
    comments_spliced: bool,
}

impl SourceFile {
    /// Creates a file from a tree without a separate comment list.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, tree: SyntaxTree) -> Self {
        Self {
            path: path.into(),
            tree,
            comments: Vec::new(),
            comments_spliced: false,
        }
    }

    /// Sets the raw comment inventory.
    #[must_use]
    pub fn with_comments(mut self, comments: Vec<CommentToken>) -> Self {
        self.comments = comments;
        self
    }

    /// Splices the comment inventory into the tree, at most once.
    pub fn splice_comments(&mut self) {
        if self.comments_spliced || self.comments.is_empty() {
            return;
        }
        self.tree.splice_comments(&self.comments);
        self.comments_spliced = true;
    }

    /// Returns true once comment nodes have been spliced in.
    #[must_use]
    pub fn has_spliced_comments(&self) -> bool {
        self.comments_spliced
    }

    /// Comment spans of this file, in source order.
    ///
    /// Uses the raw inventory when there is one, otherwise the comment nodes
    /// embedded in the tree.
    #[must_use]
    pub fn comment_spans(&self) -> Vec<CommentSpan> {
        let mut spans: Vec<CommentSpan> = if self.comments.is_empty() {
            self.tree.comment_spans()
        } else {
            self.comments.iter().map(CommentSpan::from_token).collect()
        };
        spans.sort_by_key(|s| (s.start_line(), s.start_column()));
        spans
    }
}

/// Serialized form of a [`SourceFile`], as written by parser front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Path of the original source file.
    pub path: PathBuf,
    /// Top-level nodes.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Raw comments.
    #[serde(default)]
    pub comments: Vec<CommentToken>,
}

impl SourceDocument {
    /// Parses a document from JSON.
    ///
    /// Nesting depth is unbounded: the parser grows its stack on demand
    /// instead of stopping at the default recursion limit.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed input or trailing characters.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let doc = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(doc)
    }
}

impl From<SourceDocument> for SourceFile {
    fn from(doc: SourceDocument) -> Self {
        Self::new(doc.path, SyntaxTree::from_specs(&doc.nodes)).with_comments(doc.comments)
    }
}

/// Context provided to checks in [`Check::begin_file`](crate::Check::begin_file).
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path of the file being checked.
    pub path: &'a Path,
    /// The file's tree, after comment splicing.
    pub tree: &'a SyntaxTree,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, tree: &'a SyntaxTree) -> Self {
        Self { path, tree }
    }
}
