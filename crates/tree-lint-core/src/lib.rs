//! # tree-lint-core
//!
//! Core engine for running independent checks over parsed syntax trees.
//!
//! This crate provides the foundational traits and types for building
//! tree-based linters. It includes:
//!
//! - [`SyntaxTree`] and the [`Node`] cursor for arena-backed syntax trees
//! - [`Check`] trait for rule modules driven by token-kind events
//! - [`TreeWalker`] for dispatching checks over one file
//! - [`resolve`] for `${name}` property chains in configuration
//! - [`SuppressionCommentFilter`] and [`NearbyCommentFilter`] for
//!   comment-driven suppression
//! - [`Analyzer`] for orchestrating runs over many files
//!
//! ## Example
//!
//! ```ignore
//! use tree_lint_core::{Analyzer, Config, SourceFile};
//!
//! let analyzer = Analyzer::builder()
//!     .config(Config::from_file("tree-lint.toml".as_ref())?)
//!     .registry(registry)
//!     .build()?;
//!
//! let result = analyzer.analyze(files)?;
//! println!("{}", result.format_report());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod check;
mod comment;
mod config;
mod context;
mod kind;
mod registry;
mod tree;
mod types;
mod walker;

pub mod filter;
pub mod properties;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError, FileReport};
pub use check::{
    render_template, Check, CheckBox, CheckError, CheckResult, Phase, Reporter, TokenInterest,
};
pub use comment::{CommentSpan, CommentStyle, CommentToken, InvalidCommentSpan};
pub use config::{
    AnalyzerConfig, CheckConfig, CheckOptions, Config, ConfigError, FilterConfig,
    NearbyCommentConfig, SuppressionCommentConfig,
};
pub use context::{FileContext, SourceDocument, SourceFile};
pub use filter::{
    apply_suppression_filter, FilterBox, NearbyCommentFilter, SuppressionCommentFilter,
    ViolationFilter,
};
pub use kind::{TokenKind, UnknownTokenKind};
pub use properties::{expand, resolve};
pub use registry::{CheckFactory, CheckRegistry};
pub use tree::{Node, NodeId, NodeSpec, Siblings, SyntaxNode, SyntaxTree, TreeError};
pub use types::{FileFailure, LintResult, Location, Severity, Violation};
pub use walker::{run_tree_walker, CheckExecutionError, CheckSettings, TreeWalker, WalkOutcome};
