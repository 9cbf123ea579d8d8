//! # tree-lint-checks
//!
//! Built-in checks for tree-lint.
//!
//! ## Available Checks
//!
//! | Name | Tokens | Description |
//! |------|--------|-------------|
//! | `NestingDepth` | `LITERAL_IF`, `LITERAL_FOR`, ... | Limits nesting of control structures |
//! | `TodoComment` | `COMMENT_CONTENT` | Flags comments matching a to-do pattern |
//! | `EmptyBlock` | `SLIST`, `OBJBLOCK` | Flags blocks without statements |
//! | `MethodCount` | `CLASS_DEF`, `METHOD_DEF`, ... | Limits methods per type |
//!
//! ## Usage
//!
//! ```ignore
//! use tree_lint_core::Analyzer;
//! use tree_lint_checks::{builtin_registry, Preset};
//!
//! let analyzer = Analyzer::builder()
//!     .config(Preset::Recommended.config())
//!     .registry(builtin_registry())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod empty_block;
pub mod method_count;
pub mod nesting_depth;
mod presets;
pub mod todo_comment;

pub use empty_block::EmptyBlock;
pub use method_count::MethodCount;
pub use nesting_depth::NestingDepth;
pub use presets::{
    all_checks, builtin_registry, recommended_config, register_builtin_checks, strict_config,
    Preset,
};
pub use todo_comment::TodoComment;

/// Re-export core types for convenience.
pub use tree_lint_core::{Check, Severity, Violation};
