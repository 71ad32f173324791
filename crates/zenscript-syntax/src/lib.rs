//! ZenScript incremental parser with a queryable concrete syntax tree.
//!
//! # Example
//!
//! ```
//! use zenscript_syntax::{InputEdit, Parser, Point};
//!
//! let mut parser = Parser::new();
//! let tree = parser.parse("val a = 1;", None).unwrap();
//! assert_eq!(
//!     tree.root_node().to_sexp(),
//!     "(script_file (variable_declaration name: (simple_name) value: (primary_expression (int_literal))))"
//! );
//!
//! // "1" becomes "10"
//! let edited = tree.edit(&InputEdit {
//!     start_byte: 9,
//!     old_end_byte: 9,
//!     new_end_byte: 10,
//!     start_point: Point::new(0, 9),
//!     old_end_point: Point::new(0, 9),
//!     new_end_point: Point::new(0, 10),
//! });
//! let new_tree = parser.parse("val a = 10;", Some(&edited)).unwrap();
//! assert!(!new_tree.root_node().has_error());
//! assert!(!edited.changed_ranges(&new_tree).is_empty());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod language;
mod parser;
pub mod query;
pub mod syntax;
pub mod tree;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use language::{Field, LANGUAGE_VERSION, Language, SymbolType};
pub use parser::{
    CancellationFlag, DEFAULT_CHECK_INTERVAL, DEFAULT_RECURSION_LIMIT, ParseError, Parser,
    ParserOptions,
};
pub use query::{
    CaptureQuantifier, Query, QueryCapture, QueryCursor, QueryError, QueryErrorKind, QueryMatch,
};
pub use tree::{InputEdit, Node, Point, Range, Tree, TreeCursor};

/// Failures surfaced by the library: aborted parses and rejected queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type Result<T> = std::result::Result<T, Error>;
