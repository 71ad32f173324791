//! Structural queries over syntax trees.
//!
//! A query is a list of s-expression patterns. Compiling one resolves every node kind,
//! field and capture name against the [`Language`]; running it with a [`QueryCursor`]
//! yields [`QueryMatch`]es in document order.
//!
//! # Example
//!
//! ```
//! use zenscript_syntax::{Language, Parser, Query, QueryCursor};
//!
//! let tree = Parser::new().parse("function f() {} function g() {}", None).unwrap();
//! let query = Query::new(Language::zenscript(), "(function_declaraton name: (_) @name)").unwrap();
//!
//! let mut cursor = QueryCursor::new();
//! let names: Vec<_> = cursor
//!     .matches(&query, tree.root_node())
//!     .map(|m| m.captures[0].node.text())
//!     .collect();
//! assert_eq!(names, ["f", "g"]);
//! ```

mod ast;
mod compile;
mod cursor;
mod lexer;
mod matcher;
mod parser;
mod predicate;
mod quantifier;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
mod cursor_tests;
#[cfg(test)]
mod parser_tests;

pub use cursor::{
    CaptureRecord, DEFAULT_MATCH_LIMIT, QueryCapture, QueryCaptures, QueryCursor, QueryMatch,
    QueryMatches,
};
pub use predicate::{PredicateStep, QueryPredicate, QueryPredicateArg};
pub use quantifier::CaptureQuantifier;

use indexmap::IndexSet;

use crate::language::{LANGUAGE_VERSION, Language};
use compile::{CompiledPattern, Compiler};
use parser::QueryParser;

/// What kind of problem stopped a query from compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum QueryErrorKind {
    Syntax,
    NodeType,
    Field,
    Capture,
    Structure,
    Language,
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            QueryErrorKind::Syntax => "syntax",
            QueryErrorKind::NodeType => "node type",
            QueryErrorKind::Field => "field",
            QueryErrorKind::Capture => "capture",
            QueryErrorKind::Structure => "structure",
            QueryErrorKind::Language => "language",
        })
    }
}

/// Compilation failure, located by byte offset into the query source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error at {row}:{column}: {message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub offset: usize,
    /// 0-based line of `offset`.
    pub row: usize,
    /// Byte column of `offset`.
    pub column: usize,
    pub message: String,
}

impl QueryError {
    pub(crate) fn new(kind: QueryErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            row: 0,
            column: 0,
            message: message.into(),
        }
    }

    fn locate(mut self, source: &str) -> Self {
        let before = &source[..self.offset.min(source.len())];
        self.row = before.matches('\n').count();
        self.column = before.len() - before.rfind('\n').map_or(0, |i| i + 1);
        self
    }
}

/// A compiled set of patterns.
#[derive(Debug, Clone)]
pub struct Query {
    patterns: Vec<CompiledPattern>,
    capture_names: IndexSet<String>,
    strings: IndexSet<String>,
    disabled_captures: Vec<bool>,
    disabled_patterns: Vec<bool>,
}

impl Query {
    /// Compiles `source`. Either every pattern compiles or none does.
    pub fn new(language: &Language, source: &str) -> Result<Query, QueryError> {
        Self::compile(language, source).map_err(|err| err.locate(source))
    }

    fn compile(language: &Language, source: &str) -> Result<Query, QueryError> {
        if language.version() != LANGUAGE_VERSION {
            return Err(QueryError::new(
                QueryErrorKind::Language,
                0,
                format!(
                    "language version {} is not supported (expected {LANGUAGE_VERSION})",
                    language.version()
                ),
            ));
        }

        let parsed = QueryParser::new(source).parse();
        if let Some(diagnostic) = parsed.diagnostics.first() {
            return Err(QueryError::new(
                QueryErrorKind::Syntax,
                u32::from(diagnostic.range().start()) as usize,
                diagnostic.message(),
            ));
        }

        let compiled = Compiler::new(language).compile(&parsed.patterns)?;
        tracing::debug!(
            target: "zenscript_syntax::query",
            patterns = compiled.patterns.len(),
            captures = compiled.capture_names.len(),
            "compiled query"
        );

        Ok(Query {
            disabled_captures: vec![false; compiled.capture_names.len()],
            disabled_patterns: vec![false; compiled.patterns.len()],
            patterns: compiled.patterns,
            capture_names: compiled.capture_names,
            strings: compiled.strings,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn capture_count(&self) -> usize {
        self.capture_names.len()
    }

    /// Capture names in order of first appearance; indices are capture ids.
    pub fn capture_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.capture_names.iter().map(String::as_str)
    }

    pub fn capture_name(&self, index: u32) -> Option<&str> {
        self.capture_names.get_index(index as usize).map(String::as_str)
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.capture_names.get_index_of(name).map(|i| i as u32)
    }

    /// How many nodes capture `capture` holds in one match of `pattern`.
    pub fn capture_quantifier(&self, pattern: usize, capture: u32) -> CaptureQuantifier {
        self.patterns
            .get(pattern)
            .and_then(|p| p.quantifiers.get(&capture).copied())
            .unwrap_or(CaptureQuantifier::Zero)
    }

    /// Quantifiers of every capture, indexed by capture id.
    pub fn capture_quantifiers(&self, pattern: usize) -> Vec<CaptureQuantifier> {
        (0..self.capture_count() as u32)
            .map(|capture| self.capture_quantifier(pattern, capture))
            .collect()
    }

    pub fn start_byte_for_pattern(&self, pattern: usize) -> Option<usize> {
        self.patterns.get(pattern).map(|p| p.start_byte as usize)
    }

    pub fn end_byte_for_pattern(&self, pattern: usize) -> Option<usize> {
        self.patterns.get(pattern).map(|p| p.end_byte as usize)
    }

    /// Raw predicate steps of `pattern`; each predicate ends with [`PredicateStep::Done`].
    pub fn predicates_for_pattern(&self, pattern: usize) -> &[PredicateStep] {
        self.patterns
            .get(pattern)
            .map_or(&[], |p| p.predicates.steps.as_slice())
    }

    /// Decoded predicates of `pattern`.
    pub fn general_predicates(&self, pattern: usize) -> &[QueryPredicate] {
        self.patterns
            .get(pattern)
            .map_or(&[], |p| p.predicates.decoded.as_slice())
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Text of a [`PredicateStep::String`] id.
    pub fn string_value(&self, id: u32) -> Option<&str> {
        self.strings.get_index(id as usize).map(String::as_str)
    }

    /// Stops reporting `name` in future matches. Unknown names are ignored.
    pub fn disable_capture(&mut self, name: &str) {
        if let Some(index) = self.capture_names.get_index_of(name) {
            self.disabled_captures[index] = true;
        }
    }

    /// Stops matching `pattern`. Out-of-range indices are ignored.
    pub fn disable_pattern(&mut self, pattern: usize) {
        if let Some(disabled) = self.disabled_patterns.get_mut(pattern) {
            *disabled = true;
        }
    }

    /// The pattern matches a single node rather than a run of siblings.
    pub fn is_pattern_rooted(&self, pattern: usize) -> bool {
        self.patterns.get(pattern).is_some_and(|p| p.rooted)
    }

    /// Matches of the pattern can involve nodes outside one subtree, so re-running it
    /// over a changed range alone may miss some.
    pub fn is_pattern_non_local(&self, pattern: usize) -> bool {
        self.patterns.get(pattern).is_some_and(|p| !p.rooted)
    }

    /// Whether reaching the step at `byte_offset` in the query source guarantees its
    /// pattern matches, because everything after it is optional.
    pub fn is_pattern_guaranteed_at_step(&self, byte_offset: usize) -> bool {
        self.patterns
            .iter()
            .flat_map(|p| p.steps.iter())
            .find(|(offset, _)| *offset as usize == byte_offset)
            .is_some_and(|(_, guaranteed)| *guaranteed)
    }

    pub(crate) fn enabled_patterns(&self) -> impl Iterator<Item = (usize, &CompiledPattern)> {
        self.patterns
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.disabled_patterns[*index])
    }

    pub(crate) fn is_capture_disabled(&self, id: u32) -> bool {
        self.disabled_captures.get(id as usize).copied().unwrap_or(false)
    }
}
