//! Entry point for parsing: [`Parser`], its options, and cancellation.
//!
//! A parse either completes with a [`Tree`] (possibly containing `ERROR` and `MISSING`
//! nodes) or is aborted by cancellation or timeout and yields no tree at all.
//!
//! # Example
//!
//! ```
//! use zenscript_syntax::Parser;
//!
//! let mut parser = Parser::new();
//! let tree = parser.parse("val x = 1 + 2;", None).unwrap();
//! assert_eq!(tree.root_node().kind(), "script_file");
//! ```

mod cancel;


pub use cancel::CancellationFlag;
pub(crate) use cancel::Interrupt;

use std::sync::Arc;

use crate::language::Language;
use crate::syntax::{self, PreviousParse};
use crate::tree::Tree;

/// Maximum nesting depth of statements, expressions and types before the rest of the
/// input is wrapped in an `ERROR` node.
pub const DEFAULT_RECURSION_LIMIT: u32 = 256;

/// Tokens consumed between two polls of the cancellation flag and the clock.
pub const DEFAULT_CHECK_INTERVAL: u32 = 1024;

/// Why a parse produced no tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("parse cancelled")]
    Cancelled,

    #[error("parse timed out")]
    TimedOut,
}

/// Parse knobs. Everything else about the grammar is fixed.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    cancellation_flag: Option<CancellationFlag>,
    timeout_micros: u64,
    recursion_limit: u32,
    check_interval: u32,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            cancellation_flag: None,
            timeout_micros: 0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation_flag(mut self, flag: CancellationFlag) -> Self {
        self.cancellation_flag = Some(flag);
        self
    }

    /// Zero disables the timeout.
    pub fn with_timeout_micros(mut self, timeout_micros: u64) -> Self {
        self.timeout_micros = timeout_micros;
        self
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_check_interval(mut self, interval: u32) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    pub fn check_interval(&self) -> u32 {
        self.check_interval
    }
}

/// Parses ZenScript source into [`Tree`]s.
///
/// A parser holds only configuration; one instance can parse any number of sources.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn language(&self) -> &'static Language {
        Language::zenscript()
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn set_cancellation_flag(&mut self, flag: Option<CancellationFlag>) {
        self.options.cancellation_flag = flag;
    }

    pub fn cancellation_flag(&self) -> Option<&CancellationFlag> {
        self.options.cancellation_flag.as_ref()
    }

    /// Zero disables the timeout.
    pub fn set_timeout_micros(&mut self, timeout_micros: u64) {
        self.options.timeout_micros = timeout_micros;
    }

    pub fn timeout_micros(&self) -> u64 {
        self.options.timeout_micros
    }

    /// Parses `text`.
    ///
    /// When `old_tree` has been [edited](Tree::edit) to describe how `text` differs from its
    /// source, unaffected parts of it are reused. The result is the same as a fresh parse
    /// either way; an unedited `old_tree` is ignored.
    pub fn parse(&mut self, text: &str, old_tree: Option<&Tree>) -> Result<Tree, ParseError> {
        let interrupt = Interrupt::new(
            self.options.cancellation_flag.clone(),
            self.options.timeout_micros,
            self.options.check_interval,
        );
        let source: Arc<str> = Arc::from(text);
        let limit = self.options.recursion_limit;

        let previous = old_tree.and_then(Tree::previous_parse);
        let output = match previous.filter(|p| p.applies_to(&source)) {
            Some(previous) => syntax::reparse(&previous, &source, interrupt, limit),
            None => syntax::parse(&source, interrupt, limit),
        };

        match output {
            Ok(output) => Ok(Tree::build(source, output)),
            Err(err) => {
                tracing::debug!(target: "zenscript_syntax::parse", %err, "parse aborted");
                Err(err)
            }
        }
    }
}
