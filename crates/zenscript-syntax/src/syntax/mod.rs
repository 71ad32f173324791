//! Lexer and parser producing a lossless green tree.
//!
//! Architecture:
//! - `lexer.rs`: Logos-based tokenizer; every word is an `Ident`, keywords are contextual
//! - `cst.rs`: `SyntaxKind` enum, Rowan language tag and token sets
//! - `core.rs`: parser state machine (trivia buffering, delimiters, recovery, retokenizing)
//! - `grammar/`: recursive descent productions and the expression binding-power table
//! - `reuse.rs`: top-level item records that let a re-parse keep unchanged items
//! - `ast.rs`: typed wrappers over the green tree
//!
//! The green tree keeps every byte of the source, trivia and malformed input included.
//! The public node tree in [`crate::tree`] is derived from it.

pub mod ast;
mod core;
pub mod cst;
mod grammar;
mod invariants;
pub mod lexer;
pub(crate) mod reuse;

#[cfg(test)]
mod cst_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod reuse_tests;

pub use cst::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet, ZsLang};
pub use lexer::{Token, lex, token_text};

use rowan::GreenNode;

use crate::diagnostics::Diagnostics;
use crate::parser::{Interrupt, ParseError};
use crate::tree::EditWindow;
use self::core::Parser;
use self::lexer::Tokens;
use self::reuse::{ItemMeta, ReusePlan, SuffixCandidates, stitch_items, stitch_root};

/// Everything a tree keeps from the parse that built it.
#[derive(Debug)]
pub(crate) struct ParseOutput {
    pub green: GreenNode,
    /// Lexer output, before any retokenizing by the parser.
    pub tokens: Vec<Token>,
    pub items: Vec<ItemMeta>,
    pub diagnostics: Diagnostics,
}

/// An edited tree's parse state, and the edit that separates it from the new source.
#[derive(Debug)]
pub(crate) struct PreviousParse<'a> {
    pub green: &'a GreenNode,
    pub tokens: &'a [Token],
    pub items: &'a [ItemMeta],
    pub diagnostics: &'a Diagnostics,
    pub source_len: u32,
    pub window: EditWindow,
}

impl PreviousParse<'_> {
    /// Whether the recorded edit turns the old source length into the length of `source`.
    pub fn applies_to(&self, source: &str) -> bool {
        let expected = i64::from(self.source_len) + self.window.delta();
        expected == source.len() as i64 && self.window.new_end as usize <= source.len()
    }
}

pub(crate) fn parse(
    source: &str,
    mut interrupt: Interrupt,
    recursion_limit: u32,
) -> Result<ParseOutput, ParseError> {
    interrupt.check()?;
    let mut tokens = Vec::with_capacity(source.len() / 4);
    for token in Tokens::new(source, 0) {
        interrupt.tick()?;
        tokens.push(token);
    }
    tracing::debug!(
        target: "zenscript_syntax::lex",
        tokens = tokens.len(),
        bytes = source.len(),
        "lexed"
    );

    let result = Parser::new(source, tokens.clone(), interrupt)
        .with_recursion_limit(recursion_limit)
        .parse()?;
    tracing::debug!(
        target: "zenscript_syntax::parse",
        items = result.items.len(),
        diagnostics = result.diagnostics.len(),
        "parsed"
    );

    Ok(ParseOutput {
        green: result.green,
        tokens,
        items: result.items,
        diagnostics: result.diagnostics,
    })
}

/// Parses `source` reusing the items of `previous` that the edit cannot have affected.
///
/// Produces exactly what [`parse`] would.
pub(crate) fn reparse(
    previous: &PreviousParse<'_>,
    source: &str,
    interrupt: Interrupt,
    recursion_limit: u32,
) -> Result<ParseOutput, ParseError> {
    interrupt.check()?;
    let window = previous.window;
    let tokens = lexer::relex(previous.tokens, previous.source_len, &window, source);
    interrupt.check()?;

    let plan = ReusePlan::new(previous.items, &window);
    let resume_pos = tokens.partition_point(|t| u32::from(t.span.start()) < plan.prefix_end);
    let first_suffix = previous
        .items
        .partition_point(|item| item.start < window.old_end)
        .max(plan.prefix_items);
    let suffix = SuffixCandidates {
        items: previous.items[first_suffix..].to_vec(),
        window,
    };

    let result = Parser::new(source, tokens.clone(), interrupt)
        .with_recursion_limit(recursion_limit)
        .resume(resume_pos, plan.phase, plan.last_diagnostic_pos)
        .with_suffix(suffix)
        .parse()?;

    let adopted = result.resumed_at.map(|i| first_suffix + i);
    tracing::debug!(
        target: "zenscript_syntax::parse",
        kept_prefix = plan.prefix_items,
        reparsed = result.items.len(),
        adopted_suffix = adopted.map_or(0, |i| previous.items.len() - i),
        "reparsed"
    );

    let green = stitch_root(
        previous.green,
        plan.prefix_end,
        &result.green,
        adopted.map(|i| previous.items[i].start),
    );
    let (items, diagnostics) = stitch_items(
        previous.items,
        previous.diagnostics,
        &plan,
        result.items,
        result.diagnostics,
        adopted.map(|i| (i, &window)),
        (previous.source_len, source.len() as u32),
    );

    Ok(ParseOutput {
        green,
        tokens,
        items,
        diagnostics,
    })
}
