//! Grammar productions for ZenScript.
//!
//! This module implements all `parse_*` methods as an extension of `Parser`.
//! Keywords are contextual: the lexer emits every word as `Ident`, and a production
//! re-tags it as a keyword token only where the grammar expects that keyword.

mod expressions;
mod items;
mod statements;
mod types;

#[cfg(test)]
mod grammar_tests;
