//! Lexer for ZenScript.
//!
//! Produces span-based tokens without storing text - text is sliced from source only when needed.
//! The token stream is lossless: whitespace, comments and unrecognized bytes all become tokens,
//! so spans are contiguous and cover the whole source.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive error characters into single `Garbage` tokens rather
//! than producing one error per character. Unterminated strings and block comments are
//! dedicated token kinds; the parser reports them and wraps them in `ERROR` nodes.
//!
//! ## Incremental lexing
//!
//! [`relex`] keeps the tokens of an old stream that the edit cannot have influenced, lexes
//! the edited region, and adopts the old tail as soon as a fresh token starts at a position
//! that maps onto an old token start past the edit.

use logos::Logos;
use rowan::{TextRange, TextSize};

use super::cst::SyntaxKind;
use crate::tree::EditWindow;

/// Bytes the lexer may inspect past the end of a token before deciding it ends there.
/// Covers a failed float exponent (`e+`) followed by one multi-byte character.
pub(crate) const LEXER_LOOKAHEAD: u32 = 8;

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: SyntaxKind, span: TextRange) -> Self {
        Self { kind, span }
    }

    /// Exclusive end of the bytes whose value decided this token's kind and extent.
    ///
    /// May run past the end of the input: appending text can extend the last token. An
    /// unterminated string was chosen only after the lexer failed to find a closing quote
    /// anywhere in the rest of the input.
    pub(crate) fn lookahead_end(&self, source_len: u32) -> u32 {
        match self.kind {
            SyntaxKind::UnterminatedString | SyntaxKind::UnterminatedComment => source_len + 1,
            _ => u32::from(self.span.end()) + LEXER_LOOKAHEAD,
        }
    }

    pub(crate) fn shifted(self, delta: i64) -> Token {
        let start = (i64::from(u32::from(self.span.start())) + delta) as u32;
        let end = (i64::from(u32::from(self.span.end())) + delta) as u32;
        Token::new(self.kind, TextRange::new(start.into(), end.into()))
    }
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

/// Lazily tokenizes `source` starting at a byte offset.
///
/// Post-processes the Logos output:
/// - Coalesces consecutive lexer errors into single `Garbage` tokens
/// - Splits a float ending in `.` that is followed by `.` back into an integer, so `0..10` is a range
pub struct Tokens<'src> {
    source: &'src str,
    base: usize,
    inner: logos::Lexer<'src, SyntaxKind>,
    error_start: Option<usize>,
    pending: Option<Token>,
}

impl<'src> Tokens<'src> {
    /// `offset` must lie on a char boundary.
    pub fn new(source: &'src str, offset: usize) -> Self {
        Self {
            source,
            base: offset,
            inner: SyntaxKind::lexer(&source[offset..]),
            error_start: None,
            pending: None,
        }
    }

    fn restart_at(&mut self, offset: usize) {
        self.base = offset;
        self.inner = SyntaxKind::lexer(&self.source[offset..]);
    }

    fn classify(&mut self, kind: SyntaxKind, start: usize, end: usize) -> Token {
        let bytes = self.source.as_bytes();
        let splits_range = kind == SyntaxKind::FloatLiteral
            && bytes[end - 1] == b'.'
            && bytes.get(end) == Some(&b'.');
        if splits_range {
            self.restart_at(end - 1);
            return Token::new(SyntaxKind::IntLiteral, text_range(start, end - 1));
        }
        Token::new(kind, text_range(start, end))
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        loop {
            match self.inner.next() {
                Some(Ok(kind)) => {
                    let span = self.inner.span();
                    let (start, end) = (self.base + span.start, self.base + span.end);
                    let token = self.classify(kind, start, end);
                    if let Some(error_start) = self.error_start.take() {
                        self.pending = Some(token);
                        return Some(Token::new(
                            SyntaxKind::Garbage,
                            text_range(error_start, start),
                        ));
                    }
                    return Some(token);
                }
                Some(Err(())) => {
                    if self.error_start.is_none() {
                        self.error_start = Some(self.base + self.inner.span().start);
                    }
                }
                None => {
                    let error_start = self.error_start.take()?;
                    return Some(Token::new(
                        SyntaxKind::Garbage,
                        text_range(error_start, self.source.len()),
                    ));
                }
            }
        }
    }
}

/// Tokenizes source into a vector of span-based tokens.
pub fn lex(source: &str) -> Vec<Token> {
    Tokens::new(source, 0).collect()
}

/// Lexes the single token starting at `offset`, or `None` at end of input.
pub fn next_token(source: &str, offset: usize) -> Option<Token> {
    Tokens::new(source, offset).next()
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// Re-lexes `source` after an edit, reusing the unaffected head and tail of `old`.
///
/// The result is identical to `lex(source)`.
pub(crate) fn relex(old: &[Token], old_len: u32, window: &EditWindow, source: &str) -> Vec<Token> {
    let keep = old
        .iter()
        .take_while(|t| t.lookahead_end(old_len) <= window.start)
        .count();
    let restart = keep
        .checked_sub(1)
        .map_or(0, |i| usize::from(old[i].span.end()));

    let mut tokens = Vec::with_capacity(old.len() + 8);
    tokens.extend_from_slice(&old[..keep]);

    let delta = window.delta();
    for token in Tokens::new(source, restart) {
        let start = u32::from(token.span.start());
        if start >= window.new_end {
            let old_start = (i64::from(start) - delta) as u32;
            if let Ok(j) = old.binary_search_by_key(&old_start, |t| u32::from(t.span.start())) {
                tracing::trace!(
                    target: "zenscript_syntax::lex",
                    head = keep,
                    relexed = tokens.len() - keep,
                    tail = old.len() - j,
                    "relex synchronized"
                );
                tokens.extend(old[j..].iter().map(|t| t.shifted(delta)));
                return tokens;
            }
        }
        tokens.push(token);
    }

    tracing::trace!(
        target: "zenscript_syntax::lex",
        head = keep,
        relexed = tokens.len() - keep,
        "relex ran to end of input"
    );
    tokens
}
