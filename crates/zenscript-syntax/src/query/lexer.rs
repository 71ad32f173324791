//! Lexer for query patterns.
//!
//! Produces span-based tokens without storing text. Consecutive unrecognized characters
//! are coalesced into one `Garbage` token.

use logos::Logos;
use rowan::TextRange;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TokenKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    #[token("!")]
    Negation,

    #[token("_")]
    Underscore,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    /// Anchor.
    #[token(".")]
    Dot,

    /// `@name`; names may contain dots and dashes, as in `@function.call`.
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_.\-]*")]
    Capture,

    /// `@` not followed by a name.
    #[token("@")]
    At,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    Str,

    #[regex(r#""(?:[^"\\\n]|\\.)*"#, allow_greedy = true)]
    UnterminatedStr,

    #[token("ERROR")]
    KwError,

    #[token("MISSING")]
    KwMissing,

    /// Node kinds and field names. Defined after keywords so they take precedence.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*")]
    Id,

    /// `#eq?`, `#match?`, `#set!`
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_\-]*[?!]?")]
    Predicate,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r";[^\n]*", allow_greedy = true)]
    LineComment,

    /// Coalesced unrecognized characters
    Garbage,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::LineComment)
    }

    /// How the token reads in "expected X" messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::ParenOpen => "`(`",
            TokenKind::ParenClose => "`)`",
            TokenKind::BracketOpen => "`[`",
            TokenKind::BracketClose => "`]`",
            TokenKind::Colon => "`:`",
            TokenKind::Negation => "`!`",
            TokenKind::Underscore => "`_`",
            TokenKind::Star => "`*`",
            TokenKind::Plus => "`+`",
            TokenKind::Question => "`?`",
            TokenKind::Dot => "`.`",
            TokenKind::Capture | TokenKind::At => "a capture",
            TokenKind::Str | TokenKind::UnterminatedStr => "a string",
            TokenKind::KwError => "`ERROR`",
            TokenKind::KwMissing => "`MISSING`",
            TokenKind::Id => "an identifier",
            TokenKind::Predicate => "a predicate",
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment => "a comment",
            TokenKind::Garbage => "unrecognized characters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new((start as u32).into(), (end as u32).into())
}

/// Tokenizes a pattern source, trivia included.
pub(crate) fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        span: text_range(start, lexer.span().start),
                    });
                }
                let span = lexer.span();
                tokens.push(Token {
                    kind,
                    span: text_range(span.start, span.end),
                });
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token {
                        kind: TokenKind::Garbage,
                        span: text_range(start, source.len()),
                    });
                }
                break;
            }
        }
    }

    tokens
}

#[inline]
pub(crate) fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// Decodes the escapes of a quoted string token's contents.
pub(crate) fn unescape(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .map(|s| s.strip_suffix('"').unwrap_or(s))
        .unwrap_or(quoted);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
