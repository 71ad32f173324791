//! Recursive descent parser for query patterns.
//!
//! Unlike the ZenScript parser this one does not recover: compilation is all or nothing,
//! so the first problem is recorded as a diagnostic and parsing stops.

use rowan::{TextRange, TextSize};

use super::ast::{Item, ItemKind, Name, NodeKind, Pattern, Predicate, PredicateArg};
use super::lexer::{Token, TokenKind, lex, token_text, unescape};
use super::quantifier::Repeat;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Maximum nesting of parentheses and brackets in a pattern.
const MAX_DEPTH: u32 = 256;

/// Marker for a reported error; the diagnostic holds the details.
#[derive(Debug)]
pub(crate) struct Failed;

type PResult<T> = Result<T, Failed>;

/// Where an item appears; decides which item forms are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    TopLevel,
    Children,
    Alternation,
}

pub(crate) struct QueryParser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    depth: u32,
    diagnostics: Diagnostics,
    /// Predicates seen since the current top-level pattern started.
    predicates: Vec<Predicate>,
}

pub(crate) struct ParsedQuery {
    pub patterns: Vec<Pattern>,
    pub diagnostics: Diagnostics,
}

impl<'src> QueryParser<'src> {
    pub fn new(source: &'src str) -> Self {
        let tokens = lex(source)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Self {
            source,
            tokens,
            pos: 0,
            depth: 0,
            diagnostics: Diagnostics::new(),
            predicates: Vec::new(),
        }
    }

    pub fn parse(mut self) -> ParsedQuery {
        let mut patterns = Vec::new();
        while !self.eof() {
            match self.parse_pattern() {
                Ok(pattern) => patterns.push(pattern),
                Err(Failed) => break,
            }
        }
        ParsedQuery {
            patterns,
            diagnostics: self.diagnostics,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn nth(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    fn current_span(&self) -> TextRange {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => {
                let end = TextSize::from(self.source.len() as u32);
                TextRange::empty(end)
            }
        }
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn name(&mut self) -> Name {
        let token = self.bump();
        Name {
            text: token_text(self.source, &token).to_string(),
            span: token.span,
        }
    }

    fn error(&mut self, kind: DiagnosticKind, range: TextRange) -> Failed {
        self.diagnostics.report(kind, range).emit();
        Failed
    }

    fn error_msg(&mut self, kind: DiagnosticKind, range: TextRange, msg: impl Into<String>) -> Failed {
        self.diagnostics.report(kind, range).message(msg).emit();
        Failed
    }

    fn expect(&mut self, kind: TokenKind, open: Option<(DiagnosticKind, TextRange)>) -> PResult<Token> {
        if self.at(kind) {
            return Ok(self.bump());
        }
        let span = self.current_span();
        let mut report = match open {
            Some((unclosed, _)) if self.eof() => self.diagnostics.report(unclosed, span),
            _ => self
                .diagnostics
                .report(DiagnosticKind::ExpectedToken, span)
                .message(kind.describe()),
        };
        if let Some((_, opener)) = open {
            report = report.related_to("opened here", opener);
        }
        report.emit();
        Err(Failed)
    }

    fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let span = self.current_span();
            return Err(self.error(DiagnosticKind::NestingTooDeep, span));
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn parse_pattern(&mut self) -> PResult<Pattern> {
        self.predicates.clear();
        if self.at(TokenKind::ParenOpen) && self.nth(1) == Some(TokenKind::Predicate) {
            let span = self.current_span();
            return Err(self.error_msg(
                DiagnosticKind::UnexpectedToken,
                span,
                "predicates must be written inside a pattern",
            ));
        }
        let item = self.parse_item(Context::TopLevel)?;
        Ok(Pattern {
            item,
            predicates: std::mem::take(&mut self.predicates),
        })
    }

    /// One item with its field prefix, quantifier and captures.
    fn parse_item(&mut self, context: Context) -> PResult<Item> {
        let start = self.current_span().start();

        let field = if self.at(TokenKind::Id) && self.nth(1) == Some(TokenKind::Colon) {
            let name = self.name();
            self.bump();
            if context == Context::TopLevel {
                return Err(self.error_msg(
                    DiagnosticKind::UnexpectedToken,
                    name.span,
                    "a field needs a parent node",
                ));
            }
            Some(name)
        } else {
            None
        };

        let mut item = self.parse_atom(context)?;
        if let Some(field) = field {
            if matches!(item.kind, ItemKind::Anchor | ItemKind::NegatedField(_)) {
                return Err(self.error(DiagnosticKind::ExpectedExpression, item.span));
            }
            item.field = Some(field);
        }

        if matches!(item.kind, ItemKind::Anchor | ItemKind::NegatedField(_)) {
            return Ok(item);
        }

        item.repeat = match self.current() {
            Some(TokenKind::Question) => Repeat::Optional,
            Some(TokenKind::Star) => Repeat::ZeroOrMore,
            Some(TokenKind::Plus) => Repeat::OneOrMore,
            _ => Repeat::One,
        };
        if item.repeat != Repeat::One {
            self.bump();
        }

        loop {
            match self.current() {
                Some(TokenKind::Capture) => {
                    let mut name = self.name();
                    name.text.remove(0);
                    item.captures.push(name);
                }
                Some(TokenKind::At) => {
                    let span = self.current_span();
                    return Err(self.error(DiagnosticKind::ExpectedCaptureName, span));
                }
                _ => break,
            }
        }

        let end = self.tokens[self.pos - 1].span.end();
        item.span = TextRange::new(start, end.max(start));
        Ok(item)
    }

    fn parse_atom(&mut self, context: Context) -> PResult<Item> {
        let span = self.current_span();
        let Some(kind) = self.current() else {
            return Err(self.error(DiagnosticKind::ExpectedExpression, span));
        };

        match kind {
            TokenKind::ParenOpen => {
                let opens_group = matches!(
                    self.nth(1),
                    Some(TokenKind::ParenOpen | TokenKind::BracketOpen | TokenKind::Str)
                );
                if opens_group {
                    self.parse_group()
                } else {
                    self.parse_node()
                }
            }
            TokenKind::BracketOpen => self.parse_alternation(),
            TokenKind::Str => {
                let token = self.bump();
                let text = unescape(token_text(self.source, &token));
                Ok(Item::new(
                    ItemKind::Anonymous(Name {
                        text,
                        span: token.span,
                    }),
                    token.span,
                ))
            }
            TokenKind::UnterminatedStr => {
                Err(self.error(DiagnosticKind::UnterminatedString, span))
            }
            TokenKind::Underscore => {
                self.bump();
                Ok(Item::new(ItemKind::Wildcard, span))
            }
            TokenKind::Dot if context == Context::Children => {
                self.bump();
                Ok(Item::new(ItemKind::Anchor, span))
            }
            TokenKind::Negation if context == Context::Children => {
                self.bump();
                if !self.at(TokenKind::Id) {
                    let span = self.current_span();
                    return Err(self.error(DiagnosticKind::ExpectedFieldName, span));
                }
                let name = self.name();
                let span = span.cover(name.span);
                Ok(Item::new(ItemKind::NegatedField(name), span))
            }
            TokenKind::Id | TokenKind::KwError | TokenKind::KwMissing => {
                let text = token_text(self.source, &self.tokens[self.pos]).to_string();
                Err(self.error_msg(DiagnosticKind::BareIdentifier, span, text))
            }
            TokenKind::Capture | TokenKind::At => {
                Err(self.error(DiagnosticKind::CaptureWithoutTarget, span))
            }
            TokenKind::Garbage => Err(self.error(DiagnosticKind::UnrecognizedCharacters, span)),
            _ => Err(self.error_msg(DiagnosticKind::UnexpectedToken, span, kind.describe())),
        }
    }

    /// `(kind child...)`, `(_)`, `(ERROR)`, `(MISSING [kind])`
    fn parse_node(&mut self) -> PResult<Item> {
        self.enter()?;
        let open = self.bump();
        let unclosed = Some((DiagnosticKind::UnclosedParen, open.span));

        let kind = match self.current() {
            Some(TokenKind::Id) => NodeKind::Named(self.name()),
            Some(TokenKind::Underscore) => {
                self.bump();
                NodeKind::AnyNamed
            }
            Some(TokenKind::KwError) => {
                self.bump();
                NodeKind::Error
            }
            Some(TokenKind::KwMissing) => {
                self.bump();
                match self.current() {
                    Some(TokenKind::Id) => NodeKind::Missing(Some((self.name(), true))),
                    Some(TokenKind::Str) => {
                        let token = self.bump();
                        let name = Name {
                            text: unescape(token_text(self.source, &token)),
                            span: token.span,
                        };
                        NodeKind::Missing(Some((name, false)))
                    }
                    _ => NodeKind::Missing(None),
                }
            }
            Some(TokenKind::ParenClose) => {
                let span = open.span.cover(self.current_span());
                return Err(self.error(DiagnosticKind::EmptyNodePattern, span));
            }
            _ => {
                let span = self.current_span();
                return Err(self.error_msg(DiagnosticKind::ExpectedToken, span, "a node kind"));
            }
        };

        let mut children = Vec::new();
        while !self.at(TokenKind::ParenClose) && !self.eof() {
            if let Some(child) = self.parse_child()? {
                children.push(child);
            }
        }
        let close = self.expect(TokenKind::ParenClose, unclosed)?;
        self.exit();

        let span = open.span.cover(close.span);
        if matches!(kind, NodeKind::Error | NodeKind::Missing(_)) && !children.is_empty() {
            return Err(self.error(DiagnosticKind::ErrorTakesNoArguments, span));
        }
        Ok(Item::new(ItemKind::Node { kind, children }, span))
    }

    /// A child item, or `None` after a predicate.
    fn parse_child(&mut self) -> PResult<Option<Item>> {
        if self.at(TokenKind::ParenOpen) && self.nth(1) == Some(TokenKind::Predicate) {
            self.parse_predicate()?;
            return Ok(None);
        }
        self.parse_item(Context::Children).map(Some)
    }

    /// `((a) (b) ...)`
    fn parse_group(&mut self) -> PResult<Item> {
        self.enter()?;
        let open = self.bump();
        let unclosed = Some((DiagnosticKind::UnclosedParen, open.span));

        let mut items = Vec::new();
        while !self.at(TokenKind::ParenClose) && !self.eof() {
            if let Some(item) = self.parse_child()? {
                items.push(item);
            }
        }
        let close = self.expect(TokenKind::ParenClose, unclosed)?;
        self.exit();
        Ok(Item::new(ItemKind::Group(items), open.span.cover(close.span)))
    }

    /// `[a b ...]`
    fn parse_alternation(&mut self) -> PResult<Item> {
        self.enter()?;
        let open = self.bump();
        let unclosed = Some((DiagnosticKind::UnclosedBracket, open.span));

        let mut items = Vec::new();
        while !self.at(TokenKind::BracketClose) && !self.eof() {
            items.push(self.parse_item(Context::Alternation)?);
        }
        let close = self.expect(TokenKind::BracketClose, unclosed)?;
        self.exit();

        let span = open.span.cover(close.span);
        if items.is_empty() {
            return Err(self.error(DiagnosticKind::ExpectedExpression, span));
        }
        Ok(Item::new(ItemKind::Alternation(items), span))
    }

    /// `(#name? arg...)`
    fn parse_predicate(&mut self) -> PResult<()> {
        let open = self.bump();
        let unclosed = Some((DiagnosticKind::UnclosedParen, open.span));
        let name_token = self.bump();
        let name = token_text(self.source, &name_token)[1..].to_string();

        let mut args = Vec::new();
        loop {
            match self.current() {
                Some(TokenKind::Capture) => {
                    let mut capture = self.name();
                    capture.text.remove(0);
                    args.push(PredicateArg::Capture(capture));
                }
                Some(TokenKind::Str) => {
                    let token = self.bump();
                    args.push(PredicateArg::String(unescape(token_text(self.source, &token))));
                }
                Some(TokenKind::Id | TokenKind::Underscore) => {
                    let name = self.name();
                    args.push(PredicateArg::String(name.text));
                }
                Some(TokenKind::At) => {
                    let span = self.current_span();
                    return Err(self.error(DiagnosticKind::ExpectedCaptureName, span));
                }
                _ => break,
            }
        }
        let close = self.expect(TokenKind::ParenClose, unclosed)?;

        self.predicates.push(Predicate {
            name,
            args,
            span: open.span.cover(close.span),
        });
        Ok(())
    }
}
