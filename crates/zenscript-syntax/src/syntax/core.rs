//! Parser state machine and low-level operations.

use std::cell::Cell;

use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};

use super::cst::{SyntaxKind, TokenSet};
use super::lexer::{LEXER_LOOKAHEAD, Token, Tokens, token_text};
use super::reuse::{ItemMeta, Phase, SuffixCandidates};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::{Interrupt, ParseError};

#[derive(Debug)]
pub(crate) struct ParseResult {
    pub green: GreenNode,
    pub diagnostics: Diagnostics,
    pub items: Vec<ItemMeta>,
    /// Index of the first old item adopted as-is, when the parse stopped early.
    pub resumed_at: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct OpenDelimiter {
    pub kind: DiagnosticKind,
    pub span: TextRange,
}

/// Trivia tokens are buffered and flushed when starting a new node.
pub(crate) struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) trivia_buffer: Vec<Token>,
    pub(super) builder: GreenNodeBuilder<'static>,
    pub(super) diagnostics: Diagnostics,
    pub(super) depth: u32,
    pub(super) last_diagnostic_pos: Option<TextSize>,
    pub(super) delimiter_stack: Vec<OpenDelimiter>,
    pub(super) debug_fuel: Cell<u32>,
    pub(super) phase: Phase,
    pub(super) items: Vec<ItemMeta>,
    pub(super) suffix: Option<SuffixCandidates>,
    pub(super) resumed_at: Option<usize>,
    /// Furthest byte any decision since the start of the current item depended on.
    pub(super) lookahead_end: Cell<u32>,
    /// End of the furthest token the parser re-tokenized itself.
    pub(super) rewritten_end: u32,
    /// End of the last token handed to the builder, trivia included.
    emitted_end: TextSize,
    recursion_limit: u32,
    interrupt: Interrupt,
    fatal_error: Option<ParseError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: Vec<Token>, interrupt: Interrupt) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            trivia_buffer: Vec::with_capacity(4),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            depth: 0,
            last_diagnostic_pos: None,
            delimiter_stack: Vec::with_capacity(8),
            debug_fuel: Cell::new(256),
            phase: Phase::Imports,
            items: Vec::new(),
            suffix: None,
            resumed_at: None,
            lookahead_end: Cell::new(0),
            rewritten_end: 0,
            emitted_end: TextSize::from(0),
            recursion_limit: crate::parser::DEFAULT_RECURSION_LIMIT,
            interrupt,
            fatal_error: None,
        }
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Starts at token `pos` in the given state instead of at the beginning of the source.
    pub fn resume(
        mut self,
        pos: usize,
        phase: Phase,
        last_diagnostic_pos: Option<TextSize>,
    ) -> Self {
        self.pos = pos;
        self.emitted_end = self
            .tokens
            .get(pos)
            .map_or_else(|| self.eof_offset(), |t| t.span.start());
        self.phase = phase;
        self.last_diagnostic_pos = last_diagnostic_pos;
        self
    }

    /// Old top-level items the parse may adopt once it reaches them in a compatible state.
    pub fn with_suffix(mut self, suffix: SuffixCandidates) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn parse(mut self) -> Result<ParseResult, ParseError> {
        self.interrupt.check()?;
        self.parse_root();
        self.finish()
    }

    fn finish(mut self) -> Result<ParseResult, ParseError> {
        self.drain_trivia();
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        Ok(ParseResult {
            green: self.builder.finish(),
            diagnostics: self.diagnostics,
            items: self.items,
            resumed_at: self.resumed_at,
        })
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub(super) fn source_len(&self) -> u32 {
        self.source.len() as u32
    }

    /// Raw kind of the current non-trivia token. Keywords are still `Ident` here.
    pub(super) fn current(&mut self) -> SyntaxKind {
        self.skip_trivia_to_buffer();
        self.nth_raw(0)
    }

    /// Keyword spelled by the current token, if it is an identifier.
    pub(super) fn current_keyword(&mut self) -> Option<SyntaxKind> {
        if self.current() != SyntaxKind::Ident {
            return None;
        }
        SyntaxKind::keyword(self.current_text())
    }

    pub(super) fn current_text(&mut self) -> &'src str {
        self.skip_trivia_to_buffer();
        match self.tokens.get(self.pos) {
            Some(token) => token_text(self.source, token),
            None => "",
        }
    }

    fn reset_debug_fuel(&self) {
        self.debug_fuel.set(256);
    }

    pub(super) fn note_lookahead(&self, end: u32) {
        if end > self.lookahead_end.get() {
            self.lookahead_end.set(end);
        }
    }

    pub(super) fn nth_raw(&self, lookahead: usize) -> SyntaxKind {
        self.ensure_progress();
        if self.has_fatal_error() {
            return SyntaxKind::Eof;
        }
        match self.tokens.get(self.pos + lookahead) {
            Some(token) => {
                self.note_lookahead(token.lookahead_end(self.source_len()));
                token.kind
            }
            None => {
                self.note_lookahead(self.source_len() + 1);
                SyntaxKind::Eof
            }
        }
    }

    pub(super) fn current_span(&mut self) -> TextRange {
        self.skip_trivia_to_buffer();
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source_len())
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&self) -> bool {
        self.eof() || self.has_fatal_error()
    }

    /// Keyword kinds match identifiers spelled like the keyword; other kinds match raw tokens.
    pub(super) fn at(&mut self, kind: SyntaxKind) -> bool {
        if kind.is_keyword() {
            self.current_keyword() == Some(kind)
        } else {
            self.current() == kind
        }
    }

    pub(super) fn at_any(&mut self, set: TokenSet) -> bool {
        if set.contains(self.current()) {
            return true;
        }
        self.current_keyword().is_some_and(|kw| set.contains(kw))
    }

    /// LL(k) lookahead past trivia, returning the raw token.
    fn peek_nth_token(&self, n: usize) -> Option<Token> {
        let mut count = 0;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            let token = self.tokens[pos];
            if !token.kind.is_trivia() {
                if count == n {
                    self.note_lookahead(token.lookahead_end(self.source_len()));
                    return Some(token);
                }
                count += 1;
            }
            pos += 1;
        }
        self.note_lookahead(self.source_len() + 1);
        None
    }

    /// Whether the `n`-th non-trivia token from here is `kind` (keywords resolved by text).
    pub(super) fn nth_is(&mut self, n: usize, kind: SyntaxKind) -> bool {
        self.skip_trivia_to_buffer();
        let Some(token) = self.peek_nth_token(n) else {
            return kind == SyntaxKind::Eof;
        };
        if kind.is_keyword() {
            token.kind == SyntaxKind::Ident
                && SyntaxKind::keyword(token_text(self.source, &token)) == Some(kind)
        } else {
            token.kind == kind
        }
    }

    pub(super) fn next_is(&mut self, kind: SyntaxKind) -> bool {
        self.nth_is(1, kind)
    }

    /// Non-trivia tokens from the current position on, noting how far the caller looked.
    pub(super) fn scan_ahead(&self) -> impl Iterator<Item = Token> + '_ {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .copied()
            .filter(|t| !t.kind.is_trivia())
            .inspect(|t| self.note_lookahead(t.lookahead_end(self.source_len())))
    }

    pub(super) fn skip_trivia_to_buffer(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.trivia_buffer.push(self.tokens[self.pos]);
            self.pos += 1;
        }
    }

    pub(super) fn drain_trivia(&mut self) {
        for token in self.trivia_buffer.drain(..) {
            let text = token_text(self.source, &token);
            self.builder.token(token.kind.into(), text);
            self.emitted_end = token.span.end();
        }
    }

    pub(super) fn eat_trivia(&mut self) {
        self.skip_trivia_to_buffer();
        self.drain_trivia();
    }

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.drain_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.drain_trivia();
        self.builder.checkpoint()
    }

    /// Emits the current token with its lexed kind.
    pub(super) fn bump(&mut self) {
        let kind = self.tokens[self.pos].kind;
        self.bump_remap(kind);
    }

    /// Emits the current token under `kind`; used for keywords spelled as identifiers.
    pub(super) fn bump_remap(&mut self, kind: SyntaxKind) {
        assert!(!self.eof(), "bump called at EOF");
        self.reset_debug_fuel();
        self.tick();

        self.drain_trivia();

        let token = self.tokens[self.pos];
        let text = token_text(self.source, &token);
        self.builder.token(kind.into(), text);
        self.emitted_end = token.span.end();
        self.pos += 1;
    }

    fn tick(&mut self) {
        if self.fatal_error.is_some() {
            return;
        }
        if let Err(err) = self.interrupt.tick() {
            self.fatal_error = Some(err);
        }
    }

    pub(super) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.bump_remap(kind);
        true
    }

    /// On mismatch: emit a diagnostic and a zero-width `MISSING` node, consume nothing.
    pub(super) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.missing(kind);
        false
    }

    /// Inserts a zero-width `MISSING` node right after the previous token.
    pub(super) fn missing(&mut self, kind: SyntaxKind) {
        let at = self.missing_position();
        self.report_at(
            DiagnosticKind::ExpectedToken,
            TextRange::empty(at),
            format!("`{}`", kind.name()),
        );
        self.missing_node(kind);
    }

    /// Like [`Self::missing`] for a named node, reported as `diagnostic`.
    pub(super) fn missing_with(&mut self, kind: SyntaxKind, diagnostic: DiagnosticKind) {
        let at = self.missing_position();
        if self.should_report(at) {
            let suppression = self.current_suppression_span();
            self.diagnostics
                .report(diagnostic, TextRange::empty(at))
                .suppression_range(suppression)
                .emit();
        }
        self.missing_node(kind);
    }

    /// The `MISSING` wrapper holds one empty token; its kind names what is missing.
    pub(super) fn missing_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(SyntaxKind::Missing.into());
        self.builder.token(kind.into(), "");
        self.builder.finish_node();
    }

    /// Where a `MISSING` node inserted now lands: after everything emitted so far.
    pub(super) fn missing_position(&self) -> TextSize {
        self.emitted_end
    }

    /// End of the text handed to the tree builder so far.
    pub(super) fn emitted_end(&self) -> TextSize {
        self.emitted_end
    }

    pub(super) fn current_suppression_span(&mut self) -> TextRange {
        self.delimiter_stack
            .last()
            .map(|d| TextRange::new(d.span.start(), self.eof_offset()))
            .unwrap_or_else(|| self.current_span())
    }

    fn should_report(&mut self, pos: TextSize) -> bool {
        if self.last_diagnostic_pos == Some(pos) {
            return false;
        }
        self.last_diagnostic_pos = Some(pos);
        true
    }

    pub(super) fn bump_as_error(&mut self) {
        if !self.eof() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    pub(super) fn report_at(&mut self, kind: DiagnosticKind, range: TextRange, message: impl Into<String>) {
        if !self.should_report(range.start()) {
            return;
        }
        let suppression = self.current_suppression_span();
        self.diagnostics
            .report(kind, range)
            .message(message)
            .suppression_range(suppression)
            .emit();
    }

    pub(super) fn error(&mut self, kind: DiagnosticKind) {
        let range = self.current_span();
        if !self.should_report(range.start()) {
            return;
        }
        let suppression = self.current_suppression_span();
        self.diagnostics
            .report(kind, range)
            .suppression_range(suppression)
            .emit();
    }

    pub(super) fn error_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let range = self.current_span();
        self.report_at(kind, range, message);
    }

    pub(super) fn error_and_bump(&mut self, kind: DiagnosticKind) {
        self.error(kind);
        self.bump_as_error();
    }

    pub(super) fn error_and_bump_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.error_msg(kind, message);
        self.bump_as_error();
    }

    /// Wraps tokens up to the next recovery point in an `ERROR` node.
    /// Consumes at least one token so the caller always makes progress.
    pub(super) fn error_recover(&mut self, kind: DiagnosticKind, recovery: TokenSet) {
        let kind = lexical_error(self.current()).unwrap_or(kind);
        if self.should_stop() {
            self.error(kind);
            return;
        }

        self.start_node(SyntaxKind::Error);
        self.error(kind);
        self.bump();
        // `at_any` skips trivia, so the stop check has to come after it.
        while !self.at_any(recovery) && !self.should_stop() {
            self.bump();
        }
        self.finish_node();
    }

    /// Returns false past the recursion limit, after moving the rest of the input into an `ERROR` node.
    pub(super) fn enter_recursion(&mut self) -> bool {
        if self.depth >= self.recursion_limit {
            self.error_nesting_too_deep();
            return false;
        }
        self.depth += 1;
        self.reset_debug_fuel();
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.reset_debug_fuel();
    }

    fn error_nesting_too_deep(&mut self) {
        self.error(DiagnosticKind::NestingTooDeep);
        if self.should_stop() {
            return;
        }
        self.start_node(SyntaxKind::Error);
        while !self.should_stop() {
            self.bump();
        }
        self.finish_node();
    }

    pub(super) fn push_delimiter(&mut self, kind: DiagnosticKind) {
        let span = self.current_span();
        self.delimiter_stack.push(OpenDelimiter { kind, span });
    }

    pub(super) fn pop_delimiter(&mut self) -> Option<OpenDelimiter> {
        self.delimiter_stack.pop()
    }

    /// Consumes the closer of the innermost delimiter, or reports it unclosed and inserts it as `MISSING`.
    pub(super) fn close_delimiter(&mut self, closer: SyntaxKind) {
        let open = self.pop_delimiter();
        if self.eat(closer) {
            return;
        }
        let Some(open) = open else {
            self.missing(closer);
            return;
        };
        let at = self.missing_position();
        let current = self.current_span();
        if self.should_report(at) {
            // Use full range for easier downstream error suppression
            let full_range = TextRange::new(open.span.start(), current.end().max(at));
            self.diagnostics
                .report(open.kind, full_range)
                .message(format!("expected `{}`", closer.name()))
                .related_to(format!("`{}` opened here", source_slice(self.source, open.span)), open.span)
                .emit();
        }
        self.missing_node(closer);
    }

    /// Re-tokenizes the input after a `<` as one opaque content token and the closing `>`.
    ///
    /// Returns false when no `>` follows; the content then runs to the end of the input.
    pub(super) fn rescan_bracket_content(&mut self) -> bool {
        let start = self
            .tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| usize::from(t.span.start()));
        let Some(offset) = self.source[start..].find('>') else {
            let mut replacement = Vec::with_capacity(1);
            if start < self.source.len() {
                replacement.push(Token::new(
                    SyntaxKind::BracketContent,
                    text_range(start, self.source.len()),
                ));
            }
            self.replace_tokens(replacement, self.tokens.len());
            self.rewritten_end = self.source_len();
            self.note_lookahead(self.source_len() + 1);
            return false;
        };

        let gt = start + offset;
        let mut replacement = Vec::with_capacity(2);
        if offset > 0 {
            replacement.push(Token::new(SyntaxKind::BracketContent, text_range(start, gt)));
        }
        replacement.push(Token::new(SyntaxKind::Gt, text_range(gt, gt + 1)));

        let (sync, resume) = self.relex_until_sync(gt + 1, &mut replacement);
        self.replace_tokens(replacement, resume);
        self.rewritten_end = self.rewritten_end.max(sync as u32);
        self.note_lookahead(sync as u32 + LEXER_LOOKAHEAD);
        true
    }

    /// Splits an identifier containing `$` (as in `Type$name`) at its first `$` after `skip` bytes.
    pub(super) fn split_dollar(&mut self, skip: usize) -> bool {
        self.skip_trivia_to_buffer();
        let Some(&token) = self.tokens.get(self.pos) else {
            return false;
        };
        if token.kind != SyntaxKind::Ident {
            return false;
        }
        let text = token_text(self.source, &token);
        let Some(offset) = text.get(skip..).and_then(|rest| rest.find('$')).map(|o| o + skip) else {
            return false;
        };

        let start = usize::from(token.span.start());
        let end = usize::from(token.span.end());
        let dollar = start + offset;
        let mut replacement = Vec::with_capacity(3);
        if offset > 0 {
            replacement.push(Token::new(SyntaxKind::Ident, text_range(start, dollar)));
        }
        replacement.push(Token::new(SyntaxKind::Dollar, text_range(dollar, dollar + 1)));
        if dollar + 1 < end {
            replacement.push(Token::new(SyntaxKind::Ident, text_range(dollar + 1, end)));
        }
        self.replace_tokens(replacement, self.pos + 1);
        self.rewritten_end = self.rewritten_end.max(end as u32);
        true
    }

    /// Lexes from `from` until a fresh token starts where an existing one does.
    /// Returns the synchronization offset and the index of the first existing token kept.
    fn relex_until_sync(&self, from: usize, out: &mut Vec<Token>) -> (usize, usize) {
        let rest = &self.tokens[self.pos..];
        for token in Tokens::new(self.source, from) {
            let start = token.span.start();
            if let Ok(i) = rest.binary_search_by_key(&start, |t| t.span.start()) {
                return (usize::from(start), self.pos + i);
            }
            out.push(token);
        }
        (self.source.len(), self.tokens.len())
    }

    /// Replaces `tokens[pos..resume]` with `replacement` and leaves `pos` at its first token.
    fn replace_tokens(&mut self, replacement: Vec<Token>, resume: usize) {
        let replaced = resume - self.pos;
        if replacement.len() <= replaced {
            // Tokens before `pos` are never read again, so the window shrinks in place.
            let new_pos = resume - replacement.len();
            self.tokens[new_pos..resume].copy_from_slice(&replacement);
            self.pos = new_pos;
        } else {
            self.tokens.splice(self.pos..resume, replacement);
        }
    }
}

/// Diagnostic for a token the lexer already knows to be malformed.
pub(super) fn lexical_error(kind: SyntaxKind) -> Option<DiagnosticKind> {
    match kind {
        SyntaxKind::Garbage => Some(DiagnosticKind::UnrecognizedCharacters),
        SyntaxKind::UnterminatedString => Some(DiagnosticKind::UnterminatedString),
        SyntaxKind::UnterminatedComment => Some(DiagnosticKind::UnterminatedComment),
        _ => None,
    }
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

fn source_slice(source: &str, range: TextRange) -> &str {
    &source[std::ops::Range::<usize>::from(range)]
}
