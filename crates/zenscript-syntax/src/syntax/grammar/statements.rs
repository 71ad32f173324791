use crate::diagnostics::DiagnosticKind;
use crate::syntax::core::{Parser, lexical_error};
use crate::syntax::cst::SyntaxKind;
use crate::syntax::cst::token_sets::{EXPR_FIRST, STATEMENT_RECOVERY};

impl Parser<'_> {
    pub(super) fn parse_statement(&mut self) {
        if self.should_stop() {
            // A statement was required here; the missing empty statement stands in for it.
            self.missing(SyntaxKind::Semicolon);
            return;
        }
        if !self.enter_recursion() {
            return;
        }

        match self.current_keyword() {
            Some(SyntaxKind::KwReturn) => self.parse_return_statement(),
            Some(kind @ (SyntaxKind::KwBreak | SyntaxKind::KwContinue)) => {
                self.parse_jump_statement(kind);
            }
            Some(SyntaxKind::KwIf) => self.parse_if_statement(),
            Some(SyntaxKind::KwFor) => self.parse_foreach_statement(),
            Some(SyntaxKind::KwWhile) => self.parse_while_statement(),
            Some(
                kind @ (SyntaxKind::KwVar
                | SyntaxKind::KwVal
                | SyntaxKind::KwStatic
                | SyntaxKind::KwGlobal),
            ) => self.parse_variable_declaration(kind),
            _ => self.parse_non_keyword_statement(),
        }

        self.exit_recursion();
    }

    fn parse_non_keyword_statement(&mut self) {
        let current = self.current();
        match current {
            SyntaxKind::BraceOpen => self.parse_block(SyntaxKind::BlockStatement),
            // Empty statement: a bare `;`.
            SyntaxKind::Semicolon => self.bump(),
            _ if EXPR_FIRST.contains(current) => self.parse_expression_statement(),
            _ => match lexical_error(current) {
                Some(kind) => self.error_and_bump(kind),
                None => self.error_recover(DiagnosticKind::UnexpectedToken, STATEMENT_RECOVERY),
            },
        }
    }

    /// `{ statements }`, also used for function bodies.
    pub(super) fn parse_block(&mut self, kind: SyntaxKind) {
        self.start_node(kind);

        if !self.at(SyntaxKind::BraceOpen) {
            self.missing(SyntaxKind::BraceOpen);
            self.missing(SyntaxKind::BraceClose);
            self.finish_node();
            return;
        }

        self.push_delimiter(DiagnosticKind::UnclosedBrace);
        self.bump();
        while !self.should_stop() && !self.at(SyntaxKind::BraceClose) {
            self.parse_statement();
        }
        self.close_delimiter(SyntaxKind::BraceClose);

        self.finish_node();
    }

    /// `return [value];`
    fn parse_return_statement(&mut self) {
        self.start_node(SyntaxKind::ReturnStatement);
        self.bump_remap(SyntaxKind::KwReturn);
        if !self.at(SyntaxKind::Semicolon) && EXPR_FIRST.contains(self.current()) {
            self.parse_expression();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// `break;` / `continue;`
    fn parse_jump_statement(&mut self, keyword: SyntaxKind) {
        let kind = match keyword {
            SyntaxKind::KwBreak => SyntaxKind::BreakStatement,
            _ => SyntaxKind::ContinueStatement,
        };
        self.start_node(kind);
        self.bump_remap(keyword);
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// `if condition statement [else statement]`
    fn parse_if_statement(&mut self) {
        self.start_node(SyntaxKind::IfStatement);
        self.bump_remap(SyntaxKind::KwIf);
        self.parse_expression();
        self.parse_statement();
        if self.eat(SyntaxKind::KwElse) {
            self.parse_statement();
        }
        self.finish_node();
    }

    /// `for a[, b] in iterable statement`
    fn parse_foreach_statement(&mut self) {
        self.start_node(SyntaxKind::ForeachStatement);
        self.bump_remap(SyntaxKind::KwFor);
        self.parse_simple_name();
        while self.eat(SyntaxKind::Comma) {
            self.parse_simple_name();
        }
        self.expect(SyntaxKind::KwIn);
        self.parse_expression();
        self.parse_statement();
        self.finish_node();
    }

    /// `while condition statement`
    fn parse_while_statement(&mut self) {
        self.start_node(SyntaxKind::WhileStatement);
        self.bump_remap(SyntaxKind::KwWhile);
        self.parse_expression();
        self.parse_statement();
        self.finish_node();
    }

    /// `var|val|static|global name [as type] [= value];`
    fn parse_variable_declaration(&mut self, keyword: SyntaxKind) {
        self.start_node(SyntaxKind::VariableDeclaration);
        self.bump_remap(keyword);
        self.parse_simple_name();
        if self.eat(SyntaxKind::KwAs) {
            self.parse_type();
        }
        if self.eat(SyntaxKind::Eq) {
            self.parse_expression();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn parse_expression_statement(&mut self) {
        self.start_node(SyntaxKind::ExpressionStatement);
        self.parse_expression();
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }
}
