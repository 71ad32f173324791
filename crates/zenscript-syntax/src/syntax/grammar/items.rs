use rowan::TextSize;

use crate::diagnostics::DiagnosticKind;
use crate::syntax::ast::DeclarationForm;
use crate::syntax::core::Parser;
use crate::syntax::cst::SyntaxKind;
use crate::syntax::cst::token_sets::{MEMBER_RECOVERY, OPERATOR_SYMBOLS};
use crate::syntax::reuse::{ItemMeta, Phase};

/// How many tokens the declaration/expression decision may look at.
const DECLARATION_SCAN_LIMIT: usize = 1024;

impl Parser<'_> {
    /// `script_file`: imports, then declarations and statements.
    ///
    /// Each top-level element is recorded as an item so a later re-parse can reuse it.
    pub(crate) fn parse_root(&mut self) {
        self.start_node(SyntaxKind::ScriptFile);

        loop {
            self.skip_trivia_to_buffer();
            if self.should_stop() {
                break;
            }

            let start = self.current_span().start();
            let dedupe_at_start = self.last_diagnostic_pos == Some(start);
            if let Some(index) = self.adoptable_item(start, dedupe_at_start) {
                self.resumed_at = Some(index);
                break;
            }
            self.parse_item(start, dedupe_at_start);
        }

        self.eat_trivia();
        self.finish_node();
    }

    fn adoptable_item(&self, start: TextSize, dedupe_at_start: bool) -> Option<usize> {
        let start = u32::from(start);
        if self.rewritten_end > start {
            return None;
        }
        self.suffix.as_ref()?.lookup(start, self.phase, dedupe_at_start)
    }

    fn parse_item(&mut self, start: TextSize, dedupe_at_start: bool) {
        let start = u32::from(start);
        let clean_start = self.rewritten_end <= start;
        let phase_before = self.phase;
        let first_diagnostic = self.diagnostics.len();
        self.lookahead_end.set(start);

        self.parse_top_level_element();

        // Trivia the item drained while looking ahead belongs to its node, so it counts.
        let end = u32::from(self.emitted_end()).max(start);
        self.items.push(ItemMeta {
            start,
            end,
            lookahead_end: self.lookahead_end.get().max(end),
            phase_before,
            phase_after: self.phase,
            clean_start,
            dedupe_at_start,
            last_diagnostic_after: self
                .last_diagnostic_pos
                .map(u32::from)
                .filter(|&pos| pos >= start),
            diagnostics: first_diagnostic..self.diagnostics.len(),
        });
    }

    fn parse_top_level_element(&mut self) {
        if self.at(SyntaxKind::KwImport) {
            if self.phase == Phase::Imports {
                self.parse_import_declaration();
            } else {
                self.start_node(SyntaxKind::Error);
                self.error(DiagnosticKind::ImportAfterDeclaration);
                self.parse_import_declaration();
                self.finish_node();
            }
            return;
        }

        self.phase = Phase::Body;
        match self.current_keyword() {
            Some(SyntaxKind::KwFunction) if self.next_is(SyntaxKind::Ident) => {
                self.parse_function_declaration();
            }
            Some(SyntaxKind::KwFunction)
                if self.next_is(SyntaxKind::ParenOpen)
                    && self.declaration_form() == DeclarationForm::Signature =>
            {
                self.parse_function_declaration();
            }
            Some(SyntaxKind::KwStatic | SyntaxKind::KwGlobal)
                if self.next_is(SyntaxKind::KwFunction) =>
            {
                self.parse_function_declaration();
            }
            Some(SyntaxKind::KwExpand) => self.parse_expand_function_declaration(),
            Some(SyntaxKind::KwZenClass) => self.parse_class_declaration(),
            _ if self.at(SyntaxKind::BraceClose) => {
                self.error_and_bump_msg(DiagnosticKind::UnexpectedToken, "unmatched `}`");
            }
            _ => self.parse_statement(),
        }
    }

    /// `import a.b.c [as name];`
    fn parse_import_declaration(&mut self) {
        self.start_node(SyntaxKind::ImportDeclaration);
        self.bump_remap(SyntaxKind::KwImport);
        self.parse_qualified_name();
        if self.eat(SyntaxKind::KwAs) {
            self.parse_simple_name();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// Decides between a declaration with a body and a declaration-only signature ending in `;`.
    ///
    /// Scans from the current token for the first `{` or `;` outside parentheses and brackets.
    pub(super) fn declaration_form(&self) -> DeclarationForm {
        let mut depth = 0u32;
        for token in self.scan_ahead().take(DECLARATION_SCAN_LIMIT) {
            match token.kind {
                SyntaxKind::ParenOpen | SyntaxKind::BracketOpen => depth += 1,
                SyntaxKind::ParenClose | SyntaxKind::BracketClose => {
                    depth = depth.saturating_sub(1);
                }
                SyntaxKind::BraceOpen if depth == 0 => return DeclarationForm::Body,
                SyntaxKind::Semicolon if depth == 0 => return DeclarationForm::Signature,
                SyntaxKind::BraceClose => return DeclarationForm::Body,
                _ => {}
            }
        }
        DeclarationForm::Body
    }

    /// `[static|global] function [name] (params) [as type] (body | ;)`
    ///
    /// Modifiers, a missing name, variadics and intersection return types are only valid
    /// in the declaration-only form.
    fn parse_function_declaration(&mut self) {
        let form = self.declaration_form();
        self.start_node(SyntaxKind::FunctionDeclaration);

        if let Some(modifier @ (SyntaxKind::KwStatic | SyntaxKind::KwGlobal)) = self.current_keyword() {
            match form {
                DeclarationForm::Signature => self.bump_remap(modifier),
                DeclarationForm::Body => self.error_and_bump(DiagnosticKind::ModifierNotAllowed),
            }
        }

        self.expect(SyntaxKind::KwFunction);
        if form == DeclarationForm::Body || self.current() == SyntaxKind::Ident {
            self.parse_simple_name();
        }
        self.parse_parameters(form == DeclarationForm::Signature);
        if self.eat(SyntaxKind::KwAs) {
            self.parse_declared_type(form);
        }
        self.parse_declaration_end(form);

        self.finish_node();
    }

    /// `$expand Type$name (params) [as type] body`
    fn parse_expand_function_declaration(&mut self) {
        self.start_node(SyntaxKind::ExpandFunctionDeclaration);
        self.bump_remap(SyntaxKind::KwExpand);

        // `Type$name` arrives as one identifier; a leading `$` stays part of the type name.
        self.split_dollar(1);
        self.parse_type();
        if !self.at(SyntaxKind::Dollar) {
            self.split_dollar(0);
        }
        self.expect(SyntaxKind::Dollar);
        self.parse_simple_name();

        self.parse_parameters(false);
        if self.eat(SyntaxKind::KwAs) {
            self.parse_type();
        }
        self.parse_block(SyntaxKind::FunctionBody);

        self.finish_node();
    }

    /// `zenClass Name [extends a.B, c.D] { members }`
    fn parse_class_declaration(&mut self) {
        self.start_node(SyntaxKind::ClassDeclaration);
        self.bump_remap(SyntaxKind::KwZenClass);

        if self.current() == SyntaxKind::Ident {
            self.start_node(SyntaxKind::ClassName);
            self.bump();
            self.finish_node();
        } else {
            self.missing_with(SyntaxKind::ClassName, DiagnosticKind::ExpectedName);
        }

        if self.eat(SyntaxKind::KwExtends) {
            self.parse_qualified_name();
            while self.eat(SyntaxKind::Comma) {
                self.parse_qualified_name();
            }
        }

        self.parse_class_body();
        self.finish_node();
    }

    fn parse_class_body(&mut self) {
        self.start_node(SyntaxKind::ClassBody);

        if !self.at(SyntaxKind::BraceOpen) {
            self.missing(SyntaxKind::BraceOpen);
            self.missing(SyntaxKind::BraceClose);
            self.finish_node();
            return;
        }

        self.push_delimiter(DiagnosticKind::UnclosedBrace);
        self.bump();
        while !self.should_stop() && !self.at(SyntaxKind::BraceClose) {
            self.parse_class_member();
        }
        self.close_delimiter(SyntaxKind::BraceClose);

        self.finish_node();
    }

    fn parse_class_member(&mut self) {
        match self.current_keyword() {
            Some(SyntaxKind::KwFunction) => self.parse_function_declaration(),
            Some(SyntaxKind::KwStatic | SyntaxKind::KwGlobal)
                if self.next_is(SyntaxKind::KwFunction) =>
            {
                self.parse_function_declaration();
            }
            Some(SyntaxKind::KwVar | SyntaxKind::KwVal | SyntaxKind::KwStatic) => {
                self.parse_field_declaration();
            }
            Some(SyntaxKind::KwZenConstructor) => self.parse_constructor_declaration(),
            Some(SyntaxKind::KwOperator) => self.parse_operator_function_declaration(),
            _ => self.error_recover(DiagnosticKind::InvalidClassMember, MEMBER_RECOVERY),
        }
    }

    /// `var|val|static name [as type] [= value];`
    fn parse_field_declaration(&mut self) {
        self.start_node(SyntaxKind::FieldDeclaration);
        if let Some(keyword) = self.current_keyword() {
            self.bump_remap(keyword);
        }
        self.parse_simple_name();
        if self.eat(SyntaxKind::KwAs) {
            self.parse_extend_type();
        }
        if self.eat(SyntaxKind::Eq) {
            self.parse_expression();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    /// `zenConstructor (params) body`, or `zenConstructor (params);` as a declaration only.
    fn parse_constructor_declaration(&mut self) {
        let form = self.declaration_form();
        self.start_node(SyntaxKind::ConstructorDeclaration);
        self.bump_remap(SyntaxKind::KwZenConstructor);
        self.parse_parameters(form == DeclarationForm::Signature);
        self.parse_declaration_end(form);
        self.finish_node();
    }

    /// `operator + (params) [as type];`
    fn parse_operator_function_declaration(&mut self) {
        self.start_node(SyntaxKind::OperatorFunctionDeclaration);
        self.bump_remap(SyntaxKind::KwOperator);
        self.parse_operator_symbol();
        self.parse_parameters(false);
        if self.eat(SyntaxKind::KwAs) {
            self.parse_extend_type();
        }
        self.expect(SyntaxKind::Semicolon);
        self.finish_node();
    }

    fn parse_operator_symbol(&mut self) {
        let current = self.current();
        match current {
            SyntaxKind::BracketOpen if self.next_is(SyntaxKind::BracketClose) => {
                self.bump();
                self.bump();
                self.eat(SyntaxKind::Eq);
            }
            SyntaxKind::Dot => {
                self.bump();
                self.eat(SyntaxKind::Eq);
            }
            _ if OPERATOR_SYMBOLS.contains(current) => self.bump(),
            _ => match self.current_keyword() {
                Some(kw @ (SyntaxKind::KwHas | SyntaxKind::KwForIn | SyntaxKind::KwAs)) => {
                    self.bump_remap(kw);
                }
                _ => self.error_msg(DiagnosticKind::ExpectedToken, "an operator symbol"),
            },
        }
    }

    /// `( [param {, param}] [, ... param] )`.
    ///
    /// The `parameter_list` node exists only when at least one parameter is written.
    pub(super) fn parse_parameters(&mut self, allow_variadic: bool) {
        if !self.at(SyntaxKind::ParenOpen) {
            self.missing(SyntaxKind::ParenOpen);
            self.missing(SyntaxKind::ParenClose);
            return;
        }
        self.push_delimiter(DiagnosticKind::UnclosedParen);
        self.bump();

        if !self.at(SyntaxKind::ParenClose) && !self.should_stop() {
            self.start_node(SyntaxKind::ParameterList);
            loop {
                if self.at(SyntaxKind::Ellipsis) {
                    if allow_variadic {
                        self.bump();
                    } else {
                        self.error_and_bump(DiagnosticKind::VariadicNotAllowed);
                    }
                    self.parse_parameter();
                    break;
                }
                self.parse_parameter();
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.finish_node();
        }

        self.close_delimiter(SyntaxKind::ParenClose);
    }

    /// `name [as type] [= default]`, spliced into the enclosing list.
    fn parse_parameter(&mut self) {
        self.start_node(SyntaxKind::Parameter);
        self.parse_simple_name();
        if self.eat(SyntaxKind::KwAs) {
            self.parse_type();
        }
        if self.eat(SyntaxKind::Eq) {
            self.parse_expression();
        }
        self.finish_node();
    }

    fn parse_declared_type(&mut self, form: DeclarationForm) {
        match form {
            DeclarationForm::Signature => self.parse_extend_type(),
            DeclarationForm::Body => self.parse_type(),
        }
    }

    fn parse_declaration_end(&mut self, form: DeclarationForm) {
        match form {
            DeclarationForm::Body => self.parse_block(SyntaxKind::FunctionBody),
            DeclarationForm::Signature => {
                self.expect(SyntaxKind::Semicolon);
            }
        }
    }

    /// `a.b.c`
    pub(super) fn parse_qualified_name(&mut self) {
        self.start_node(SyntaxKind::QualifiedName);
        self.parse_simple_name();
        while self.at(SyntaxKind::Dot) && self.next_is(SyntaxKind::Ident) {
            self.bump();
            self.parse_simple_name();
        }
        self.finish_node();
    }

    pub(super) fn parse_simple_name(&mut self) {
        if self.current() != SyntaxKind::Ident {
            self.missing_with(SyntaxKind::SimpleName, DiagnosticKind::ExpectedName);
            return;
        }
        self.start_node(SyntaxKind::SimpleName);
        self.bump();
        self.finish_node();
    }
}
