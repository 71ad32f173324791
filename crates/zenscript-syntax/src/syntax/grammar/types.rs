use crate::diagnostics::DiagnosticKind;
use crate::syntax::core::Parser;
use crate::syntax::cst::SyntaxKind;

impl Parser<'_> {
    pub(super) fn parse_type(&mut self) {
        self.parse_type_with(false);
    }

    /// A type, or an intersection `A & B` where declarations allow one.
    pub(super) fn parse_extend_type(&mut self) {
        self.parse_type_with(true);
    }

    fn parse_type_with(&mut self, allow_intersection: bool) {
        if !self.enter_recursion() {
            return;
        }

        let checkpoint = self.checkpoint();
        self.parse_postfix_type();
        if allow_intersection && self.at(SyntaxKind::Amp) {
            self.start_node_at(checkpoint, SyntaxKind::IntersectionType);
            while self.eat(SyntaxKind::Amp) {
                self.parse_postfix_type();
            }
            self.finish_node();
        }

        self.exit_recursion();
    }

    /// `T`, `T[]` (array) and `T[K]` (map), repeated.
    fn parse_postfix_type(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_type_atom();

        while self.at(SyntaxKind::BracketOpen) {
            if self.next_is(SyntaxKind::BracketClose) {
                self.start_node_at(checkpoint, SyntaxKind::ArrayType);
                self.bump();
                self.bump();
            } else {
                self.start_node_at(checkpoint, SyntaxKind::MapType);
                self.push_delimiter(DiagnosticKind::UnclosedBracket);
                self.bump();
                self.parse_type();
                self.close_delimiter(SyntaxKind::BracketClose);
            }
            self.finish_node();
        }
    }

    fn parse_type_atom(&mut self) {
        match self.current_keyword() {
            Some(primitive) if primitive.is_primitive_type() => {
                self.bump_remap(primitive);
                return;
            }
            Some(SyntaxKind::KwFunction) if self.next_is(SyntaxKind::ParenOpen) => {
                self.parse_function_type();
                return;
            }
            _ => {}
        }

        match self.current() {
            SyntaxKind::Ident => {
                self.start_node(SyntaxKind::ClassType);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::BracketOpen => self.parse_list_type(),
            _ => self.missing_with(SyntaxKind::ClassType, DiagnosticKind::ExpectedType),
        }
    }

    /// `function(A, B)R`
    fn parse_function_type(&mut self) {
        self.start_node(SyntaxKind::FunctionType);
        self.bump_remap(SyntaxKind::KwFunction);
        self.push_delimiter(DiagnosticKind::UnclosedParen);
        self.bump();
        self.parse_type();
        while self.eat(SyntaxKind::Comma) {
            self.parse_type();
        }
        self.close_delimiter(SyntaxKind::ParenClose);
        self.parse_type();
        self.finish_node();
    }

    /// `[T]`
    fn parse_list_type(&mut self) {
        self.start_node(SyntaxKind::ListType);
        self.push_delimiter(DiagnosticKind::UnclosedBracket);
        self.bump();
        self.parse_type();
        self.close_delimiter(SyntaxKind::BracketClose);
        self.finish_node();
    }
}
