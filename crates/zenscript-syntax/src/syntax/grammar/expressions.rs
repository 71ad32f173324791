//! Expressions: a Pratt loop over binding powers.
//!
//! Operands are wrapped in `primary_expression` the way the grammar nests them, except for
//! a bare name or parenthesized expression that ends up as an assignment target.

use crate::diagnostics::DiagnosticKind;
use crate::syntax::core::Parser;
use crate::syntax::cst::SyntaxKind;
use crate::syntax::cst::token_sets::ASSIGNMENT_OPERATORS;

/// Binding powers, loosest first.
mod bp {
    pub const ASSIGN: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const OR_OR: u8 = 3;
    pub const AND_AND: u8 = 4;
    pub const OR: u8 = 5;
    pub const XOR: u8 = 6;
    pub const AND: u8 = 7;
    pub const COMPARE: u8 = 8;
    pub const ADD: u8 = 9;
    pub const MUL: u8 = 10;
    pub const UNARY: u8 = 11;
    pub const CAST: u8 = 12;
    pub const INDEX: u8 = 13;
    pub const CALL: u8 = 14;
    pub const RANGE: u8 = 15;
    pub const MEMBER: u8 = 16;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infix {
    /// Left-associative operator producing the given node.
    Binary(SyntaxKind),
    Range,
    Conditional,
    Assign,
    Call,
    Index,
    Member,
    Cast,
    Instanceof,
}

/// What the left operand turned out to be; decides whether it may be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Name,
    Parens,
    Member,
    Index,
    Other,
}

impl Operand {
    fn is_assignable(self) -> bool {
        !matches!(self, Operand::Other)
    }
}

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) {
        self.parse_expression_bp(bp::ASSIGN);
    }

    fn parse_expression_bp(&mut self, min_bp: u8) {
        if !self.enter_recursion() {
            return;
        }

        let checkpoint = self.checkpoint();
        let mut operand = self.parse_prefix(min_bp);

        while let Some((op, power)) = self.infix_operator() {
            if power < min_bp {
                break;
            }
            operand = match op {
                Infix::Binary(kind) => {
                    self.start_node_at(checkpoint, kind);
                    self.bump_operator();
                    self.parse_expression_bp(power + 1);
                    self.finish_node();
                    Operand::Other
                }
                Infix::Range => {
                    self.start_node_at(checkpoint, SyntaxKind::IntRangeExpression);
                    self.bump_operator();
                    self.parse_expression_bp(power + 1);
                    self.finish_node();
                    Operand::Other
                }
                Infix::Conditional => {
                    self.start_node_at(checkpoint, SyntaxKind::ConditionalExpression);
                    self.bump();
                    self.parse_expression_bp(bp::ASSIGN);
                    self.expect(SyntaxKind::Colon);
                    self.parse_expression_bp(bp::CONDITIONAL);
                    self.finish_node();
                    Operand::Other
                }
                Infix::Assign if operand.is_assignable() => {
                    self.start_node_at(checkpoint, SyntaxKind::AssignmentExpression);
                    self.bump();
                    self.parse_expression_bp(bp::ASSIGN);
                    self.finish_node();
                    Operand::Other
                }
                Infix::Assign => {
                    self.start_node(SyntaxKind::Error);
                    self.error(DiagnosticKind::InvalidAssignmentTarget);
                    self.bump();
                    self.parse_expression_bp(bp::ASSIGN);
                    self.finish_node();
                    Operand::Other
                }
                Infix::Call => {
                    self.start_node_at(checkpoint, SyntaxKind::CallExpression);
                    self.parse_arguments();
                    self.finish_node();
                    Operand::Other
                }
                Infix::Index => {
                    self.start_node_at(checkpoint, SyntaxKind::MemberIndexExpression);
                    self.push_delimiter(DiagnosticKind::UnclosedBracket);
                    self.bump();
                    self.parse_expression();
                    self.close_delimiter(SyntaxKind::BracketClose);
                    self.finish_node();
                    Operand::Index
                }
                Infix::Member => {
                    self.start_node_at(checkpoint, SyntaxKind::MemberAccessExpression);
                    self.bump();
                    self.parse_member_name();
                    self.finish_node();
                    Operand::Member
                }
                Infix::Cast | Infix::Instanceof => {
                    let kind = if op == Infix::Cast {
                        SyntaxKind::TypeCastExpression
                    } else {
                        SyntaxKind::InstanceofExpression
                    };
                    self.start_node_at(checkpoint, kind);
                    self.bump_operator();
                    self.parse_type();
                    self.finish_node();
                    Operand::Other
                }
            };
        }

        self.exit_recursion();
    }

    /// The operator at the current token, if it continues an expression.
    fn infix_operator(&mut self) -> Option<(Infix, u8)> {
        use SyntaxKind::*;

        let binary = |kind, power| Some((Infix::Binary(kind), power));
        match self.current() {
            Star | Slash | Percent => binary(BinaryExpression, bp::MUL),
            Plus | Minus | Tilde => binary(BinaryExpression, bp::ADD),
            Amp => binary(BinaryExpression, bp::AND),
            Caret => binary(BinaryExpression, bp::XOR),
            Pipe => binary(BinaryExpression, bp::OR),
            EqEq | BangEq | Lt | LtEq | Gt | GtEq => binary(CompareExpression, bp::COMPARE),
            AmpAmp => binary(LogicalExpression, bp::AND_AND),
            PipePipe => binary(LogicalExpression, bp::OR_OR),
            DotDot => Some((Infix::Range, bp::RANGE)),
            Question => Some((Infix::Conditional, bp::CONDITIONAL)),
            ParenOpen => Some((Infix::Call, bp::CALL)),
            BracketOpen => Some((Infix::Index, bp::INDEX)),
            Dot => Some((Infix::Member, bp::MEMBER)),
            kind if ASSIGNMENT_OPERATORS.contains(kind) => Some((Infix::Assign, bp::ASSIGN)),
            Ident => match self.current_keyword()? {
                KwTo => Some((Infix::Range, bp::RANGE)),
                KwIn | KwHas => binary(CompareExpression, bp::COMPARE),
                KwAs => Some((Infix::Cast, bp::CAST)),
                KwInstanceof => Some((Infix::Instanceof, bp::CAST)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Emits an operator token; word operators become keyword tokens.
    fn bump_operator(&mut self) {
        match self.current_keyword() {
            Some(keyword) => self.bump_remap(keyword),
            None => self.bump(),
        }
    }

    fn parse_prefix(&mut self, min_bp: u8) -> Operand {
        match self.current() {
            SyntaxKind::Bang | SyntaxKind::Minus => {
                self.start_node(SyntaxKind::UnaryExpression);
                self.bump();
                self.parse_expression_bp(bp::UNARY);
                self.finish_node();
                Operand::Other
            }
            _ => self.parse_primary(min_bp),
        }
    }

    fn parse_primary(&mut self, min_bp: u8) -> Operand {
        // Only where an assignment can still follow may a target stay unwrapped.
        let may_assign = min_bp <= bp::ASSIGN;
        let checkpoint = self.checkpoint();

        let operand = match self.current() {
            SyntaxKind::IntLiteral | SyntaxKind::FloatLiteral | SyntaxKind::StringLiteral => {
                self.bump();
                Operand::Other
            }
            SyntaxKind::Lt => {
                self.parse_bracket_handler();
                Operand::Other
            }
            SyntaxKind::BracketOpen => {
                self.parse_array_literal();
                Operand::Other
            }
            SyntaxKind::BraceOpen => {
                self.parse_map_literal();
                Operand::Other
            }
            SyntaxKind::ParenOpen => {
                self.parse_parens_expression();
                Operand::Parens
            }
            SyntaxKind::Ident => match self.current_keyword() {
                Some(kw @ (SyntaxKind::KwTrue | SyntaxKind::KwFalse | SyntaxKind::KwNull)) => {
                    self.bump_remap(kw);
                    Operand::Other
                }
                Some(SyntaxKind::KwFunction) if self.next_is(SyntaxKind::ParenOpen) => {
                    self.parse_function_expression();
                    Operand::Other
                }
                _ => {
                    self.parse_simple_name();
                    Operand::Name
                }
            },
            SyntaxKind::UnterminatedString => {
                self.error_and_bump(DiagnosticKind::UnterminatedString);
                return Operand::Other;
            }
            _ => {
                self.missing_with(SyntaxKind::SimpleName, DiagnosticKind::ExpectedExpression);
                return Operand::Other;
            }
        };

        let bare_target = matches!(operand, Operand::Name | Operand::Parens)
            && may_assign
            && self.at_any(ASSIGNMENT_OPERATORS);
        if bare_target {
            return operand;
        }
        self.start_node_at(checkpoint, SyntaxKind::PrimaryExpression);
        self.finish_node();
        Operand::Other
    }

    /// `(expression)`
    fn parse_parens_expression(&mut self) {
        self.start_node(SyntaxKind::ParensExpression);
        self.push_delimiter(DiagnosticKind::UnclosedParen);
        self.bump();
        self.parse_expression();
        self.close_delimiter(SyntaxKind::ParenClose);
        self.finish_node();
    }

    /// `<item:minecraft:stone>`: everything between the angle brackets is one opaque token.
    fn parse_bracket_handler(&mut self) {
        self.start_node(SyntaxKind::BracketHandlerExpression);
        self.push_delimiter(DiagnosticKind::UnclosedBracketHandler);
        self.bump();
        let closed = self.rescan_bracket_content();
        if self.current() == SyntaxKind::BracketContent {
            self.bump();
        }
        if closed {
            self.pop_delimiter();
            self.expect(SyntaxKind::Gt);
        } else {
            self.close_delimiter(SyntaxKind::Gt);
        }
        self.finish_node();
    }

    /// `[a, b, c]`, trailing comma allowed.
    fn parse_array_literal(&mut self) {
        self.start_node(SyntaxKind::ArrayLiteral);
        self.push_delimiter(DiagnosticKind::UnclosedBracket);
        self.bump();
        while !self.should_stop() && !self.at(SyntaxKind::BracketClose) {
            self.parse_expression();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.close_delimiter(SyntaxKind::BracketClose);
        self.finish_node();
    }

    /// `{key: value, ...}`, trailing comma allowed.
    fn parse_map_literal(&mut self) {
        self.start_node(SyntaxKind::MapLiteral);
        self.push_delimiter(DiagnosticKind::UnclosedBrace);
        self.bump();
        while !self.should_stop() && !self.at(SyntaxKind::BraceClose) {
            self.parse_map_entry();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.close_delimiter(SyntaxKind::BraceClose);
        self.finish_node();
    }

    fn parse_map_entry(&mut self) {
        self.start_node(SyntaxKind::MapEntry);
        // The key stops before `?` and `=` so the `:` is never read as part of a conditional.
        self.parse_expression_bp(bp::OR_OR);
        self.expect(SyntaxKind::Colon);
        self.parse_expression();
        self.finish_node();
    }

    /// `function (params) [as type] { body }`
    fn parse_function_expression(&mut self) {
        self.start_node(SyntaxKind::FunctionExpression);
        self.bump_remap(SyntaxKind::KwFunction);
        self.parse_parameters(false);
        if self.eat(SyntaxKind::KwAs) {
            self.parse_type();
        }
        self.parse_block(SyntaxKind::FunctionBody);
        self.finish_node();
    }

    /// `(a, b)`; the arguments are direct children of the call.
    fn parse_arguments(&mut self) {
        self.push_delimiter(DiagnosticKind::UnclosedParen);
        self.bump();
        if !self.at(SyntaxKind::ParenClose) {
            loop {
                self.parse_expression();
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
        }
        self.close_delimiter(SyntaxKind::ParenClose);
    }

    /// Any word, keywords included, or a string literal.
    fn parse_member_name(&mut self) {
        match self.current() {
            SyntaxKind::Ident | SyntaxKind::StringLiteral => {
                self.start_node(SyntaxKind::MemberName);
                self.bump();
                self.finish_node();
            }
            _ => self.missing_with(SyntaxKind::MemberName, DiagnosticKind::ExpectedName),
        }
    }
}
