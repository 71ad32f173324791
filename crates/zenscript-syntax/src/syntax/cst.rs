//! Syntax kinds for ZenScript.
//!
//! `SyntaxKind` is shared by the lexer (token kinds) and the parser (node kinds).
//! Logos derives token recognition; keyword and node kinds carry no lexer attributes
//! because keywords are recognized by the parser from `Ident` tokens in context.
//! `ZsLang` implements Rowan's `Language` trait for tree construction.

use logos::Logos;
use rowan::Language;

/// All token and node kinds. Tokens first, then keywords, then nodes, then `__LAST`.
/// `#[repr(u16)]` enables safe transmute in `kind_from_raw`.
///
/// The discriminants double as the public symbol ids of the grammar (see
/// [`crate::Language`]); reordering variants requires bumping the language version.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token("(")]
    ParenOpen = 0,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("..")]
    DotDot,

    #[token("...")]
    Ellipsis,

    #[token(":")]
    Colon,

    #[token("?")]
    Question,

    /// Separator in `$expand Type$name`. A `$` followed by name characters lexes as `Ident`.
    #[token("$", priority = 3)]
    Dollar,

    #[token("=")]
    Eq,

    #[token("+=")]
    PlusEq,

    #[token("-=")]
    MinusEq,

    #[token("~=")]
    TildeEq,

    #[token("*=")]
    StarEq,

    #[token("/=")]
    SlashEq,

    #[token("%=")]
    PercentEq,

    #[token("|=")]
    PipeEq,

    #[token("&=")]
    AmpEq,

    #[token("^=")]
    CaretEq,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("~")]
    Tilde,

    #[token("|")]
    Pipe,

    #[token("&")]
    Amp,

    #[token("^")]
    Caret,

    #[token("!")]
    Bang,

    #[token("==")]
    EqEq,

    #[token("!=")]
    BangEq,

    #[token("<")]
    Lt,

    #[token("<=")]
    LtEq,

    #[token(">")]
    Gt,

    #[token(">=")]
    GtEq,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    /// Names and keywords alike. `$` may start or continue a name.
    #[regex(r"[\p{L}_$][\p{L}\p{Nd}\p{Sc}_$]*")]
    Ident,

    #[regex(r"0x[0-9a-fA-F]+")]
    #[regex(r"0|[1-9][0-9]*")]
    IntLiteral,

    /// A float ending in `.` right before another `.` is split back into an int by the lexer,
    /// so `0..10` stays a range.
    #[regex(r"(0|[1-9][0-9]*)\.[0-9]*([eE][+-]?[0-9]+)?[fF]?")]
    #[regex(r"(0|[1-9][0-9]*)[eE][+-]?[0-9]+[fF]?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fF]?")]
    FloatLiteral,

    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    StringLiteral,

    /// A string whose closing quote is missing on its line.
    #[regex(r#""(?:[^"\\\n]|\\.)*"#, allow_greedy = true)]
    #[regex(r"'(?:[^'\\\n]|\\.)*", allow_greedy = true)]
    UnterminatedString,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*+/")]
    Comment,

    #[regex(r"/\*(?:[^*]|\*+[^*/])*\**", allow_greedy = true)]
    UnterminatedComment,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    Preprocessor,

    #[regex(r"\s+")]
    Whitespace,

    /// Opaque run between `<` and `>` of a bracket handler. Produced by the parser, not by Logos.
    BracketContent,

    /// Coalesced unrecognized characters
    Garbage,

    /// End of input sentinel returned by lookahead. Never stored in a tree.
    Eof,

    // --- Keywords (recognized by the parser from `Ident` tokens) ---
    KwImport,
    KwAs,
    KwFunction,
    KwStatic,
    KwGlobal,
    KwVar,
    KwVal,
    KwZenConstructor,
    KwExpand,
    KwOperator,
    KwZenClass,
    KwExtends,
    KwReturn,
    KwBreak,
    KwContinue,
    KwIf,
    KwElse,
    KwFor,
    KwIn,
    KwWhile,
    KwInstanceof,
    KwTo,
    KwHas,
    KwForIn,
    KwTrue,
    KwFalse,
    KwNull,
    KwAny,
    KwByte,
    KwShort,
    KwInt,
    KwLong,
    KwFloat,
    KwDouble,
    KwBool,
    KwVoid,
    KwString,

    // --- Node kinds (non-terminals) ---
    ScriptFile,
    ImportDeclaration,
    FunctionDeclaration,
    ExpandFunctionDeclaration,
    ClassDeclaration,
    ClassBody,
    FieldDeclaration,
    ConstructorDeclaration,
    OperatorFunctionDeclaration,
    ParameterList,
    /// One entry of a parameter list; transparent in the public tree.
    Parameter,
    FunctionBody,
    BlockStatement,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    IfStatement,
    ForeachStatement,
    WhileStatement,
    ExpressionStatement,
    VariableDeclaration,
    PrimaryExpression,
    ParensExpression,
    FunctionExpression,
    BracketHandlerExpression,
    ArrayLiteral,
    MapLiteral,
    MapEntry,
    CallExpression,
    MemberIndexExpression,
    MemberAccessExpression,
    MemberName,
    IntRangeExpression,
    UnaryExpression,
    BinaryExpression,
    CompareExpression,
    LogicalExpression,
    ConditionalExpression,
    AssignmentExpression,
    InstanceofExpression,
    TypeCastExpression,
    FunctionType,
    ListType,
    ArrayType,
    MapType,
    IntersectionType,
    ClassType,
    ClassName,
    QualifiedName,
    SimpleName,
    Error,
    /// Zero-width placeholder wrapping the token the parser expected.
    Missing,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Comment | Preprocessor)
    }

    /// Comments and preprocessor lines: kept in the tree, outside the grammar.
    #[inline]
    pub fn is_extra(self) -> bool {
        matches!(self, Comment | Preprocessor)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | Garbage | UnterminatedString | UnterminatedComment)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        (KwImport as u16..=KwString as u16).contains(&(self as u16))
    }

    #[inline]
    pub fn is_token(self) -> bool {
        (self as u16) < ScriptFile as u16
    }

    #[inline]
    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            KwAny | KwByte | KwShort | KwInt | KwLong | KwFloat | KwDouble | KwBool | KwVoid | KwString
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            Eq | PlusEq | MinusEq | TildeEq | StarEq | SlashEq | PercentEq | PipeEq | AmpEq | CaretEq
        )
    }

    /// Resolves reserved words. The parser decides per position whether the keyword applies.
    pub fn keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "import" => KwImport,
            "as" => KwAs,
            "function" => KwFunction,
            "static" => KwStatic,
            "global" => KwGlobal,
            "var" => KwVar,
            "val" => KwVal,
            "zenConstructor" => KwZenConstructor,
            "$expand" => KwExpand,
            "operator" => KwOperator,
            "zenClass" => KwZenClass,
            "extends" => KwExtends,
            "return" => KwReturn,
            "break" => KwBreak,
            "continue" => KwContinue,
            "if" => KwIf,
            "else" => KwElse,
            "for" => KwFor,
            "in" => KwIn,
            "while" => KwWhile,
            "instanceof" => KwInstanceof,
            "to" => KwTo,
            "has" => KwHas,
            "for_in" => KwForIn,
            "true" => KwTrue,
            "false" => KwFalse,
            "null" => KwNull,
            "any" => KwAny,
            "byte" => KwByte,
            "short" => KwShort,
            "int" => KwInt,
            "long" => KwLong,
            "float" => KwFloat,
            "double" => KwDouble,
            "bool" => KwBool,
            "void" => KwVoid,
            "string" => KwString,
            _ => return None,
        };
        Some(kind)
    }

    /// Grammar-facing name: rule names for nodes, source text for anonymous tokens.
    pub fn name(self) -> &'static str {
        match self {
            ParenOpen => "(",
            ParenClose => ")",
            BracketOpen => "[",
            BracketClose => "]",
            BraceOpen => "{",
            BraceClose => "}",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            DotDot => "..",
            Ellipsis => "...",
            Colon => ":",
            Question => "?",
            Dollar => "$",
            Eq => "=",
            PlusEq => "+=",
            MinusEq => "-=",
            TildeEq => "~=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            PipeEq => "|=",
            AmpEq => "&=",
            CaretEq => "^=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Tilde => "~",
            Pipe => "|",
            Amp => "&",
            Caret => "^",
            Bang => "!",
            EqEq => "==",
            BangEq => "!=",
            Lt => "<",
            LtEq => "<=",
            Gt => ">",
            GtEq => ">=",
            AmpAmp => "&&",
            PipePipe => "||",
            Ident => "identifier",
            IntLiteral => "int_literal",
            FloatLiteral => "float_literal",
            StringLiteral => "string_literal",
            UnterminatedString => "unterminated_string",
            Comment => "comment",
            UnterminatedComment => "unterminated_comment",
            Preprocessor => "preprocessor",
            Whitespace => "_whitespace",
            BracketContent => "bracket_handler_content",
            Garbage => "garbage",
            Eof => "end",
            KwImport => "import",
            KwAs => "as",
            KwFunction => "function",
            KwStatic => "static",
            KwGlobal => "global",
            KwVar => "var",
            KwVal => "val",
            KwZenConstructor => "zenConstructor",
            KwExpand => "$expand",
            KwOperator => "operator",
            KwZenClass => "zenClass",
            KwExtends => "extends",
            KwReturn => "return",
            KwBreak => "break",
            KwContinue => "continue",
            KwIf => "if",
            KwElse => "else",
            KwFor => "for",
            KwIn => "in",
            KwWhile => "while",
            KwInstanceof => "instanceof",
            KwTo => "to",
            KwHas => "has",
            KwForIn => "for_in",
            KwTrue => "true",
            KwFalse => "false",
            KwNull => "null",
            KwAny => "any",
            KwByte => "byte",
            KwShort => "short",
            KwInt => "int",
            KwLong => "long",
            KwFloat => "float",
            KwDouble => "double",
            KwBool => "bool",
            KwVoid => "void",
            KwString => "string",
            ScriptFile => "script_file",
            ImportDeclaration => "import_declaraton",
            FunctionDeclaration => "function_declaraton",
            ExpandFunctionDeclaration => "expand_function_declaraton",
            ClassDeclaration => "class_declaraton",
            ClassBody => "class_body",
            FieldDeclaration => "field_declaration",
            ConstructorDeclaration => "constructor_declaration",
            OperatorFunctionDeclaration => "operator_function_declaration",
            ParameterList => "parameter_list",
            Parameter => "_parameter_decl",
            FunctionBody => "function_body",
            BlockStatement => "block_statement",
            ReturnStatement => "return_statement",
            BreakStatement => "break_statement",
            ContinueStatement => "continue_statement",
            IfStatement => "if_statement",
            ForeachStatement => "foreach_statement",
            WhileStatement => "while_statement",
            ExpressionStatement => "expression_statement",
            VariableDeclaration => "variable_declaration",
            PrimaryExpression => "primary_expression",
            ParensExpression => "parens_expression",
            FunctionExpression => "function_expression",
            BracketHandlerExpression => "bracket_handler_expression",
            ArrayLiteral => "array_literal",
            MapLiteral => "map_literal",
            MapEntry => "map_entry",
            CallExpression => "call_expression",
            MemberIndexExpression => "member_index_expression",
            MemberAccessExpression => "member_access_expression",
            MemberName => "member_name",
            IntRangeExpression => "int_range_expression",
            UnaryExpression => "unary_expression",
            BinaryExpression => "binary_expression",
            CompareExpression => "compare_expression",
            LogicalExpression => "logical_expression",
            ConditionalExpression => "conditional_expression",
            AssignmentExpression => "assignment_expression",
            InstanceofExpression => "instanceof_expression",
            TypeCastExpression => "type_cast_expression",
            FunctionType => "function_type",
            ListType => "list_type",
            ArrayType => "array_type",
            MapType => "map_type",
            IntersectionType => "intersection_type",
            ClassType => "class_type",
            ClassName => "class_name",
            QualifiedName => "qualified_name",
            SimpleName => "simple_name",
            Error => "ERROR",
            Missing => "_missing",
            __LAST => "__LAST",
        }
    }

    /// Named in the public tree: grammar rules, literal tokens, `true`/`false`/`null`, extras, `ERROR`.
    pub fn is_named(self) -> bool {
        match self {
            IntLiteral | FloatLiteral | StringLiteral | Comment | Preprocessor => true,
            KwTrue | KwFalse | KwNull => true,
            Error => true,
            _ => !self.is_token() && !self.is_hidden(),
        }
    }

    /// Kinds that never appear in the public tree. Hidden nodes are spliced into their parent.
    ///
    /// Every other token is a node, so the public leaves cover all non-whitespace bytes.
    /// Identifiers only surface as leaves of their own inside `ERROR`.
    pub fn is_hidden(self) -> bool {
        matches!(self, Whitespace | Eof | Parameter | Missing | __LAST)
    }

    /// Named nodes exposed as leaves: their inner tokens stay hidden.
    pub fn is_leaf_node(self) -> bool {
        matches!(self, SimpleName | ClassType | ClassName | MemberName)
    }

    pub(crate) fn from_raw(raw: u16) -> Option<SyntaxKind> {
        (raw < __LAST as u16).then(|| ZsLang::kind_from_raw(rowan::SyntaxKind(raw)))
    }

    pub(crate) const COUNT: u16 = __LAST as u16;
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for Rowan's tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ZsLang {}

impl Language for ZsLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<ZsLang>;
pub type SyntaxToken = rowan::SyntaxToken<ZsLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// 128-bit bitset of token and keyword kinds for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Panics at compile time if any kind's discriminant >= 128.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 128, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    pub const fn single(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        assert!(kind < 128, "SyntaxKind value exceeds TokenSet capacity");
        TokenSet(1 << kind)
    }

    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 128 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..128u16 {
            if self.0 & (1 << i) != 0
                && let Some(kind) = SyntaxKind::from_raw(i)
            {
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets for the parser. Keyword kinds match resolved `Ident` tokens.
pub mod token_sets {
    use super::*;

    pub const LITERALS: TokenSet = TokenSet::new(&[IntLiteral, FloatLiteral, StringLiteral]);

    /// FIRST set of expressions over raw token kinds. Any `Ident` may start one.
    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        Ident,
        IntLiteral,
        FloatLiteral,
        StringLiteral,
        ParenOpen,
        BracketOpen,
        BraceOpen,
        Lt,
        Bang,
        Minus,
    ]);

    /// Statement keywords. Checked before falling back to an expression statement.
    pub const STATEMENT_KEYWORDS: TokenSet = TokenSet::new(&[
        KwReturn, KwBreak, KwContinue, KwIf, KwFor, KwWhile, KwVar, KwVal, KwStatic, KwGlobal,
    ]);

    /// Where statement-level recovery stops consuming into an `ERROR` node.
    pub const STATEMENT_RECOVERY: TokenSet =
        EXPR_FIRST.union(TokenSet::new(&[Semicolon, BraceClose]));

    pub const MEMBER_RECOVERY: TokenSet = TokenSet::new(&[
        KwFunction,
        KwStatic,
        KwVar,
        KwVal,
        KwZenConstructor,
        KwOperator,
        BraceClose,
    ]);

    pub const ASSIGNMENT_OPERATORS: TokenSet = TokenSet::new(&[
        Eq, PlusEq, MinusEq, TildeEq, StarEq, SlashEq, PercentEq, PipeEq, AmpEq, CaretEq,
    ]);

    pub const COMPARE_OPERATORS: TokenSet = TokenSet::new(&[EqEq, BangEq, Lt, LtEq, Gt, GtEq]);

    /// Symbols allowed after `operator` in a declaration-only operator function.
    pub const OPERATOR_SYMBOLS: TokenSet = TokenSet::new(&[
        Plus, Minus, Star, Slash, Percent, Tilde, Pipe, Amp, Caret, Bang, DotDot, EqEq, BangEq,
        Lt, LtEq, Gt, GtEq,
    ]);
}
