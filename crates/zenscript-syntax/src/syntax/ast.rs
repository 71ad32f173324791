//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind` - validation happens elsewhere.
//! Keywords are re-tagged by the parser, so accessors can match on keyword kinds directly.

use super::cst::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(ScriptFile, ScriptFile);
ast_node!(ImportDeclaration, ImportDeclaration);
ast_node!(FunctionDeclaration, FunctionDeclaration);
ast_node!(ExpandFunctionDeclaration, ExpandFunctionDeclaration);
ast_node!(ClassDeclaration, ClassDeclaration);
ast_node!(FieldDeclaration, FieldDeclaration);
ast_node!(ConstructorDeclaration, ConstructorDeclaration);
ast_node!(OperatorFunctionDeclaration, OperatorFunctionDeclaration);
ast_node!(ParameterList, ParameterList);
ast_node!(Parameter, Parameter);
ast_node!(VariableDeclaration, VariableDeclaration);
ast_node!(QualifiedName, QualifiedName);
ast_node!(SimpleName, SimpleName);

/// Whether a function-like declaration carries a body or ends in `;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationForm {
    /// `function f() { ... }`
    Body,
    /// `static function f(a as int, ...rest as int[]) as void;`
    Signature,
}

/// A top-level element of a script.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Import(ImportDeclaration),
    Function(FunctionDeclaration),
    Expand(ExpandFunctionDeclaration),
    Class(ClassDeclaration),
    /// Any other statement. `ERROR` nodes are skipped.
    Statement(SyntaxNode),
}

impl Item {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::ImportDeclaration => ImportDeclaration::cast(node).map(Item::Import),
            SyntaxKind::FunctionDeclaration => FunctionDeclaration::cast(node).map(Item::Function),
            SyntaxKind::ExpandFunctionDeclaration => {
                ExpandFunctionDeclaration::cast(node).map(Item::Expand)
            }
            SyntaxKind::ClassDeclaration => ClassDeclaration::cast(node).map(Item::Class),
            SyntaxKind::Error => None,
            _ => Some(Item::Statement(node)),
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Item::Import(n) => n.as_cst(),
            Item::Function(n) => n.as_cst(),
            Item::Expand(n) => n.as_cst(),
            Item::Class(n) => n.as_cst(),
            Item::Statement(n) => n,
        }
    }
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassMember {
    Function(FunctionDeclaration),
    Field(FieldDeclaration),
    Constructor(ConstructorDeclaration),
    Operator(OperatorFunctionDeclaration),
}

impl ClassMember {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FunctionDeclaration => {
                FunctionDeclaration::cast(node).map(ClassMember::Function)
            }
            SyntaxKind::FieldDeclaration => FieldDeclaration::cast(node).map(ClassMember::Field),
            SyntaxKind::ConstructorDeclaration => {
                ConstructorDeclaration::cast(node).map(ClassMember::Constructor)
            }
            SyntaxKind::OperatorFunctionDeclaration => {
                OperatorFunctionDeclaration::cast(node).map(ClassMember::Operator)
            }
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            ClassMember::Function(n) => n.as_cst(),
            ClassMember::Field(n) => n.as_cst(),
            ClassMember::Constructor(n) => n.as_cst(),
            ClassMember::Operator(n) => n.as_cst(),
        }
    }
}

fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn form_of(node: &SyntaxNode) -> DeclarationForm {
    if node.children().any(|c| c.kind() == SyntaxKind::FunctionBody) {
        DeclarationForm::Body
    } else {
        DeclarationForm::Signature
    }
}

/// First non-trivia element after the first `keyword` token.
///
/// Types are elements, not nodes: a primitive type is a bare keyword token.
fn element_after(node: &SyntaxNode, keyword: SyntaxKind) -> Option<SyntaxElement> {
    node.children_with_tokens()
        .skip_while(|e| e.kind() != keyword)
        .skip(1)
        .find(|e| !e.kind().is_trivia())
}

impl ScriptFile {
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.0.children().filter_map(Item::cast)
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDeclaration> + '_ {
        self.0.children().filter_map(ImportDeclaration::cast)
    }
}

impl ImportDeclaration {
    pub fn path(&self) -> Option<QualifiedName> {
        self.0.children().find_map(QualifiedName::cast)
    }

    pub fn alias(&self) -> Option<SimpleName> {
        self.0.children().find_map(SimpleName::cast)
    }
}

impl FunctionDeclaration {
    pub fn form(&self) -> DeclarationForm {
        form_of(&self.0)
    }

    /// `static` or `global`, on declaration-only functions.
    pub fn modifier(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::KwStatic | SyntaxKind::KwGlobal))
    }

    pub fn name(&self) -> Option<SimpleName> {
        self.0.children().find_map(SimpleName::cast)
    }

    pub fn parameters(&self) -> Option<ParameterList> {
        self.0.children().find_map(ParameterList::cast)
    }

    pub fn return_type(&self) -> Option<SyntaxElement> {
        element_after(&self.0, SyntaxKind::KwAs)
    }
}

impl ExpandFunctionDeclaration {
    /// The expanded type, before the `$`.
    pub fn target(&self) -> Option<SyntaxElement> {
        element_after(&self.0, SyntaxKind::KwExpand)
    }

    pub fn name(&self) -> Option<SimpleName> {
        self.0.children().find_map(SimpleName::cast)
    }

    pub fn parameters(&self) -> Option<ParameterList> {
        self.0.children().find_map(ParameterList::cast)
    }
}

impl ClassDeclaration {
    pub fn name(&self) -> Option<SyntaxToken> {
        let class_name = self.0.children().find(|n| n.kind() == SyntaxKind::ClassName)?;
        token(&class_name, SyntaxKind::Ident)
    }

    pub fn superclasses(&self) -> impl Iterator<Item = QualifiedName> + '_ {
        self.0.children().filter_map(QualifiedName::cast)
    }

    pub fn members(&self) -> impl Iterator<Item = ClassMember> + '_ {
        self.0
            .children()
            .filter(|n| n.kind() == SyntaxKind::ClassBody)
            .flat_map(|body| body.children())
            .filter_map(ClassMember::cast)
    }
}

impl FieldDeclaration {
    /// `var`, `val` or `static`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.0.first_token().filter(|t| {
            matches!(t.kind(), SyntaxKind::KwVar | SyntaxKind::KwVal | SyntaxKind::KwStatic)
        })
    }

    pub fn name(&self) -> Option<SimpleName> {
        self.0.children().find_map(SimpleName::cast)
    }
}

impl ConstructorDeclaration {
    pub fn form(&self) -> DeclarationForm {
        form_of(&self.0)
    }

    pub fn parameters(&self) -> Option<ParameterList> {
        self.0.children().find_map(ParameterList::cast)
    }
}

impl OperatorFunctionDeclaration {
    /// Tokens spelling the operator, such as `[`, `]`, `=` for `[]=`.
    pub fn operator(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .skip_while(|t| t.kind() != SyntaxKind::KwOperator)
            .skip(1)
            .filter(|t| !t.kind().is_trivia())
            .take_while(|t| t.kind() != SyntaxKind::ParenOpen)
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        self.0.children().filter_map(Parameter::cast)
    }

    pub fn is_variadic(&self) -> bool {
        token(&self.0, SyntaxKind::Ellipsis).is_some()
    }
}

impl Parameter {
    pub fn name(&self) -> Option<SimpleName> {
        self.0.children().find_map(SimpleName::cast)
    }

    pub fn declared_type(&self) -> Option<SyntaxElement> {
        element_after(&self.0, SyntaxKind::KwAs)
    }
}

impl VariableDeclaration {
    /// `var`, `val`, `static` or `global`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.0.first_token().filter(|t| t.kind().is_keyword())
    }

    pub fn name(&self) -> Option<SimpleName> {
        self.0.children().find_map(SimpleName::cast)
    }
}

impl QualifiedName {
    pub fn segments(&self) -> impl Iterator<Item = SimpleName> + '_ {
        self.0.children().filter_map(SimpleName::cast)
    }

    /// Segments joined by `.`, trivia dropped.
    pub fn text(&self) -> String {
        self.segments()
            .filter_map(|s| s.ident().map(|t| t.text().to_string()))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl SimpleName {
    pub fn ident(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::Ident)
    }

    pub fn text(&self) -> String {
        self.ident().map(|t| t.text().to_string()).unwrap_or_default()
    }
}
