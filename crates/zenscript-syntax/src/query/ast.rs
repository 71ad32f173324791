//! Parsed, unresolved query patterns.
//!
//! Names are kept as written; [`super::compile`] resolves them against the language.

use rowan::TextRange;

use super::quantifier::Repeat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Name {
    pub text: String,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Named(Name),
    /// `(_)`
    AnyNamed,
    /// `(ERROR)`
    Error,
    /// `(MISSING)`, `(MISSING name)`, `(MISSING "x")`
    Missing(Option<(Name, bool)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Node {
        kind: NodeKind,
        children: Vec<Item>,
    },
    /// `"("`: an anonymous node.
    Anonymous(Name),
    /// `_`: any node, named or not.
    Wildcard,
    /// `((a) (b))`: consecutive siblings.
    Group(Vec<Item>),
    /// `[(a) (b)]`
    Alternation(Vec<Item>),
    /// `.`: the neighbouring items are adjacent among named siblings.
    Anchor,
    /// `!field`: the parent has no child in this field.
    NegatedField(Name),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Item {
    pub kind: ItemKind,
    pub field: Option<Name>,
    pub repeat: Repeat,
    pub captures: Vec<Name>,
    pub span: TextRange,
}

impl Item {
    pub fn new(kind: ItemKind, span: TextRange) -> Self {
        Self {
            kind,
            field: None,
            repeat: Repeat::One,
            captures: Vec::new(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PredicateArg {
    Capture(Name),
    String(String),
}

/// `(#name? args...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Predicate {
    pub name: String,
    pub args: Vec<PredicateArg>,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    pub item: Item,
    pub predicates: Vec<Predicate>,
}
