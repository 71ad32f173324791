//! The fixed ZenScript grammar as seen by tree consumers: node kinds, fields and version.
//!
//! Symbol ids are the discriminants of [`SyntaxKind`]; field ids are the discriminants of
//! [`Field`]. Both are stable within one [`LANGUAGE_VERSION`].

use serde::Serialize;

use crate::syntax::SyntaxKind;

/// Bumped whenever a symbol or field id changes meaning.
pub const LANGUAGE_VERSION: u32 = 1;

/// How a symbol shows up in trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolType {
    /// A named node: a grammar rule, a literal, a comment.
    Regular,
    /// An anonymous token such as `(` or `import`.
    Anonymous,
    /// Internal to the parser; never produced as a node.
    Auxiliary,
}

/// Field names that label a child's role in its parent. Ids start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u16)]
pub enum Field {
    Name = 1,
    Alias,
    Parameters,
    ReturnType,
    Body,
    Type,
    Value,
    Condition,
    Consequence,
    Alternative,
    Left,
    Operator,
    Right,
    Operand,
    Object,
    Member,
    Index,
    Function,
    Key,
    Target,
    Superclass,
    Variable,
    Iterable,
    Element,
}

impl Field {
    pub const ALL: [Field; 24] = [
        Field::Name,
        Field::Alias,
        Field::Parameters,
        Field::ReturnType,
        Field::Body,
        Field::Type,
        Field::Value,
        Field::Condition,
        Field::Consequence,
        Field::Alternative,
        Field::Left,
        Field::Operator,
        Field::Right,
        Field::Operand,
        Field::Object,
        Field::Member,
        Field::Index,
        Field::Function,
        Field::Key,
        Field::Target,
        Field::Superclass,
        Field::Variable,
        Field::Iterable,
        Field::Element,
    ];

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Field> {
        let index = usize::from(id).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Alias => "alias",
            Field::Parameters => "parameters",
            Field::ReturnType => "return_type",
            Field::Body => "body",
            Field::Type => "type",
            Field::Value => "value",
            Field::Condition => "condition",
            Field::Consequence => "consequence",
            Field::Alternative => "alternative",
            Field::Left => "left",
            Field::Operator => "operator",
            Field::Right => "right",
            Field::Operand => "operand",
            Field::Object => "object",
            Field::Member => "member",
            Field::Index => "index",
            Field::Function => "function",
            Field::Key => "key",
            Field::Target => "target",
            Field::Superclass => "superclass",
            Field::Variable => "variable",
            Field::Iterable => "iterable",
            Field::Element => "element",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Descriptor of the ZenScript grammar.
#[derive(Debug, PartialEq, Eq)]
pub struct Language {
    name: &'static str,
    version: u32,
}

static ZENSCRIPT: Language = Language {
    name: "zenscript",
    version: LANGUAGE_VERSION,
};

impl Language {
    pub fn zenscript() -> &'static Language {
        &ZENSCRIPT
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn symbol_count(&self) -> u16 {
        SyntaxKind::COUNT
    }

    pub fn symbol_name(&self, id: u16) -> Option<&'static str> {
        SyntaxKind::from_raw(id).map(SyntaxKind::name)
    }

    pub fn symbol_type(&self, id: u16) -> Option<SymbolType> {
        SyntaxKind::from_raw(id).map(symbol_type)
    }

    /// Id of the visible symbol called `name`, named or anonymous.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<u16> {
        let wanted = if named {
            SymbolType::Regular
        } else {
            SymbolType::Anonymous
        };
        (0..SyntaxKind::COUNT)
            .filter_map(SyntaxKind::from_raw)
            .find(|kind| kind.name() == name && symbol_type(*kind) == wanted)
            .map(|kind| kind as u16)
    }

    /// Number of fields; valid ids are `1..=field_count()`.
    pub fn field_count(&self) -> u16 {
        Field::ALL.len() as u16
    }

    pub fn field_name_for_id(&self, id: u16) -> Option<&'static str> {
        Field::from_id(id).map(Field::name)
    }

    pub fn field_id_for_name(&self, name: &str) -> Option<u16> {
        Field::from_name(name).map(Field::id)
    }
}

pub(crate) fn symbol_type(kind: SyntaxKind) -> SymbolType {
    if kind.is_hidden() {
        SymbolType::Auxiliary
    } else if kind.is_named() {
        SymbolType::Regular
    } else {
        SymbolType::Anonymous
    }
}
