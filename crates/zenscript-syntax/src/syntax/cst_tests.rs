use super::cst::token_sets::{ASSIGNMENT_OPERATORS, EXPR_FIRST, STATEMENT_RECOVERY};
use super::cst::{SyntaxKind, TokenSet};

#[test]
fn token_set_membership() {
    let set = TokenSet::new(&[SyntaxKind::Plus, SyntaxKind::Minus]);
    assert!(set.contains(SyntaxKind::Plus));
    assert!(set.contains(SyntaxKind::Minus));
    assert!(!set.contains(SyntaxKind::Star));
    assert!(!TokenSet::EMPTY.contains(SyntaxKind::Plus));
    assert!(!set.contains(SyntaxKind::ScriptFile));
}

#[test]
fn token_set_union_and_debug() {
    let set = TokenSet::single(SyntaxKind::Eq).union(TokenSet::single(SyntaxKind::PlusEq));
    insta::assert_snapshot!(format!("{set:?}"), @"{Eq, PlusEq}");
}

#[test]
fn recovery_set_extends_expression_first() {
    assert!(STATEMENT_RECOVERY.contains(SyntaxKind::Semicolon));
    assert!(STATEMENT_RECOVERY.contains(SyntaxKind::BraceClose));
    assert!(EXPR_FIRST.contains(SyntaxKind::Ident));
    assert!(!EXPR_FIRST.contains(SyntaxKind::Semicolon));
    assert!(ASSIGNMENT_OPERATORS.contains(SyntaxKind::CaretEq));
}

#[test]
fn keywords_resolve_by_text() {
    assert_eq!(SyntaxKind::keyword("zenClass"), Some(SyntaxKind::KwZenClass));
    assert_eq!(SyntaxKind::keyword("$expand"), Some(SyntaxKind::KwExpand));
    assert_eq!(SyntaxKind::keyword("for_in"), Some(SyntaxKind::KwForIn));
    assert_eq!(SyntaxKind::keyword("zenclass"), None);
    assert!(SyntaxKind::KwFunction.is_keyword());
    assert!(SyntaxKind::KwString.is_primitive_type());
    assert!(!SyntaxKind::KwReturn.is_primitive_type());
}

#[test]
fn grammar_names() {
    let names: Vec<_> = [
        SyntaxKind::ScriptFile,
        SyntaxKind::FunctionDeclaration,
        SyntaxKind::ClassDeclaration,
        SyntaxKind::Semicolon,
        SyntaxKind::KwAs,
        SyntaxKind::Error,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    insta::assert_snapshot!(names.join(" "), @r#"script_file function_declaraton class_declaraton ; as ERROR"#);
}

#[test]
fn named_and_hidden_kinds() {
    assert!(SyntaxKind::IntLiteral.is_named());
    assert!(SyntaxKind::Comment.is_named());
    assert!(SyntaxKind::KwNull.is_named());
    assert!(SyntaxKind::Error.is_named());
    assert!(!SyntaxKind::Semicolon.is_named());
    assert!(!SyntaxKind::KwVal.is_named());

    assert!(!SyntaxKind::Ident.is_hidden());
    assert!(!SyntaxKind::BracketContent.is_hidden());
    assert!(!SyntaxKind::BracketContent.is_named());
    assert!(SyntaxKind::Whitespace.is_hidden());
    assert!(SyntaxKind::Parameter.is_hidden());
    assert!(!SyntaxKind::Parameter.is_named());
    assert!(SyntaxKind::SimpleName.is_leaf_node());
}

#[test]
fn trivia_and_extras() {
    assert!(SyntaxKind::Whitespace.is_trivia());
    assert!(!SyntaxKind::Whitespace.is_extra());
    assert!(SyntaxKind::Preprocessor.is_extra());
    assert!(SyntaxKind::Garbage.is_error());
}
