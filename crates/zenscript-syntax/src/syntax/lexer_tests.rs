use indoc::indoc;

use super::cst::SyntaxKind;
use super::lexer::{Token, lex, next_token, relex, token_text};
use crate::tree::{EditWindow, InputEdit, Point};

fn dump(source: &str) -> String {
    lex(source)
        .iter()
        .filter(|t| t.kind != SyntaxKind::Whitespace)
        .map(|t| format!("{:?} {:?}", t.kind, token_text(source, t)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn kinds(tokens: &[Token]) -> Vec<(SyntaxKind, u32, u32)> {
    tokens
        .iter()
        .map(|t| (t.kind, t.span.start().into(), t.span.end().into()))
        .collect()
}

#[test]
fn names_and_keywords_are_idents() {
    insta::assert_snapshot!(dump("val x = 0x1F;"), @r#"
    Ident "val"
    Ident "x"
    Eq "="
    IntLiteral "0x1F"
    Semicolon ";"
    "#);
}

#[test]
fn dollar_and_unicode_names() {
    insta::assert_snapshot!(dump("$expand café$x"), @r#"
    Ident "$expand"
    Ident "café$x"
    "#);
}

#[test]
fn lone_dollar_is_separator() {
    insta::assert_snapshot!(dump("a $ b$"), @r#"
    Ident "a"
    Dollar "$"
    Ident "b$"
    "#);
}

#[test]
fn float_forms() {
    insta::assert_snapshot!(dump("1.5 2e3 .5f 3. 7F"), @r#"
    FloatLiteral "1.5"
    FloatLiteral "2e3"
    FloatLiteral ".5f"
    FloatLiteral "3."
    IntLiteral "7"
    Ident "F"
    "#);
}

#[test]
fn range_is_not_a_float() {
    insta::assert_snapshot!(dump("0..10"), @r#"
    IntLiteral "0"
    DotDot ".."
    IntLiteral "10"
    "#);
}

#[test]
fn strings_both_quotes() {
    insta::assert_snapshot!(dump(r#""a\"b" 'c'"#), @r#"
    StringLiteral "\"a\\\"b\""
    StringLiteral "'c'"
    "#);
}

#[test]
fn unterminated_string_stops_at_newline() {
    insta::assert_snapshot!(dump("\"abc\nx"), @r#"
    UnterminatedString "\"abc"
    Ident "x"
    "#);
}

#[test]
fn extras() {
    let source = indoc! {"
        #loader crafttweaker
        // line
        /* block */ x
        /* open
    "};
    insta::assert_snapshot!(dump(source), @r##"
    Preprocessor "#loader crafttweaker"
    Comment "// line"
    Comment "/* block */"
    Ident "x"
    UnterminatedComment "/* open\n"
    "##);
}

#[test]
fn garbage_is_coalesced() {
    insta::assert_snapshot!(dump("a `` b"), @r#"
    Ident "a"
    Garbage "``"
    Ident "b"
    "#);
}

#[test]
fn tokens_cover_source() {
    let source = "function f(a as int) { return a ~ \"x\"; } // end";
    let tokens = lex(source);
    let text: String = tokens.iter().map(|t| token_text(source, t)).collect();
    assert_eq!(text, source);
    for pair in tokens.windows(2) {
        assert_eq!(pair[0].span.end(), pair[1].span.start());
    }
}

#[test]
fn next_token_from_offset() {
    let token = next_token("a += 1", 2).unwrap();
    assert_eq!(token.kind, SyntaxKind::PlusEq);
    assert_eq!(next_token("a", 1), None);
}

#[test]
fn relex_matches_fresh_lex() {
    let old_source = "val a = 1;\nval b = 2;\nval c = 3;";
    let new_source = "val a = 1;\nval bb = 2.5;\nval c = 3;";
    let old = lex(old_source);

    // "b = 2" became "bb = 2.5"
    let edit = InputEdit {
        start_byte: 15,
        old_end_byte: 20,
        new_end_byte: 23,
        start_point: Point::new(1, 4),
        old_end_point: Point::new(1, 9),
        new_end_point: Point::new(1, 12),
    };
    let window = EditWindow::from_edit(&edit);
    let relexed = relex(&old, old_source.len() as u32, &window, new_source);
    assert_eq!(kinds(&relexed), kinds(&lex(new_source)));
}

#[test]
fn relex_append_extends_last_token() {
    let old_source = "val a = 1";
    let new_source = "val a = 12";
    let old = lex(old_source);
    let edit = InputEdit {
        start_byte: 9,
        old_end_byte: 9,
        new_end_byte: 10,
        start_point: Point::new(0, 9),
        old_end_point: Point::new(0, 9),
        new_end_point: Point::new(0, 10),
    };
    let window = EditWindow::from_edit(&edit);
    let relexed = relex(&old, old_source.len() as u32, &window, new_source);
    assert_eq!(kinds(&relexed), kinds(&lex(new_source)));
    assert_eq!(token_text(new_source, relexed.last().unwrap()), "12");
}
