use super::ast::{Item, ItemKind, NodeKind, Pattern, PredicateArg};
use super::parser::QueryParser;
use super::quantifier::Repeat;

fn show(item: &Item) -> String {
    let mut out = String::new();
    if let Some(field) = &item.field {
        out.push_str(&field.text);
        out.push_str(": ");
    }
    let list = |items: &[Item]| items.iter().map(show).collect::<Vec<_>>().join(" ");
    match &item.kind {
        ItemKind::Node { kind, children } => {
            let head = match kind {
                NodeKind::Named(name) => name.text.clone(),
                NodeKind::AnyNamed => "_".to_string(),
                NodeKind::Error => "ERROR".to_string(),
                NodeKind::Missing(None) => "MISSING".to_string(),
                NodeKind::Missing(Some((name, true))) => format!("MISSING {}", name.text),
                NodeKind::Missing(Some((name, false))) => format!("MISSING {:?}", name.text),
            };
            if children.is_empty() {
                out.push_str(&format!("({head})"));
            } else {
                out.push_str(&format!("({head} {})", list(children)));
            }
        }
        ItemKind::Anonymous(name) => out.push_str(&format!("{:?}", name.text)),
        ItemKind::Wildcard => out.push('_'),
        ItemKind::Group(items) => out.push_str(&format!("{{{}}}", list(items))),
        ItemKind::Alternation(items) => out.push_str(&format!("[{}]", list(items))),
        ItemKind::Anchor => out.push('.'),
        ItemKind::NegatedField(name) => out.push_str(&format!("!{}", name.text)),
    }
    out.push_str(match item.repeat {
        Repeat::One => "",
        Repeat::Optional => "?",
        Repeat::ZeroOrMore => "*",
        Repeat::OneOrMore => "+",
    });
    for capture in &item.captures {
        out.push_str(&format!(" @{}", capture.text));
    }
    out
}

fn show_pattern(pattern: &Pattern) -> String {
    let mut out = show(&pattern.item);
    for predicate in &pattern.predicates {
        let args: Vec<_> = predicate
            .args
            .iter()
            .map(|arg| match arg {
                PredicateArg::Capture(name) => format!("@{}", name.text),
                PredicateArg::String(value) => format!("{value:?}"),
            })
            .collect();
        out.push_str(&format!(" #{}[{}]", predicate.name, args.join(" ")));
    }
    out
}

fn parse(source: &str) -> String {
    let parsed = QueryParser::new(source).parse();
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    parsed
        .patterns
        .iter()
        .map(show_pattern)
        .collect::<Vec<_>>()
        .join("\n")
}

fn error(source: &str) -> String {
    let parsed = QueryParser::new(source).parse();
    parsed.diagnostics.first().unwrap().to_string()
}

#[test]
fn node_with_field_and_capture() {
    insta::assert_snapshot!(
        parse("(function_declaraton name: (simple_name) @name)"),
        @"(function_declaraton name: (simple_name) @name)"
    );
}

#[test]
fn several_patterns_and_comments() {
    let source = "
        ; functions
        (function_declaraton) @f
        (class_declaraton) @c @decl
    ";
    insta::assert_snapshot!(parse(source), @r"
    (function_declaraton) @f
    (class_declaraton) @c @decl
    ");
}

#[test]
fn quantifiers_and_anchors() {
    insta::assert_snapshot!(
        parse("(class_body . (field_declaration)* @fields (function_declaraton)+ .)"),
        @"(class_body . (field_declaration)* @fields (function_declaraton)+ .)"
    );
}

#[test]
fn alternation_and_group() {
    insta::assert_snapshot!(
        parse(r#"[(int_literal) (float_literal) "null"] @lit ((simple_name) "=" (_))?"#),
        @r#"
    [(int_literal) (float_literal) "null"] @lit
    {(simple_name) "=" (_)}?
    "#
    );
}

#[test]
fn wildcard_negated_field_and_special_nodes() {
    insta::assert_snapshot!(
        parse(r#"(function_declaraton !parameters _ @any) (ERROR) (MISSING) (MISSING simple_name) (MISSING ";")"#),
        @r#"
    (function_declaraton !parameters _ @any)
    (ERROR)
    (MISSING)
    (MISSING simple_name)
    (MISSING ";")
    "#
    );
}

#[test]
fn predicates_belong_to_pattern() {
    insta::assert_snapshot!(
        parse(r#"((simple_name) @n (#eq? @n "main") (#set! kind fn)) (int_literal)"#),
        @r#"
    {(simple_name) @n} #eq?[@n "main"] #set!["kind" "fn"]
    (int_literal)
    "#
    );
}

#[test]
fn string_escapes() {
    insta::assert_snapshot!(parse(r#""\"""#), @r#""\"""#);
}

#[test]
fn unclosed_node() {
    insta::assert_snapshot!(error("(simple_name"), @"error at 12..12: missing closing `)` (related: opened here at 0..1)");
}

#[test]
fn empty_node() {
    insta::assert_snapshot!(error("()"), @"error at 0..2: empty `()` is not allowed");
}

#[test]
fn bare_identifier() {
    insta::assert_snapshot!(error("simple_name"), @"error at 0..11: bare identifier `simple_name` is not valid");
}

#[test]
fn capture_without_target() {
    insta::assert_snapshot!(error("@x"), @"error at 0..2: capture has no target");
}

#[test]
fn field_at_top_level() {
    insta::assert_snapshot!(error("name: (simple_name)"), @"error at 0..4: unexpected token: a field needs a parent node");
}

#[test]
fn error_node_with_children() {
    insta::assert_snapshot!(error("(ERROR (simple_name))"), @"error at 0..21: `(ERROR)` cannot have children");
}

#[test]
fn predicate_outside_pattern() {
    insta::assert_snapshot!(error(r#"(#eq? @a "b")"#), @"error at 0..1: unexpected token: predicates must be written inside a pattern");
}

#[test]
fn empty_alternation() {
    insta::assert_snapshot!(error("[]"), @"error at 0..2: expected an expression");
}

#[test]
fn unexpected_close() {
    insta::assert_snapshot!(error("(a))"), @"error at 3..4: unexpected token: `)`");
}

#[test]
fn garbage() {
    insta::assert_snapshot!(error("(a) $$"), @"error at 4..6: unrecognized characters");
}
