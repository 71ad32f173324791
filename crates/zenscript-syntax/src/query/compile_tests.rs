use indoc::indoc;

use super::*;

fn query(source: &str) -> Query {
    Query::new(Language::zenscript(), source).unwrap()
}

fn error(source: &str) -> QueryError {
    Query::new(Language::zenscript(), source).unwrap_err()
}

#[test]
fn empty_query() {
    let query = query("; nothing here\n");
    assert_eq!(query.pattern_count(), 0);
    assert_eq!(query.capture_count(), 0);
}

#[test]
fn captures_are_shared_across_patterns() {
    let query = query(indoc! {"
        (function_declaraton name: (simple_name) @name body: (function_body) @body)
        (class_declaraton name: (class_name) @name)
    "});

    assert_eq!(query.pattern_count(), 2);
    assert_eq!(query.capture_names().collect::<Vec<_>>(), ["name", "body"]);
    assert_eq!(query.capture_index_for_name("body"), Some(1));
    assert_eq!(query.capture_index_for_name("nope"), None);
    assert_eq!(query.capture_name(1), Some("body"));
    assert_eq!(query.capture_name(2), None);

    assert_eq!(query.start_byte_for_pattern(0), Some(0));
    assert_eq!(query.start_byte_for_pattern(1), Some(76));
    assert_eq!(query.end_byte_for_pattern(1), Some(119));
    assert_eq!(query.start_byte_for_pattern(2), None);

    assert_eq!(query.capture_quantifier(0, 1), CaptureQuantifier::One);
    assert_eq!(query.capture_quantifier(1, 1), CaptureQuantifier::Zero);
    assert_eq!(
        query.capture_quantifiers(1),
        [CaptureQuantifier::One, CaptureQuantifier::Zero]
    );
}

#[test]
fn quantifiers() {
    let cases = [
        ("(class_body (field_declaration) @f)", CaptureQuantifier::One),
        ("(class_body (field_declaration)? @f)", CaptureQuantifier::ZeroOrOne),
        ("(class_body (field_declaration)* @f)", CaptureQuantifier::ZeroOrMore),
        ("(class_body (field_declaration)+ @f)", CaptureQuantifier::OneOrMore),
        ("[(int_literal) @f (float_literal)]", CaptureQuantifier::ZeroOrOne),
        ("[(int_literal) @f (float_literal) @f]", CaptureQuantifier::One),
        ("(binary_expression (primary_expression) @f (primary_expression) @f)", CaptureQuantifier::OneOrMore),
        ("(class_body ((field_declaration) @f (function_declaraton))*)", CaptureQuantifier::ZeroOrMore),
        ("(class_body ((field_declaration)? @f)+)", CaptureQuantifier::ZeroOrMore),
    ];
    for (source, expected) in cases {
        assert_eq!(query(source).capture_quantifier(0, 0), expected, "{source}");
    }
}

#[test]
fn rooted_and_non_local_patterns() {
    let query = query(indoc! {"
        (simple_name)
        [(int_literal) (float_literal)]
        ((simple_name) (primary_expression))
        (simple_name)+
        [(int_literal) ((simple_name) (int_literal))]
    "});

    let rooted: Vec<_> = (0..query.pattern_count())
        .map(|i| query.is_pattern_rooted(i))
        .collect();
    assert_eq!(rooted, [true, true, false, false, false]);
    assert!(query.is_pattern_non_local(2));
    assert!(!query.is_pattern_non_local(0));
}

#[test]
fn single_item_group_is_the_item() {
    let query = query("((simple_name) @n)");
    assert!(query.is_pattern_rooted(0));
    assert_eq!(query.capture_quantifier(0, 0), CaptureQuantifier::One);
}

#[test]
fn guaranteed_steps() {
    // steps start at 0, 21 and 41
    let optional_body = query("(function_declaraton name: (simple_name) body: (function_body)?)");
    assert!(!optional_body.is_pattern_guaranteed_at_step(0));
    assert!(optional_body.is_pattern_guaranteed_at_step(21));
    assert!(optional_body.is_pattern_guaranteed_at_step(41));
    assert!(!optional_body.is_pattern_guaranteed_at_step(5));

    // steps inside an alternation never are
    let alternation = query("(return_statement [(int_literal) (simple_name)])");
    assert!(!alternation.is_pattern_guaranteed_at_step(18));
    assert!(!alternation.is_pattern_guaranteed_at_step(19));
    assert!(!alternation.is_pattern_guaranteed_at_step(33));
}

#[test]
fn predicates() {
    let query = query(r#"((simple_name) @n (#eq? @n "main") (#match? @n "^get"))"#);

    assert_eq!(
        query.predicates_for_pattern(0),
        [
            PredicateStep::String(0),
            PredicateStep::Capture(0),
            PredicateStep::String(1),
            PredicateStep::Done,
            PredicateStep::String(2),
            PredicateStep::Capture(0),
            PredicateStep::String(3),
            PredicateStep::Done,
        ]
    );
    assert_eq!(query.string_count(), 4);
    assert_eq!(query.string_value(1), Some("main"));
    assert_eq!(query.string_value(4), None);

    let decoded = query.general_predicates(0);
    assert_eq!(decoded.len(), 2);
    assert_eq!(&*decoded[1].operator, "match?");
    assert_eq!(
        decoded[0].args,
        [
            QueryPredicateArg::Capture(0),
            QueryPredicateArg::String("main".into())
        ]
    );
    assert!(query.general_predicates(1).is_empty());
}

#[test]
fn pattern_end_includes_predicates() {
    let source = r#"((simple_name) @n (#eq? @n "x"))"#;
    let query = query(source);
    assert_eq!(query.end_byte_for_pattern(0), Some(source.len()));
}

#[test]
fn unknown_node_type() {
    let err = error("(simple_name)\n  (bogus)");
    assert_eq!(err.kind, QueryErrorKind::NodeType);
    assert_eq!((err.offset, err.row, err.column), (17, 1, 3));
    insta::assert_snapshot!(err, @"node type error at 1:3: unknown node type `bogus`");
}

#[test]
fn unknown_anonymous_node() {
    let err = error(r#"(variable_declaration "nope")"#);
    assert_eq!(err.kind, QueryErrorKind::NodeType);
    assert_eq!(err.offset, 22);
    insta::assert_snapshot!(err.message, @r#"unknown node type `"nope"`"#);
}

#[test]
fn hidden_kinds_are_unknown() {
    assert_eq!(error("(_parameter_decl)").kind, QueryErrorKind::Syntax);
    assert_eq!(error("(function_declaration)").kind, QueryErrorKind::NodeType);
}

#[test]
fn unknown_field() {
    let err = error("(function_declaraton nam: (simple_name))");
    assert_eq!(err.kind, QueryErrorKind::Field);
    assert_eq!(err.offset, 21);
    insta::assert_snapshot!(err.message, @"unknown field `nam`");

    let err = error("(function_declaraton !nam)");
    assert_eq!(err.kind, QueryErrorKind::Field);
    assert_eq!(err.offset, 22);
}

#[test]
fn undefined_capture_in_predicate() {
    let err = error(r#"((simple_name) @n (#eq? @b "x"))"#);
    assert_eq!(err.kind, QueryErrorKind::Capture);
    assert_eq!(err.offset, 24);
    insta::assert_snapshot!(err.message, @"undefined capture `@b`");

    // a capture of another pattern does not count
    let err = error(indoc! {r#"
        (int_literal) @b
        ((simple_name) @n (#eq? @b "x"))
    "#});
    assert_eq!(err.kind, QueryErrorKind::Capture);
}

#[test]
fn structure_errors() {
    let cases = [
        ("((simple_name) (int_literal)) @g", 30),
        ("(function_declaraton body: ((function_body)))", 21),
        ("(class_body ((field_declaration) !name))", 33),
        ("(class_body ((field_declaration) .))", 33),
    ];
    for (source, offset) in cases {
        let err = error(source);
        assert_eq!(err.kind, QueryErrorKind::Structure, "{source}");
        assert_eq!(err.offset, offset, "{source}");
    }
}

#[test]
fn syntax_error() {
    let err = error("(simple_name");
    assert_eq!(err.kind, QueryErrorKind::Syntax);
    assert_eq!(err.offset, 12);
    insta::assert_snapshot!(err, @"syntax error at 0:12: missing closing `)`");
}

#[test]
fn one_bad_pattern_rejects_all() {
    assert!(Query::new(Language::zenscript(), "(simple_name) (bogus) (int_literal)").is_err());
}
