use indoc::indoc;

use super::*;
use crate::{Parser, Point, Tree};

fn parse(source: &str) -> Tree {
    Parser::new().parse(source, None).unwrap()
}

fn query(source: &str) -> Query {
    Query::new(Language::zenscript(), source).unwrap()
}

/// Texts of every capture, one match per entry.
fn run(query: &Query, tree: &Tree) -> Vec<Vec<String>> {
    QueryCursor::new()
        .matches(query, tree.root_node())
        .map(|m| m.captures.iter().map(|c| c.node.text().to_string()).collect())
        .collect()
}

fn texts(query: &Query, tree: &Tree) -> Vec<String> {
    run(query, tree).into_iter().flatten().collect()
}

const CLASS: &str = indoc! {"
    function f() {}
    zenClass C {
        val x = 1;
        function g(a as int) { return a; }
    }
    function h() { f(); }
"};

const THREE_FUNCTIONS: &str = "function f() {}\nfunction g() {}\nfunction h() {}";

#[test]
fn matches_in_document_order() {
    let tree = parse(CLASS);
    let query = query("(function_declaraton name: (_) @name)");
    assert_eq!(texts(&query, &tree), ["f", "g", "h"]);
}

#[test]
fn match_reports_pattern_and_capture() {
    let tree = parse("val a = 1;\nval b = 2.5;");
    let query = query(indoc! {"
        (int_literal) @int
        (float_literal) @float
    "});

    let found: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root_node())
        .map(|m| (m.pattern_index, m.captures[0].index, m.captures[0].node.kind()))
        .collect();
    assert_eq!(found, [(0, 0, "int_literal"), (1, 1, "float_literal")]);
}

#[test]
fn field_with_nested_child() {
    let tree = parse("val a = 1;\nval b = 2.5;");
    let query = query("(variable_declaration value: (primary_expression (int_literal) @v))");
    assert_eq!(texts(&query, &tree), ["1"]);
}

#[test]
fn anonymous_nodes() {
    let tree = parse("val a = 1;\nvar b = 2;");
    let query = query(r#"(variable_declaration "var" @kw name: (_) @name)"#);
    assert_eq!(run(&query, &tree), [["var", "b"]]);
}

#[test]
fn alternation() {
    let tree = parse("val a = 1;\nval b = 2.5;");
    let query = query("[(int_literal) (float_literal)] @lit");
    assert_eq!(texts(&query, &tree), ["1", "2.5"]);
}

#[test]
fn every_placement_of_a_plain_child_is_a_match() {
    let tree = parse(CLASS);
    let query = query("(class_body (_) @member)");
    let kinds: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node.kind())
        .collect();
    assert_eq!(kinds, ["field_declaration", "function_declaraton"]);
}

#[test]
fn anchors() {
    let tree = parse(CLASS);
    let kinds = |source: &str| -> Vec<&'static str> {
        let query = query(source);
        QueryCursor::new()
            .matches(&query, tree.root_node())
            .map(|m| m.captures[0].node.kind())
            .collect()
    };

    // `{` and `}` are anonymous, so they do not block either anchor
    assert_eq!(kinds("(class_body . (_) @first)"), ["field_declaration"]);
    assert_eq!(kinds("(class_body (_) @last .)"), ["function_declaraton"]);
    assert_eq!(
        kinds("(class_body (field_declaration) . (_) @next)"),
        ["function_declaraton"]
    );
}

#[test]
fn quantified_children() {
    let tree = parse(indoc! {"
        zenClass C {
            val x = 1;
            val y = 2;
            var z = 3;
            function g() {}
        }
    "});

    let query = query("(class_body (field_declaration)* @fields (function_declaraton) @fn)");
    let fields = query.capture_index_for_name("fields").unwrap();
    let matches: Vec<_> = QueryCursor::new().matches(&query, tree.root_node()).collect();
    assert_eq!(matches.len(), 1);
    let names: Vec<_> = matches[0]
        .nodes_for_capture_index(fields)
        .map(|n| n.child_by_field_name("name").unwrap().text())
        .collect();
    assert_eq!(names, ["x", "y", "z"]);

    let query = self::query("(class_body (function_declaraton)+ @fn (field_declaration) @late)");
    assert!(run(&query, &tree).is_empty());
}

#[test]
fn optional_child() {
    let tree = parse("function f() {}\nfunction g(a as int) {}");
    let query = query("(function_declaraton name: (_) @name parameters: (parameter_list)? @params)");
    assert_eq!(run(&query, &tree), [vec!["f"], vec!["g", "a as int"]]);
}

#[test]
fn negated_field() {
    let tree = parse(CLASS);
    let query = query("(function_declaraton !parameters name: (_) @name)");
    assert_eq!(texts(&query, &tree), ["f", "h"]);
}

#[test]
fn top_level_group() {
    let tree = parse("val a = 1;\nval b = c;");
    let query = query("((simple_name) . (primary_expression (int_literal)) @value)");
    assert_eq!(texts(&query, &tree), ["1"]);
}

#[test]
fn error_nodes() {
    let tree = parse("1 = 2;");
    let query = query("(ERROR) @e");
    let nodes: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node)
        .collect();
    assert!(!nodes.is_empty());
    assert!(nodes.iter().all(|n| n.is_error()));
}

#[test]
fn missing_nodes() {
    let tree = parse("val a = 1");

    let query = self::query(r#"(MISSING ";") @m"#);
    let nodes: Vec<_> = QueryCursor::new()
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node)
        .collect();
    assert_eq!(nodes.len(), 1);
    assert!(nodes[0].is_missing());
    assert_eq!(nodes[0].byte_range(), 9..9);

    assert_eq!(run(&self::query("(MISSING) @m"), &tree).len(), 1);
    assert!(run(&self::query("(MISSING simple_name) @m"), &tree).is_empty());
}

#[test]
fn byte_range_restriction() {
    let tree = parse(THREE_FUNCTIONS);
    let query = query("(function_declaraton name: (_) @name)");

    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(16..31);
    let names: Vec<_> = cursor
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node.text())
        .collect();
    assert_eq!(names, ["g"]);
}

#[test]
fn point_range_restriction() {
    let tree = parse(THREE_FUNCTIONS);
    let query = query("(function_declaraton name: (_) @name)");

    let mut cursor = QueryCursor::new();
    cursor.set_point_range(Point::new(2, 0)..Point::new(3, 0));
    let names: Vec<_> = cursor
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node.text())
        .collect();
    assert_eq!(names, ["h"]);
}

#[test]
fn range_start_excludes_node_ending_there() {
    let tree = parse("val a = 1;val b = 2;");
    let query = query("(variable_declaration name: (_) @name)");

    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(10..20);
    let names: Vec<_> = cursor
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node.text())
        .collect();
    assert_eq!(names, ["b"]);

    let mut cursor = QueryCursor::new();
    cursor.set_point_range(Point::new(0, 10)..Point::new(0, 20));
    let names: Vec<_> = cursor
        .matches(&query, tree.root_node())
        .map(|m| m.captures[0].node.text())
        .collect();
    assert_eq!(names, ["b"]);
}

#[test]
fn empty_node_inside_range() {
    let tree = parse("val a = 1");
    let query = query(r#"(MISSING ";") @m"#);

    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(8..10);
    assert_eq!(cursor.matches(&query, tree.root_node()).count(), 1);

    cursor.set_byte_range(0..9);
    assert_eq!(cursor.matches(&query, tree.root_node()).count(), 0);
}

#[test]
fn matches_below_a_node() {
    let tree = parse(CLASS);
    let class = tree.root_node().child(1).unwrap();
    let query = query("(function_declaraton name: (_) @name)");
    let names: Vec<_> = QueryCursor::new()
        .matches(&query, class)
        .map(|m| m.captures[0].node.text())
        .collect();
    assert_eq!(names, ["g"]);
}

#[test]
fn disabled_capture() {
    let tree = parse(THREE_FUNCTIONS);
    let mut query = query("(function_declaraton name: (simple_name) @name) @fn");
    query.disable_capture("fn");
    query.disable_capture("unknown");

    assert_eq!(run(&query, &tree), [["f"], ["g"], ["h"]]);
    assert_eq!(query.capture_count(), 2);
}

#[test]
fn disabled_pattern() {
    let tree = parse("val a = 1;\nval b = 2.5;");
    let mut query = query("(int_literal) @int\n(float_literal) @float");
    query.disable_pattern(0);
    query.disable_pattern(7);
    assert_eq!(texts(&query, &tree), ["2.5"]);
}

#[test]
fn captures_in_document_order() {
    let tree = parse("function f() {}\nfunction g() {}");
    let query = query(indoc! {"
        (function_declaraton name: (simple_name) @name body: (function_body) @body) @fn
        (function_body) @inner
    "});

    let order: Vec<_> = QueryCursor::new()
        .captures(&query, tree.root_node())
        .map(|(m, i)| {
            let capture = m.captures[i];
            format!(
                "{}@{}",
                query.capture_name(capture.index).unwrap(),
                capture.node.start_byte()
            )
        })
        .collect();
    insta::assert_snapshot!(order.join(" "), @"fn@0 name@9 body@13 inner@13 fn@16 name@25 body@29 inner@29");
}

#[test]
fn captures_release_finished_matches() {
    let source = "val a = 1;\n".repeat(500);
    let tree = parse(&source);
    let query = query("(variable_declaration name: (_) @name value: (_) @value) @decl");

    let mut cursor = QueryCursor::new();
    let mut captures = cursor.captures(&query, tree.root_node());
    let mut seen = 0;
    let mut most_buffered = 0;
    while let Some((m, i)) = captures.next() {
        assert!(i < m.captures.len());
        seen += 1;
        most_buffered = most_buffered.max(captures.buffered_len());
    }
    assert_eq!(seen, 1500);
    assert!(most_buffered <= 2, "kept {most_buffered} matches alive");
    assert_eq!(captures.buffered_len(), 0);
}

#[test]
fn match_limit() {
    let mut source = String::from("zenClass C {\n");
    for i in 0..10 {
        source.push_str(&format!("    val a{i} = {i};\n"));
    }
    source.push('}');
    let tree = parse(&source);
    let query = query("(class_body (_) @a (_) @b)");

    // every ordered pair of members
    let mut cursor = QueryCursor::new();
    assert_eq!(cursor.match_limit(), DEFAULT_MATCH_LIMIT);
    assert_eq!(cursor.matches(&query, tree.root_node()).count(), 45);
    assert!(!cursor.did_exceed_match_limit());

    cursor.set_match_limit(4);
    assert_eq!(cursor.matches(&query, tree.root_node()).count(), 4);
    assert!(cursor.did_exceed_match_limit());

    cursor.set_match_limit(0);
    assert_eq!(cursor.match_limit(), 1);
}

#[test]
fn capture_record_json() {
    let tree = parse("function f() {}");
    let query = query("(function_declaraton name: (_) @name)");
    let found = QueryCursor::new()
        .matches(&query, tree.root_node())
        .next()
        .unwrap();

    let record = CaptureRecord::new(&query, found.pattern_index, &found.captures[0]);
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        serde_json::json!({
            "pattern": 0,
            "capture": "name",
            "kind": "simple_name",
            "start_byte": 9,
            "end_byte": 10,
            "start": { "row": 0, "column": 9 },
            "end": { "row": 0, "column": 10 },
            "text": "f",
        })
    );
}
