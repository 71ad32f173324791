use zenscript_syntax::query::{Query, QueryCursor};
use zenscript_syntax::Language;

use super::parse_source;
use super::query::collect_captures;

const SOURCE: &str = "function f() {}\nfunction g(a as int) {}\nval x = 1;";

fn query(text: &str) -> Query {
    Query::new(Language::zenscript(), text).unwrap()
}

#[test]
fn records_in_document_order() {
    let tree = parse_source(SOURCE, 0).unwrap();
    let query = query("(function_declaraton name: (_) @name)\n(int_literal) @int");

    let records = collect_captures(&query, &tree, &mut QueryCursor::new());
    let summary: Vec<_> = records
        .iter()
        .map(|r| format!("{}:{}:{}", r.pattern, r.capture, r.text))
        .collect();
    assert_eq!(summary, ["0:name:f", "0:name:g", "1:int:1"]);
}

#[test]
fn compact_json() {
    let tree = parse_source(SOURCE, 0).unwrap();
    let query = query("(int_literal) @int");

    let records = collect_captures(&query, &tree, &mut QueryCursor::new());
    insta::assert_snapshot!(
        serde_json::to_string(&records).unwrap(),
        @r#"[{"pattern":0,"capture":"int","kind":"int_literal","start_byte":48,"end_byte":49,"start":{"row":2,"column":8},"end":{"row":2,"column":9},"text":"1"}]"#
    );
}

#[test]
fn byte_range() {
    let tree = parse_source(SOURCE, 0).unwrap();
    let query = query("(function_declaraton name: (_) @name)");

    let mut cursor = QueryCursor::new();
    cursor.set_byte_range(16..39);
    let records = collect_captures(&query, &tree, &mut cursor);
    let names: Vec<_> = records.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(names, ["g"]);
}

#[test]
fn no_matches_is_empty_array() {
    let tree = parse_source(SOURCE, 0).unwrap();
    let query = query("(class_declaraton) @class");
    let records = collect_captures(&query, &tree, &mut QueryCursor::new());
    assert_eq!(serde_json::to_string(&records).unwrap(), "[]");
}
