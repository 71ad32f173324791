use super::parse_source;
use super::tree::dump_tree;

#[test]
fn named_nodes() {
    let tree = parse_source("val a = 1;", 0).unwrap();
    insta::assert_snapshot!(dump_tree(&tree, false, false), @r#"
    (script_file
      (variable_declaration
        name: (simple_name "a")
        value: (primary_expression
          (int_literal "1"))))
    "#);
}

#[test]
fn raw_includes_anonymous_nodes() {
    let tree = parse_source("val a = 1;", 0).unwrap();
    insta::assert_snapshot!(dump_tree(&tree, true, false), @r#"
    (script_file
      (variable_declaration
        ("val")
        name: (simple_name "a")
        ("=")
        value: (primary_expression
          (int_literal "1"))
        (";")))
    "#);
}

#[test]
fn spans() {
    let tree = parse_source("val a = 1;", 0).unwrap();
    insta::assert_snapshot!(dump_tree(&tree, false, true), @r#"
    (script_file [0:0-0:10]
      (variable_declaration [0:0-0:10]
        name: (simple_name "a") [0:4-0:5]
        value: (primary_expression [0:8-0:9]
          (int_literal "1") [0:8-0:9])))
    "#);
}

#[test]
fn missing_nodes() {
    let tree = parse_source("val a = 1", 0).unwrap();
    insta::assert_snapshot!(dump_tree(&tree, true, false), @r#"
    (script_file
      (variable_declaration
        ("val")
        name: (simple_name "a")
        ("=")
        value: (primary_expression
          (int_literal "1"))
        (MISSING ";")))
    "#);
}

#[test]
fn escapes_text() {
    let tree = parse_source("val s = \"a\\tb\";", 0).unwrap();
    let dump = dump_tree(&tree, false, false);
    assert!(dump.contains(r#"(string_literal "\"a\\tb\"")"#), "{dump}");
}
