use indoc::indoc;

use crate::diagnostics::DiagnosticKind;
use crate::{Node, Parser, ParserOptions, Tree};

fn parse(source: &str) -> Tree {
    Parser::new().parse(source, None).unwrap()
}

fn sexp(source: &str) -> String {
    parse(source).root_node().to_sexp()
}

fn errors(source: &str) -> String {
    parse(source)
        .diagnostics()
        .filtered()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn variable_declaration() {
    insta::assert_snapshot!(sexp("val a = 1;"), @"(script_file (variable_declaration name: (simple_name) value: (primary_expression (int_literal))))");
}

#[test]
fn subtraction_is_left_associative() {
    insta::assert_snapshot!(sexp("a - b - c;"), @"(script_file (expression_statement (binary_expression left: (binary_expression left: (primary_expression (simple_name)) right: (primary_expression (simple_name))) right: (primary_expression (simple_name)))))");
}

#[test]
fn multiplication_binds_tighter() {
    insta::assert_snapshot!(sexp("a + b * c;"), @"(script_file (expression_statement (binary_expression left: (primary_expression (simple_name)) right: (binary_expression left: (primary_expression (simple_name)) right: (primary_expression (simple_name))))))");
}

#[test]
fn conditional_is_right_associative() {
    insta::assert_snapshot!(sexp("x = a ? b : c ? d : e;"), @"(script_file (expression_statement (assignment_expression left: (simple_name) right: (conditional_expression condition: (primary_expression (simple_name)) consequence: (primary_expression (simple_name)) alternative: (conditional_expression condition: (primary_expression (simple_name)) consequence: (primary_expression (simple_name)) alternative: (primary_expression (simple_name)))))))");
}

#[test]
fn member_access_is_assignable() {
    insta::assert_snapshot!(sexp("a.b = 1;"), @"(script_file (expression_statement (assignment_expression left: (member_access_expression object: (primary_expression (simple_name)) member: (member_name)) right: (primary_expression (int_literal)))))");
}

#[test]
fn call_arguments_are_direct_children() {
    insta::assert_snapshot!(sexp("print(1, x);"), @"(script_file (expression_statement (call_expression function: (primary_expression (simple_name)) (primary_expression (int_literal)) (primary_expression (simple_name)))))");
}

#[test]
fn invalid_assignment_target() {
    insta::assert_snapshot!(sexp("1 = 2;"), @"(script_file (expression_statement (primary_expression (int_literal)) (ERROR (primary_expression (int_literal)))))");
    insta::assert_snapshot!(errors("1 = 2;"), @"error at 2..3: invalid assignment target");
}

#[test]
fn function_declaration() {
    insta::assert_snapshot!(
        sexp("function f(a as int) { return a; }"),
        @"(script_file (function_declaraton name: (simple_name) parameters: (parameter_list name: (simple_name)) body: (function_body (return_statement value: (primary_expression (simple_name))))))"
    );
}

#[test]
fn function_without_parameters_has_no_list() {
    insta::assert_snapshot!(sexp("function f() {}"), @"(script_file (function_declaraton name: (simple_name) body: (function_body)))");
}

#[test]
fn class_declaration() {
    let source = indoc! {"
        zenClass Foo {
            var x as int;
            zenConstructor() {}
        }
    "};
    insta::assert_snapshot!(sexp(source), @"(script_file (class_declaraton name: (class_name) body: (class_body (field_declaration name: (simple_name)) (constructor_declaration body: (function_body)))))");
}

#[test]
fn missing_semicolon() {
    insta::assert_snapshot!(sexp("val a = 1"), @r#"(script_file (variable_declaration name: (simple_name) value: (primary_expression (int_literal)) (MISSING ";")))"#);
    insta::assert_snapshot!(errors("val a = 1"), @"error at 9..9: expected `;`");

    let tree = parse("val a = 1");
    let decl = tree.root_node().child(0).unwrap();
    let missing = decl.child(decl.child_count() - 1).unwrap();
    assert!(missing.is_missing());
    assert_eq!(missing.kind(), ";");
    assert_eq!(missing.start_byte(), missing.end_byte());
    assert!(tree.root_node().has_error());
}

#[test]
fn comments_are_extras() {
    let source = indoc! {"
        #priority 10
        // note
        val a = 1; /* trailing */
    "};
    insta::assert_snapshot!(sexp(source), @"(script_file (preprocessor) (comment) (variable_declaration name: (simple_name) value: (primary_expression (int_literal))) (comment))");

    let tree = parse(source);
    let comment = tree.root_node().child(1).unwrap();
    assert!(comment.is_extra());
    assert!(comment.is_named());
}

#[test]
fn unclosed_brace_reports_opening() {
    let tree = parse("function f() {\n  val a = 1;\n");
    assert!(tree.root_node().has_error());
    let kinds: Vec<_> = tree.diagnostics().filtered().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, [DiagnosticKind::UnclosedBrace]);
}

#[test]
fn import_after_declaration() {
    insta::assert_snapshot!(errors("val a = 1;\nimport a.b;"), @"error at 11..17: imports must come before other declarations");
}

#[test]
fn source_round_trips() {
    let sources = [
        "val a = 1;",
        "function f(a as int, b as string) as bool { return a == 1 && b has \"x\"; }",
        "zenClass C extends a.B { val x = [1, 2,]; operator + (o as C) as C; }",
        "for i, v in 0 .. 10 { if i > 2 print(v); else continue; }",
        "$expand IItemStack$damage(n as int) { this.damage = n; }",
        "val m = {a: 1, \"b\": <item:minecraft:stone>.withTag({})};",
        "val broken = (1 +;\n} ` garbage \"unterminated\n/* open",
        "",
    ];
    for source in sources {
        let tree = parse(source);
        assert_eq!(tree.syntax().as_cst().text().to_string(), source);
        assert_eq!(tree.root_node().end_byte() as usize, source.len());
        assert_leaves_cover_source(&tree);
    }
}

fn leaves(node: Node<'_>, out: &mut Vec<(u32, u32, String)>) {
    if node.child_count() == 0 {
        out.push((node.start_byte(), node.end_byte(), node.text().to_string()));
        return;
    }
    for child in node.children() {
        leaves(child, out);
    }
}

/// Leaves in order reproduce the source; only whitespace falls between them.
fn assert_leaves_cover_source(tree: &Tree) {
    let source = tree.text();
    let mut all = Vec::new();
    leaves(tree.root_node(), &mut all);

    let mut at = 0;
    for (start, end, _) in &all {
        let gap = &source[at as usize..*start as usize];
        assert!(gap.trim().is_empty(), "uncovered {gap:?} in {source:?}");
        at = *end;
    }
    assert!(source[at as usize..].trim().is_empty(), "uncovered tail in {source:?}");
}

#[test]
fn bracket_handler_content_is_a_leaf() {
    let tree = parse("x = <a:b> ;");
    let mut all = Vec::new();
    leaves(tree.root_node(), &mut all);
    let texts: Vec<_> = all.iter().map(|(_, _, text)| text.as_str()).collect();
    assert_eq!(texts, ["x", "=", "<", "a:b", ">", ";"]);

    let handler = tree
        .root_node()
        .named_descendant_for_byte_range(5, 8)
        .unwrap();
    assert_eq!(handler.kind(), "bracket_handler_expression");
    let content = handler.child(1).unwrap();
    assert_eq!(content.kind(), "bracket_handler_content");
    assert!(!content.is_named());
    assert_eq!(content.byte_range(), 5..8);
}

#[test]
fn error_contents_are_leaves() {
    let tree = parse("zenClass C { foo ` }");
    let mut all = Vec::new();
    leaves(tree.root_node(), &mut all);
    let texts: Vec<_> = all.iter().map(|(_, _, text)| text.as_str()).collect();
    assert_eq!(texts, ["zenClass", "C", "{", "foo", "`", "}"]);

    let error = tree.root_node().named_descendant_for_byte_range(13, 16).unwrap();
    assert!(error.is_error());
    let kinds: Vec<_> = error.children().map(|c| c.kind()).collect();
    assert_eq!(kinds, ["identifier", "garbage"]);

    let garbage = error.child(1).unwrap();
    assert!(!garbage.is_error());
    assert!(garbage.has_error());
    assert!(!garbage.is_named());
}

#[test]
fn stray_token_before_trailing_trivia() {
    assert_eq!(sexp(")\n"), sexp(")"));
    assert_eq!(sexp(") "), sexp(")"));

    let sources = [
        ")\n",
        ") ",
        "foo ) \n",
        ") // done\n",
        "function f() { ) \n",
        "zenClass C { ) \n",
        "zenClass C { val a = 1; ? \t",
    ];
    for source in sources {
        let tree = parse(source);
        assert!(tree.root_node().has_error(), "{source:?}");
        assert_eq!(tree.syntax().as_cst().text().to_string(), source);
        assert_eq!(tree.root_node().end_byte() as usize, source.len(), "{source:?}");
    }
}

#[test]
fn recursion_limit_wraps_rest_in_error() {
    let source = format!("val a = {}1{};", "(".repeat(40), ")".repeat(40));
    let mut parser = Parser::with_options(ParserOptions::new().with_recursion_limit(16));
    let tree = parser.parse(&source, None).unwrap();

    assert!(tree.root_node().has_error());
    assert!(tree
        .diagnostics()
        .iter()
        .any(|d| d.kind() == DiagnosticKind::NestingTooDeep));
    assert!(!parse(&source).root_node().has_error());
}
