use super::check::render_diagnostics;
use super::parse_source;

#[test]
fn valid_source_is_silent() {
    let tree = parse_source("val a = 1;\nfunction f() { return a; }", 0).unwrap();
    assert_eq!(render_diagnostics(&tree, "ok.zs", false), None);
}

#[test]
fn reports_errors_with_path_and_message() {
    let tree = parse_source("val a = 1\nval b = 2;", 0).unwrap();
    let report = render_diagnostics(&tree, "broken.zs", false).unwrap();
    assert!(report.contains("broken.zs"), "{report}");
    assert!(report.contains("expected `;`"), "{report}");
}

#[test]
fn plain_output_has_no_escapes() {
    let tree = parse_source("zenClass C {", 0).unwrap();
    let report = render_diagnostics(&tree, "c.zs", false).unwrap();
    assert!(!report.contains('\u{1b}'), "{report}");
}
