use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedExpression, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    insta::assert_snapshot!(diagnostics.first().unwrap().message(), @"expected an expression");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedToken, range(3, 4))
        .message("`;`")
        .emit();
    diagnostics
        .report(DiagnosticKind::BareIdentifier, range(0, 3))
        .message("foo")
        .emit();

    let messages: Vec<_> = diagnostics.iter().map(Diagnostic::message).collect();
    assert_eq!(messages, ["expected `;`", "bare identifier `foo` is not valid"]);
}

#[test]
fn unclosed_delimiter_keeps_related_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedBrace, range(10, 10))
        .related_to("opened here", range(2, 3))
        .emit();

    let diagnostic = diagnostics.first().unwrap();
    assert_eq!(diagnostic.related().len(), 1);
    insta::assert_snapshot!(
        diagnostic.to_string(),
        @"error at 10..10: missing closing `}` (related: opened here at 2..3)"
    );
}

#[test]
fn root_cause_suppresses_structural_error_at_same_position() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedParen, range(5, 5))
        .emit();
    diagnostics
        .report(DiagnosticKind::ExpectedExpression, range(5, 5))
        .emit();

    let filtered = diagnostics.filtered();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].kind(), DiagnosticKind::ExpectedExpression);
}

#[test]
fn wide_suppression_range_hides_cascade() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedBrace, range(0, 1))
        .suppression_range(range(0, 20))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(4, 6))
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(30, 31))
        .emit();

    let kept: Vec<_> = diagnostics.filtered().iter().map(|d| d.range()).collect();
    assert_eq!(kept, [range(0, 1), range(30, 31)]);
}

#[test]
fn render_shows_snippet_with_path() {
    let source = "val a = ;";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedExpression, range(8, 8))
        .emit();

    let rendered = diagnostics.render(source, "a.zs", false);
    assert!(rendered.contains("expected an expression"), "{rendered}");
    assert!(rendered.contains("a.zs"), "{rendered}");
    assert!(rendered.contains("val a = ;"), "{rendered}");
}

#[test]
fn render_marks_related_span() {
    let source = "function f() {\n";
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedBrace, range(15, 15))
        .related_to("opened here", range(13, 14))
        .emit();

    let rendered = diagnostics.render(source, "f.zs", false);
    assert!(rendered.contains("opened here"), "{rendered}");
    assert!(!rendered.contains('\u{1b}'), "{rendered}");
}

#[test]
fn extend_and_iterate() {
    let mut a = Diagnostics::new();
    a.report(DiagnosticKind::ExpectedType, range(0, 1)).emit();
    let mut b = Diagnostics::new();
    b.report(DiagnosticKind::ExpectedName, range(2, 3)).emit();

    a.extend(b.iter().cloned());
    let kinds: Vec<_> = (&a).into_iter().map(Diagnostic::kind).collect();
    assert_eq!(kinds, [DiagnosticKind::ExpectedType, DiagnosticKind::ExpectedName]);
    assert!(!a.is_empty());
}
