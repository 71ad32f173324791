use std::io::Write;
use std::path::PathBuf;

use super::{CliError, Input, parse_source};
use zenscript_syntax::ParseError;

#[test]
fn inline_text() {
    let input = Input::new(None, Some("val a = 1;".to_string()));
    assert_eq!(input.read("source").unwrap(), "val a = 1;");
    assert_eq!(input.name(), "<inline>");
}

#[test]
fn file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "function f() {{}}").unwrap();

    let input = Input::new(Some(file.path().to_path_buf()), None);
    assert_eq!(input.read("source").unwrap(), "function f() {}");
    assert_eq!(input.name(), file.path().display().to_string());
}

#[test]
fn stdin_name() {
    let input = Input::new(Some(PathBuf::from("-")), None);
    assert_eq!(input.name(), "<stdin>");
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.zs");
    let err = Input::new(Some(path), None).read("source").unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
    assert!(err.to_string().starts_with("failed to read '"), "{err}");
}

#[test]
fn both_or_neither() {
    let both = Input::new(Some(PathBuf::from("a.zs")), Some("val a = 1;".to_string()));
    insta::assert_snapshot!(
        both.read("source").unwrap_err(),
        @"cannot use both inline text and a positional source"
    );

    let neither = Input::default();
    insta::assert_snapshot!(
        neither.read("query").unwrap_err(),
        @"query required (positional or inline flag)"
    );
}

#[test]
fn parse_timeout_surfaces() {
    let source = "val a = 1;\n".repeat(50_000);
    let mut parser = zenscript_syntax::Parser::with_options(
        zenscript_syntax::ParserOptions::new()
            .with_timeout_micros(1)
            .with_check_interval(1),
    );
    assert_eq!(parser.parse(&source, None).unwrap_err(), ParseError::TimedOut);

    let err = CliError::from(ParseError::TimedOut);
    insta::assert_snapshot!(err, @"parse timed out");
    assert!(parse_source("val a = 1;", 0).is_ok());
}
