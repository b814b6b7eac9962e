//! Tests for lex/parse failures and error rendering.

use vivjson::{Config, ErrorKind, Input, run};

fn fail(source: &str) -> vivjson::Error {
    run(&[Input::code(source)], &Config::default()).unwrap_err()
}

#[test]
fn lex_errors_report_the_lexer_stage() {
    for source in [
        "x = \"abc",          // unterminated string
        "x = \"a\\qb\"",      // invalid escape
        "x = \"a\\u12\"",     // short unicode escape
        "/* never closed",    // unterminated block comment
        "x = 3.",             // trailing dot
        "x = 1e",             // empty exponent
        "x = @",              // invalid character
    ] {
        let err = fail(source);
        assert_eq!(err.kind(), ErrorKind::Lexer, "source {source:?}");
    }
}

#[test]
fn parse_errors_report_the_parser_stage() {
    for source in [
        "3 > 2 > 1",          // chained comparison
        "x = (1 + 2",         // unbalanced bracket
        "class = 3",          // reserved word as a name
        "1 + 2 = 3",          // invalid assignment target
        "for (a; b; c; d) { }",
        "x = ",               // missing value
        "if (true)",          // missing body
        "x = .",              // stray scope dot
    ] {
        let err = fail(source);
        assert_eq!(err.kind(), ErrorKind::Parser, "source {source:?}");
    }
}

#[test]
fn evaluate_errors_report_the_evaluator_stage() {
    for source in [
        "return(missing)",
        "return(1 / 0)",
        "return([1] < [2])",
        "x = 3, x()",
    ] {
        let err = fail(source);
        assert_eq!(err.kind(), ErrorKind::Evaluator, "source {source:?}");
    }
}

#[test]
fn messages_carry_the_viv_prefix() {
    let err = fail("x = (1 + 2");
    let plain = err.render(false);
    assert!(plain.starts_with("[Viv] Error: "), "got: {plain}");
    let tagged = err.render(true);
    assert!(tagged.starts_with("[Viv:Parser] Error: "), "got: {tagged}");
}

#[test]
fn messages_point_at_the_offending_line() {
    let err = fail("x = 1\ny = \"abc");
    assert_eq!(err.location().map(|loc| loc.line), Some(2));
    let rendered = err.render(false);
    let mut lines = rendered.lines();
    lines.next();
    // The second line shows the source, the third the caret.
    assert_eq!(lines.next(), Some("y = \"abc"));
    assert!(lines.next().is_some_and(|line| line.trim_end().ends_with('^')));
}

#[test]
fn display_matches_the_plain_rendering() {
    let err = fail("x = (1 + 2");
    assert_eq!(err.to_string(), err.render(false));
}
