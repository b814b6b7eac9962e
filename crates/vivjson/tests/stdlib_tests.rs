//! Tests for the standard library builtins.

use pretty_assertions::assert_eq;
use vivjson::{CollectStringPrint, Config, Input, Object, run, run_with};

fn run_code(source: &str) -> Result<Object, vivjson::Error> {
    run(&[Input::code(source)], &Config::default())
}

fn eval(expr: &str) -> Object {
    run_code(&format!("return({expr})")).unwrap()
}

#[test]
fn int_parses_and_truncates() {
    assert_eq!(eval("int(10)"), Object::Int(10));
    assert_eq!(eval("int(3.9)"), Object::Int(3));
    assert_eq!(eval("int(-3.9)"), Object::Int(-3));
    assert_eq!(eval(r#"int("10")"#), Object::Int(10));
    assert_eq!(eval(r#"int("1.5")"#), Object::Int(1));
    assert_eq!(eval(r#"int("2e3")"#), Object::Int(2000));
    assert!(run_code(r#"return(int("abc"))"#).is_err());
    assert!(run_code("return(int(true))").is_err());
    assert!(run_code("return(int([1]))").is_err());
}

#[test]
fn float_parses_and_widens() {
    assert_eq!(eval("float(3)"), Object::Float(3.0));
    assert_eq!(eval("float(2.5)"), Object::Float(2.5));
    assert_eq!(eval(r#"float("2.5")"#), Object::Float(2.5));
    assert_eq!(eval(r#"float("1e2")"#), Object::Float(100.0));
    assert!(run_code(r#"return(float("abc"))"#).is_err());
    assert!(run_code("return(float(null))").is_err());
}

#[test]
fn string_serializes_canonically() {
    assert_eq!(eval("string(1.0)"), Object::String("1.0".into()));
    assert_eq!(eval("string(1000000.1)"), Object::String("1000000.1".into()));
    assert_eq!(eval("string(42)"), Object::String("42".into()));
    assert_eq!(eval("string(null)"), Object::String("null".into()));
    assert_eq!(eval("string(true)"), Object::String("true".into()));
    assert_eq!(eval(r#"string("x")"#), Object::String("x".into()));
    assert_eq!(eval(r#"string([1, "a", null])"#), Object::String(r#"[1, "a", null]"#.into()));
    assert_eq!(
        eval(r#"string({"a": 1, "b": [2]})"#),
        Object::String(r#"{"a": 1, "b": [2]}"#.into())
    );
}

#[test]
fn len_counts_code_points() {
    assert_eq!(eval(r#"len("αβγ")"#), Object::Int(3));
    assert_eq!(eval(r#"len("")"#), Object::Int(0));
    assert_eq!(eval("len([1, 2, 3])"), Object::Int(3));
    assert_eq!(eval(r#"len({"a": 1, "b": 2})"#), Object::Int(2));
    assert!(run_code("return(len(3))").is_err());
}

#[test]
fn type_names_every_tag() {
    assert_eq!(eval("type(3)"), Object::String("int".into()));
    assert_eq!(eval("type(2.5)"), Object::String("float".into()));
    assert_eq!(eval(r#"type("s")"#), Object::String("string".into()));
    assert_eq!(eval("type(true)"), Object::String("boolean".into()));
    assert_eq!(eval("type(null)"), Object::String("null".into()));
    assert_eq!(eval("type([1])"), Object::String("array".into()));
    assert_eq!(eval(r#"type({"a": 1})"#), Object::String("block".into()));
    assert_eq!(eval("type(len)"), Object::String("function".into()));
    assert_eq!(
        run_code("function f() { }, return(type(f))").unwrap(),
        Object::String("function".into())
    );
}

#[test]
fn insert_writes_back_through_variables() {
    assert_eq!(
        run_code("a = [1, 3], insert(a, 1, 2), return(a)").unwrap(),
        Object::Array(vec![Object::Int(1), Object::Int(2), Object::Int(3)])
    );
    // Negative indices count from the end.
    assert_eq!(
        run_code("a = [1, 2, 3], insert(a, -1, 99), return(a)").unwrap(),
        Object::Array(vec![Object::Int(1), Object::Int(2), Object::Int(99), Object::Int(3)])
    );
    // Appending at the length is allowed; beyond it is not.
    assert_eq!(
        run_code("a = [1], insert(a, 1, 2), return(a)").unwrap(),
        Object::Array(vec![Object::Int(1), Object::Int(2)])
    );
    assert!(run_code("a = [1], insert(a, 5, 9)").is_err());
    assert!(run_code("insert(3, 0, 9)").is_err());
}

#[test]
fn insert_returns_the_modified_array() {
    assert_eq!(
        eval("insert([1, 2], 0, 0)"),
        Object::Array(vec![Object::Int(0), Object::Int(1), Object::Int(2)])
    );
}

#[test]
fn strip_trims_unicode_whitespace() {
    assert_eq!(eval(r#"strip("  x  ")"#), Object::String("x".into()));
    assert_eq!(eval("strip(\"\u{3000}x\u{3000}\")"), Object::String("x".into()));
    assert!(run_code("return(strip(3))").is_err());
}

#[test]
fn print_joins_with_comma_space() {
    let mut print = CollectStringPrint::new();
    let result = run_with(
        &[Input::code(r#"print("a", 1), print(), print(null)"#)],
        &Config::default(),
        &mut print,
    );
    assert!(result.is_ok());
    assert_eq!(print.output(), "a, 1\n\nnull\n");
}

#[test]
fn print_returns_null() {
    assert_eq!(eval(r#"type(print(""))"#), Object::String("null".into()));
}

#[test]
fn builtins_report_arity_errors() {
    assert!(run_code("return(len())").is_err());
    assert!(run_code("return(len(1, 2))").is_err());
    assert!(run_code("return(int())").is_err());
    assert!(run_code("return(insert([1], 0))").is_err());
}

#[test]
fn builtins_can_be_shadowed_by_variables() {
    assert_eq!(run_code("len = 3, return(len)").unwrap(), Object::Int(3));
}
