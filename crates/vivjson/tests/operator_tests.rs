//! Script-level tests for the operator decision tables.

use pretty_assertions::assert_eq;
use vivjson::{CollectStringPrint, Config, Input, Object, run, run_with};

fn run_code(source: &str) -> Result<Object, vivjson::Error> {
    run(&[Input::code(source)], &Config::default())
}

fn eval(expr: &str) -> Object {
    run_code(&format!("return({expr})")).unwrap()
}

#[test]
fn string_division_splits() {
    assert_eq!(
        eval(r#""a,b,c" / ",""#),
        Object::Array(vec![
            Object::String("a".into()),
            Object::String("b".into()),
            Object::String("c".into()),
        ])
    );
    assert_eq!(
        eval(r#""aXXXb" / "XX""#),
        Object::Array(vec![Object::String("a".into()), Object::String("Xb".into())])
    );
    // An empty delimiter splits into code points.
    assert_eq!(
        eval(r#""αβγ" / """#),
        Object::Array(vec![
            Object::String("α".into()),
            Object::String("β".into()),
            Object::String("γ".into()),
        ])
    );
}

#[test]
fn array_plus_wraps_the_right_array() {
    assert_eq!(
        eval("[1] + [2, 3]"),
        Object::Array(vec![
            Object::Int(1),
            Object::Array(vec![Object::Int(2), Object::Int(3)]),
        ])
    );
    // The testable length law: appending one element grows len by one.
    assert_eq!(eval("len([1, 2] + [9])"), Object::Int(3));
    assert_eq!(eval("len([1, 2] + 9)"), Object::Int(3));
}

#[test]
fn block_and_array_addition_prepends_the_block() {
    let expected = Object::Array(vec![
        Object::from_json(r#"{"k": 1}"#).unwrap(),
        Object::Int(2),
        Object::Int(3),
    ]);
    // The Block leads in either order.
    assert_eq!(eval(r#"{"k": 1} + [2, 3]"#), expected);
    assert_eq!(eval(r#"[2, 3] + {"k": 1}"#), expected);
}

#[test]
fn block_multiplication_is_pointwise() {
    assert_eq!(
        eval(r#"{"a": 2, "b": 3} * {"b": 4, "c": 5}"#),
        Object::from_json(r#"{"a": 2, "b": 12, "c": null}"#).unwrap()
    );
}

#[test]
fn float_repetition_counts_truncate() {
    assert_eq!(
        eval("[1] * 2.9"),
        Object::Array(vec![Object::Int(1), Object::Int(1)])
    );
    assert_eq!(eval("[1] * -2"), Object::Array(vec![]));
    assert_eq!(eval(r#""x" * -1"#), Object::String(String::new()));
}

#[test]
fn assignment_deep_copies_containers() {
    assert_eq!(
        run_code("a = [1, [2]], b = a, b[1][0] = 99, return(a)").unwrap(),
        Object::Array(vec![Object::Int(1), Object::Array(vec![Object::Int(2)])])
    );
    assert_eq!(
        run_code(r#"a = {"x": {"y": 1}}, b = a, b.x.y = 99, return(a.x.y)"#).unwrap(),
        Object::Int(1)
    );
}

#[test]
fn string_concatenation_stringifies_the_right_side() {
    assert_eq!(eval(r#""n=" + 1"#), Object::String("n=1".into()));
    assert_eq!(eval(r#""f=" + 1.0"#), Object::String("f=1.0".into()));
    assert_eq!(eval(r#""b=" + true"#), Object::String("b=true".into()));
    assert_eq!(eval(r#""a=" + [1, "x"]"#), Object::String(r#"a=[1, "x"]"#.into()));
}

#[test]
fn block_merge_sums_matching_keys() {
    assert_eq!(
        eval(r#"{"a": 1, "b": 2} + {"b": 10, "c": 3}"#),
        Object::from_json(r#"{"a": 1, "b": 12, "c": 3}"#).unwrap()
    );
}

#[test]
fn block_minus_block_cancels() {
    assert_eq!(eval(r#"{"a": 1, "b": 2} - {"a": 1, "b": 2}"#), Object::from_json("{}").unwrap());
    assert_eq!(
        eval(r#"{"a": 1, "b": 5} - {"b": 2, "c": 3}"#),
        Object::from_json(r#"{"a": 1, "b": 3, "c": -3}"#).unwrap()
    );
}

#[test]
fn block_minus_names_deletes_keys() {
    assert_eq!(
        eval(r#"{"a": 1, "b": 2, "c": 3} - ["a", "c"]"#),
        Object::from_json(r#"{"b": 2}"#).unwrap()
    );
    assert_eq!(
        eval(r#"{"a": 1, "b": 2} - "a""#),
        Object::from_json(r#"{"b": 2}"#).unwrap()
    );
    assert!(run_code(r#"return({"a": 1} - [2])"#).is_err());
}

#[test]
fn array_minus_deletes_equal_elements() {
    assert_eq!(
        eval("[1, 2, 1, 3] - 1"),
        Object::Array(vec![Object::Int(2), Object::Int(3)])
    );
    assert_eq!(
        eval("[1, null, 2] - null"),
        Object::Array(vec![Object::Int(1), Object::Int(2)])
    );
}

#[test]
fn string_minus_deletes_occurrences() {
    assert_eq!(eval(r#""banana" - "an""#), Object::String("ba".into()));
    assert_eq!(eval(r#""banana" - ["a", "n"]"#), Object::String("b".into()));
}

#[test]
fn repetition_and_joining() {
    assert_eq!(
        eval("[1, 2] * 2"),
        Object::Array(vec![Object::Int(1), Object::Int(2), Object::Int(1), Object::Int(2)])
    );
    assert_eq!(eval("[9] * 0"), Object::Array(vec![]));
    assert_eq!(eval(r#""ab" * 3"#), Object::String("ababab".into()));
    assert_eq!(eval(r#"[1, "a", 2.5] * "-""#), Object::String("1-a-2.5".into()));
    assert_eq!(eval(r#""," * [1, 2]"#), Object::String("1,2".into()));
}

#[test]
fn division_prefers_integer_results() {
    assert_eq!(eval("6 / 3"), Object::Int(2));
    assert_eq!(eval("7 / 2"), Object::Float(3.5));
    assert_eq!(eval("7.0 / 3.5"), Object::Int(2));
    assert!(run_code("return(1 / 0)").is_err());
    assert!(run_code("return(1.0 / 0.0)").is_err());
}

#[test]
fn modulo_follows_the_divisor_sign() {
    assert_eq!(eval("-10 % 3"), Object::Int(2));
    assert_eq!(eval("10 % -3"), Object::Int(-2));
    assert_eq!(eval("10 % 3"), Object::Int(1));
    assert!(run_code("return(10 % 0)").is_err());
}

#[test]
fn integer_modulo_law_holds() {
    // (a / b) * b + (a % b) == a whenever the division is exact in Int.
    for (a, b) in [(12, 3), (-12, 3), (12, -3), (-12, -3)] {
        let out = run_code(&format!("return(({a} / {b}) * {b} + ({a} % {b}))")).unwrap();
        assert_eq!(out, Object::Int(a));
    }
}

#[test]
fn integer_overflow_is_an_error() {
    assert!(run_code("return(9223372036854775807 + 1)").is_err());
    assert!(run_code("return(-9223372036854775807 - 2)").is_err());
}

#[test]
fn null_corner_cases_follow_the_tables() {
    assert_eq!(eval("null + 3"), Object::Int(3));
    assert_eq!(eval("3 + null"), Object::Int(3));
    assert_eq!(eval("[1] + null").to_json_string(), "[1,null]");
    assert_eq!(eval("3 - null"), Object::Int(3));
    assert!(run_code("return(null - 3)").is_err());
    assert_eq!(eval("type(null * 99)"), Object::String("null".into()));
    assert_eq!(eval("type(null / 3)"), Object::String("null".into()));
    assert!(run_code("return(null / 0)").is_err());
    assert!(run_code("return(null / null)").is_err());
    assert_eq!(eval("type(null % 3)"), Object::String("null".into()));
    assert!(run_code("return(null % null)").is_err());
}

#[test]
fn bool_arithmetic_is_truthiness_or() {
    assert_eq!(eval("true + 0"), Object::Bool(true));
    assert_eq!(eval("false + 0"), Object::Bool(false));
    assert_eq!(eval("false + 7"), Object::Bool(true));
    assert!(run_code("return(true - 1)").is_err());
    assert!(run_code("return(true * 1)").is_err());
}

#[test]
fn comparisons_are_numeric_only() {
    assert_eq!(eval("3 < 3.5"), Object::Bool(true));
    assert_eq!(eval("3 >= 3"), Object::Bool(true));
    assert!(run_code(r#"return("a" < "b")"#).is_err());
    assert!(run_code("return([1] < [2])").is_err());
}

#[test]
fn equality_is_structural_for_same_tags() {
    assert_eq!(eval("[1, [2, 3]] == [1, [2, 3]]"), Object::Bool(true));
    assert_eq!(eval(r#"{"a": 1, "b": 2} == {"b": 2, "a": 1}"#), Object::Bool(true));
    assert_eq!(eval("[1] != [2]"), Object::Bool(true));
    // Differently tagged operands compare by truthiness.
    assert_eq!(eval("1 == 1.0"), Object::Bool(true));
    assert_eq!(eval(r#"0 == """#), Object::Bool(true));
    assert_eq!(eval(r#"1 == """#), Object::Bool(false));
}

#[test]
fn membership_shapes() {
    assert_eq!(eval(r#""an" in "banana""#), Object::Bool(true));
    assert_eq!(eval("2 in [1, 2, 3]"), Object::Bool(true));
    assert_eq!(eval("[2] in [1, [2], 3]"), Object::Bool(true));
    assert_eq!(eval(r#"{"a": 1} in {"a": 1, "b": 2}"#), Object::Bool(true));
    assert_eq!(eval(r#""a" in {"a": 1}"#), Object::Bool(true));
    assert_eq!(eval(r#"1 in {"a": 1}"#), Object::Bool(true));
    assert!(run_code("return(1 in 2)").is_err());
}

#[test]
fn truthiness_is_total() {
    assert_eq!(
        eval(r#"[not not 5, not not 0, not not "", not not [1], not not {}, not not null]"#),
        Object::Array(vec![
            Object::Bool(true),
            Object::Bool(false),
            Object::Bool(false),
            Object::Bool(true),
            Object::Bool(false),
            Object::Bool(false),
        ])
    );
}

#[test]
fn logical_operators_short_circuit() {
    let mut print = CollectStringPrint::new();
    let result = run_with(
        &[Input::code(concat!(
            "function touch() { print(\"touched\"), return(true) }, ",
            "a = true or touch(), b = false and touch(), return([a, b])",
        ))],
        &Config::default(),
        &mut print,
    );
    assert_eq!(
        result.unwrap(),
        Object::Array(vec![Object::Bool(true), Object::Bool(false)])
    );
    // Neither side effect ran.
    assert_eq!(print.output(), "");
}

#[test]
fn logical_operators_return_bools() {
    assert_eq!(eval("3 and 5"), Object::Bool(true));
    assert_eq!(eval("0 or [1]"), Object::Bool(true));
    assert_eq!(eval("0 or []"), Object::Bool(false));
}

#[test]
fn unary_operators_are_numeric_only() {
    assert_eq!(eval("-3"), Object::Int(-3));
    assert_eq!(eval("- -3"), Object::Int(3));
    assert_eq!(eval("+2.5"), Object::Float(2.5));
    assert!(run_code(r#"return(-"a")"#).is_err());
}

#[test]
fn compound_assignments_apply_the_tables() {
    assert_eq!(
        run_code(r#"s = "a", s += 1, return(s)"#).unwrap(),
        Object::String("a1".into())
    );
    assert_eq!(run_code("n = 10, n %= 3, return(n)").unwrap(), Object::Int(1));
    assert_eq!(
        run_code("a = [1, 2], a -= 1, return(a)").unwrap(),
        Object::Array(vec![Object::Int(2)])
    );
}
