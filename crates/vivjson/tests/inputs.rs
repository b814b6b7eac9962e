//! Tests for passing host values into runs and reading them back.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use vivjson::{Config, Input, Object, run};

fn variables(pairs: &[(&str, Object)]) -> Input {
    let map: IndexMap<String, Object> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect();
    Input::variables(map)
}

fn echo(value: Object) -> Object {
    run(
        &[variables(&[("x", value)]), Input::code("return(x)")],
        &Config::default(),
    )
    .unwrap()
}

#[test]
fn input_int() {
    assert_eq!(echo(Object::Int(42)), Object::Int(42));
}

#[test]
fn input_int_arithmetic() {
    let result = run(
        &[variables(&[("x", Object::Int(41))]), Input::code("return(x + 1)")],
        &Config::default(),
    );
    assert_eq!(result.unwrap(), Object::Int(42));
}

#[test]
fn input_bool() {
    assert_eq!(echo(Object::Bool(true)), Object::Bool(true));
    assert_eq!(echo(Object::Bool(false)), Object::Bool(false));
}

#[test]
fn input_float() {
    assert_eq!(echo(Object::Float(2.5)), Object::Float(2.5));
}

#[test]
fn input_null() {
    assert_eq!(echo(Object::Null), Object::Null);
}

#[test]
fn input_string() {
    assert_eq!(echo(Object::String("héllo".into())), Object::String("héllo".into()));
}

#[test]
fn input_nested_containers() {
    let value = Object::from_json(r#"{"list": [1, {"deep": [null, true]}], "n": 2.5}"#).unwrap();
    assert_eq!(echo(value.clone()), value);
}

#[test]
fn map_inputs_keep_key_order() {
    let value = Object::from_json(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    let result = run(
        &[
            variables(&[("x", value)]),
            Input::code("keys = [], for (pair in x) { keys += pair[0] }, return(keys)"),
        ],
        &Config::default(),
    );
    assert_eq!(
        result.unwrap(),
        Object::Array(vec![
            Object::String("z".into()),
            Object::String("a".into()),
            Object::String("m".into()),
        ])
    );
}

#[test]
fn inputs_apply_left_to_right() {
    // A mapping pre-populates the scope at its position.
    let before = run(
        &[
            variables(&[("x", Object::Int(1))]),
            Input::code("y = x + 1, return(y)"),
        ],
        &Config::default(),
    );
    assert_eq!(before.unwrap(), Object::Int(2));
    // A source before the mapping cannot see the binding.
    let after = run(
        &[
            Input::code("y = x + 1, return(y)"),
            variables(&[("x", Object::Int(1))]),
        ],
        &Config::default(),
    );
    assert!(after.is_err());
}

#[test]
fn later_variables_override_earlier_sources() {
    let result = run(
        &[
            Input::code(r#"{"mode": "default"}"#),
            variables(&[("mode", Object::String("override".into()))]),
            Input::code("return(mode)"),
        ],
        &Config::default(),
    );
    assert_eq!(result.unwrap(), Object::String("override".into()));
}

#[test]
fn plus_argument_concatenates_neighboring_sources() {
    let result = run(
        &[Input::code("retu"), Input::code("+"), Input::code("rn(5)")],
        &Config::default(),
    );
    assert_eq!(result.unwrap(), Object::Int(5));
}

#[test]
fn invalid_variable_names_are_rejected_at_the_boundary() {
    for name in ["1bad", "", "with space", "while", "___marker___"] {
        let result = run(
            &[variables(&[(name, Object::Int(1))]), Input::code("return(1)")],
            &Config::default(),
        );
        assert!(result.is_err(), "name {name:?} should be rejected");
    }
}

#[test]
fn functions_cannot_cross_the_host_boundary() {
    let result = run(
        &[Input::code("function f() { return(1) }, return(f)")],
        &Config::default(),
    );
    assert!(result.is_err());
}

#[test]
fn injected_variables_are_enumerable() {
    let result = run(
        &[
            variables(&[("foo", Object::Int(10)), ("bar", Object::Int(30))]),
            Input::code("total = 0, for (pair in .) { total += pair[1] }, return(total)"),
        ],
        &Config::default(),
    );
    assert_eq!(result.unwrap(), Object::Int(40));
}
