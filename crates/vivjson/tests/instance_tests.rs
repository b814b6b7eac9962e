//! Tests for the Instance API: one long-lived environment shared by member
//! reads, method calls, and follow-up scripts.

use pretty_assertions::assert_eq;
use vivjson::{Config, Input, Instance, Object};

fn make(source: &str) -> Instance {
    Instance::make(&[Input::code(source)], &Config::default()).unwrap()
}

#[test]
fn members_read_by_path() {
    let instance = make(r#"{"a": {"b": 7}, "list": [10, 20, 30]}"#);
    assert_eq!(instance.get(&["a"]).unwrap(), Object::from_json(r#"{"b": 7}"#).unwrap());
    assert_eq!(instance.get(&["a", "b"]).unwrap(), Object::Int(7));
    assert_eq!(instance.get(&["list", "1"]).unwrap(), Object::Int(20));
    assert_eq!(instance.get(&["list", "-1"]).unwrap(), Object::Int(30));
    assert!(instance.get(&["missing"]).is_err());
    assert!(instance.get(&["a", "missing"]).is_err());
    assert!(instance.get(&["list", "9"]).is_err());
}

#[test]
fn methods_call_with_host_arguments() {
    let instance = make("function add(x, y) { return(x + y) }");
    let result = instance.call("add", &[Object::Int(2), Object::Int(3)]).unwrap();
    assert_eq!(result, Object::Int(5));
    assert!(instance.call("missing", &[]).is_err());
}

#[test]
fn calling_a_plain_member_is_an_error() {
    let instance = make(r#"{"n": 3}"#);
    assert!(instance.call("n", &[]).is_err());
}

#[test]
fn methods_see_the_instance_environment() {
    let instance = make(r#"{"base": 40}, function plus_base(n) { return(base + n) }"#);
    assert_eq!(instance.call("plus_base", &[Object::Int(2)]).unwrap(), Object::Int(42));
}

#[test]
fn follow_up_scripts_share_the_environment() {
    let instance = make(r#"{"counter": 10}"#);
    assert_eq!(instance.run_text("return(counter + 1)").unwrap(), Object::Int(11));
    instance.run_text("counter = 20").unwrap();
    assert_eq!(instance.get(&["counter"]).unwrap(), Object::Int(20));
}

#[test]
fn method_locals_do_not_leak_into_the_instance() {
    let instance = make(r#"{"count": 0}, function bump() { count += 1, return(count) }"#);
    assert_eq!(instance.call("bump", &[]).unwrap(), Object::Int(1));
    // Captured variables are only mutable through `reference` parameters, so
    // the update stayed local to the call frame.
    assert_eq!(instance.call("bump", &[]).unwrap(), Object::Int(1));
    assert_eq!(instance.get(&["count"]).unwrap(), Object::Int(0));
}
