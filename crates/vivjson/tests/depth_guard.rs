//! Tests for the three resource ceilings: recursion depth, loop iterations,
//! and container growth. Each ceiling has an input accepted at limit N and
//! rejected at limit N - 1.

use vivjson::{Config, Input, Object, run};

fn run_limited(source: &str, config: &Config) -> Result<Object, vivjson::Error> {
    run(&[Input::code(source)], config)
}

#[test]
fn depth_limit_has_an_exact_boundary() {
    // Nested unary minus consumes one evaluation level per sign.
    let source = format!("x = {}1, return(x)", "-".repeat(40).replace('-', "- "));
    let mut boundary = None;
    for limit in 1..200 {
        let config = Config {
            max_depth: limit,
            ..Config::default()
        };
        if run_limited(&source, &config).is_ok() {
            boundary = Some(limit);
            break;
        }
    }
    let boundary = boundary.expect("some limit must accept the program");
    assert!(boundary > 40, "40 nested operators need more than 40 levels");
    let below = Config {
        max_depth: boundary - 1,
        ..Config::default()
    };
    assert!(run_limited(&source, &below).is_err());
    let above = Config {
        max_depth: boundary + 1,
        ..Config::default()
    };
    assert!(run_limited(&source, &above).is_ok());
}

#[test]
fn default_depth_limit_stops_runaway_recursion() {
    let source = "function f(n) { return(f(n + 1)) }, f(0)";
    let err = run_limited(source, &Config::default()).unwrap_err();
    assert!(err.message().contains("depth"));
}

#[test]
fn loop_limit_is_per_loop() {
    let source = "i = 0, while (i < 10) { i += 1 }, return(i)";
    let at_limit = Config {
        max_loop_times: 10,
        ..Config::default()
    };
    assert_eq!(run_limited(source, &at_limit).unwrap(), Object::Int(10));
    let below = Config {
        max_loop_times: 9,
        ..Config::default()
    };
    let err = run_limited(source, &below).unwrap_err();
    assert!(err.message().contains("loop"));
    // Two sequential loops each get the full budget.
    let two_loops = concat!(
        "i = 0, while (i < 10) { i += 1 }, ",
        "j = 0, while (j < 10) { j += 1 }, return(i + j)",
    );
    assert_eq!(run_limited(two_loops, &at_limit).unwrap(), Object::Int(20));
}

#[test]
fn default_loop_limit_stops_infinite_loops() {
    let err = run_limited("while (true) { x = 1 }", &Config::default()).unwrap_err();
    assert!(err.message().contains("loop"));
}

#[test]
fn size_limit_bounds_array_growth() {
    let source = "a = [], for (i = 0; i < 5; i += 1) { a += i }, return(len(a))";
    let at_limit = Config {
        max_array_size: 5,
        ..Config::default()
    };
    assert_eq!(run_limited(source, &at_limit).unwrap(), Object::Int(5));
    let below = Config {
        max_array_size: 4,
        ..Config::default()
    };
    let err = run_limited(source, &below).unwrap_err();
    assert!(err.message().contains("size"));
}

#[test]
fn size_limit_bounds_repetition_and_splitting() {
    let tight = Config {
        max_array_size: 5,
        ..Config::default()
    };
    assert!(run_limited("return([1, 2] * 3)", &tight).is_err());
    assert!(run_limited(r#"return("abcdef" / "")"#, &tight).is_err());
    assert!(run_limited(r#"return("abcde" / "")"#, &tight).is_ok());
    assert!(run_limited(r#"return("ab" * 3)"#, &tight).is_err());
}
