#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Behavior checked against explicit values rather than recorded ones.

mod common;

use std::rc::Rc;

use common::{case, options_for, outcome_of, Outcome};
use cook_eval::value::{from_json, to_json};
use cook_eval::{supply, EvalLimits, Globals, Value};
use cookc::{CookOptions, PrecookOptions};
use pretty_assertions::assert_eq;
use serde_json::json;

fn value(v: serde_json::Value) -> Outcome {
    Outcome::Value(v)
}

fn error(class: &str) -> Outcome {
    Outcome::Error(class.to_string())
}

#[test]
fn test_declarations_hoist() {
    assert_eq!(outcome_of("functions.json", "hoisting order"), value(json!("undefined")));
    assert_eq!(outcome_of("functions.json", "hoisted helper"), value(json!(6)));
    assert_eq!(
        outcome_of("functions.json", "function and var shadowing"),
        value(json!("string"))
    );
}

#[test]
fn test_var_in_blocks_reaches_function_scope() {
    assert_eq!(
        outcome_of("functions.json", "var in taken block overrides function"),
        value(json!("string"))
    );
    assert_eq!(
        outcome_of("functions.json", "var in skipped block keeps function"),
        value(json!("function"))
    );
    assert_eq!(outcome_of("functions.json", "var survives loop"), value(json!(3)));
}

#[test]
fn test_block_functions() {
    assert_eq!(
        outcome_of("functions.json", "block function stays in its block"),
        value(json!("undefined"))
    );
    assert_eq!(
        outcome_of("functions.json", "strict block function leaves var alone"),
        value(json!("number"))
    );
    assert_eq!(
        outcome_of("functions.json", "annex b block function updates var"),
        value(json!("function"))
    );
    assert_eq!(
        outcome_of("functions.json", "annex b skipped block function"),
        value(json!("number"))
    );
}

#[test]
fn test_switch_falls_through() {
    let expected = [
        ("switch fallthrough 1", json!("AB")),
        ("switch fallthrough 2", json!("B")),
        ("switch fallthrough default", json!("C")),
        ("switch default first, no match", json!(["d", 1])),
        ("switch default first, later match", json!([2])),
        ("switch strict comparison", json!("number")),
    ];
    for (name, result) in expected {
        assert_eq!(outcome_of("functions.json", name), value(result), "{name}");
    }
}

#[test]
fn test_loop_bindings_per_iteration() {
    assert_eq!(outcome_of("functions.json", "for let closures"), value(json!([0, 1, 2])));
    assert_eq!(outcome_of("functions.json", "for var closures"), value(json!([3, 3, 3])));
    assert_eq!(outcome_of("functions.json", "for of const closures"), value(json!([1, 2])));
    assert_eq!(outcome_of("functions.json", "for in let closures"), value(json!(["a", "b"])));
}

#[test]
fn test_completions() {
    assert_eq!(outcome_of("functions.json", "break and continue"), value(json!(12)));
    assert_eq!(outcome_of("functions.json", "continue inside switch"), value(json!([1, 3])));
    assert_eq!(
        outcome_of("functions.json", "finally return overrides"),
        value(json!("finally"))
    );
    assert_eq!(outcome_of("functions.json", "finally overrides throw"), value(json!("kept")));
    assert_eq!(outcome_of("functions.json", "break through finally"), value(json!([1])));
}

#[test]
fn test_error_classes() {
    assert_eq!(outcome_of("functions.json", "temporal dead zone"), value(json!("ReferenceError")));
    assert_eq!(outcome_of("functions.json", "const assignment"), value(json!("TypeError")));
    assert_eq!(outcome_of("rejections.json", "throw a string"), error("Uncaught"));
    assert_eq!(outcome_of("rejections.json", "runaway recursion"), error("RangeError"));
    assert_eq!(outcome_of("rejections.json", "bad uri"), error("URIError"));
    assert_eq!(outcome_of("rejections.json", "this"), error("SyntaxError"));
}

#[test]
fn test_sandbox_escapes_are_refused() {
    for name in [
        "function constructor escape",
        "object constructor",
        "proto access",
        "string prototype",
        "user constructor",
        "shadowed builtin constructor",
    ] {
        assert_eq!(outcome_of("rejections.json", name), error("TypeError"), "{name}");
    }
    for name in ["Function is not a global", "globalThis is not a global", "eval is not a global"] {
        assert_eq!(outcome_of("rejections.json", name), error("ReferenceError"), "{name}");
    }
}

#[test]
fn test_only_referenced_globals_are_supplied() {
    let (fixture, index) = case("functions.json", "free variable minimality");
    let tree = fixture.cases[index].ast.to_string();
    let precooked = cookc::prefeast(&tree, "", PrecookOptions::default()).unwrap();

    let mut host = Globals::new();
    host.insert("DATA".to_string(), from_json(&fixture.globals["DATA"]));
    host.insert("APP".to_string(), from_json(&fixture.globals["APP"]));
    host.insert("SECRET".to_string(), Value::string("hidden"));

    let supplied = supply(precooked.free_variables.iter().map(String::as_str), &host);
    let names: Vec<&str> = supplied.keys().map(String::as_str).collect();
    assert_eq!(names, ["APP", "DATA", "undefined"]);
}

#[test]
fn test_builtins_fill_unprovided_globals() {
    let supplied = supply(["Math", "nope"], &Globals::new());
    assert!(supplied.contains_key("Math"));
    assert!(!supplied.contains_key("nope"));

    // A host value shadows the built-in of the same name.
    let mut host = Globals::new();
    host.insert("Math".to_string(), Value::Number(1.0));
    assert_eq!(supply(["Math"], &host)["Math"], Value::Number(1.0));
}

#[test]
fn test_analysis_is_repeatable() {
    let fixture = common::load("functions.json");
    for case in &fixture.cases {
        let tree = case.ast.to_string();
        let options = PrecookOptions::default().with_rules(case.rules.into());
        let (Ok(first), Ok(second)) = (
            cookc::prefeast(&tree, &case.source, options),
            cookc::prefeast(&tree, &case.source, options),
        ) else {
            continue;
        };
        assert_eq!(first.free_variables, second.free_variables, "{}", case.name);
        assert_eq!(first.scopes.len(), second.scopes.len(), "{}", case.name);
    }
}

#[test]
fn test_each_invocation_starts_fresh() {
    let (fixture, index) = case("functions.json", "closure counter");
    let case = &fixture.cases[index];
    let precooked = cookc::prefeast(&case.ast.to_string(), &case.source, PrecookOptions::default())
        .unwrap();
    let function = cookc::feast(&precooked, &CookOptions::default()).unwrap();
    for _ in 0..3 {
        assert_eq!(cookc::invoke(&function, &[]).unwrap(), Value::Number(2.0));
    }
}

#[test]
fn test_host_objects_are_shared_with_the_host() {
    let (fixture, index) = case("functions.json", "host object mutation");
    let case = &fixture.cases[index];
    let data = from_json(&fixture.globals["DATA"]);
    let options = CookOptions::default().with_global("DATA", data.clone());
    let precooked = cookc::prefeast(&case.ast.to_string(), &case.source, PrecookOptions::default())
        .unwrap();
    let function = cookc::feast(&precooked, &options).unwrap();
    cookc::invoke(&function, &[]).unwrap();
    assert_eq!(to_json(&data)["objectA"]["added"], json!(1));
}

#[test]
fn test_call_depth_limit_is_configurable() {
    let (fixture, index) = case("functions.json", "recursion");
    let case = &fixture.cases[index];
    let precooked = cookc::prefeast(&case.ast.to_string(), &case.source, PrecookOptions::default())
        .unwrap();
    let shallow = options_for(case, &fixture.globals).with_limits(EvalLimits { max_call_depth: 5 });
    let function = cookc::feast(&precooked, &shallow).unwrap();

    assert_eq!(cookc::invoke(&function, &[Value::Number(3.0)]).unwrap(), Value::Number(6.0));
    let err = cookc::invoke(&function, &[Value::Number(10.0)]).unwrap_err();
    assert_eq!(err.error_class(), Some("RangeError"));
}

#[test]
fn test_one_source_many_global_sets() {
    let (fixture, index) = case("expressions.json", "free variables pass through");
    let case = &fixture.cases[index];
    let expression = cookc::tree::read_expression(&case.ast.to_string()).unwrap();
    let precooked = cookc::precook(expression, &case.source, PrecookOptions::default()).unwrap();
    let source: Rc<str> = Rc::clone(&precooked.source);
    assert_eq!(&*source, case.source);

    for (home, q, expected) in [
        ("/a", "x y", "/a?q=x%20y"),
        ("/b", "1&2", "/b?q=1%262"),
    ] {
        let options = CookOptions::default()
            .with_global("APP", from_json(&json!({"homepage": home})))
            .with_global("DATA", from_json(&json!({"q": q})));
        let result = cookc::cook(&precooked, &options).unwrap();
        assert_eq!(result, Value::string(expected));
    }
}
