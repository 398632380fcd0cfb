#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::errors::EvalErrorKind;
use crate::interpreter::Program;
use crate::value::{from_json, to_json};

fn interp() -> Interpreter {
    Interpreter::new(Rc::new(Program::default()))
}

/// `global.name(...args)`.
fn call_static(global: &str, name: &str, args: &[Value]) -> EvalResult<Value> {
    let target = builtin_global(global).unwrap();
    let method = target.get(name);
    assert!(method.is_callable(), "{global}.{name} is not callable");
    interp().call(&method, &target, args)
}

fn call_global(name: &str, args: &[Value]) -> EvalResult<Value> {
    interp().call(&builtin_global(name).unwrap(), &Value::Undefined, args)
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn test_every_builtin_name_resolves() {
    for name in BUILTIN_NAMES {
        assert!(builtin_global(name).is_some(), "{name} is missing");
    }
    assert!(builtin_global("eval").is_none());
    assert!(builtin_global("Function").is_none());
    assert!(builtin_global("globalThis").is_none());
}

#[test]
fn test_math_rounding() {
    let round = |x: f64| call_static("Math", "round", &[num(x)]).unwrap();
    assert_eq!(round(2.5), num(3.0));
    assert_eq!(round(-2.5), num(-2.0));
    assert_eq!(round(-0.4), num(-0.0));
    assert_eq!(round(0.499_999_999_999_999_94), num(0.0));
    assert_eq!(call_static("Math", "trunc", &[num(-4.7)]).unwrap(), num(-4.0));
    assert_eq!(call_static("Math", "sign", &[num(-3.0)]).unwrap(), num(-1.0));
}

#[test]
fn test_math_max_and_min() {
    assert_eq!(call_static("Math", "max", &[]).unwrap(), num(f64::NEG_INFINITY));
    assert_eq!(call_static("Math", "min", &[]).unwrap(), num(f64::INFINITY));
    assert_eq!(
        call_static("Math", "max", &[num(1.0), Value::string("3"), num(2.0)]).unwrap(),
        num(3.0)
    );
    let nan = call_static("Math", "max", &[num(1.0), num(f64::NAN)]).unwrap();
    assert!(nan.as_number().unwrap().is_nan());
    assert_eq!(call_static("Math", "max", &[num(-0.0), num(0.0)]).unwrap(), num(0.0));
    assert_eq!(call_static("Math", "min", &[num(0.0), num(-0.0)]).unwrap(), num(-0.0));
}

#[test]
fn test_math_integer_helpers() {
    assert_eq!(
        call_static("Math", "imul", &[num(0xFFFF_FFFF_u32 as f64), num(5.0)]).unwrap(),
        num(-5.0)
    );
    assert_eq!(call_static("Math", "clz32", &[num(1.0)]).unwrap(), num(31.0));
    assert_eq!(
        call_static("Math", "hypot", &[num(3.0), num(4.0)]).unwrap(),
        num(5.0)
    );
    assert_eq!(
        call_static("Math", "pow", &[num(2.0), num(10.0)]).unwrap(),
        num(1024.0)
    );
    let nan = call_static("Math", "pow", &[num(1.0), num(f64::INFINITY)]).unwrap();
    assert!(nan.as_number().unwrap().is_nan());
}

#[test]
fn test_math_random_is_in_unit_interval() {
    let mut seen = Vec::new();
    for _ in 0..32 {
        let value = call_static("Math", "random", &[]).unwrap().as_number().unwrap();
        assert!((0.0..1.0).contains(&value), "{value}");
        seen.push(value);
    }
    seen.dedup();
    assert!(seen.len() > 1);
}

#[test]
fn test_math_constants() {
    let math = builtin_global("Math").unwrap();
    assert_eq!(math.get("PI"), num(std::f64::consts::PI));
    assert_eq!(math.get("SQRT1_2"), num(std::f64::consts::FRAC_1_SQRT_2));
}

#[test]
fn test_json_parse() {
    let value = call_static("JSON", "parse", &[Value::string(r#"{"b":[1,"x"],"a":null}"#)]).unwrap();
    assert_eq!(to_json(&value), json!({"b": [1, "x"], "a": null}));

    let err = call_static("JSON", "parse", &[Value::string("{oops")]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::SyntaxError);

    let reviver = Value::host_function("r", |_, _| Ok(Value::Undefined));
    let err = call_static("JSON", "parse", &[Value::string("1"), reviver]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_json_stringify() {
    let value = from_json(&json!({"a": 1, "b": {"c": [true]}}));
    assert_eq!(
        call_static("JSON", "stringify", &[value.clone()]).unwrap(),
        Value::string(r#"{"a":1,"b":{"c":[true]}}"#)
    );
    assert_eq!(
        call_static("JSON", "stringify", &[value.clone(), Value::Null, num(1.0)]).unwrap(),
        Value::string("{\n \"a\": 1,\n \"b\": {\n  \"c\": [\n   true\n  ]\n }\n}")
    );
    let allow = Value::array(vec![Value::string("a")]);
    assert_eq!(
        call_static("JSON", "stringify", &[value, allow]).unwrap(),
        Value::string(r#"{"a":1}"#)
    );
    assert_eq!(
        call_static("JSON", "stringify", &[Value::Undefined]).unwrap(),
        Value::Undefined
    );
    assert_eq!(
        call_static("JSON", "stringify", &[Value::string("q\"")]).unwrap(),
        Value::string(r#""q\"""#)
    );
}

#[test]
fn test_number_statics() {
    assert_eq!(
        call_static("Number", "isInteger", &[num(5.0)]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        call_static("Number", "isInteger", &[Value::string("5")]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        call_static("Number", "isSafeInteger", &[num(2f64.powi(53))]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        call_static("Number", "isNaN", &[Value::string("x")]).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(call_global("isNaN", &[Value::string("x")]).unwrap(), Value::Bool(true));
    assert_eq!(
        builtin_global("Number").unwrap().get("MAX_SAFE_INTEGER"),
        num(9_007_199_254_740_991.0)
    );
}

#[test]
fn test_conversion_functions() {
    assert_eq!(call_global("Number", &[Value::string(" 12 ")]).unwrap(), num(12.0));
    assert_eq!(call_global("Number", &[]).unwrap(), num(0.0));
    assert_eq!(call_global("String", &[num(1.5)]).unwrap(), Value::string("1.5"));
    assert_eq!(call_global("String", &[]).unwrap(), Value::string(""));
    assert_eq!(call_global("Boolean", &[Value::string("")]).unwrap(), Value::Bool(false));
    assert_eq!(call_global("parseInt", &[Value::string("08")]).unwrap(), num(8.0));
    assert_eq!(call_global("parseFloat", &[Value::string("1e2x")]).unwrap(), num(100.0));
}

#[test]
fn test_string_statics() {
    assert_eq!(
        call_static("String", "fromCharCode", &[num(104.0), num(105.0)]).unwrap(),
        Value::string("hi")
    );
    assert_eq!(
        call_static("String", "fromCodePoint", &[num(128_512.0)]).unwrap(),
        Value::string("\u{1F600}")
    );
}

/// `object_statics().name(...args)`.
fn call_object_static(name: &str, args: &[Value]) -> EvalResult<Value> {
    let target = object_statics();
    let method = target.get(name);
    assert!(method.is_callable(), "Object.{name} is not callable");
    interp().call(&method, &target, args)
}

#[test]
fn test_object_global_is_reserved() {
    let object = builtin_global("Object").unwrap();
    assert!(object.get("keys").is_undefined());
    let err = crate::sandbox::sanitize(&object).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_object_delegate() {
    let value = from_json(&json!({"b": 1, "2": "two", "a": [1]}));
    assert_eq!(
        to_json(&call_object_static("keys", &[value.clone()]).unwrap()),
        json!(["2", "b", "a"])
    );
    assert_eq!(
        to_json(&call_object_static("entries", &[value.clone()]).unwrap()),
        json!([["2", "two"], ["b", 1], ["a", [1]]])
    );
    assert_eq!(
        to_json(&call_object_static("values", &[value]).unwrap()),
        json!(["two", 1, [1]])
    );

    let pairs = from_json(&json!([["x", 1], ["y", 2]]));
    assert_eq!(
        to_json(&call_object_static("fromEntries", &[pairs]).unwrap()),
        json!({"x": 1, "y": 2})
    );

    let err = call_object_static("keys", &[Value::Null]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_uri_component_functions() {
    assert_eq!(
        call_global("encodeURIComponent", &[Value::string("a b&c/é")]).unwrap(),
        Value::string("a%20b%26c%2F%C3%A9")
    );
    assert_eq!(
        call_global("decodeURIComponent", &[Value::string("a%20b%26c%2F%C3%A9")]).unwrap(),
        Value::string("a b&c/é")
    );
    let err = call_global("decodeURIComponent", &[Value::string("%E0%A4%A")]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::UriError);
}

#[test]
fn test_collection_constructors_require_new() {
    for name in ["Map", "Set", "WeakMap", "WeakSet", "URLSearchParams"] {
        let err = call_global(name, &[]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeError, "{name}");
    }
}
