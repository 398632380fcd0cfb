#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::errors::EvalErrorKind;
use crate::interpreter::Program;
use crate::value::to_json;

fn interp() -> Interpreter {
    Interpreter::new(Rc::new(Program::default()))
}

fn try_invoke(subject: &str, name: &str, args: &[Value]) -> EvalResult<Value> {
    let mut interp = interp();
    let this = Value::string(subject);
    let method = interp.get_property(&this, name)?;
    interp.call(&method, &this, args)
}

fn invoke(subject: &str, name: &str, args: &[Value]) -> Value {
    try_invoke(subject, name, args).unwrap()
}

fn s(text: &str) -> Value {
    Value::string(text)
}

fn n(value: f64) -> Value {
    Value::Number(value)
}

fn re(pattern: &str, flags: &str) -> Value {
    regexp::create(pattern, flags).unwrap()
}

#[test]
fn test_indexing_uses_code_units() {
    let text = "a\u{1F600}b";
    assert_eq!(invoke(text, "charCodeAt", &[n(1.0)]), n(f64::from(0xD83D)));
    assert_eq!(invoke(text, "codePointAt", &[n(1.0)]), n(f64::from(0x1F600)));
    assert_eq!(invoke(text, "at", &[n(-1.0)]), s("b"));
    assert_eq!(invoke(text, "at", &[n(9.0)]), Value::Undefined);
    assert_eq!(invoke(text, "charAt", &[n(9.0)]), s(""));
    assert_eq!(invoke(text, "indexOf", &[s("b")]), n(3.0));
    assert_eq!(invoke(text, "slice", &[n(1.0), n(3.0)]), s("\u{1F600}"));
}

#[test]
fn test_search_helpers() {
    assert_eq!(invoke("hello", "includes", &[s("ell")]), Value::Bool(true));
    assert_eq!(invoke("hello", "includes", &[s("h"), n(1.0)]), Value::Bool(false));
    assert_eq!(invoke("hello", "startsWith", &[s("llo"), n(2.0)]), Value::Bool(true));
    assert_eq!(invoke("hello", "endsWith", &[s("hel"), n(3.0)]), Value::Bool(true));
    assert_eq!(invoke("abcabc", "lastIndexOf", &[s("b")]), n(4.0));
    assert_eq!(invoke("abcabc", "lastIndexOf", &[s("b"), n(3.0)]), n(1.0));
    assert_eq!(invoke("abc", "indexOf", &[s("")]), n(0.0));
    assert_eq!(invoke("abc", "indexOf", &[s("z")]), n(-1.0));

    let err = try_invoke("abc", "includes", &[re("a", "")]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_slicing() {
    assert_eq!(invoke("abcdef", "slice", &[n(-3.0)]), s("def"));
    assert_eq!(invoke("abcdef", "slice", &[n(4.0), n(2.0)]), s(""));
    assert_eq!(invoke("abcdef", "substring", &[n(4.0), n(2.0)]), s("cd"));
    assert_eq!(invoke("abcdef", "substring", &[n(-5.0), n(2.0)]), s("ab"));
    assert_eq!(invoke("abcdef", "substr", &[n(-4.0), n(2.0)]), s("cd"));
    assert_eq!(invoke("abcdef", "substr", &[n(1.0)]), s("bcdef"));
}

#[test]
fn test_padding_and_repeat() {
    assert_eq!(invoke("5", "padStart", &[n(3.0), s("0")]), s("005"));
    assert_eq!(invoke("ab", "padEnd", &[n(7.0), s("xyz")]), s("abxyzxy"));
    assert_eq!(invoke("abc", "padStart", &[n(2.0)]), s("abc"));
    assert_eq!(invoke("ab", "padEnd", &[n(4.0)]), s("ab  "));
    assert_eq!(invoke("ab", "repeat", &[n(3.0)]), s("ababab"));
    assert_eq!(invoke("ab", "repeat", &[n(0.0)]), s(""));
    let err = try_invoke("ab", "repeat", &[n(-1.0)]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::RangeError);
}

#[test]
fn test_padding_past_the_string_limit_is_a_range_error() {
    for (method, target) in [("padStart", f64::INFINITY), ("padEnd", f64::from(1u32 << 30))] {
        let err = try_invoke("a", method, &[n(target)]).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::RangeError, "{method}");
        assert_eq!(err.message, "Invalid string length");
    }
    // Nothing to pad with, so no length to check.
    assert_eq!(invoke("a", "padEnd", &[n(f64::INFINITY), s("")]), s("a"));
}

#[test]
fn test_case_and_trim() {
    assert_eq!(invoke("Straße", "toUpperCase", &[]), s("STRASSE"));
    assert_eq!(invoke("ÀB", "toLowerCase", &[]), s("àb"));
    assert_eq!(invoke("\u{feff} x \n", "trim", &[]), s("x"));
    assert_eq!(invoke("  x ", "trimStart", &[]), s("x "));
    assert_eq!(invoke("  x ", "trimEnd", &[]), s("  x"));
}

#[test]
fn test_split() {
    assert_eq!(to_json(&invoke("a,b,,c", "split", &[s(",")])), json!(["a", "b", "", "c"]));
    assert_eq!(to_json(&invoke("abc", "split", &[s("")])), json!(["a", "b", "c"]));
    assert_eq!(to_json(&invoke("abc", "split", &[])), json!(["abc"]));
    assert_eq!(to_json(&invoke("a,b,c", "split", &[s(","), n(2.0)])), json!(["a", "b"]));
    assert_eq!(to_json(&invoke("", "split", &[s(",")])), json!([""]));
    assert_eq!(
        to_json(&invoke("a1b22c", "split", &[re(r"\d+", "")])),
        json!(["a", "b", "c"])
    );
    assert_eq!(
        to_json(&invoke("a-b", "split", &[re("(-)", "")])),
        json!(["a", "-", "b"])
    );
    assert_eq!(to_json(&invoke("", "split", &[re("", "")])), json!([]));
}

#[test]
fn test_replace_with_string_patterns() {
    assert_eq!(invoke("aaa", "replace", &[s("a"), s("b")]), s("baa"));
    assert_eq!(invoke("aaa", "replaceAll", &[s("a"), s("b")]), s("bbb"));
    assert_eq!(invoke("abc", "replaceAll", &[s(""), s("-")]), s("-a-b-c-"));
    assert_eq!(invoke("abc", "replace", &[s("b"), s("[$`|$&|$']")]), s("a[a|b|c]c"));
    assert_eq!(invoke("abc", "replace", &[s("b"), s("$$")]), s("a$c"));
}

#[test]
fn test_replace_with_regexp() {
    assert_eq!(
        invoke("John Smith", "replace", &[re(r"(\w+)\s(\w+)", ""), s("$2, $1")]),
        s("Smith, John")
    );
    assert_eq!(
        invoke("2024-01-02", "replace", &[re(r"(?<y>\d+)-(?<m>\d+)", ""), s("$<m>/$<y>")]),
        s("01/2024-02")
    );
    assert_eq!(invoke("a1b2", "replace", &[re(r"\d", "g"), s("#")]), s("a#b#"));
    assert_eq!(invoke("abc", "replace", &[re("b", ""), s("$9")]), s("a$9c"));

    let err = try_invoke("abc", "replaceAll", &[re("b", ""), s("x")]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_replace_with_function() {
    let upper = Value::host_function("upper", |_, args| {
        let text = args[0].as_str().unwrap_or_default().to_uppercase();
        let offset = args[1].as_number().unwrap_or(-1.0);
        Ok(Value::from(format!("{text}@{offset}")))
    });
    assert_eq!(invoke("xay", "replace", &[s("a"), upper.clone()]), s("xA@1y"));
    assert_eq!(
        invoke("ab", "replace", &[re("[ab]", "g"), upper]),
        s("A@0B@1")
    );
}

#[test]
fn test_match_and_search() {
    assert_eq!(
        to_json(&invoke("a1b22", "match", &[re(r"\d+", "g")])),
        json!(["1", "22"])
    );
    let first = invoke("a1b22", "match", &[re(r"\d+", "")]);
    assert_eq!(first.get("0"), s("1"));
    assert_eq!(first.get("index"), n(1.0));
    assert_eq!(invoke("abc", "match", &[re("z", "g")]), Value::Null);
    assert_eq!(invoke("abc", "match", &[s("b.")]).get("0"), s("bc"));
    assert_eq!(invoke("abc", "search", &[re("c", "")]), n(2.0));
    assert_eq!(invoke("abc", "search", &[s("z")]), n(-1.0));
}

#[test]
fn test_match_all_returns_array_of_results() {
    let all = invoke("a1b2", "matchAll", &[re(r"[a-z](\d)", "g")]);
    assert_eq!(all.get("length"), n(2.0));
    let second = all.as_object().unwrap().array_items().unwrap()[1].clone();
    assert_eq!(to_json(&second), json!(["b2", "2"]));
    assert_eq!(second.get("index"), n(2.0));

    let err = try_invoke("a", "matchAll", &[re("a", "")]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_concat_and_compare() {
    assert_eq!(invoke("a", "concat", &[n(1.0), Value::Null]), s("a1null"));
    assert_eq!(invoke("a", "localeCompare", &[s("b")]), n(-1.0));
    assert_eq!(invoke("b", "localeCompare", &[s("b")]), n(0.0));
}

#[test]
fn test_methods_reject_non_string_receivers() {
    let mut interp = interp();
    let method = interp.get_property(&s(""), "trim").unwrap();
    let err = interp.call(&method, &n(1.0), &[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}
