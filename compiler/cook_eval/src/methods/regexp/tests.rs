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

fn invoke(interp: &mut Interpreter, this: &Value, name: &str, args: &[Value]) -> Value {
    let method = interp.get_property(this, name).unwrap();
    interp.call(&method, this, args).unwrap()
}

#[test]
fn test_translate_rewrites_javascript_only_syntax() {
    assert_eq!(translate(r"a\/b"), "a/b");
    assert_eq!(translate(r"\0"), r"\x00");
    assert_eq!(translate(r"\cJ"), r"\x0A");
    assert_eq!(translate("[^]"), r"[\s\S]");
    assert_eq!(translate("[]"), r"[^\s\S]");
    assert_eq!(translate("[a[]"), r"[a\[]");
    assert_eq!(translate(r"\d+"), r"\d+");
}

#[test]
fn test_compile_validates_flags() {
    assert!(compile("a", "gi").is_ok());
    assert!(compile("a", "gg").is_err());
    assert!(compile("a", "x").is_err());
    assert!(compile("(", "").is_err());
}

#[test]
fn test_create_rejects_unsupported_patterns() {
    let err = create(r"(a)\1", "").unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::SyntaxError);
    assert!(err.message.contains(r"/(a)\1/"), "{}", err.message);
}

#[test]
fn test_empty_pattern_source() {
    let re = create("", "g").unwrap();
    assert_eq!(re.to_string(), "/(?:)/g");
}

#[test]
fn test_utf16_offsets() {
    let s = "a\u{1F600}b";
    assert_eq!(byte_to_utf16(s, 0), 0);
    assert_eq!(byte_to_utf16(s, 1), 1);
    assert_eq!(byte_to_utf16(s, 5), 3);
    assert_eq!(utf16_to_byte(s, 3), 5);
    assert_eq!(utf16_to_byte(s, 2), 5);
    assert_eq!(utf16_to_byte(s, 99), s.len());
}

#[test]
fn test_exec_reports_groups_and_utf16_index() {
    let mut interp = interp();
    let re = create(r"(?<word>b+)(c)?", "").unwrap();
    let found = invoke(&mut interp, &re, "exec", &[Value::string("\u{1F600}abb")]);
    assert_eq!(to_json(&found), json!(["bb", "bb", null]));
    assert_eq!(found.get("index"), Value::Number(3.0));
    assert_eq!(found.get("groups").get("word"), Value::string("bb"));
    assert_eq!(found.get("input"), Value::string("\u{1F600}abb"));

    let missing = invoke(&mut interp, &re, "exec", &[Value::string("zzz")]);
    assert_eq!(missing, Value::Null);
}

#[test]
fn test_global_exec_advances_last_index() {
    let mut interp = interp();
    let re = create(r"\d", "g").unwrap();
    let subject = [Value::string("a1b2")];
    assert_eq!(invoke(&mut interp, &re, "exec", &subject).get("0"), Value::string("1"));
    assert_eq!(interp.get_property(&re, "lastIndex").unwrap(), Value::Number(2.0));
    assert_eq!(invoke(&mut interp, &re, "exec", &subject).get("0"), Value::string("2"));
    assert_eq!(invoke(&mut interp, &re, "exec", &subject), Value::Null);
    assert_eq!(interp.get_property(&re, "lastIndex").unwrap(), Value::Number(0.0));
}

#[test]
fn test_sticky_matches_only_at_last_index() {
    let mut interp = interp();
    let re = create("a", "y").unwrap();
    assert_eq!(invoke(&mut interp, &re, "test", &[Value::string("ba")]), Value::Bool(false));
    interp
        .set_property(&re, "lastIndex", Value::Number(1.0))
        .unwrap();
    assert_eq!(invoke(&mut interp, &re, "test", &[Value::string("ba")]), Value::Bool(true));
}

#[test]
fn test_flag_properties() {
    let mut interp = interp();
    let re = create("x.y", "ims").unwrap();
    assert_eq!(interp.get_property(&re, "source").unwrap(), Value::string("x.y"));
    assert_eq!(interp.get_property(&re, "ignoreCase").unwrap(), Value::Bool(true));
    assert_eq!(interp.get_property(&re, "global").unwrap(), Value::Bool(false));
    assert_eq!(invoke(&mut interp, &re, "test", &[Value::string("X\nY")]), Value::Bool(true));
}

#[test]
fn test_exec_on_wrong_receiver() {
    let mut interp = interp();
    let re = create("a", "").unwrap();
    let exec = interp.get_property(&re, "exec").unwrap();
    let err = interp
        .call(&exec, &Value::array(vec![]), &[Value::string("a")])
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}
