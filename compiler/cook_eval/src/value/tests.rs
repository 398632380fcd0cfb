#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

#[test]
fn test_type_of() {
    assert_eq!(Value::Undefined.type_of(), "undefined");
    assert_eq!(Value::Null.type_of(), "object");
    assert_eq!(Value::Bool(true).type_of(), "boolean");
    assert_eq!(Value::Number(1.0).type_of(), "number");
    assert_eq!(Value::string("").type_of(), "string");
    assert_eq!(Value::array(vec![]).type_of(), "object");
    let f = Value::host_function("f", |_, _| Ok(Value::Undefined));
    assert_eq!(f.type_of(), "function");
}

#[test]
fn test_to_boolean() {
    for falsy in [
        Value::Undefined,
        Value::Null,
        Value::Bool(false),
        Value::Number(0.0),
        Value::Number(-0.0),
        Value::Number(f64::NAN),
        Value::string(""),
    ] {
        assert!(!falsy.to_boolean(), "{falsy:?} should be falsy");
    }
    for truthy in [
        Value::Bool(true),
        Value::Number(-1.0),
        Value::string("0"),
        Value::array(vec![]),
        Value::object(Vec::<(String, Value)>::new()),
    ] {
        assert!(truthy.to_boolean(), "{truthy:?} should be truthy");
    }
}

#[test]
fn test_equality_flavours() {
    let nan = Value::Number(f64::NAN);
    assert!(!nan.strict_equals(&nan));
    assert!(nan.same_value_zero(&nan));
    assert!(nan.same_value(&nan));

    let zero = Value::Number(0.0);
    let neg_zero = Value::Number(-0.0);
    assert!(zero.strict_equals(&neg_zero));
    assert!(zero.same_value_zero(&neg_zero));
    assert!(!zero.same_value(&neg_zero));

    let a = Value::array(vec![]);
    let b = Value::array(vec![]);
    assert!(!a.strict_equals(&b));
    assert!(a.strict_equals(&a.clone()));
}

#[test]
fn test_display_of_objects() {
    let nested = Value::array(vec![
        Value::Number(1.0),
        Value::Null,
        Value::array(vec![Value::string("a"), Value::Undefined]),
    ]);
    assert_eq!(nested.to_string(), "1,,a,");
    assert_eq!(
        Value::object([("a", Value::Number(1.0))]).to_string(),
        "[object Object]"
    );
    let map = Value::Object(Object::new(ObjectKind::Map(OrderedTable::new())));
    assert_eq!(map.to_string(), "[object Map]");
}

#[test]
fn test_display_cuts_array_cycles() {
    let array = Object::array(vec![Value::Number(1.0)]);
    if let ObjectKind::Array(items) = &mut array.borrow_mut().kind {
        items.push(Value::Object(array.clone()));
    }
    assert_eq!(Value::Object(array).to_string(), "1,");
}

#[test]
fn test_property_order_puts_integer_keys_first() {
    let mut map = PropertyMap::new();
    map.insert("b", Value::Null);
    map.insert("2", Value::Null);
    map.insert("a", Value::Null);
    map.insert("1", Value::Null);
    map.insert("b", Value::Number(1.0));
    let keys: Vec<String> = map.keys().iter().map(ToString::to_string).collect();
    assert_eq!(keys, ["1", "2", "b", "a"]);
    assert_eq!(map.get("b"), Some(&Value::Number(1.0)));
    assert_eq!(map.len(), 4);
}

#[test]
fn test_ordered_table_uses_same_value_zero() {
    let mut table = OrderedTable::new();
    table.set(Value::Number(-0.0), Value::string("zero"));
    table.set(Value::Number(f64::NAN), Value::string("nan"));
    assert_eq!(table.get(&Value::Number(0.0)), Some(Value::string("zero")));
    assert_eq!(table.get(&Value::Number(f64::NAN)), Some(Value::string("nan")));
    assert!(!table.has(&Value::string("0")));

    assert!(table.delete(&Value::Number(0.0)));
    assert!(!table.delete(&Value::Number(0.0)));
    table.set(Value::Number(0.0), Value::string("again"));
    let keys: Vec<Value> = table.entries().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![Value::Number(f64::NAN), Value::Number(0.0)]);
}

#[test]
fn test_ordered_table_keys_objects_by_identity() {
    let mut table = OrderedTable::new();
    let a = Value::array(vec![]);
    let b = Value::array(vec![]);
    table.set(a.clone(), Value::Number(1.0));
    assert!(table.has(&a));
    assert!(!table.has(&b));
}

#[test]
fn test_json_round_trip_keeps_key_order() {
    let json = json!({"z": 1, "a": [true, null, "s"], "m": {"k": 1.5}});
    let value = from_json(&json);
    assert_eq!(value.get("z"), Value::Number(1.0));
    assert_eq!(value.get("a").get("length"), Value::Number(3.0));
    assert_eq!(to_json(&value), json);
}

#[test]
fn test_to_json_drops_what_json_cannot_hold() {
    let f = Value::host_function("f", |_, _| Ok(Value::Undefined));
    let value = Value::object([
        ("f", f.clone()),
        ("u", Value::Undefined),
        ("n", Value::Number(f64::NAN)),
        ("list", Value::array(vec![Value::Undefined, f])),
    ]);
    assert_eq!(to_json(&value), json!({"n": null, "list": [null, null]}));
}

#[test]
fn test_to_json_cuts_cycles() {
    let obj = Object::ordinary(PropertyMap::new());
    obj.borrow_mut()
        .properties
        .insert("me", Value::Object(obj.clone()));
    assert_eq!(to_json(&Value::Object(obj)), json!({"me": null}));
}

#[test]
fn test_stringifier_indents_and_filters() {
    let value = from_json(&json!({"a": 1, "b": [1, 2], "c": {}}));
    let text = Stringifier::new("  ", None).stringify(&value).unwrap().unwrap();
    assert_eq!(text, "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ],\n  \"c\": {}\n}");

    let allow = vec!["a".to_string()];
    let text = Stringifier::new("", Some(&allow)).stringify(&value).unwrap().unwrap();
    assert_eq!(text, "{\"a\":1}");
}

#[test]
fn test_stringifier_rejects_cycles() {
    let array = Object::array(vec![]);
    if let ObjectKind::Array(items) = &mut array.borrow_mut().kind {
        items.push(Value::Object(array.clone()));
    }
    let err = Stringifier::new("", None)
        .stringify(&Value::Object(array))
        .unwrap_err();
    assert_eq!(err.kind, crate::EvalErrorKind::TypeError);
}

#[test]
fn test_get_reads_own_properties_only() {
    let value = Value::object([("a", Value::Number(1.0))]);
    assert_eq!(value.get("a"), Value::Number(1.0));
    assert_eq!(value.get("toString"), Value::Undefined);
    assert_eq!(Value::string("héllo").get("length"), Value::Number(5.0));
}
