//! Built-in methods, resolved by receiver kind at property lookup.
//!
//! Values have no prototype objects. A property read that misses the
//! receiver's own properties asks [`primitive_method`] or
//! [`object_method`] for a method of that name, and hands out a fresh
//! function object wrapping it.
//!
//! Each submodule exports `const` tables of `(name, NativeFn)` pairs.

pub(crate) mod array;
pub(crate) mod collections;
pub(crate) mod date;
pub(crate) mod number;
pub(crate) mod regexp;
pub(crate) mod string;
pub(crate) mod url;

use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Builtin, NativeFn, Object, ObjectKind, Value};

pub(crate) type MethodTable = &'static [(&'static str, NativeFn)];

/// Methods every object answers to.
const OBJECT_METHODS: MethodTable = &[
    ("hasOwnProperty", has_own_property),
    ("toString", to_string),
    ("toLocaleString", to_string),
    ("valueOf", value_of),
];

/// Methods of callables.
const FUNCTION_METHODS: MethodTable = &[("call", function_call), ("apply", function_apply)];

pub(crate) fn find(table: MethodTable, key: &str) -> Option<Builtin> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|&(name, call)| Builtin {
            name,
            call,
            construct: None,
        })
}

/// Method `key` of a string, number or boolean.
pub(crate) fn primitive_method(base: &Value, key: &str) -> Option<Builtin> {
    let table = match base {
        Value::String(_) => string::METHODS,
        Value::Number(_) => number::METHODS,
        Value::Bool(_) => number::BOOLEAN_METHODS,
        _ => return None,
    };
    find(table, key).or_else(|| find(OBJECT_METHODS, key))
}

/// Method `key` of an object of the given kind.
pub(crate) fn object_method(kind: &ObjectKind, key: &str) -> Option<Builtin> {
    let table = match kind {
        ObjectKind::Array(_) => array::METHODS,
        ObjectKind::Function(_) => FUNCTION_METHODS,
        ObjectKind::Map(_) => collections::MAP_METHODS,
        ObjectKind::Set(_) => collections::SET_METHODS,
        ObjectKind::WeakMap(_) => collections::WEAK_MAP_METHODS,
        ObjectKind::WeakSet(_) => collections::WEAK_SET_METHODS,
        ObjectKind::Date(_) => date::METHODS,
        ObjectKind::RegExp(_) => regexp::METHODS,
        ObjectKind::UrlSearchParams(_) => url::METHODS,
        ObjectKind::Ordinary | ObjectKind::Error(_) | ObjectKind::Reserved(_) => &[],
    };
    find(table, key).or_else(|| find(OBJECT_METHODS, key))
}

/// Argument `index`, `undefined` when missing.
pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// A callable argument, or a `TypeError` naming what was passed.
pub(crate) fn callback(args: &[Value], index: usize) -> EvalResult<Value> {
    let value = arg(args, index);
    if value.is_callable() {
        Ok(value)
    } else {
        Err(errors::not_a_constructor_callback(&value.to_string()))
    }
}

/// A function object for a built-in with no static properties.
pub(crate) fn function_value(name: &'static str, call: NativeFn) -> Value {
    Value::Object(Object::builtin(Builtin {
        name,
        call,
        construct: None,
    }))
}

fn has_own_property(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let key = interp.to_property_key(&arg(args, 0))?;
    let has_length = match this {
        Value::String(_) => true,
        Value::Object(obj) => obj.is_array(),
        _ => false,
    };
    if has_length && &*key == "length" {
        return Ok(Value::Bool(true));
    }
    Ok(Value::Bool(Interpreter::own_keys(this).contains(&key)))
}

fn to_string(interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    match this {
        Value::Object(obj) if obj.is_array() => Ok(Value::from(interp.join_array(obj, ",")?)),
        Value::Object(obj) if matches!(obj.borrow().kind, ObjectKind::Ordinary) => {
            Ok(Value::string("[object Object]"))
        }
        other => Ok(Value::from(other.to_string())),
    }
}

fn value_of(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(this.clone())
}

fn function_call(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let receiver = arg(args, 0);
    interp.call(this, &receiver, args.get(1..).unwrap_or_default())
}

fn function_apply(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let receiver = arg(args, 0);
    let list = match arg(args, 1) {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(obj) if obj.is_array() => obj.array_items().unwrap_or_default(),
        other => return Err(errors::type_error(format!(
            "CreateListFromArrayLike called on non-object: {other}"
        ))),
    };
    interp.call(this, &receiver, &list)
}
