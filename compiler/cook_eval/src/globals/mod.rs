//! Built-in globals the sandbox may supply.
//!
//! Every lookup builds a fresh value, so evaluated code mutating a
//! built-in's properties never leaks into another run.

mod json;
mod math;

use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::methods::{arg, array, collections, date, function_value, number, string, url};
use crate::sandbox;
use crate::value::{Builtin, Callable, NativeCtor, NativeFn, Object, ObjectKind, PropertyMap, Value};

/// Names [`builtin_global`] answers to.
pub const BUILTIN_NAMES: [&str; 22] = [
    "Array",
    "Boolean",
    "Date",
    "Infinity",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Set",
    "String",
    "URLSearchParams",
    "WeakMap",
    "WeakSet",
    "decodeURIComponent",
    "encodeURIComponent",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "undefined",
];

/// The built-in global `name`, if there is one.
pub(crate) fn builtin_global(name: &str) -> Option<Value> {
    Some(match name {
        "undefined" => Value::Undefined,
        "NaN" => Value::Number(f64::NAN),
        "Infinity" => Value::Number(f64::INFINITY),
        "Array" => constructor(
            "Array",
            array::call_constructor,
            Some(array::construct),
            &[("from", array::from), ("isArray", array::is_array), ("of", array::of)],
            &[],
        ),
        "Boolean" => constructor("Boolean", number::call_boolean, None, &[], &[]),
        "Date" => constructor(
            "Date",
            date::call_constructor,
            Some(date::construct),
            &[("UTC", date::date_utc), ("now", date::date_now), ("parse", date::date_parse)],
            &[],
        ),
        "JSON" => namespace(&[("parse", json::parse), ("stringify", json::stringify)], &[]),
        "Map" => constructor("Map", collections::call_map, Some(collections::construct_map), &[], &[]),
        "Set" => constructor("Set", collections::call_set, Some(collections::construct_set), &[], &[]),
        "WeakMap" => constructor(
            "WeakMap",
            collections::call_weak_map,
            Some(collections::construct_weak_map),
            &[],
            &[],
        ),
        "WeakSet" => constructor(
            "WeakSet",
            collections::call_weak_set,
            Some(collections::construct_weak_set),
            &[],
            &[],
        ),
        "URLSearchParams" => constructor(
            "URLSearchParams",
            url::call_constructor,
            Some(url::construct),
            &[],
            &[],
        ),
        "Math" => namespace(math::FUNCTIONS, math::CONSTANTS),
        "Number" => constructor(
            "Number",
            number::call_constructor,
            None,
            &[
                ("isFinite", number::number_is_finite),
                ("isInteger", number::is_integer),
                ("isNaN", number::number_is_nan),
                ("isSafeInteger", number::is_safe_integer),
                ("parseFloat", number::parse_float),
                ("parseInt", number::parse_int),
            ],
            &[
                ("EPSILON", f64::EPSILON),
                ("MAX_SAFE_INTEGER", number::MAX_SAFE_INTEGER),
                ("MAX_VALUE", f64::MAX),
                ("MIN_SAFE_INTEGER", -number::MAX_SAFE_INTEGER),
                ("MIN_VALUE", 5e-324),
                ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
                ("NaN", f64::NAN),
                ("POSITIVE_INFINITY", f64::INFINITY),
            ],
        ),
        // Reserved: any member read, call or `new` on it throws.
        "Object" => sandbox::reserved("Object"),
        "String" => constructor(
            "String",
            string::call_constructor,
            None,
            &[
                ("fromCharCode", string::from_char_code),
                ("fromCodePoint", string::from_code_point),
            ],
            &[],
        ),
        "isFinite" => function_value("isFinite", number::is_finite),
        "isNaN" => function_value("isNaN", number::is_nan),
        "parseFloat" => function_value("parseFloat", number::parse_float),
        "parseInt" => function_value("parseInt", number::parse_int),
        "encodeURIComponent" => function_value("encodeURIComponent", url::encode_uri_component),
        "decodeURIComponent" => function_value("decodeURIComponent", url::decode_uri_component),
        _ => return None,
    })
}

fn statics(functions: &[(&'static str, NativeFn)], constants: &[(&str, f64)]) -> PropertyMap {
    let mut properties = PropertyMap::new();
    for &(name, call) in functions {
        properties.insert(name, function_value(name, call));
    }
    for &(name, value) in constants {
        properties.insert(name, Value::Number(value));
    }
    properties
}

/// A built-in constructor carrying its static members.
fn constructor(
    name: &'static str,
    call: NativeFn,
    construct: Option<NativeCtor>,
    functions: &[(&'static str, NativeFn)],
    constants: &[(&str, f64)],
) -> Value {
    Value::Object(Object::with_properties(
        ObjectKind::Function(Callable::Builtin(Builtin {
            name,
            call,
            construct,
        })),
        statics(functions, constants),
    ))
}

/// A plain namespace object such as `Math`.
fn namespace(functions: &[(&'static str, NativeFn)], constants: &[(&str, f64)]) -> Value {
    Value::Object(Object::ordinary(statics(functions, constants)))
}

// The `Object` delegate

/// A stand-in for `Object` exposing only `entries`, `fromEntries`, `keys`
/// and `values`.
///
/// The built-in `Object` global is reserved. Hosts that want these helpers
/// supply this value under the name `Object`.
pub fn object_statics() -> Value {
    namespace(
        &[
            ("entries", object_entries),
            ("fromEntries", object_from_entries),
            ("keys", object_keys),
            ("values", object_values),
        ],
        &[],
    )
}

fn object_arg(args: &[Value]) -> EvalResult<Value> {
    let value = arg(args, 0);
    if value.is_nullish() {
        return Err(errors::cannot_convert_to_object(&value));
    }
    Ok(value)
}

fn object_keys(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = object_arg(args)?;
    Ok(Value::array(
        Interpreter::own_keys(&value).into_iter().map(Value::String).collect(),
    ))
}

fn object_values(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = object_arg(args)?;
    Ok(Value::array(
        interp.own_entries(&value)?.into_iter().map(|(_, v)| v).collect(),
    ))
}

fn object_entries(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = object_arg(args)?;
    Ok(Value::array(
        interp
            .own_entries(&value)?
            .into_iter()
            .map(|(k, v)| Value::array(vec![Value::String(k), v]))
            .collect(),
    ))
}

fn object_from_entries(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let source = object_arg(args)?;
    let entries = interp.iterate_at(&source, cook_ir::Span::default())?;
    let mut properties = PropertyMap::new();
    for entry in entries {
        if entry.as_object().is_none() {
            return Err(errors::type_error(format!(
                "Iterator value {entry} is not an entry object"
            )));
        }
        let key = interp.get_property(&entry, "0")?;
        let key = interp.to_property_key(&key)?;
        let value = interp.get_property(&entry, "1")?;
        properties.insert(&key, value);
    }
    Ok(Value::Object(Object::ordinary(properties)))
}

#[cfg(test)]
mod tests;
