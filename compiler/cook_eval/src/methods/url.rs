//! `URLSearchParams` and the URI component codecs.

use super::{arg, callback, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Object, ObjectKind, Value};

pub(crate) const METHODS: MethodTable = &[
    ("append", append),
    ("delete", delete),
    ("entries", entries),
    ("forEach", for_each),
    ("get", get),
    ("getAll", get_all),
    ("has", has),
    ("keys", keys),
    ("set", set),
    ("sort", sort),
    ("toString", to_string),
    ("values", values),
];

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Characters `encodeURIComponent` leaves alone.
fn is_component_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&b)
}

/// Characters the `application/x-www-form-urlencoded` serializer leaves
/// alone (space becomes `+`).
fn is_form_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"*-._".contains(&b)
}

fn percent_encode(s: &str, safe: fn(u8) -> bool, space_as_plus: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if safe(b) {
            out.push(b as char);
        } else if space_as_plus && b == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(HEX[usize::from(b >> 4)] as char);
            out.push(HEX[usize::from(b & 0xF)] as char);
        }
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Decode `%XX` escapes. Strict mode fails on malformed escapes and
/// invalid UTF-8; lenient mode (form decoding) keeps them verbatim.
fn percent_decode(s: &str, plus_as_space: bool, strict: bool) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| Some(hex_value(pair[0])? << 4 | hex_value(pair[1])?));
                match decoded {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None if strict => return None,
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    if strict {
        String::from_utf8(out).ok()
    } else {
        Some(String::from_utf8_lossy(&out).into_owned())
    }
}

/// `application/x-www-form-urlencoded` serialization of `pairs`.
pub(crate) fn serialize(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                percent_encode(name, is_form_safe, true),
                percent_encode(value, is_form_safe, true)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a query string, with or without its leading `?`.
fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (name, value) = part.split_once('=').unwrap_or((part, ""));
            (
                percent_decode(name, true, false).unwrap_or_default(),
                percent_decode(value, true, false).unwrap_or_default(),
            )
        })
        .collect()
}

pub(crate) fn encode_uri_component(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = interp.to_js_string(&arg(args, 0))?;
    // Lone surrogates cannot reach a Rust string; they were replaced when
    // the string was built.
    Ok(Value::from(percent_encode(&s, is_component_safe, false)))
}

pub(crate) fn decode_uri_component(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = interp.to_js_string(&arg(args, 0))?;
    percent_decode(&s, false, true)
        .map(Value::from)
        .ok_or_else(errors::uri_malformed)
}

// URLSearchParams

fn with_pairs<R>(this: &Value, method: &str, f: impl FnOnce(&mut Vec<(String, String)>) -> R) -> EvalResult<R> {
    let obj = this
        .as_object()
        .ok_or_else(|| errors::wrong_receiver(method, "URLSearchParams"))?;
    let mut data = obj.borrow_mut();
    match &mut data.kind {
        ObjectKind::UrlSearchParams(pairs) => Ok(f(pairs)),
        _ => Err(errors::wrong_receiver(method, "URLSearchParams")),
    }
}

fn name_arg(interp: &mut Interpreter, args: &[Value]) -> EvalResult<String> {
    Ok(interp.to_js_string(&arg(args, 0))?.to_string())
}

fn append(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let name = name_arg(interp, args)?;
    let value = interp.to_js_string(&arg(args, 1))?.to_string();
    with_pairs(this, "append", |pairs| pairs.push((name, value)))?;
    Ok(Value::Undefined)
}

fn delete(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let name = name_arg(interp, args)?;
    let value = match args.get(1) {
        None | Some(Value::Undefined) => None,
        Some(value) => Some(interp.to_js_string(value)?.to_string()),
    };
    with_pairs(this, "delete", |pairs| {
        pairs.retain(|(n, v)| n != &name || value.as_ref().is_some_and(|value| v != value));
    })?;
    Ok(Value::Undefined)
}

fn get(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let name = name_arg(interp, args)?;
    let found = with_pairs(this, "get", |pairs| {
        pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| v.clone())
    })?;
    Ok(found.map_or(Value::Null, Value::from))
}

fn get_all(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let name = name_arg(interp, args)?;
    let found = with_pairs(this, "getAll", |pairs| {
        pairs
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, v)| Value::string(v))
            .collect()
    })?;
    Ok(Value::array(found))
}

fn has(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let name = name_arg(interp, args)?;
    let value = match args.get(1) {
        None | Some(Value::Undefined) => None,
        Some(value) => Some(interp.to_js_string(value)?.to_string()),
    };
    let found = with_pairs(this, "has", |pairs| {
        pairs
            .iter()
            .any(|(n, v)| *n == name && value.as_ref().map_or(true, |value| v == value))
    })?;
    Ok(Value::Bool(found))
}

/// Replaces the first pair named `name` and drops the others.
fn set(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let name = name_arg(interp, args)?;
    let value = interp.to_js_string(&arg(args, 1))?.to_string();
    with_pairs(this, "set", |pairs| {
        match pairs.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                pairs[first].1 = value;
                let mut index = 0;
                pairs.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((name, value)),
        }
    })?;
    Ok(Value::Undefined)
}

/// Stable sort by UTF-16 code units of the name.
fn sort(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    with_pairs(this, "sort", |pairs| {
        pairs.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
    })?;
    Ok(Value::Undefined)
}

fn to_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(with_pairs(this, "toString", |pairs| serialize(pairs))?))
}

fn snapshot(this: &Value, method: &str) -> EvalResult<Vec<(String, String)>> {
    with_pairs(this, method, |pairs| pairs.clone())
}

fn keys(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::array(
        snapshot(this, "keys")?.iter().map(|(n, _)| Value::string(n)).collect(),
    ))
}

fn values(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::array(
        snapshot(this, "values")?.iter().map(|(_, v)| Value::string(v)).collect(),
    ))
}

fn entries(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::array(
        snapshot(this, "entries")?
            .iter()
            .map(|(n, v)| Value::array(vec![Value::string(n), Value::string(v)]))
            .collect(),
    ))
}

fn for_each(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let f = callback(args, 0)?;
    let this_arg = arg(args, 1);
    for (name, value) in snapshot(this, "forEach")? {
        interp.call(&f, &this_arg, &[Value::from(value), Value::from(name), this.clone()])?;
    }
    Ok(Value::Undefined)
}

/// `new URLSearchParams(init)`: a query string, a sequence of pairs, a
/// record or another `URLSearchParams`.
pub(crate) fn construct(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    let init = arg(args, 0);
    let pairs = match &init {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(obj) => {
            let existing = match &obj.borrow().kind {
                ObjectKind::UrlSearchParams(pairs) => Some(pairs.clone()),
                _ => None,
            };
            match existing {
                Some(pairs) => pairs,
                None => match Interpreter::iterate(&init) {
                    Some(items) => {
                        let mut pairs = Vec::with_capacity(items.len());
                        for item in items {
                            let parts = Interpreter::iterate(&item)
                                .filter(|parts| parts.len() == 2)
                                .ok_or_else(|| {
                                    errors::type_error(
                                        "Failed to construct 'URLSearchParams': Sequence initializer must only contain pair elements",
                                    )
                                })?;
                            pairs.push((
                                interp.to_js_string(&parts[0])?.to_string(),
                                interp.to_js_string(&parts[1])?.to_string(),
                            ));
                        }
                        pairs
                    }
                    None => {
                        let mut pairs = Vec::new();
                        for (key, value) in interp.own_entries(&init)? {
                            pairs.push((key.to_string(), interp.to_js_string(&value)?.to_string()));
                        }
                        pairs
                    }
                },
            }
        }
        other => parse_query(&interp.to_js_string(other)?),
    };
    Ok(Value::Object(Object::new(ObjectKind::UrlSearchParams(pairs))))
}

pub(crate) fn call_constructor(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Err(errors::requires_new("URLSearchParams"))
}
