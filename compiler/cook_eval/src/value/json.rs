//! Conversions between runtime values and JSON.

use serde_json::{Map, Number};

use super::{number_to_string, Object, ObjectKind, PropertyMap, Value};
use crate::errors::{self, EvalResult};

/// Build a runtime value from JSON. Objects keep their key order.
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(items) => Value::array(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut properties = PropertyMap::new();
            for (key, value) in map {
                properties.insert(key, from_json(value));
            }
            Value::Object(Object::ordinary(properties))
        }
    }
}

/// Convert a result for the host. Values JSON cannot represent become
/// `null` (or are dropped as object members), integral numbers become
/// JSON integers and cycles are cut with `null`.
pub fn to_json(value: &Value) -> serde_json::Value {
    to_json_inner(value, &mut Vec::new())
}

fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

fn to_json_inner(value: &Value, seen: &mut Vec<usize>) -> serde_json::Value {
    match value {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => json_number(*n),
        Value::String(s) => serde_json::Value::String(s.to_string()),
        Value::Object(obj) => {
            if seen.contains(&obj.addr()) {
                return serde_json::Value::Null;
            }
            seen.push(obj.addr());
            let data = obj.borrow();
            let json = match &data.kind {
                ObjectKind::Array(items) => serde_json::Value::Array(
                    items.iter().map(|item| to_json_inner(item, seen)).collect(),
                ),
                ObjectKind::Function(_) => serde_json::Value::Null,
                ObjectKind::Date(time) => crate::methods::date::to_iso_string(*time)
                    .map_or(serde_json::Value::Null, serde_json::Value::String),
                _ => {
                    let mut map = Map::new();
                    for (key, item) in data.properties.entries() {
                        if item.is_undefined() || item.is_callable() {
                            continue;
                        }
                        map.insert(key.to_string(), to_json_inner(&item, seen));
                    }
                    serde_json::Value::Object(map)
                }
            };
            drop(data);
            seen.pop();
            json
        }
    }
}

/// `JSON.stringify` without a function replacer.
pub(crate) struct Stringifier<'a> {
    indent: &'a str,
    allow: Option<&'a [String]>,
    stack: Vec<usize>,
}

impl<'a> Stringifier<'a> {
    pub(crate) fn new(indent: &'a str, allow: Option<&'a [String]>) -> Self {
        Stringifier {
            indent,
            allow,
            stack: Vec::new(),
        }
    }

    /// `None` when the value has no JSON form (`undefined`, functions).
    pub(crate) fn stringify(&mut self, value: &Value) -> EvalResult<Option<String>> {
        self.serialize(value, 0)
    }

    fn quote(s: &str) -> String {
        serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
    }

    fn serialize(&mut self, value: &Value, level: usize) -> EvalResult<Option<String>> {
        Ok(Some(match value {
            Value::Undefined => return Ok(None),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.is_finite() => number_to_string(*n),
            Value::Number(_) => "null".to_string(),
            Value::String(s) => Self::quote(s),
            Value::Object(obj) => return self.serialize_object(obj, level),
        }))
    }

    fn serialize_object(&mut self, obj: &Object, level: usize) -> EvalResult<Option<String>> {
        enum Shape {
            Array(Vec<Value>),
            Members(Vec<(String, Value)>),
        }
        let shape = {
            let data = obj.borrow();
            match &data.kind {
                ObjectKind::Function(_) => return Ok(None),
                ObjectKind::Reserved(_) => return Err(errors::reserved_object()),
                ObjectKind::Date(time) => {
                    return Ok(Some(crate::methods::date::to_iso_string(*time).map_or_else(
                        || "null".to_string(),
                        |iso| Self::quote(&iso),
                    )));
                }
                ObjectKind::Array(items) => Shape::Array(items.clone()),
                _ => Shape::Members(
                    data.properties
                        .entries()
                        .into_iter()
                        .filter(|(key, _)| {
                            self.allow
                                .map_or(true, |allow| allow.iter().any(|k| **k == **key))
                        })
                        .map(|(key, value)| (key.to_string(), value))
                        .collect(),
                ),
            }
        };

        if self.stack.contains(&obj.addr()) {
            return Err(errors::circular_json());
        }
        self.stack.push(obj.addr());

        let (open, close, parts) = match shape {
            Shape::Array(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in &items {
                    let part = self.serialize(item, level + 1)?;
                    parts.push(part.unwrap_or_else(|| "null".to_string()));
                }
                ('[', ']', parts)
            }
            Shape::Members(members) => {
                let mut parts = Vec::with_capacity(members.len());
                let separator = if self.indent.is_empty() { ":" } else { ": " };
                for (key, item) in &members {
                    if let Some(part) = self.serialize(item, level + 1)? {
                        parts.push(format!("{}{separator}{part}", Self::quote(key)));
                    }
                }
                ('{', '}', parts)
            }
        };
        self.stack.pop();

        if parts.is_empty() {
            return Ok(Some(format!("{open}{close}")));
        }
        if self.indent.is_empty() {
            return Ok(Some(format!("{open}{}{close}", parts.join(","))));
        }
        let inner = self.indent.repeat(level + 1);
        let outer = self.indent.repeat(level);
        let body = parts
            .iter()
            .map(|part| format!("{inner}{part}"))
            .collect::<Vec<_>>()
            .join(",\n");
        Ok(Some(format!("{open}\n{body}\n{outer}{close}")))
    }
}
