//! Property access, own-key enumeration and iteration.

use std::rc::Rc;

use super::Interpreter;
use crate::errors::{self, EvalResult};
use crate::methods;
use crate::sandbox;
use crate::value::number::{array_index, to_integer_or_infinity};
use crate::value::{Object, ObjectKind, Value, MAX_ARRAY_LENGTH};

/// Describe a primitive the way property errors quote it.
fn describe_primitive(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string '{s}'"),
        other => format!("{} '{other}'", other.type_of()),
    }
}

/// Code units of a string, as JavaScript indexes them.
pub(crate) fn utf16_units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

impl Interpreter {
    /// `GetValue` on a property reference.
    pub(crate) fn get_property(&mut self, base: &Value, key: &str) -> EvalResult<Value> {
        match base {
            Value::Undefined | Value::Null => {
                Err(errors::cannot_read_property(&base.to_string(), key))
            }
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.encode_utf16().count() as f64));
                }
                if let Some(index) = array_index(key) {
                    let units = utf16_units(s);
                    return Ok(units.get(index).map_or(Value::Undefined, |unit| {
                        Value::from(String::from_utf16_lossy(&[*unit]))
                    }));
                }
                Ok(methods::primitive_method(base, key)
                    .map(|builtin| Value::Object(Object::builtin(builtin)))
                    .or_else(|| sandbox::intrinsic_property(base, key))
                    .unwrap_or_default())
            }
            Value::Number(_) | Value::Bool(_) => Ok(methods::primitive_method(base, key)
                .map(|builtin| Value::Object(Object::builtin(builtin)))
                .or_else(|| sandbox::intrinsic_property(base, key))
                .unwrap_or_default()),
            Value::Object(obj) => self.get_object_property(obj, base, key),
        }
    }

    fn get_object_property(&mut self, obj: &Object, base: &Value, key: &str) -> EvalResult<Value> {
        let data = obj.borrow();
        let intrinsic = match &data.kind {
            ObjectKind::Reserved(_) => return Err(errors::reserved_object()),
            ObjectKind::Array(items) => {
                if key == "length" {
                    return Ok(Value::Number(items.len() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(items.get(index).cloned().unwrap_or_default());
                }
                None
            }
            ObjectKind::Function(callable) => match key {
                "name" => Some(Value::from(callable.name())),
                "length" => Some(Value::Number(callable.length() as f64)),
                _ => None,
            },
            ObjectKind::Error(error) => match key {
                "name" => Some(Value::string(&error.name)),
                "message" => Some(Value::string(&error.message)),
                _ => None,
            },
            ObjectKind::Map(table)
            | ObjectKind::Set(table) => (key == "size").then(|| Value::Number(table.len() as f64)),
            ObjectKind::UrlSearchParams(pairs) => {
                (key == "size").then(|| Value::Number(pairs.len() as f64))
            }
            ObjectKind::RegExp(re) => match key {
                "source" => Some(Value::string(&re.source)),
                "flags" => Some(Value::string(&re.flags)),
                "global" => Some(Value::Bool(re.flags.contains('g'))),
                "ignoreCase" => Some(Value::Bool(re.flags.contains('i'))),
                "multiline" => Some(Value::Bool(re.flags.contains('m'))),
                "dotAll" => Some(Value::Bool(re.flags.contains('s'))),
                "lastIndex" => Some(Value::Number(re.last_index as f64)),
                _ => None,
            },
            _ => None,
        };
        if let Some(own) = data.properties.get(key) {
            return Ok(own.clone());
        }
        if let Some(value) = intrinsic {
            return Ok(value);
        }
        let method = methods::object_method(&data.kind, key);
        drop(data);
        if let Some(builtin) = method {
            return Ok(Value::Object(Object::builtin(builtin)));
        }
        Ok(sandbox::intrinsic_property(base, key).unwrap_or_default())
    }

    /// `PutValue` on a property reference.
    pub(crate) fn set_property(&mut self, base: &Value, key: &str, value: Value) -> EvalResult<()> {
        let obj = match base {
            Value::Undefined | Value::Null => {
                return Err(errors::cannot_set_property(&base.to_string(), key));
            }
            Value::Object(obj) => obj,
            primitive => {
                return Err(errors::cannot_create_property(key, &describe_primitive(primitive)));
            }
        };

        // Numeric conversions run before the object is borrowed.
        let is_array = obj.is_array();
        let is_regexp = matches!(obj.borrow().kind, ObjectKind::RegExp(_));
        let new_length = if is_array && key == "length" {
            let n = self.to_number(&value)?;
            if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
                return Err(errors::invalid_array_length());
            }
            if n as usize > MAX_ARRAY_LENGTH {
                return Err(errors::array_too_large(n as usize));
            }
            Some(n as usize)
        } else {
            None
        };
        let last_index = if is_regexp && key == "lastIndex" {
            Some(to_integer_or_infinity(self.to_number(&value)?).max(0.0) as usize)
        } else {
            None
        };

        let mut data = obj.borrow_mut();
        if data.frozen {
            return Err(errors::read_only_property(key));
        }
        match &mut data.kind {
            ObjectKind::Reserved(_) => return Err(errors::reserved_object()),
            ObjectKind::Array(items) => {
                if let Some(len) = new_length {
                    items.resize(len, Value::Undefined);
                    return Ok(());
                }
                if let Some(index) = array_index(key) {
                    if index >= MAX_ARRAY_LENGTH {
                        return Err(errors::array_too_large(index + 1));
                    }
                    if index >= items.len() {
                        items.resize(index + 1, Value::Undefined);
                    }
                    items[index] = value;
                    return Ok(());
                }
            }
            ObjectKind::RegExp(re) => {
                if let Some(last_index) = last_index {
                    re.last_index = last_index;
                    return Ok(());
                }
            }
            _ => {}
        }
        data.properties.insert(key, value);
        Ok(())
    }

    /// Own enumerable string keys, in enumeration order. `null` and
    /// `undefined` have none.
    pub(crate) fn own_keys(value: &Value) -> Vec<Rc<str>> {
        match value {
            Value::String(s) => (0..s.encode_utf16().count())
                .map(|i| Rc::from(i.to_string()))
                .collect(),
            Value::Object(obj) => {
                let data = obj.borrow();
                let mut keys: Vec<Rc<str>> = match &data.kind {
                    ObjectKind::Array(items) => {
                        (0..items.len()).map(|i| Rc::from(i.to_string())).collect()
                    }
                    _ => Vec::new(),
                };
                keys.extend(data.properties.keys());
                keys
            }
            _ => Vec::new(),
        }
    }

    /// Own enumerable properties with their values.
    pub(crate) fn own_entries(&mut self, value: &Value) -> EvalResult<Vec<(Rc<str>, Value)>> {
        let keys = Self::own_keys(value);
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let item = self.get_property(value, &key)?;
            entries.push((key, item));
        }
        Ok(entries)
    }

    /// Elements produced by iterating `value`, or `None` when it is not
    /// iterable.
    pub(crate) fn iterate(value: &Value) -> Option<Vec<Value>> {
        match value {
            Value::String(s) => Some(s.chars().map(|c| Value::from(c.to_string())).collect()),
            Value::Object(obj) => match &obj.borrow().kind {
                ObjectKind::Array(items) => Some(items.clone()),
                ObjectKind::Set(table) => Some(table.entries().into_iter().map(|(k, _)| k).collect()),
                ObjectKind::Map(table) => Some(
                    table
                        .entries()
                        .into_iter()
                        .map(|(k, v)| Value::array(vec![k, v]))
                        .collect(),
                ),
                ObjectKind::UrlSearchParams(pairs) => Some(
                    pairs
                        .iter()
                        .map(|(k, v)| Value::array(vec![Value::string(k), Value::string(v)]))
                        .collect(),
                ),
                _ => None,
            },
            _ => None,
        }
    }

    /// [`Self::iterate`], failing with a `TypeError` that quotes `span`.
    pub(crate) fn iterate_at(
        &self,
        value: &Value,
        span: cook_ir::Span,
    ) -> EvalResult<Vec<Value>> {
        Self::iterate(value).ok_or_else(|| {
            let snippet = self.snippet(span);
            let what = if snippet.is_empty() {
                value.to_string()
            } else {
                snippet
            };
            self.locate(errors::not_iterable(&what), span)
        })
    }
}
