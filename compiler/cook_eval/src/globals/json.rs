//! The `JSON` namespace.

use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::methods::arg;
use crate::value::{from_json, Stringifier, Value};

const MAX_INDENT: usize = 10;

pub(super) fn parse(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    if arg(args, 1).is_callable() {
        return Err(errors::type_error("JSON.parse does not accept a reviver here"));
    }
    let text = interp.to_js_string(&arg(args, 0))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| errors::json_parse(&err.to_string()))?;
    Ok(from_json(&json))
}

pub(super) fn stringify(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let replacer = arg(args, 1);
    if replacer.is_callable() {
        return Err(errors::type_error(
            "JSON.stringify does not accept a replacer function here",
        ));
    }
    let allow = match &replacer {
        Value::Object(obj) if obj.is_array() => {
            let mut keys: Vec<String> = Vec::new();
            for item in obj.array_items().unwrap_or_default() {
                if matches!(item, Value::String(_) | Value::Number(_)) {
                    let key = interp.to_js_string(&item)?.to_string();
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            Some(keys)
        }
        _ => None,
    };

    let indent = match arg(args, 2) {
        Value::Number(n) => " ".repeat(n.clamp(0.0, MAX_INDENT as f64) as usize),
        Value::String(s) => s.chars().take(MAX_INDENT).collect(),
        _ => String::new(),
    };

    let mut stringifier = Stringifier::new(&indent, allow.as_deref());
    Ok(stringifier
        .stringify(&arg(args, 0))?
        .map_or(Value::Undefined, Value::from))
}
