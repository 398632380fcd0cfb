//! Type conversions that may run user code (`toString` / `valueOf`
//! defined on plain objects).

use std::rc::Rc;

use super::Interpreter;
use crate::errors::{self, EvalResult};
use crate::value::{default_object_string, Object, ObjectKind, Value};

/// Preferred type for `ToPrimitive`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Hint {
    Default,
    Number,
    String,
}

impl Interpreter {
    /// `ToPrimitive`. Own `toString`/`valueOf` functions take precedence
    /// over the built-in conversion of the object's kind.
    pub(crate) fn to_primitive(&mut self, value: &Value, hint: Hint) -> EvalResult<Value> {
        let Value::Object(obj) = value else {
            return Ok(value.clone());
        };
        let order = match hint {
            Hint::String => ["toString", "valueOf"],
            Hint::Number | Hint::Default => ["valueOf", "toString"],
        };
        for name in order {
            let method = obj.borrow().properties.get(name).cloned();
            if let Some(method) = method.filter(Value::is_callable) {
                let result = self.call(&method, value, &[])?;
                if !matches!(result, Value::Object(_)) {
                    return Ok(result);
                }
            }
        }
        self.builtin_primitive(obj, hint)
    }

    fn builtin_primitive(&mut self, obj: &Object, hint: Hint) -> EvalResult<Value> {
        let kind_value = {
            let data = obj.borrow();
            match &data.kind {
                ObjectKind::Date(time) if hint == Hint::Number => Some(Value::Number(*time)),
                ObjectKind::Reserved(_) => return Err(errors::reserved_object()),
                ObjectKind::Array(_) => None,
                _ => Some(Value::from(default_object_string(obj, &mut Vec::new()))),
            }
        };
        match kind_value {
            Some(value) => Ok(value),
            None => Ok(Value::from(self.join_array(obj, ",")?)),
        }
    }

    /// `Array.prototype.join`, converting elements with `ToString`.
    pub(crate) fn join_array(&mut self, array: &Object, separator: &str) -> EvalResult<String> {
        if self.join_stack.iter().any(|addr| *addr == array.addr()) {
            return Ok(String::new());
        }
        let items = array.array_items().unwrap_or_default();
        self.join_stack.push(array.addr());
        let mut out = String::new();
        let mut result = Ok(());
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            if item.is_nullish() {
                continue;
            }
            match self.to_js_string(item) {
                Ok(s) => out.push_str(&s),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.join_stack.pop();
        result.map(|()| out)
    }

    /// `ToNumber`.
    pub(crate) fn to_number(&mut self, value: &Value) -> EvalResult<f64> {
        match value {
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Hint::Number)?;
                Ok(primitive.primitive_to_number())
            }
            other => Ok(other.primitive_to_number()),
        }
    }

    /// `ToString`.
    pub(crate) fn to_js_string(&mut self, value: &Value) -> EvalResult<Rc<str>> {
        match value {
            Value::String(s) => Ok(Rc::clone(s)),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Hint::String)?;
                Ok(Rc::from(primitive.to_string()))
            }
            other => Ok(Rc::from(other.to_string())),
        }
    }

    /// `ToPropertyKey`.
    pub(crate) fn to_property_key(&mut self, value: &Value) -> EvalResult<Rc<str>> {
        self.to_js_string(value)
    }
}
