//! Binary operators, equality and relational comparison.

use std::cmp::Ordering;
use std::rc::Rc;

use cook_ir::BinaryOperator;

use crate::errors::{self, EvalResult};
use crate::interpreter::{Hint, Interpreter};
use crate::value::{Value, MAX_STRING_LENGTH};

/// `Number::exponentiate`. Differs from `powf` for a NaN exponent and for
/// `±1 ** ±Infinity`, which are NaN.
pub fn exponentiate(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

impl Interpreter {
    /// Apply a binary operator to evaluated operands. `|>` is handled by the
    /// caller, since it is a call.
    pub(crate) fn binary_operation(
        &mut self,
        op: BinaryOperator,
        left: &Value,
        right: &Value,
    ) -> EvalResult<Value> {
        Ok(match op {
            BinaryOperator::StrictEq => Value::Bool(left.strict_equals(right)),
            BinaryOperator::StrictNotEq => Value::Bool(!left.strict_equals(right)),
            BinaryOperator::LooseEq => Value::Bool(self.loose_equals(left, right)?),
            BinaryOperator::LooseNotEq => Value::Bool(!self.loose_equals(left, right)?),
            BinaryOperator::Lt => {
                let ord = self.compare(left, right)?;
                Value::Bool(ord == Some(Ordering::Less))
            }
            BinaryOperator::Gt => {
                let ord = self.compare(left, right)?;
                Value::Bool(ord == Some(Ordering::Greater))
            }
            BinaryOperator::LtEq => {
                let ord = self.compare(left, right)?;
                Value::Bool(matches!(ord, Some(Ordering::Less | Ordering::Equal)))
            }
            BinaryOperator::GtEq => {
                let ord = self.compare(left, right)?;
                Value::Bool(matches!(ord, Some(Ordering::Greater | Ordering::Equal)))
            }
            BinaryOperator::Add => self.add(left, right)?,
            BinaryOperator::Sub => self.arithmetic(left, right, |a, b| a - b)?,
            BinaryOperator::Mul => self.arithmetic(left, right, |a, b| a * b)?,
            BinaryOperator::Div => self.arithmetic(left, right, |a, b| a / b)?,
            BinaryOperator::Rem => self.arithmetic(left, right, |a, b| a % b)?,
            BinaryOperator::Exp => self.arithmetic(left, right, exponentiate)?,
            BinaryOperator::Pipeline
            | BinaryOperator::Shl
            | BinaryOperator::Shr
            | BinaryOperator::UShr
            | BinaryOperator::BitOr
            | BinaryOperator::BitXor
            | BinaryOperator::BitAnd
            | BinaryOperator::In
            | BinaryOperator::InstanceOf => {
                return Err(errors::unsupported_operator("binary", op.as_str(), ""));
            }
        })
    }

    fn add(&mut self, left: &Value, right: &Value) -> EvalResult<Value> {
        let left = self.to_primitive(left, Hint::Default)?;
        let right = self.to_primitive(right, Hint::Default)?;
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            let mut out = self.to_js_string(&left)?.to_string();
            let tail = self.to_js_string(&right)?;
            if out.len() + tail.len() > MAX_STRING_LENGTH {
                return Err(errors::invalid_string_length());
            }
            out.push_str(&tail);
            return Ok(Value::String(Rc::from(out)));
        }
        Ok(Value::Number(
            left.primitive_to_number() + right.primitive_to_number(),
        ))
    }

    fn arithmetic(
        &mut self,
        left: &Value,
        right: &Value,
        op: impl Fn(f64, f64) -> f64,
    ) -> EvalResult<Value> {
        let a = self.to_number(left)?;
        let b = self.to_number(right)?;
        Ok(Value::Number(op(a, b)))
    }

    /// `IsLooselyEqual`.
    pub(crate) fn loose_equals(&mut self, left: &Value, right: &Value) -> EvalResult<bool> {
        Ok(match (left, right) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(a), Value::String(_)) => *a == right.primitive_to_number(),
            (Value::String(_), Value::Number(b)) => left.primitive_to_number() == *b,
            (Value::Bool(_), _) => {
                let number = Value::Number(left.primitive_to_number());
                return self.loose_equals(&number, right);
            }
            (_, Value::Bool(_)) => {
                let number = Value::Number(right.primitive_to_number());
                return self.loose_equals(left, &number);
            }
            (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                let primitive = self.to_primitive(left, Hint::Default)?;
                return self.loose_equals(&primitive, right);
            }
            (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                let primitive = self.to_primitive(right, Hint::Default)?;
                return self.loose_equals(left, &primitive);
            }
            _ => left.strict_equals(right),
        })
    }

    /// Abstract relational comparison. `None` when either side is NaN.
    pub(crate) fn compare(&mut self, left: &Value, right: &Value) -> EvalResult<Option<Ordering>> {
        let left = self.to_primitive(left, Hint::Number)?;
        let right = self.to_primitive(right, Hint::Number)?;
        if let (Value::String(a), Value::String(b)) = (&left, &right) {
            return Ok(Some(a.encode_utf16().cmp(b.encode_utf16())));
        }
        let a = left.primitive_to_number();
        let b = right.primitive_to_number();
        Ok(a.partial_cmp(&b))
    }
}

#[cfg(test)]
mod tests;
