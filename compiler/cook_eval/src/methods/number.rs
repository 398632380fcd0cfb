//! `Number.prototype` and `Boolean.prototype` methods, plus the `Number`
//! statics.

use super::{arg, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::number::{
    number_to_exponential, number_to_fixed, number_to_precision, number_to_radix_string,
    number_to_string, parse_float as parse_float_str, parse_int as parse_int_str,
    to_integer_or_infinity,
};
use crate::value::Value;

pub(crate) const METHODS: MethodTable = &[
    ("toExponential", to_exponential),
    ("toFixed", to_fixed),
    ("toLocaleString", to_string),
    ("toPrecision", to_precision),
    ("toString", to_string),
    ("valueOf", value_of),
];

pub(crate) const BOOLEAN_METHODS: MethodTable =
    &[("toString", boolean_to_string), ("valueOf", boolean_value_of)];

pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn this_number(this: &Value, method: &str) -> EvalResult<f64> {
    this.as_number()
        .ok_or_else(|| errors::wrong_receiver(method, "Number"))
}

/// A digit-count argument in `range`, or `invalid_digits`.
fn digits_arg(
    interp: &mut Interpreter,
    args: &[Value],
    method: &str,
    range: std::ops::RangeInclusive<f64>,
) -> EvalResult<Option<usize>> {
    match args.first() {
        None | Some(Value::Undefined) => Ok(None),
        Some(value) => {
            let digits = to_integer_or_infinity(interp.to_number(value)?);
            if range.contains(&digits) {
                Ok(Some(digits as usize))
            } else {
                Err(errors::invalid_digits(method))
            }
        }
    }
}

fn to_fixed(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = this_number(this, "toFixed")?;
    let digits = digits_arg(interp, args, "toFixed", 0.0..=100.0)?.unwrap_or(0);
    Ok(Value::from(number_to_fixed(value, digits)))
}

fn to_exponential(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = this_number(this, "toExponential")?;
    let digits = digits_arg(interp, args, "toExponential", 0.0..=100.0)?;
    Ok(Value::from(number_to_exponential(value, digits)))
}

fn to_precision(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = this_number(this, "toPrecision")?;
    match digits_arg(interp, args, "toPrecision", 1.0..=100.0)? {
        Some(precision) => Ok(Value::from(number_to_precision(value, precision))),
        None => Ok(Value::from(number_to_string(value))),
    }
}

fn to_string(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let value = this_number(this, "toString")?;
    let radix = match args.first() {
        None | Some(Value::Undefined) => 10.0,
        Some(radix) => to_integer_or_infinity(interp.to_number(radix)?),
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(errors::invalid_radix());
    }
    if radix == 10.0 {
        return Ok(Value::from(number_to_string(value)));
    }
    Ok(Value::from(number_to_radix_string(value, radix as u32)))
}

fn value_of(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(this_number(this, "valueOf")?))
}

fn boolean_to_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    match this {
        Value::Bool(b) => Ok(Value::string(if *b { "true" } else { "false" })),
        _ => Err(errors::wrong_receiver("toString", "Boolean")),
    }
}

fn boolean_value_of(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    match this {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        _ => Err(errors::wrong_receiver("valueOf", "Boolean")),
    }
}

// Statics

/// `Number(value)`.
pub(crate) fn call_constructor(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    match args.first() {
        None => Ok(Value::Number(0.0)),
        Some(value) => Ok(Value::Number(interp.to_number(value)?)),
    }
}

/// `Boolean(value)`.
pub(crate) fn call_boolean(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(arg(args, 0).to_boolean()))
}

fn number_arg(args: &[Value]) -> Option<f64> {
    args.first().and_then(Value::as_number)
}

pub(crate) fn is_integer(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(
        number_arg(args).is_some_and(|n| n.is_finite() && n.trunc() == n),
    ))
}

pub(crate) fn is_safe_integer(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(number_arg(args).is_some_and(|n| {
        n.is_finite() && n.trunc() == n && n.abs() <= MAX_SAFE_INTEGER
    })))
}

/// `Number.isFinite`: no coercion.
pub(crate) fn number_is_finite(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(number_arg(args).is_some_and(f64::is_finite)))
}

/// `Number.isNaN`: no coercion.
pub(crate) fn number_is_nan(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(number_arg(args).is_some_and(f64::is_nan)))
}

/// Global `isFinite`: coerces.
pub(crate) fn is_finite(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(interp.to_number(&arg(args, 0))?.is_finite()))
}

/// Global `isNaN`: coerces.
pub(crate) fn is_nan(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(interp.to_number(&arg(args, 0))?.is_nan()))
}

pub(crate) fn parse_float(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = interp.to_js_string(&arg(args, 0))?;
    Ok(Value::Number(parse_float_str(&s)))
}

pub(crate) fn parse_int(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = interp.to_js_string(&arg(args, 0))?;
    let radix = match args.get(1) {
        None | Some(Value::Undefined) => 0,
        Some(value) => crate::value::number::to_int32(interp.to_number(value)?) as u32,
    };
    Ok(Value::Number(parse_int_str(&s, radix)))
}
