//! The `Math` namespace.

use std::cell::Cell;
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

use crate::errors::EvalResult;
use crate::interpreter::Interpreter;
use crate::methods::arg;
use crate::operators::exponentiate;
use crate::value::number::to_int32;
use crate::value::{NativeFn, Value};

/// `Math.name(x)` for a plain `f64 -> f64` function.
macro_rules! unary {
    ($($name:ident => $op:expr;)*) => {
        $(
            fn $name(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
                let x = interp.to_number(&arg(args, 0))?;
                let op: fn(f64) -> f64 = $op;
                Ok(Value::Number(op(x)))
            }
        )*
    };
}

unary! {
    abs => f64::abs;
    acos => f64::acos;
    acosh => f64::acosh;
    asin => f64::asin;
    asinh => f64::asinh;
    atan => f64::atan;
    atanh => f64::atanh;
    cbrt => f64::cbrt;
    ceil => f64::ceil;
    cos => f64::cos;
    cosh => f64::cosh;
    exp => f64::exp;
    expm1 => f64::exp_m1;
    floor => f64::floor;
    fround => |x| f64::from(x as f32);
    log => f64::ln;
    log10 => f64::log10;
    log1p => f64::ln_1p;
    log2 => f64::log2;
    round => round_half_up;
    sign => sign_of;
    sin => f64::sin;
    sinh => f64::sinh;
    sqrt => f64::sqrt;
    tan => f64::tan;
    tanh => f64::tanh;
    trunc => f64::trunc;
    clz32 => |x| f64::from((to_int32(x) as u32).leading_zeros());
}

pub(super) const FUNCTIONS: &[(&str, NativeFn)] = &[
    ("abs", abs),
    ("acos", acos),
    ("acosh", acosh),
    ("asin", asin),
    ("asinh", asinh),
    ("atan", atan),
    ("atan2", atan2),
    ("atanh", atanh),
    ("cbrt", cbrt),
    ("ceil", ceil),
    ("clz32", clz32),
    ("cos", cos),
    ("cosh", cosh),
    ("exp", exp),
    ("expm1", expm1),
    ("floor", floor),
    ("fround", fround),
    ("hypot", hypot),
    ("imul", imul),
    ("log", log),
    ("log10", log10),
    ("log1p", log1p),
    ("log2", log2),
    ("max", max),
    ("min", min),
    ("pow", pow),
    ("random", random),
    ("round", round),
    ("sign", sign),
    ("sin", sin),
    ("sinh", sinh),
    ("sqrt", sqrt),
    ("tan", tan),
    ("tanh", tanh),
    ("trunc", trunc),
];

pub(super) const CONSTANTS: &[(&str, f64)] = &[
    ("E", std::f64::consts::E),
    ("LN10", std::f64::consts::LN_10),
    ("LN2", std::f64::consts::LN_2),
    ("LOG10E", std::f64::consts::LOG10_E),
    ("LOG2E", std::f64::consts::LOG2_E),
    ("PI", std::f64::consts::PI),
    ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ("SQRT2", std::f64::consts::SQRT_2),
];

/// Rounds half-way cases towards +Infinity, keeping -0 for `-0.5..0`.
fn round_half_up(x: f64) -> f64 {
    if !x.is_finite() || x.fract() == 0.0 {
        return x;
    }
    if (-0.5..0.0).contains(&x) {
        return -0.0;
    }
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

fn sign_of(x: f64) -> f64 {
    if x.is_nan() || x == 0.0 {
        x
    } else {
        x.signum()
    }
}

fn numbers(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Vec<f64>> {
    args.iter().map(|value| interp.to_number(value)).collect()
}

fn atan2(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let y = interp.to_number(&arg(args, 0))?;
    let x = interp.to_number(&arg(args, 1))?;
    Ok(Value::Number(y.atan2(x)))
}

fn pow(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let base = interp.to_number(&arg(args, 0))?;
    let exponent = interp.to_number(&arg(args, 1))?;
    Ok(Value::Number(exponentiate(base, exponent)))
}

fn imul(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let a = to_int32(interp.to_number(&arg(args, 0))?);
    let b = to_int32(interp.to_number(&arg(args, 1))?);
    Ok(Value::Number(f64::from(a.wrapping_mul(b))))
}

fn hypot(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    if values.iter().any(|v| v.is_infinite()) {
        return Ok(Value::Number(f64::INFINITY));
    }
    Ok(Value::Number(values.iter().map(|v| v * v).sum::<f64>().sqrt()))
}

/// `+0` counts as larger than `-0`; any NaN wins.
fn max(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    Ok(Value::Number(values.into_iter().fold(f64::NEG_INFINITY, |acc, v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else if v > acc || (v == 0.0 && acc == 0.0 && acc.is_sign_negative()) {
            v
        } else {
            acc
        }
    })))
}

fn min(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let values = numbers(interp, args)?;
    Ok(Value::Number(values.into_iter().fold(f64::INFINITY, |acc, v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else if v < acc || (v == 0.0 && acc == 0.0 && v.is_sign_negative()) {
            v
        } else {
            acc
        }
    })))
}

thread_local! {
    static RANDOM_STATE: RandomState = RandomState::new();
    static RANDOM_COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Uniform in `[0, 1)`. Not cryptographically secure.
fn random(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let counter = RANDOM_COUNTER.with(|c| {
        let next = c.get().wrapping_add(1);
        c.set(next);
        next
    });
    let bits = RANDOM_STATE.with(|state| state.hash_one(counter));
    Ok(Value::Number((bits >> 11) as f64 / (1u64 << 53) as f64))
}
