#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::interpreter::Program;

fn interp() -> Interpreter {
    Interpreter::new(Rc::new(Program::default()))
}

fn eval(op: BinaryOperator, left: Value, right: Value) -> Value {
    interp().binary_operation(op, &left, &right).unwrap()
}

#[test]
fn test_add_concatenates_when_either_side_is_a_string() {
    assert_eq!(
        eval(BinaryOperator::Add, Value::Number(1.0), Value::string("2")),
        Value::string("12")
    );
    assert_eq!(
        eval(BinaryOperator::Add, Value::array(vec![Value::Number(1.0)]), Value::Number(2.0)),
        Value::string("12")
    );
    assert_eq!(
        eval(BinaryOperator::Add, Value::Bool(true), Value::Null),
        Value::Number(1.0)
    );
    assert!(matches!(
        eval(BinaryOperator::Add, Value::Undefined, Value::Number(1.0)),
        Value::Number(n) if n.is_nan()
    ));
}

#[test]
fn test_arithmetic_coerces() {
    assert_eq!(
        eval(BinaryOperator::Sub, Value::string("5"), Value::Number(2.0)),
        Value::Number(3.0)
    );
    assert_eq!(
        eval(BinaryOperator::Rem, Value::Number(-5.0), Value::Number(3.0)),
        Value::Number(-2.0)
    );
    assert_eq!(
        eval(BinaryOperator::Div, Value::Number(1.0), Value::Number(-0.0)),
        Value::Number(f64::NEG_INFINITY)
    );
    assert_eq!(
        eval(BinaryOperator::Exp, Value::Number(2.0), Value::Number(10.0)),
        Value::Number(1024.0)
    );
}

#[test]
fn test_exponentiate_edge_cases() {
    assert!(exponentiate(1.0, f64::NAN).is_nan());
    assert!(exponentiate(1.0, f64::INFINITY).is_nan());
    assert!(exponentiate(-1.0, f64::NEG_INFINITY).is_nan());
    assert_eq!(exponentiate(f64::NAN, 0.0), 1.0);
}

#[test]
fn test_loose_equality_table() {
    let mut interp = interp();
    let cases = [
        (Value::Null, Value::Undefined, true),
        (Value::Null, Value::Number(0.0), false),
        (Value::string("1"), Value::Number(1.0), true),
        (Value::Bool(true), Value::string("1"), true),
        (Value::Bool(false), Value::string(""), true),
        (Value::array(vec![]), Value::string(""), true),
        (Value::array(vec![Value::Number(1.0)]), Value::Number(1.0), true),
        (Value::Number(f64::NAN), Value::Number(f64::NAN), false),
        (Value::string("a"), Value::string("a"), true),
    ];
    for (left, right, expected) in cases {
        assert_eq!(
            interp.loose_equals(&left, &right).unwrap(),
            expected,
            "{left:?} == {right:?}"
        );
    }
}

#[test]
fn test_relational_comparison() {
    let lt = |l: Value, r: Value| eval(BinaryOperator::Lt, l, r);
    assert_eq!(lt(Value::string("10"), Value::string("9")), Value::Bool(true));
    assert_eq!(lt(Value::string("10"), Value::Number(9.0)), Value::Bool(false));
    assert_eq!(lt(Value::Null, Value::Number(1.0)), Value::Bool(true));
    assert_eq!(lt(Value::Undefined, Value::Number(1.0)), Value::Bool(false));
    assert_eq!(
        eval(BinaryOperator::GtEq, Value::Undefined, Value::Undefined),
        Value::Bool(false)
    );
    assert_eq!(
        eval(BinaryOperator::LtEq, Value::Null, Value::Null),
        Value::Bool(true)
    );
}

#[test]
fn test_string_comparison_uses_code_units() {
    // U+1F600 encodes as 0xD83D 0xDE00, below 0xFF61.
    assert_eq!(
        eval(BinaryOperator::Lt, Value::string("\u{1F600}"), Value::string("\u{FF61}")),
        Value::Bool(true)
    );
}

#[test]
fn test_bitwise_operators_are_rejected() {
    let err = interp()
        .binary_operation(BinaryOperator::BitOr, &Value::Number(1.0), &Value::Number(2.0))
        .unwrap_err();
    assert_eq!(err.kind, crate::EvalErrorKind::SyntaxError);
    assert!(err.message.contains('|'), "{}", err.message);
}

fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        prop_oneof![any::<f64>(), Just(0.0), Just(-0.0), Just(f64::NAN)].prop_map(Value::Number),
        "[0-9a-z ]{0,4}".prop_map(|s| Value::string(&s)),
    ]
}

proptest! {
    #[test]
    fn prop_loose_equality_is_symmetric(a in primitive(), b in primitive()) {
        let mut interp = interp();
        prop_assert_eq!(
            interp.loose_equals(&a, &b).unwrap(),
            interp.loose_equals(&b, &a).unwrap()
        );
    }

    #[test]
    fn prop_strict_equality_implies_loose(a in primitive(), b in primitive()) {
        let mut interp = interp();
        if a.strict_equals(&b) {
            prop_assert!(interp.loose_equals(&a, &b).unwrap());
        }
    }

    #[test]
    fn prop_lt_and_gt_are_mirrored(a in primitive(), b in primitive()) {
        prop_assert_eq!(
            eval(BinaryOperator::Lt, a.clone(), b.clone()),
            eval(BinaryOperator::Gt, b, a)
        );
    }
}
