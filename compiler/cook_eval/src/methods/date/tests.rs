#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::EvalErrorKind;
use crate::interpreter::Program;

fn interp() -> Interpreter {
    Interpreter::new(Rc::new(Program::default()))
}

fn n(value: f64) -> Value {
    Value::Number(value)
}

fn new_date(args: &[Value]) -> Value {
    construct(&mut interp(), args).unwrap()
}

fn try_invoke(this: &Value, name: &str, args: &[Value]) -> EvalResult<Value> {
    let mut interp = interp();
    let method = interp.get_property(this, name)?;
    interp.call(&method, this, args)
}

fn invoke(this: &Value, name: &str, args: &[Value]) -> Value {
    try_invoke(this, name, args).unwrap()
}

/// 2020-01-15T10:30:05.250Z, a Wednesday.
const SAMPLE: f64 = 1_579_084_205_250.0;

#[test]
fn test_make_day_carries_months() {
    assert_eq!(make_day(1970.0, 0.0, 1.0), 0.0);
    assert_eq!(make_day(2020.0, 13.0, 1.0), make_day(2021.0, 1.0, 1.0));
    assert_eq!(make_day(2020.0, -1.0, 1.0), make_day(2019.0, 11.0, 1.0));
    assert!(make_day(f64::NAN, 0.0, 1.0).is_nan());
}

#[test]
fn test_time_clip() {
    assert_eq!(time_clip(1.7), 1.0);
    assert!(time_clip(8.64e15 + 1.0).is_nan());
    assert!(time_clip(f64::INFINITY).is_nan());
    assert_eq!(time_clip(-0.0).to_bits(), 0.0f64.to_bits());
}

#[test]
fn test_construct_from_components() {
    let date = new_date(&[n(2020.0), n(0.0), n(15.0), n(10.0), n(30.0), n(5.0), n(250.0)]);
    assert_eq!(invoke(&date, "getTime", &[]), n(SAMPLE));
    assert_eq!(invoke(&date, "getDay", &[]), n(3.0));
    assert_eq!(invoke(&date, "getMonth", &[]), n(0.0));
    assert_eq!(invoke(&date, "getUTCHours", &[]), n(10.0));
    assert_eq!(invoke(&date, "getMilliseconds", &[]), n(250.0));
    assert_eq!(invoke(&date, "getTimezoneOffset", &[]), n(0.0));
}

#[test]
fn test_two_digit_years_map_to_1900s() {
    let date = new_date(&[n(99.0), n(1.0), n(1.0)]);
    assert_eq!(invoke(&date, "getTime", &[]), n(917_827_200_000.0));
}

#[test]
fn test_construct_from_single_values() {
    assert_eq!(invoke(&new_date(&[n(SAMPLE)]), "getTime", &[]), n(SAMPLE));
    let copy = new_date(&[new_date(&[n(SAMPLE)])]);
    assert_eq!(invoke(&copy, "getTime", &[]), n(SAMPLE));
    let parsed = new_date(&[Value::string("2020-01-15")]);
    assert_eq!(invoke(&parsed, "getTime", &[]), n(1_579_046_400_000.0));
    let invalid = new_date(&[Value::string("nope")]);
    assert!(invoke(&invalid, "getTime", &[]).as_number().unwrap().is_nan());
    assert_eq!(invalid.to_string(), "Invalid Date");
}

#[test]
fn test_parse_iso_forms() {
    assert_eq!(parse_date("2020-01-15"), 1_579_046_400_000.0);
    assert_eq!(parse_date("2020-01-15T10:30:00+02:00"), 1_579_077_000_000.0);
    assert_eq!(parse_date("2020-01-15T10:30:00.5Z"), 1_579_084_200_500.0);
    assert_eq!(parse_date("2020"), 1_577_836_800_000.0);
    assert_eq!(parse_date("-000001-01-01T00:00:00.000Z"), -62_198_755_200_000.0);
    assert!(parse_date("2020-13-01").is_nan());
    assert!(parse_date("2020-01-15T25:00").is_nan());
    assert!(parse_date("-000000-01-01").is_nan());
}

#[test]
fn test_parse_other_forms() {
    let sample_seconds = 1_579_084_205_000.0;
    assert_eq!(
        parse_date("Wed Jan 15 2020 10:30:05 GMT+0000 (Coordinated Universal Time)"),
        sample_seconds
    );
    assert_eq!(parse_date("Wed, 15 Jan 2020 10:30:05 GMT"), sample_seconds);
    assert_eq!(parse_date("January 15, 2020"), 1_579_046_400_000.0);
    assert_eq!(parse_date("2020/01/15"), 1_579_046_400_000.0);
    assert!(parse_date("tomorrow").is_nan());
}

#[test]
fn test_string_forms() {
    let date = new_date(&[n(SAMPLE)]);
    assert_eq!(
        invoke(&date, "toString", &[]),
        Value::string("Wed Jan 15 2020 10:30:05 GMT+0000 (Coordinated Universal Time)")
    );
    assert_eq!(
        invoke(&date, "toUTCString", &[]),
        Value::string("Wed, 15 Jan 2020 10:30:05 GMT")
    );
    assert_eq!(
        invoke(&date, "toISOString", &[]),
        Value::string("2020-01-15T10:30:05.250Z")
    );
    assert_eq!(invoke(&date, "toDateString", &[]), Value::string("Wed Jan 15 2020"));
    assert_eq!(
        invoke(&date, "toLocaleString", &[]),
        Value::string("1/15/2020, 10:30:05 AM")
    );
    assert_eq!(invoke(&date, "toLocaleDateString", &[]), Value::string("1/15/2020"));
    assert_eq!(invoke(&date, "toLocaleTimeString", &[]), Value::string("10:30:05 AM"));
}

#[test]
fn test_iso_string_extended_years() {
    assert_eq!(to_iso_string(-1.0).unwrap(), "1969-12-31T23:59:59.999Z");
    assert_eq!(
        to_iso_string(-62_198_755_200_000.0).unwrap(),
        "-000001-01-01T00:00:00.000Z"
    );
    assert_eq!(to_iso_string(f64::NAN), None);
}

#[test]
fn test_invalid_dates() {
    let invalid = new_date(&[n(f64::NAN)]);
    let err = try_invoke(&invalid, "toISOString", &[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::RangeError);
    assert_eq!(invoke(&invalid, "toJSON", &[]), Value::Null);
    assert!(invoke(&invalid, "getFullYear", &[]).as_number().unwrap().is_nan());
    assert_eq!(invoke(&invalid, "toDateString", &[]), Value::string("Invalid Date"));
}

#[test]
fn test_setters() {
    let date = new_date(&[n(2020.0), n(0.0), n(31.0)]);
    assert_eq!(invoke(&date, "setMonth", &[n(1.0)]), n(1_583_107_200_000.0));
    assert_eq!(
        invoke(&date, "toISOString", &[]),
        Value::string("2020-03-02T00:00:00.000Z")
    );

    invoke(&date, "setHours", &[n(25.0), n(1.0)]);
    assert_eq!(
        invoke(&date, "toISOString", &[]),
        Value::string("2020-03-03T01:01:00.000Z")
    );

    let missing = invoke(&date, "setDate", &[]);
    assert!(missing.as_number().unwrap().is_nan());
}

#[test]
fn test_set_full_year_starts_from_invalid_date() {
    let date = new_date(&[n(f64::NAN)]);
    assert!(invoke(&date, "setDate", &[n(3.0)]).as_number().unwrap().is_nan());
    assert_eq!(invoke(&date, "setFullYear", &[n(2000.0)]), n(946_684_800_000.0));
    assert_eq!(invoke(&date, "setDate", &[n(3.0)]), n(946_857_600_000.0));
}

#[test]
fn test_statics() {
    let mut interp = interp();
    assert_eq!(
        date_utc(&mut interp, &Value::Undefined, &[n(2020.0), n(13.0), n(1.0)]).unwrap(),
        n(1_612_137_600_000.0)
    );
    assert_eq!(
        date_parse(&mut interp, &Value::Undefined, &[Value::string("2020-01-15")]).unwrap(),
        n(1_579_046_400_000.0)
    );
    let now = date_now(&mut interp, &Value::Undefined, &[]).unwrap();
    assert!(now.as_number().unwrap() > 1.7e12);
    let text = call_constructor(&mut interp, &Value::Undefined, &[]).unwrap();
    assert!(text.as_str().unwrap().ends_with("GMT+0000 (Coordinated Universal Time)"));
}

#[test]
fn test_methods_reject_other_receivers() {
    let date = new_date(&[n(0.0)]);
    let mut interp = interp();
    let method = interp.get_property(&date, "getTime").unwrap();
    let err = interp.call(&method, &Value::array(vec![]), &[]).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}
