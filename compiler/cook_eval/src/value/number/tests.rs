#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn test_number_to_string_integers_and_fractions() {
    assert_eq!(number_to_string(0.0), "0");
    assert_eq!(number_to_string(-0.0), "0");
    assert_eq!(number_to_string(42.0), "42");
    assert_eq!(number_to_string(-1.5), "-1.5");
    assert_eq!(number_to_string(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(number_to_string(123.456), "123.456");
}

#[test]
fn test_number_to_string_exponent_thresholds() {
    assert_eq!(number_to_string(1e20), "100000000000000000000");
    assert_eq!(number_to_string(1e21), "1e+21");
    assert_eq!(number_to_string(1.5e21), "1.5e+21");
    assert_eq!(number_to_string(0.000001), "0.000001");
    assert_eq!(number_to_string(1e-7), "1e-7");
    assert_eq!(number_to_string(1.25e-7), "1.25e-7");
}

#[test]
fn test_number_to_string_special_values() {
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::INFINITY), "Infinity");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn test_radix_strings() {
    assert_eq!(number_to_radix_string(255.0, 16), "ff");
    assert_eq!(number_to_radix_string(-255.0, 2), "-11111111");
    assert_eq!(number_to_radix_string(0.5, 2), "0.1");
    assert_eq!(number_to_radix_string(35.0, 36), "z");
    assert_eq!(number_to_radix_string(0.0, 8), "0");
}

#[test]
fn test_to_fixed() {
    assert_eq!(number_to_fixed(1.005, 2), "1.00");
    assert_eq!(number_to_fixed(1.5, 0), "2");
    assert_eq!(number_to_fixed(2.5, 0), "3");
    assert_eq!(number_to_fixed(-2.5, 0), "-3");
    assert_eq!(number_to_fixed(0.125, 2), "0.13");
    assert_eq!(number_to_fixed(123.456, 1), "123.5");
    assert_eq!(number_to_fixed(1e21, 2), "1e+21");
}

#[test]
fn test_to_precision_and_exponential() {
    assert_eq!(number_to_precision(123.456, 4), "123.5");
    assert_eq!(number_to_precision(0.000123, 2), "0.00012");
    assert_eq!(number_to_precision(123456.0, 2), "1.2e+5");
    assert_eq!(number_to_precision(0.0, 3), "0.00");
    assert_eq!(number_to_exponential(123456.0, Some(2)), "1.23e+5");
    assert_eq!(number_to_exponential(0.00015, None), "1.5e-4");
}

#[test]
fn test_string_to_number() {
    assert_eq!(string_to_number(""), 0.0);
    assert_eq!(string_to_number("  42\n"), 42.0);
    assert_eq!(string_to_number("0x1F"), 31.0);
    assert_eq!(string_to_number("0b101"), 5.0);
    assert_eq!(string_to_number("0o17"), 15.0);
    assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
    assert_eq!(string_to_number(".5"), 0.5);
    assert_eq!(string_to_number("5."), 5.0);
    assert_eq!(string_to_number("1e3"), 1000.0);
    assert!(string_to_number("12px").is_nan());
    assert!(string_to_number("0x").is_nan());
    assert!(string_to_number("-0x10").is_nan());
}

#[test]
fn test_parse_int_and_float() {
    assert_eq!(parse_int("  42px", 0), 42.0);
    assert_eq!(parse_int("-0x1f", 0), -31.0);
    assert_eq!(parse_int("ff", 16), 255.0);
    assert_eq!(parse_int("101", 2), 5.0);
    assert!(parse_int("z", 10).is_nan());
    assert!(parse_int("1", 37).is_nan());
    assert_eq!(parse_float("3.14abc"), 3.14);
    assert_eq!(parse_float("-.5e1x"), -5.0);
    assert_eq!(parse_float("Infinityx"), f64::INFINITY);
    assert!(parse_float("abc").is_nan());
}

#[test]
fn test_to_int32_wraps() {
    assert_eq!(to_int32(2_147_483_648.0), -2_147_483_648);
    assert_eq!(to_int32(4_294_967_297.0), 1);
    assert_eq!(to_int32(-1.9), -1);
    assert_eq!(to_int32(f64::NAN), 0);
}

#[test]
fn test_relative_index_and_array_index() {
    assert_eq!(relative_index(-1.0, 5), 4);
    assert_eq!(relative_index(-10.0, 5), 0);
    assert_eq!(relative_index(10.0, 5), 5);
    assert_eq!(relative_index(f64::NAN, 5), 0);
    assert_eq!(array_index("0"), Some(0));
    assert_eq!(array_index("12"), Some(12));
    assert_eq!(array_index("01"), None);
    assert_eq!(array_index("-1"), None);
    assert_eq!(array_index("1.5"), None);
    assert_eq!(array_index("4294967295"), None);
}

proptest! {
    #[test]
    fn prop_number_to_string_round_trips(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let text = number_to_string(value);
        let back = string_to_number(&text);
        // -0 prints as "0".
        prop_assert!(back == value, "{value} -> {text} -> {back}");
    }

    #[test]
    fn prop_integers_print_without_fraction(value in -1_000_000_000i64..1_000_000_000) {
        prop_assert_eq!(number_to_string(value as f64), value.to_string());
    }

    #[test]
    fn prop_radix_round_trips_integers(value in 0u32..u32::MAX, radix in 2u32..=36) {
        let text = number_to_radix_string(f64::from(value), radix);
        prop_assert_eq!(parse_int(&text, radix), f64::from(value));
    }

    #[test]
    fn prop_to_int32_matches_wrapping_cast(value in any::<i64>()) {
        prop_assert_eq!(to_int32(value as f64), (value as f64 as i128 as i64) as i32);
    }
}
