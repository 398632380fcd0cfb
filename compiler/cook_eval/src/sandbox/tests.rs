#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::environment::BindingError;
use crate::errors::EvalErrorKind;

// Test-only accessor: the name of a function object, via `Callable::name`.
impl crate::value::Object {
    fn name(&self) -> String {
        match &self.borrow().kind {
            crate::value::ObjectKind::Function(callable) => callable.name(),
            _ => String::new(),
        }
    }
}

fn host(entries: &[(&str, Value)]) -> Globals {
    entries
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

#[test]
fn test_supply_forwards_host_values() {
    let globals = host(&[("DATA", Value::Number(7.0)), ("unused", Value::Null)]);
    let supplied = supply(["DATA"], &globals);
    assert_eq!(supplied.get("DATA"), Some(&Value::Number(7.0)));
    assert!(!supplied.contains_key("unused"));
}

#[test]
fn test_supply_prefers_host_over_builtin() {
    let globals = host(&[("Math", Value::string("shadowed"))]);
    let supplied = supply(["Math"], &globals);
    assert_eq!(supplied.get("Math"), Some(&Value::string("shadowed")));
}

#[test]
fn test_supply_fills_builtins_and_skips_unknown() {
    let supplied = supply(["Math", "JSON", "mystery"], &Globals::new());
    assert!(supplied.get("Math").is_some_and(|v| v.as_object().is_some()));
    assert!(supplied.contains_key("JSON"));
    assert!(!supplied.contains_key("mystery"));
}

#[test]
fn test_supply_always_includes_undefined() {
    let supplied = supply([], &Globals::new());
    assert_eq!(supplied.keys().collect::<Vec<_>>(), ["undefined"]);
    assert_eq!(supplied.get("undefined"), Some(&Value::Undefined));
}

#[test]
fn test_builtins_are_fresh_per_supply() {
    let a = supply(["Math"], &Globals::new());
    let b = supply(["Math"], &Globals::new());
    assert!(!a["Math"].strict_equals(&b["Math"]));
}

#[test]
fn test_sanitize_rejects_reserved_objects() {
    assert!(sanitize(&Value::Number(1.0)).is_ok());
    assert!(sanitize(&Value::array(vec![])).is_ok());
    let err = sanitize(&reserved("Function")).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::TypeError);
}

#[test]
fn test_intrinsic_constructor_of_primitives_is_the_builtin() {
    let ctor = intrinsic_property(&Value::string("s"), "constructor").unwrap();
    assert!(ctor.is_callable());
    assert!(sanitize(&ctor).is_ok());
    assert_eq!(ctor.as_object().unwrap().name(), "String");
    let ctor = intrinsic_property(&Value::array(vec![]), "constructor").unwrap();
    assert!(is_builtin_constructor(&ctor, "Array"));
}

#[test]
fn test_intrinsic_constructor_of_plain_objects_is_reserved() {
    let plain = Value::object([("a", Value::Null)]);
    let ctor = intrinsic_property(&plain, "constructor").unwrap();
    assert!(sanitize(&ctor).is_err());

    let func = Value::host_function("f", |_, _| Ok(Value::Undefined));
    assert!(sanitize(&intrinsic_property(&func, "constructor").unwrap()).is_err());
    assert!(sanitize(&intrinsic_property(&func, "prototype").unwrap()).is_err());
    assert!(sanitize(&intrinsic_property(&plain, "__proto__").unwrap()).is_err());
}

#[test]
fn test_intrinsic_property_ignores_other_keys_and_nullish_bases() {
    assert!(intrinsic_property(&Value::array(vec![]), "length").is_none());
    assert!(intrinsic_property(&Value::Null, "constructor").is_none());
}

#[test]
fn test_is_builtin_constructor_rejects_host_functions() {
    let fake = Value::host_function("Map", |_, _| Ok(Value::Undefined));
    assert!(!is_builtin_constructor(&fake, "Map"));
    let real = globals::builtin_global("Map").unwrap();
    assert!(is_builtin_constructor(&real, "Map"));
    assert!(!is_builtin_constructor(&real, "Set"));
}

#[test]
fn test_global_environment_bindings_are_immutable() {
    let env = global_environment(&host(&[("x", Value::Number(1.0))]));
    assert_eq!(env.lookup("x"), Ok(Value::Number(1.0)));
    assert_eq!(
        env.assign("x", Value::Number(2.0)),
        Err(BindingError::Immutable)
    );
    assert!(env.parent().is_none());
}
