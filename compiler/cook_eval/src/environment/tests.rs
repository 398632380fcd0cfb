#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_declare_and_lookup() {
    let env = Environment::new();
    env.declare("x", Value::Number(1.0), true).unwrap();
    assert_eq!(env.lookup("x"), Ok(Value::Number(1.0)));
}

#[test]
fn test_lookup_walks_parents() {
    let root = Environment::new();
    root.declare("x", Value::Number(1.0), false).unwrap();
    let inner = root.child().child();
    assert_eq!(inner.lookup("x"), Ok(Value::Number(1.0)));
    assert!(inner.resolve("x").unwrap().same_frame(&root));
    assert_eq!(inner.depth(), 3);
}

#[test]
fn test_shadowing_is_per_frame() {
    let root = Environment::new();
    root.declare("x", Value::Number(1.0), true).unwrap();
    let inner = root.child();
    inner.declare("x", Value::Number(2.0), true).unwrap();
    assert_eq!(inner.lookup("x"), Ok(Value::Number(2.0)));
    assert_eq!(root.lookup("x"), Ok(Value::Number(1.0)));
}

#[test]
fn test_redeclaration_in_same_frame_fails() {
    let env = Environment::new();
    env.create_mutable_binding("x").unwrap();
    assert_eq!(
        env.create_immutable_binding("x", true),
        Err(BindingError::AlreadyDeclared)
    );
}

#[test]
fn test_temporal_dead_zone() {
    let env = Environment::new();
    env.create_mutable_binding("x").unwrap();
    assert!(env.is_uninitialized("x"));
    assert_eq!(env.lookup("x"), Err(BindingError::Uninitialized));
    assert_eq!(
        env.assign("x", Value::Number(1.0)),
        Err(BindingError::Uninitialized)
    );
    env.initialize_binding("x", Value::Number(1.0)).unwrap();
    assert!(!env.is_uninitialized("x"));
    assert_eq!(env.lookup("x"), Ok(Value::Number(1.0)));
}

#[test]
fn test_unresolvable_name() {
    let env = Environment::new().child();
    assert_eq!(env.lookup("missing"), Err(BindingError::Unresolvable));
    assert_eq!(
        env.assign("missing", Value::Null),
        Err(BindingError::Unresolvable)
    );
}

#[test]
fn test_immutable_binding_rejects_strict_writes() {
    let env = Environment::new();
    env.declare("x", Value::Number(1.0), false).unwrap();
    assert_eq!(
        env.set_mutable_binding("x", Value::Number(2.0), true),
        Err(BindingError::Immutable)
    );
    assert_eq!(env.lookup("x"), Ok(Value::Number(1.0)));
}

#[test]
fn test_sloppy_immutable_binding_ignores_sloppy_writes() {
    let env = Environment::new();
    env.create_immutable_binding("self", false).unwrap();
    env.initialize_binding("self", Value::Number(1.0)).unwrap();
    assert_eq!(env.set_mutable_binding("self", Value::Number(2.0), false), Ok(()));
    assert_eq!(env.lookup("self"), Ok(Value::Number(1.0)));
    assert_eq!(
        env.set_mutable_binding("self", Value::Number(2.0), true),
        Err(BindingError::Immutable)
    );
}

#[test]
fn test_copy_for_iteration_detaches_bindings() {
    let root = Environment::new();
    let loop_env = root.child();
    loop_env.declare("i", Value::Number(0.0), true).unwrap();
    loop_env.declare("other", Value::Null, true).unwrap();

    let next = loop_env.copy_for_iteration(["i"]);
    next.assign("i", Value::Number(1.0)).unwrap();

    assert_eq!(loop_env.lookup("i"), Ok(Value::Number(0.0)));
    assert_eq!(next.lookup("i"), Ok(Value::Number(1.0)));
    assert_eq!(next.names(), vec!["i".to_string()]);
    assert!(next.parent().unwrap().same_frame(&root));
}

#[test]
fn test_outermost() {
    let root = Environment::new();
    let inner = root.child().child().child();
    assert!(inner.outermost().same_frame(&root));
}

#[test]
fn test_closure_keeps_frame_alive() {
    let captured = {
        let env = Environment::new().child();
        env.declare("x", Value::string("kept"), false).unwrap();
        env.clone()
    };
    assert_eq!(captured.lookup("x"), Ok(Value::string("kept")));
}
