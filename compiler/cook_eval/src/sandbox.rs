//! The sandbox boundary.
//!
//! Evaluated code never sees the host's intrinsics. Reads of
//! `constructor`, `__proto__` and `prototype` that are not own properties
//! produce a reserved stand-in, and every member read, call result and
//! `new` result passes through [`sanitize`], which rejects it. The only
//! globals visible to evaluated code are the ones [`supply`] hands out.

use std::collections::BTreeMap;

use crate::environment::Environment;
use crate::errors::{self, EvalResult};
use crate::globals;
use crate::value::{Callable, Object, ObjectKind, Value};

/// Constructors `new` may be applied to.
pub const ALLOWED_CONSTRUCTORS: [&str; 7] = [
    "Array",
    "Date",
    "Map",
    "Set",
    "URLSearchParams",
    "WeakMap",
    "WeakSet",
];

/// Names always injected by [`supply`], referenced or not.
const ALWAYS_SUPPLIED: [&str; 1] = ["undefined"];

/// Global bindings handed to evaluated code.
pub type Globals = BTreeMap<String, Value>;

/// Fail if `value` is a reserved intrinsic.
pub fn sanitize(value: &Value) -> EvalResult<()> {
    match value {
        Value::Object(obj) if matches!(obj.borrow().kind, ObjectKind::Reserved(_)) => {
            Err(errors::reserved_object())
        }
        _ => Ok(()),
    }
}

pub(crate) fn reserved(name: &'static str) -> Value {
    Value::Object(Object::new(ObjectKind::Reserved(name)))
}

/// Fallback for `constructor`, `__proto__` and `prototype` when the base
/// has no own property of that name.
///
/// `constructor` of strings, numbers, booleans and the allowed collection
/// kinds is the genuine built-in constructor; of plain objects and
/// functions it is the reserved `Object` / `Function`. Prototypes are
/// always reserved.
pub(crate) fn intrinsic_property(base: &Value, key: &str) -> Option<Value> {
    match key {
        "__proto__" | "prototype" => Some(reserved(if base.is_callable() {
            "Function.prototype"
        } else {
            "Object.prototype"
        })),
        "constructor" => {
            let name = match base {
                Value::String(_) => "String",
                Value::Number(_) => "Number",
                Value::Bool(_) => "Boolean",
                Value::Object(obj) => match &obj.borrow().kind {
                    ObjectKind::Array(_) => "Array",
                    ObjectKind::Date(_) => "Date",
                    ObjectKind::Map(_) => "Map",
                    ObjectKind::Set(_) => "Set",
                    ObjectKind::WeakMap(_) => "WeakMap",
                    ObjectKind::WeakSet(_) => "WeakSet",
                    ObjectKind::UrlSearchParams(_) => "URLSearchParams",
                    ObjectKind::Function(_) => return Some(reserved("Function")),
                    _ => return Some(reserved("Object")),
                },
                Value::Undefined | Value::Null => return None,
            };
            globals::builtin_global(name)
        }
        _ => None,
    }
}

/// Whether `value` is the genuine built-in constructor `name`.
pub(crate) fn is_builtin_constructor(value: &Value, name: &str) -> bool {
    value.as_object().is_some_and(|obj| {
        matches!(
            &obj.borrow().kind,
            ObjectKind::Function(Callable::Builtin(builtin))
                if builtin.name == name && builtin.construct.is_some()
        )
    })
}

/// Build the global bindings for a run.
///
/// Every free variable the host provides is forwarded. Free variables the
/// host does not provide get the interpreter's built-in of that name, if
/// there is one. Unknown names are left out, so reading them throws a
/// `ReferenceError`.
pub fn supply<'a>(
    free_variables: impl IntoIterator<Item = &'a str>,
    host_globals: &Globals,
) -> Globals {
    let mut supplied = Globals::new();
    for name in free_variables.into_iter().chain(ALWAYS_SUPPLIED) {
        if supplied.contains_key(name) {
            continue;
        }
        let value = host_globals
            .get(name)
            .cloned()
            .or_else(|| globals::builtin_global(name));
        if let Some(value) = value {
            supplied.insert(name.to_string(), value);
        }
    }
    tracing::trace!(names = ?supplied.keys().collect::<Vec<_>>(), "supplied globals");
    supplied
}

/// The root environment holding `globals` as immutable bindings.
pub fn global_environment(globals: &Globals) -> Environment {
    let env = Environment::new();
    for (name, value) in globals {
        // Names are unique keys of the map, so declaring cannot collide.
        let _ = env.declare(name, value.clone(), false);
    }
    env
}

#[cfg(test)]
mod tests;
