//! `Map`, `Set`, `WeakMap` and `WeakSet`.
//!
//! `keys`, `values` and `entries` return arrays. The weak variants hold
//! their keys strongly and only differ in which keys they accept.

use super::{arg, callback, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Object, ObjectKind, OrderedTable, Value};

pub(crate) const MAP_METHODS: MethodTable = &[
    ("clear", clear),
    ("delete", delete),
    ("entries", entries),
    ("forEach", for_each),
    ("get", get),
    ("has", has),
    ("keys", keys),
    ("set", set),
    ("values", values),
];

pub(crate) const SET_METHODS: MethodTable = &[
    ("add", add),
    ("clear", clear),
    ("delete", delete),
    ("entries", entries),
    ("forEach", for_each),
    ("has", has),
    ("keys", values),
    ("values", values),
];

pub(crate) const WEAK_MAP_METHODS: MethodTable =
    &[("delete", delete), ("get", get), ("has", has), ("set", set)];

pub(crate) const WEAK_SET_METHODS: MethodTable = &[("add", add), ("delete", delete), ("has", has)];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Map,
    Set,
    WeakMap,
    WeakSet,
}

impl Flavor {
    fn of(kind: &ObjectKind) -> Option<Self> {
        match kind {
            ObjectKind::Map(_) => Some(Flavor::Map),
            ObjectKind::Set(_) => Some(Flavor::Set),
            ObjectKind::WeakMap(_) => Some(Flavor::WeakMap),
            ObjectKind::WeakSet(_) => Some(Flavor::WeakSet),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Flavor::Map => "Map",
            Flavor::Set => "Set",
            Flavor::WeakMap => "WeakMap",
            Flavor::WeakSet => "WeakSet",
        }
    }

    fn is_weak(self) -> bool {
        matches!(self, Flavor::WeakMap | Flavor::WeakSet)
    }

    fn is_set(self) -> bool {
        matches!(self, Flavor::Set | Flavor::WeakSet)
    }

    fn wrap(self, table: OrderedTable) -> ObjectKind {
        match self {
            Flavor::Map => ObjectKind::Map(table),
            Flavor::Set => ObjectKind::Set(table),
            Flavor::WeakMap => ObjectKind::WeakMap(table),
            Flavor::WeakSet => ObjectKind::WeakSet(table),
        }
    }
}

fn this_collection(this: &Value, method: &str) -> EvalResult<(Object, Flavor)> {
    let obj = this
        .as_object()
        .ok_or_else(|| errors::wrong_receiver(method, "Map"))?;
    let flavor = Flavor::of(&obj.borrow().kind).ok_or_else(|| errors::wrong_receiver(method, "Map"))?;
    Ok((obj.clone(), flavor))
}

fn with_table<R>(obj: &Object, f: impl FnOnce(&mut OrderedTable) -> R) -> Option<R> {
    match &mut obj.borrow_mut().kind {
        ObjectKind::Map(table)
        | ObjectKind::Set(table)
        | ObjectKind::WeakMap(table)
        | ObjectKind::WeakSet(table) => Some(f(table)),
        _ => None,
    }
}

fn table_entries(obj: &Object) -> Vec<(Value, Value)> {
    with_table(obj, |table| table.entries()).unwrap_or_default()
}

fn check_key(flavor: Flavor, key: &Value) -> EvalResult<()> {
    if flavor.is_weak() && key.as_object().is_none() {
        let what = if flavor.is_set() { "set" } else { "map key" };
        return Err(errors::invalid_weak_key(what));
    }
    Ok(())
}

fn normalize_key(key: Value) -> Value {
    // -0 and +0 are the same key.
    match key {
        Value::Number(n) if n == 0.0 => Value::Number(0.0),
        other => other,
    }
}

fn get(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "get")?;
    let key = arg(args, 0);
    Ok(with_table(&obj, |table| table.get(&key)).flatten().unwrap_or_default())
}

fn has(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "has")?;
    let key = arg(args, 0);
    Ok(Value::Bool(with_table(&obj, |table| table.has(&key)).unwrap_or(false)))
}

fn set(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let (obj, flavor) = this_collection(this, "set")?;
    if flavor.is_set() {
        return Err(errors::wrong_receiver("set", flavor.name()));
    }
    let key = normalize_key(arg(args, 0));
    check_key(flavor, &key)?;
    with_table(&obj, |table| table.set(key, arg(args, 1)));
    Ok(this.clone())
}

fn add(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let (obj, flavor) = this_collection(this, "add")?;
    if !flavor.is_set() {
        return Err(errors::wrong_receiver("add", flavor.name()));
    }
    let value = normalize_key(arg(args, 0));
    check_key(flavor, &value)?;
    with_table(&obj, |table| table.set(value.clone(), value));
    Ok(this.clone())
}

fn delete(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "delete")?;
    let key = arg(args, 0);
    Ok(Value::Bool(with_table(&obj, |table| table.delete(&key)).unwrap_or(false)))
}

fn clear(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "clear")?;
    with_table(&obj, OrderedTable::clear);
    Ok(Value::Undefined)
}

fn keys(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "keys")?;
    Ok(Value::array(table_entries(&obj).into_iter().map(|(k, _)| k).collect()))
}

fn values(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "values")?;
    Ok(Value::array(table_entries(&obj).into_iter().map(|(_, v)| v).collect()))
}

fn entries(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "entries")?;
    Ok(Value::array(
        table_entries(&obj)
            .into_iter()
            .map(|(k, v)| Value::array(vec![k, v]))
            .collect(),
    ))
}

/// Visits entries live: entries added during iteration are visited,
/// deleted ones are skipped.
fn for_each(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let (obj, _) = this_collection(this, "forEach")?;
    let f = callback(args, 0)?;
    let this_arg = arg(args, 1);
    let mut visited = 0;
    loop {
        let Some((key, value)) = table_entries(&obj).into_iter().nth(visited) else {
            break;
        };
        interp.call(&f, &this_arg, &[value, key, this.clone()])?;
        visited += 1;
    }
    Ok(Value::Undefined)
}

// Constructors

fn construct_flavor(interp: &mut Interpreter, args: &[Value], flavor: Flavor) -> EvalResult<Value> {
    let mut table = OrderedTable::new();
    let source = arg(args, 0);
    if !source.is_nullish() {
        let items = interp.iterate_at(&source, cook_ir::Span::default())?;
        for item in items {
            if flavor.is_set() {
                let item = normalize_key(item);
                check_key(flavor, &item)?;
                table.set(item.clone(), item);
            } else {
                if item.as_object().is_none() {
                    return Err(errors::type_error(format!(
                        "Iterator value {item} is not an entry object"
                    )));
                }
                let key = normalize_key(interp.get_property(&item, "0")?);
                let value = interp.get_property(&item, "1")?;
                check_key(flavor, &key)?;
                table.set(key, value);
            }
        }
    }
    Ok(Value::Object(Object::new(flavor.wrap(table))))
}

pub(crate) fn construct_map(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    construct_flavor(interp, args, Flavor::Map)
}

pub(crate) fn construct_set(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    construct_flavor(interp, args, Flavor::Set)
}

pub(crate) fn construct_weak_map(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    construct_flavor(interp, args, Flavor::WeakMap)
}

pub(crate) fn construct_weak_set(interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    construct_flavor(interp, args, Flavor::WeakSet)
}

pub(crate) fn call_map(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Err(errors::requires_new("Map"))
}

pub(crate) fn call_set(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Err(errors::requires_new("Set"))
}

pub(crate) fn call_weak_map(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Err(errors::requires_new("WeakMap"))
}

pub(crate) fn call_weak_set(_interp: &mut Interpreter, _this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Err(errors::requires_new("WeakSet"))
}
