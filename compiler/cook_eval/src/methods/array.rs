//! `Array.prototype` methods and the `Array` constructor.

use std::cmp::Ordering;

use super::{arg, callback, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::number::{relative_index, to_integer_or_infinity};
use crate::value::{Object, ObjectKind, Value, MAX_ARRAY_LENGTH};

pub(crate) const METHODS: MethodTable = &[
    ("at", at),
    ("concat", concat),
    ("entries", entries),
    ("every", every),
    ("fill", fill),
    ("filter", filter),
    ("find", find),
    ("findIndex", find_index),
    ("findLast", find_last),
    ("findLastIndex", find_last_index),
    ("flat", flat),
    ("flatMap", flat_map),
    ("forEach", for_each),
    ("includes", includes),
    ("indexOf", index_of),
    ("join", join),
    ("keys", keys),
    ("lastIndexOf", last_index_of),
    ("map", map),
    ("pop", pop),
    ("push", push),
    ("reduce", reduce),
    ("reduceRight", reduce_right),
    ("reverse", reverse),
    ("shift", shift),
    ("slice", slice),
    ("some", some),
    ("sort", sort),
    ("splice", splice),
    ("toReversed", to_reversed),
    ("toSorted", to_sorted),
    ("toSpliced", to_spliced),
    ("toString", to_string),
    ("unshift", unshift),
    ("values", values),
    ("with", with),
];

fn this_array(this: &Value, method: &str) -> EvalResult<Object> {
    match this {
        Value::Object(obj) if obj.is_array() => Ok(obj.clone()),
        _ => Err(errors::wrong_receiver(method, "Array")),
    }
}

fn snapshot(obj: &Object) -> Vec<Value> {
    obj.array_items().unwrap_or_default()
}

fn length(obj: &Object) -> usize {
    match &obj.borrow().kind {
        ObjectKind::Array(items) => items.len(),
        _ => 0,
    }
}

/// Current element `index`; `None` once the array shrank below it.
fn item_at(obj: &Object, index: usize) -> Option<Value> {
    match &obj.borrow().kind {
        ObjectKind::Array(items) => items.get(index).cloned(),
        _ => None,
    }
}

/// Run `edit` on the elements of a mutable array.
fn mutate<R>(obj: &Object, edit: impl FnOnce(&mut Vec<Value>) -> R) -> EvalResult<R> {
    let mut data = obj.borrow_mut();
    if data.frozen {
        return Err(errors::type_error("Cannot modify a frozen array"));
    }
    match &mut data.kind {
        ObjectKind::Array(items) => Ok(edit(items)),
        _ => Err(errors::wrong_receiver("mutate", "Array")),
    }
}

fn index_arg(interp: &mut Interpreter, args: &[Value], index: usize, len: usize, default: usize) -> EvalResult<usize> {
    match args.get(index) {
        None | Some(Value::Undefined) => Ok(default),
        Some(value) => Ok(relative_index(interp.to_number(value)?, len)),
    }
}

/// Call `f(item, index, array)` for every element still present.
fn visit(
    interp: &mut Interpreter,
    obj: &Object,
    this: &Value,
    f: &Value,
    reverse: bool,
    mut on_result: impl FnMut(usize, Value, Value) -> bool,
) -> EvalResult<()> {
    let len = length(obj);
    let indices: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..len).rev())
    } else {
        Box::new(0..len)
    };
    for i in indices {
        let Some(item) = item_at(obj, i) else {
            if reverse {
                continue;
            }
            break;
        };
        let result = interp.call(f, &Value::Undefined, &[item.clone(), Value::Number(i as f64), this.clone()])?;
        if !on_result(i, item, result) {
            break;
        }
    }
    Ok(())
}

fn at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "at")?;
    let len = length(&obj) as f64;
    let index = to_integer_or_infinity(interp.to_number(&arg(args, 0))?);
    let index = if index < 0.0 { len + index } else { index };
    if index < 0.0 || index >= len {
        return Ok(Value::Undefined);
    }
    Ok(item_at(&obj, index as usize).unwrap_or_default())
}

fn concat(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "concat")?;
    let mut out = snapshot(&obj);
    for value in args {
        match value {
            Value::Object(other) if other.is_array() => out.extend(snapshot(other)),
            other => out.push(other.clone()),
        }
    }
    Ok(Value::array(out))
}

fn entries(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "entries")?;
    Ok(Value::array(
        snapshot(&obj)
            .into_iter()
            .enumerate()
            .map(|(i, item)| Value::array(vec![Value::Number(i as f64), item]))
            .collect(),
    ))
}

fn keys(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "keys")?;
    Ok(Value::array((0..length(&obj)).map(|i| Value::Number(i as f64)).collect()))
}

fn values(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "values")?;
    Ok(Value::array(snapshot(&obj)))
}

fn every(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "every")?;
    let f = callback(args, 0)?;
    let mut all = true;
    visit(interp, &obj, this, &f, false, |_, _, result| {
        all = result.to_boolean();
        all
    })?;
    Ok(Value::Bool(all))
}

fn some(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "some")?;
    let f = callback(args, 0)?;
    let mut any = false;
    visit(interp, &obj, this, &f, false, |_, _, result| {
        any = result.to_boolean();
        !any
    })?;
    Ok(Value::Bool(any))
}

fn fill(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "fill")?;
    let len = length(&obj);
    let start = index_arg(interp, args, 1, len, 0)?;
    let end = index_arg(interp, args, 2, len, len)?;
    let value = arg(args, 0);
    mutate(&obj, |items| {
        for item in items.iter_mut().take(end).skip(start) {
            *item = value.clone();
        }
    })?;
    Ok(this.clone())
}

fn filter(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "filter")?;
    let f = callback(args, 0)?;
    let mut out = Vec::new();
    visit(interp, &obj, this, &f, false, |_, item, result| {
        if result.to_boolean() {
            out.push(item);
        }
        true
    })?;
    Ok(Value::array(out))
}

fn map(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "map")?;
    let f = callback(args, 0)?;
    let mut out = Vec::with_capacity(length(&obj));
    visit(interp, &obj, this, &f, false, |_, _, result| {
        out.push(result);
        true
    })?;
    Ok(Value::array(out))
}

fn for_each(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "forEach")?;
    let f = callback(args, 0)?;
    visit(interp, &obj, this, &f, false, |_, _, _| true)?;
    Ok(Value::Undefined)
}

/// Shared body of `find`, `findIndex`, `findLast` and `findLastIndex`.
fn search(interp: &mut Interpreter, this: &Value, args: &[Value], method: &str, reverse: bool) -> EvalResult<Option<(usize, Value)>> {
    let obj = this_array(this, method)?;
    let f = callback(args, 0)?;
    let mut found = None;
    visit(interp, &obj, this, &f, reverse, |i, item, result| {
        if result.to_boolean() {
            found = Some((i, item));
            return false;
        }
        true
    })?;
    Ok(found)
}

fn find(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(search(interp, this, args, "find", false)?.map(|(_, item)| item).unwrap_or_default())
}

fn find_index(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(
        search(interp, this, args, "findIndex", false)?.map_or(-1.0, |(i, _)| i as f64),
    ))
}

fn find_last(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(search(interp, this, args, "findLast", true)?.map(|(_, item)| item).unwrap_or_default())
}

fn find_last_index(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Number(
        search(interp, this, args, "findLastIndex", true)?.map_or(-1.0, |(i, _)| i as f64),
    ))
}

fn flatten_into(out: &mut Vec<Value>, items: Vec<Value>, depth: f64) {
    for item in items {
        match &item {
            Value::Object(inner) if depth >= 1.0 && inner.is_array() => {
                flatten_into(out, snapshot(inner), depth - 1.0);
            }
            _ => out.push(item),
        }
    }
}

fn flat(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "flat")?;
    let depth = match args.first() {
        None | Some(Value::Undefined) => 1.0,
        Some(value) => to_integer_or_infinity(interp.to_number(value)?),
    };
    let mut out = Vec::new();
    flatten_into(&mut out, snapshot(&obj), depth);
    Ok(Value::array(out))
}

fn flat_map(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mapped = map(interp, this, args)?;
    let mut out = Vec::new();
    if let Value::Object(obj) = &mapped {
        flatten_into(&mut out, snapshot(obj), 1.0);
    }
    Ok(Value::array(out))
}

fn includes(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "includes")?;
    let items = snapshot(&obj);
    let start = index_arg(interp, args, 1, items.len(), 0)?;
    let needle = arg(args, 0);
    Ok(Value::Bool(items.iter().skip(start).any(|item| item.same_value_zero(&needle))))
}

fn index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "indexOf")?;
    let items = snapshot(&obj);
    let start = index_arg(interp, args, 1, items.len(), 0)?;
    let needle = arg(args, 0);
    let found = items
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, item)| item.strict_equals(&needle));
    Ok(Value::Number(found.map_or(-1.0, |(i, _)| i as f64)))
}

fn last_index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "lastIndexOf")?;
    let items = snapshot(&obj);
    if items.is_empty() {
        return Ok(Value::Number(-1.0));
    }
    let from = match args.get(1) {
        None => items.len() - 1,
        Some(value) => {
            let n = to_integer_or_infinity(interp.to_number(value)?);
            if n < 0.0 {
                let shifted = items.len() as f64 + n;
                if shifted < 0.0 {
                    return Ok(Value::Number(-1.0));
                }
                shifted as usize
            } else {
                (n as usize).min(items.len() - 1)
            }
        }
    };
    let needle = arg(args, 0);
    let found = items[..=from]
        .iter()
        .rposition(|item| item.strict_equals(&needle));
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

fn join(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "join")?;
    let separator = match args.first() {
        None | Some(Value::Undefined) => ",".into(),
        Some(value) => interp.to_js_string(value)?,
    };
    Ok(Value::from(interp.join_array(&obj, &separator)?))
}

fn to_string(interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "toString")?;
    Ok(Value::from(interp.join_array(&obj, ",")?))
}

fn pop(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "pop")?;
    Ok(mutate(&obj, Vec::pop)?.unwrap_or_default())
}

fn push(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "push")?;
    let len = mutate(&obj, |items| {
        items.extend_from_slice(args);
        items.len()
    })?;
    Ok(Value::Number(len as f64))
}

fn shift(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "shift")?;
    let first = mutate(&obj, |items| (!items.is_empty()).then(|| items.remove(0)))?;
    Ok(first.unwrap_or_default())
}

fn unshift(_interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "unshift")?;
    let len = mutate(&obj, |items| {
        items.splice(0..0, args.iter().cloned());
        items.len()
    })?;
    Ok(Value::Number(len as f64))
}

fn reduce_with(interp: &mut Interpreter, this: &Value, args: &[Value], method: &str, reverse: bool) -> EvalResult<Value> {
    let obj = this_array(this, method)?;
    let f = callback(args, 0)?;
    let len = length(&obj);
    let mut indices: Vec<usize> = (0..len).collect();
    if reverse {
        indices.reverse();
    }
    let mut indices = indices.into_iter();
    let mut acc = match args.get(1) {
        Some(initial) => initial.clone(),
        None => {
            let first = indices.next().and_then(|i| item_at(&obj, i));
            first.ok_or_else(errors::reduce_of_empty)?
        }
    };
    for i in indices {
        let Some(item) = item_at(&obj, i) else {
            continue;
        };
        acc = interp.call(&f, &Value::Undefined, &[acc, item, Value::Number(i as f64), this.clone()])?;
    }
    Ok(acc)
}

fn reduce(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    reduce_with(interp, this, args, "reduce", false)
}

fn reduce_right(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    reduce_with(interp, this, args, "reduceRight", true)
}

fn reverse(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "reverse")?;
    mutate(&obj, |items| items.reverse())?;
    Ok(this.clone())
}

fn to_reversed(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "toReversed")?;
    let mut items = snapshot(&obj);
    items.reverse();
    Ok(Value::array(items))
}

fn slice(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "slice")?;
    let items = snapshot(&obj);
    let start = index_arg(interp, args, 0, items.len(), 0)?;
    let end = index_arg(interp, args, 1, items.len(), items.len())?;
    Ok(Value::array(items.get(start..end.max(start)).unwrap_or_default().to_vec()))
}

/// `(start, delete_count)` of a splice call.
fn splice_range(interp: &mut Interpreter, args: &[Value], len: usize) -> EvalResult<(usize, usize)> {
    let start = index_arg(interp, args, 0, len, 0)?;
    let delete = match args.len() {
        0 => 0,
        1 => len - start,
        _ => {
            let n = to_integer_or_infinity(interp.to_number(&args[1])?);
            (n.max(0.0) as usize).min(len - start)
        }
    };
    Ok((start, delete))
}

fn splice(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "splice")?;
    let (start, delete) = splice_range(interp, args, length(&obj))?;
    let inserted = args.get(2..).unwrap_or_default().iter().cloned();
    let removed: Vec<Value> = mutate(&obj, |items| items.splice(start..start + delete, inserted).collect())?;
    Ok(Value::array(removed))
}

fn to_spliced(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "toSpliced")?;
    let mut items = snapshot(&obj);
    let (start, delete) = splice_range(interp, args, items.len())?;
    items.splice(start..start + delete, args.get(2..).unwrap_or_default().iter().cloned());
    Ok(Value::array(items))
}

fn with(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "with")?;
    let mut items = snapshot(&obj);
    let len = items.len() as f64;
    let index = to_integer_or_infinity(interp.to_number(&arg(args, 0))?);
    let index = if index < 0.0 { len + index } else { index };
    if index < 0.0 || index >= len {
        return Err(errors::range_error("Invalid index"));
    }
    items[index as usize] = arg(args, 1);
    Ok(Value::array(items))
}

/// Stable merge sort with a fallible comparator. `undefined` sorts last
/// without consulting the comparator.
pub(crate) fn sort_values(interp: &mut Interpreter, items: Vec<Value>, comparator: &Value) -> EvalResult<Vec<Value>> {
    let (mut defined, undefined): (Vec<Value>, Vec<Value>) =
        items.into_iter().partition(|item| !item.is_undefined());

    let mut keys = Vec::new();
    if comparator.is_undefined() {
        for item in &defined {
            keys.push(interp.to_js_string(item)?);
        }
    }
    let mut order: Vec<usize> = (0..defined.len()).collect();
    let mut compare = |interp: &mut Interpreter, a: usize, b: usize| -> EvalResult<Ordering> {
        if comparator.is_undefined() {
            return Ok(keys[a].encode_utf16().cmp(keys[b].encode_utf16()));
        }
        let result = interp.call(comparator, &Value::Undefined, &[defined[a].clone(), defined[b].clone()])?;
        let n = interp.to_number(&result)?;
        Ok(if n < 0.0 {
            Ordering::Less
        } else if n > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        })
    };
    merge_sort(interp, &mut order, &mut compare)?;

    let mut sorted: Vec<Value> = order.into_iter().map(|i| std::mem::take(&mut defined[i])).collect();
    sorted.extend(undefined);
    Ok(sorted)
}

fn merge_sort(
    interp: &mut Interpreter,
    order: &mut [usize],
    compare: &mut impl FnMut(&mut Interpreter, usize, usize) -> EvalResult<Ordering>,
) -> EvalResult<()> {
    if order.len() < 2 {
        return Ok(());
    }
    let mid = order.len() / 2;
    merge_sort(interp, &mut order[..mid], compare)?;
    merge_sort(interp, &mut order[mid..], compare)?;
    let mut merged = Vec::with_capacity(order.len());
    let (mut i, mut j) = (0, mid);
    while i < mid && j < order.len() {
        if compare(interp, order[j], order[i])? == Ordering::Less {
            merged.push(order[j]);
            j += 1;
        } else {
            merged.push(order[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&order[i..mid]);
    merged.extend_from_slice(&order[j..]);
    order.copy_from_slice(&merged);
    Ok(())
}

fn comparator_arg(args: &[Value]) -> EvalResult<Value> {
    match arg(args, 0) {
        Value::Undefined => Ok(Value::Undefined),
        _ => callback(args, 0),
    }
}

fn sort(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "sort")?;
    let comparator = comparator_arg(args)?;
    let sorted = sort_values(interp, snapshot(&obj), &comparator)?;
    mutate(&obj, |items| *items = sorted)?;
    Ok(this.clone())
}

fn to_sorted(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let obj = this_array(this, "toSorted")?;
    let comparator = comparator_arg(args)?;
    Ok(Value::array(sort_values(interp, snapshot(&obj), &comparator)?))
}

// Constructor and statics

fn from_arguments(args: &[Value]) -> EvalResult<Value> {
    if let [Value::Number(n)] = args {
        if *n < 0.0 || n.fract() != 0.0 || *n > f64::from(u32::MAX) {
            return Err(errors::invalid_array_length());
        }
        if *n as usize > MAX_ARRAY_LENGTH {
            return Err(errors::array_too_large(*n as usize));
        }
        return Ok(Value::array(vec![Value::Undefined; *n as usize]));
    }
    Ok(Value::array(args.to_vec()))
}

/// `Array(...)`.
pub(crate) fn call_constructor(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    from_arguments(args)
}

/// `new Array(...)`.
pub(crate) fn construct(_interp: &mut Interpreter, args: &[Value]) -> EvalResult<Value> {
    from_arguments(args)
}

/// `Array.isArray`.
pub(crate) fn is_array(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::Bool(matches!(args.first(), Some(Value::Object(obj)) if obj.is_array())))
}

/// `Array.of`.
pub(crate) fn of(_interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    Ok(Value::array(args.to_vec()))
}

/// `Array.from(source, mapFn?)`. Accepts iterables and array-likes with a
/// `length`.
pub(crate) fn from(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let source = arg(args, 0);
    if source.is_nullish() {
        return Err(errors::cannot_convert_to_object(&source));
    }
    let items = match Interpreter::iterate(&source) {
        Some(items) => items,
        None => {
            let len = interp.get_property(&source, "length")?;
            let len = to_integer_or_infinity(interp.to_number(&len)?).max(0.0);
            if len > f64::from(u32::MAX) {
                return Err(errors::invalid_array_length());
            }
            if len as usize > MAX_ARRAY_LENGTH {
                return Err(errors::array_too_large(len as usize));
            }
            let mut items = Vec::with_capacity(len as usize);
            for i in 0..len as usize {
                items.push(interp.get_property(&source, &i.to_string())?);
            }
            items
        }
    };
    let map_fn = match arg(args, 1) {
        Value::Undefined => return Ok(Value::array(items)),
        _ => callback(args, 1)?,
    };
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        out.push(interp.call(&map_fn, &Value::Undefined, &[item, Value::Number(i as f64)])?);
    }
    Ok(Value::array(out))
}
