//! Insertion-ordered hash table backing `Map`, `Set` and their weak
//! variants.

use rustc_hash::FxHashMap;
use std::rc::Rc;

use super::Value;

/// Hashable form of a value under `SameValueZero`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum TableKey {
    Undefined,
    Null,
    Bool(bool),
    Number(u64),
    String(Rc<str>),
    Object(usize),
}

impl TableKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Undefined => TableKey::Undefined,
            Value::Null => TableKey::Null,
            Value::Bool(b) => TableKey::Bool(*b),
            Value::Number(n) if n.is_nan() => TableKey::Number(f64::NAN.to_bits()),
            Value::Number(n) if *n == 0.0 => TableKey::Number(0f64.to_bits()),
            Value::Number(n) => TableKey::Number(n.to_bits()),
            Value::String(s) => TableKey::String(Rc::clone(s)),
            Value::Object(obj) => TableKey::Object(obj.addr()),
        }
    }
}

/// Entries in insertion order. Deleted slots become tombstones so that
/// indices stay valid.
#[derive(Clone, Debug, Default)]
pub struct OrderedTable {
    slots: Vec<Option<(Value, Value)>>,
    index: FxHashMap<TableKey, usize>,
}

impl OrderedTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        let &slot = self.index.get(&TableKey::of(key))?;
        self.slots[slot].as_ref().map(|(_, value)| value.clone())
    }

    pub fn has(&self, key: &Value) -> bool {
        self.index.contains_key(&TableKey::of(key))
    }

    pub fn set(&mut self, key: Value, value: Value) {
        let key = match key {
            Value::Number(n) if n == 0.0 => Value::Number(0.0),
            other => other,
        };
        let table_key = TableKey::of(&key);
        if let Some(&slot) = self.index.get(&table_key) {
            self.slots[slot] = Some((key, value));
            return;
        }
        self.index.insert(table_key, self.slots.len());
        self.slots.push(Some((key, value)));
    }

    pub fn delete(&mut self, key: &Value) -> bool {
        match self.index.remove(&TableKey::of(key)) {
            Some(slot) => {
                self.slots[slot] = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live entries, in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.slots.iter().flatten().cloned().collect()
    }
}
