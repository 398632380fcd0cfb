//! Ordered own-property storage.

use rustc_hash::FxHashMap;
use std::rc::Rc;

use super::number::array_index;
use super::Value;

/// Own properties of an object.
///
/// Enumeration follows JavaScript order: integer keys ascending, then
/// string keys in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    entries: Vec<(Rc<str>, Value)>,
    index: FxHashMap<Rc<str>, usize>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite, keeping the original position on overwrite.
    pub fn insert(&mut self, key: &str, value: Value) {
        if let Some(&i) = self.index.get(key) {
            self.entries[i].1 = value;
            return;
        }
        let key: Rc<str> = Rc::from(key);
        self.index.insert(Rc::clone(&key), self.entries.len());
        self.entries.push((key, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in enumeration order.
    pub fn keys(&self) -> Vec<Rc<str>> {
        let mut integers: Vec<(usize, Rc<str>)> = Vec::new();
        let mut strings: Vec<Rc<str>> = Vec::new();
        for (key, _) in &self.entries {
            match array_index(key) {
                Some(index) => integers.push((index, Rc::clone(key))),
                None => strings.push(Rc::clone(key)),
            }
        }
        integers.sort_by_key(|(index, _)| *index);
        integers
            .into_iter()
            .map(|(_, key)| key)
            .chain(strings)
            .collect()
    }

    /// Entries in enumeration order.
    pub fn entries(&self) -> Vec<(Rc<str>, Value)> {
        self.keys()
            .into_iter()
            .filter_map(|key| {
                let value = self.get(&key)?.clone();
                Some((key, value))
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.insert(&key, value);
        }
        map
    }
}
