//! Bidirectional multimap between keys and values.

use std::collections::HashMap;
use std::hash::Hash;

/// Many-to-many mapping kept consistent in both directions.
///
/// A key may exist with no values, but a value always has at least one key:
/// detaching a value from its last key removes the value. Operations on keys
/// or values that are not present are silent no-ops.
///
/// Keys are iterated in insertion order; each key's values and each value's
/// keys keep attachment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidirectionalIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Key -> values attached to it
    forward: HashMap<K, Vec<V>>,
    /// Value -> keys it is attached to
    backward: HashMap<V, Vec<K>>,
    /// Keys in insertion order
    key_order: Vec<K>,
}

impl<K, V> Default for BidirectionalIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
            key_order: Vec::new(),
        }
    }
}

impl<K, V> BidirectionalIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key with no values. No-op if the key exists.
    pub fn add_key(&mut self, key: K) {
        if !self.forward.contains_key(&key) {
            self.forward.insert(key.clone(), Vec::new());
            self.key_order.push(key);
        }
    }

    /// Attach a value to a key, creating the key if needed.
    ///
    /// No-op if the value is already attached to the key.
    pub fn add_value_to_key(&mut self, key: K, value: V) {
        self.add_key(key.clone());

        let values = self.forward.entry(key.clone()).or_default();
        if values.contains(&value) {
            return;
        }
        values.push(value.clone());
        self.backward.entry(value).or_default().push(key);
    }

    /// Insert a key (if absent) and attach a value to it.
    pub fn add_key_with_value(&mut self, key: K, value: V) {
        self.add_key(key.clone());
        self.add_value_to_key(key, value);
    }

    /// Keys attached to a value, or `None` if the value is not present.
    pub fn keys_from_value(&self, value: &V) -> Option<&[K]> {
        self.backward.get(value).map(Vec::as_slice)
    }

    /// Values attached to a key, or `None` if the key is not present.
    pub fn values_from_key(&self, key: &K) -> Option<&[V]> {
        self.forward.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.forward.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool {
        self.backward.contains_key(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.key_order.iter()
    }

    pub fn key_count(&self) -> usize {
        self.key_order.len()
    }

    pub fn value_count(&self) -> usize {
        self.backward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_order.is_empty()
    }

    /// Re-point every key attached to `old` at `new`.
    ///
    /// No-op if `old` is absent or `new` is already present, so two distinct
    /// values are never merged.
    pub fn replace_value(&mut self, old: &V, new: V) {
        if !self.backward.contains_key(old) || self.backward.contains_key(&new) {
            return;
        }
        let Some(keys) = self.backward.remove(old) else {
            return;
        };
        for key in &keys {
            if let Some(values) = self.forward.get_mut(key) {
                for value in values.iter_mut().filter(|v| **v == *old) {
                    *value = new.clone();
                }
            }
        }
        self.backward.insert(new, keys);
    }

    /// Rename a key, keeping its position and values.
    ///
    /// No-op if `old` is absent or `new` is already present.
    pub fn replace_key(&mut self, old: &K, new: K) {
        if !self.forward.contains_key(old) || self.forward.contains_key(&new) {
            return;
        }
        let Some(values) = self.forward.remove(old) else {
            return;
        };
        for value in &values {
            if let Some(keys) = self.backward.get_mut(value) {
                for key in keys.iter_mut().filter(|k| **k == *old) {
                    *key = new.clone();
                }
            }
        }
        if let Some(slot) = self.key_order.iter_mut().find(|k| **k == *old) {
            *slot = new.clone();
        }
        self.forward.insert(new, values);
    }

    /// Remove a key. Values left without any key are removed too.
    pub fn delete_key(&mut self, key: &K) {
        let Some(values) = self.forward.remove(key) else {
            return;
        };
        self.key_order.retain(|k| k != key);
        for value in values {
            self.detach_back_reference(&value, key);
        }
    }

    /// Remove a value from every key it is attached to.
    ///
    /// Keys are kept even if this leaves them empty.
    pub fn delete_value(&mut self, value: &V) {
        let Some(keys) = self.backward.remove(value) else {
            return;
        };
        for key in keys {
            if let Some(values) = self.forward.get_mut(&key) {
                values.retain(|v| v != value);
            }
        }
    }

    /// Detach a value from one key, removing the value if that was its last key.
    pub fn delete_value_from_key(&mut self, key: &K, value: &V) {
        let Some(values) = self.forward.get_mut(key) else {
            return;
        };
        let before = values.len();
        values.retain(|v| v != value);
        if values.len() != before {
            self.detach_back_reference(value, key);
        }
    }

    /// Owned copy of the key -> values mapping.
    pub fn copy_of_mappings(&self) -> HashMap<K, Vec<V>> {
        self.forward.clone()
    }

    fn detach_back_reference(&mut self, value: &V, key: &K) {
        if let Some(keys) = self.backward.get_mut(value) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.backward.remove(value);
            }
        }
    }
}
