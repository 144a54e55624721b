//! Compute, merge and conditional update operations.
//!
//! Each operation probes once and acts on the slot it found, so callers never
//! see a half-applied update. A closure returning `None` means "no mapping":
//! the key is removed, or left absent, and the default return value is
//! reported.

use crate::generic::IntFunction;
use crate::hash_table::Probe;
use crate::IntOpenHashMap;

impl<V> IntOpenHashMap<V> {
    /// Insert a value for `key` computed by `f`, unless the key is already
    /// present.
    ///
    /// Returns the existing value (without calling `f`), the inserted value,
    /// or the default return value if `f` produced nothing.
    pub fn compute_if_absent<F>(&mut self, key: i32, f: F) -> Option<&V>
    where
        F: FnOnce(i32) -> Option<V>,
    {
        match self.probe(key) {
            Probe::Occupied(pos) => self.values[pos].as_ref(),
            Probe::Vacant(pos) => match f(key) {
                Some(value) => self.insert_and_get(pos, key, value),
                None => self.default_value.as_ref(),
            },
        }
    }

    /// Like [`compute_if_absent`](Self::compute_if_absent), but driven by a
    /// partial function: nothing is inserted, and `apply` is not called, when
    /// `f` does not define `key`.
    pub fn compute_if_absent_partial<F>(&mut self, key: i32, f: &F) -> Option<&V>
    where
        F: IntFunction<V> + ?Sized,
    {
        match self.probe(key) {
            Probe::Occupied(pos) => self.values[pos].as_ref(),
            Probe::Vacant(_) if !f.defines(key) => self.default_value.as_ref(),
            Probe::Vacant(pos) => match f.apply(key) {
                Some(value) => self.insert_and_get(pos, key, value),
                None => self.default_value.as_ref(),
            },
        }
    }

    /// Recompute the value of a present key. `None` removes the entry.
    ///
    /// Returns the new value, or the default return value if the key was
    /// absent or has been removed.
    pub fn compute_if_present<F>(&mut self, key: i32, f: F) -> Option<&V>
    where
        F: FnOnce(i32, &V) -> Option<V>,
    {
        let Some(pos) = self.find(key) else {
            return self.default_value.as_ref();
        };
        let computed = match self.values[pos].as_ref() {
            Some(old) => f(key, old),
            None => return self.default_value.as_ref(),
        };
        self.store_computed(pos, computed)
    }

    /// Compute a value from the key and its current value, if any.
    ///
    /// `Some` inserts or replaces, `None` removes the key or leaves it
    /// absent. Returns the new value or the default return value.
    pub fn compute<F>(&mut self, key: i32, f: F) -> Option<&V>
    where
        F: FnOnce(i32, Option<&V>) -> Option<V>,
    {
        match self.probe(key) {
            Probe::Occupied(pos) => {
                let computed = f(key, self.values[pos].as_ref());
                self.store_computed(pos, computed)
            }
            Probe::Vacant(pos) => match f(key, None) {
                Some(value) => self.insert_and_get(pos, key, value),
                None => self.default_value.as_ref(),
            },
        }
    }

    /// Insert `value` if `key` is absent, otherwise combine it with the
    /// current value through `f`. `None` from `f` removes the entry.
    ///
    /// `f` only runs when the key is present.
    pub fn merge<F>(&mut self, key: i32, value: V, f: F) -> Option<&V>
    where
        F: FnOnce(&V, V) -> Option<V>,
    {
        match self.probe(key) {
            Probe::Vacant(pos) => self.insert_and_get(pos, key, value),
            Probe::Occupied(pos) => {
                let merged = match self.values[pos].as_ref() {
                    Some(old) => f(old, value),
                    None => Some(value),
                };
                self.store_computed(pos, merged)
            }
        }
    }

    /// Insert `value` unless `key` is present. Returns the existing value,
    /// or the default return value if the insertion happened.
    pub fn put_if_absent(&mut self, key: i32, value: V) -> Option<&V> {
        match self.probe(key) {
            Probe::Occupied(pos) => self.values[pos].as_ref(),
            Probe::Vacant(pos) => {
                self.insert_at(pos, key, value);
                self.default_value.as_ref()
            }
        }
    }

    /// Replace the value of a present key. Returns the previous value, or the
    /// default return value if the key was absent (and nothing changed).
    pub fn replace(&mut self, key: i32, value: V) -> Option<V>
    where
        V: Clone,
    {
        match self.find(key) {
            Some(pos) => self.values[pos].replace(value),
            None => self.default_value.clone(),
        }
    }

    /// Replace the value of `key` with `new` only if it currently equals
    /// `old`.
    pub fn replace_exact(&mut self, key: i32, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        match self.find(key) {
            Some(pos) if self.values[pos].as_ref() == Some(old) => {
                self.values[pos] = Some(new);
                true
            }
            _ => false,
        }
    }

    /// Remove `key` only if it maps to a value equal to `expected`.
    pub fn remove_exact(&mut self, key: i32, expected: &V) -> bool
    where
        V: PartialEq,
    {
        match self.find(key) {
            Some(pos) if self.values[pos].as_ref() == Some(expected) => {
                self.remove_entry(pos);
                true
            }
            _ => false,
        }
    }

    /// Insert into the vacant slot `pos` and return the stored value, which
    /// may have moved if the table grew.
    fn insert_and_get(&mut self, pos: usize, key: i32, value: V) -> Option<&V> {
        self.insert_at(pos, key, value);
        self.lookup(key)
    }

    /// Write a computed value into the occupied slot `pos`; `None` removes it.
    fn store_computed(&mut self, pos: usize, computed: Option<V>) -> Option<&V> {
        match computed {
            Some(value) => {
                self.values[pos] = Some(value);
                self.values[pos].as_ref()
            }
            None => {
                self.remove_entry(pos);
                self.default_value.as_ref()
            }
        }
    }
}
