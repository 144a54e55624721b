//! The map as a generic keyed collection.
//!
//! Callers that only hold keys as type-erased objects go through the `*_obj`
//! operations below. A key is an `Option<&dyn Any>`: `None` plays the part of
//! a null reference and only an `i32` is a compatible key. Pure membership
//! queries treat anything unusable as absent, lookups and removals reject
//! mistyped keys, and operations that must associate a key reject null.
//!
//! This module also holds the conversions, equality and partial-function
//! interop shared with the std and hashbrown maps.

use crate::error::{Error, Result};
use crate::IntOpenHashMap;
use core::any::{type_name, Any};
use core::hash::BuildHasher;
use std::collections::{BTreeMap, HashMap};

/// Downcast an object-typed key. Null stays `None`, anything but an `i32`
/// is an error.
pub(crate) fn downcast_key(key: Option<&dyn Any>) -> Result<Option<i32>> {
    match key {
        None => Ok(None),
        Some(k) => k
            .downcast_ref::<i32>()
            .copied()
            .map(Some)
            .ok_or(Error::TypeMismatch {
                expected: type_name::<i32>(),
            }),
    }
}

/// Downcast an object-typed value to `V`. Null stays `None`.
pub(crate) fn downcast_value<V: 'static>(value: Option<&dyn Any>) -> Result<Option<&V>> {
    match value {
        None => Ok(None),
        Some(v) => v.downcast_ref::<V>().map(Some).ok_or(Error::TypeMismatch {
            expected: type_name::<V>(),
        }),
    }
}

/// A key that is about to be associated: null is rejected.
fn required_key(key: Option<&dyn Any>) -> Result<i32> {
    downcast_key(key)?.ok_or(Error::NullKey)
}

/// A function from `i32` keys that may be undefined on part of its domain.
///
/// Maps are the usual example: they define exactly their keys.
pub trait IntFunction<V> {
    /// Whether `key` is in the function's domain.
    fn defines(&self, key: i32) -> bool;

    /// The image of `key`. Only meaningful when `defines(key)` holds.
    fn apply(&self, key: i32) -> Option<V>;
}

impl<V: Clone> IntFunction<V> for IntOpenHashMap<V> {
    fn defines(&self, key: i32) -> bool {
        self.contains_key(key)
    }

    fn apply(&self, key: i32) -> Option<V> {
        self.get(key).cloned()
    }
}

impl<V: Clone, S: BuildHasher> IntFunction<V> for HashMap<i32, V, S> {
    fn defines(&self, key: i32) -> bool {
        self.contains_key(&key)
    }

    fn apply(&self, key: i32) -> Option<V> {
        self.get(&key).cloned()
    }
}

impl<V: Clone> IntFunction<V> for BTreeMap<i32, V> {
    fn defines(&self, key: i32) -> bool {
        self.contains_key(&key)
    }

    fn apply(&self, key: i32) -> Option<V> {
        self.get(&key).cloned()
    }
}

impl<V> IntOpenHashMap<V> {
    /// Whether the map contains an object-typed key. Null or non-`i32` keys
    /// are never contained.
    pub fn contains_key_obj(&self, key: Option<&dyn Any>) -> bool {
        matches!(downcast_key(key), Ok(Some(k)) if self.contains_key(k))
    }

    /// Whether the map holds an object-typed value. Null or values of another
    /// type are never held.
    pub fn contains_value_obj(&self, value: Option<&dyn Any>) -> bool
    where
        V: PartialEq + 'static,
    {
        matches!(downcast_value::<V>(value), Ok(Some(v)) if self.contains_value(v))
    }

    /// Look up an object-typed key. A null key or a miss yields `Ok(None)`;
    /// the default return value is not substituted.
    pub fn get_obj(&self, key: Option<&dyn Any>) -> Result<Option<&V>> {
        Ok(downcast_key(key)?.and_then(|k| self.lookup(k)))
    }

    /// The value for an object-typed key, or `fallback` when the key is null
    /// or absent.
    pub fn get_or_obj<'a>(
        &'a self,
        key: Option<&dyn Any>,
        fallback: Option<&'a V>,
    ) -> Result<Option<&'a V>> {
        Ok(downcast_key(key)?.and_then(|k| self.lookup(k)).or(fallback))
    }

    /// Remove an object-typed key, returning its value or the default return
    /// value. A null key removes nothing.
    pub fn remove_obj(&mut self, key: Option<&dyn Any>) -> Result<Option<V>>
    where
        V: Clone,
    {
        match downcast_key(key)? {
            Some(k) => Ok(self.remove(k)),
            None => Ok(self.default_value.clone()),
        }
    }

    /// Remove an object-typed key only if it maps to `value`.
    pub fn remove_exact_obj(&mut self, key: Option<&dyn Any>, value: &V) -> Result<bool>
    where
        V: PartialEq,
    {
        match downcast_key(key)? {
            Some(k) => Ok(self.remove_exact(k, value)),
            None => Ok(false),
        }
    }

    pub fn replace_obj(&mut self, key: Option<&dyn Any>, value: V) -> Result<Option<V>>
    where
        V: Clone,
    {
        let k = required_key(key)?;
        Ok(self.replace(k, value))
    }

    pub fn replace_exact_obj(&mut self, key: Option<&dyn Any>, old: &V, new: V) -> Result<bool>
    where
        V: PartialEq,
    {
        let k = required_key(key)?;
        Ok(self.replace_exact(k, old, new))
    }

    pub fn put_if_absent_obj(&mut self, key: Option<&dyn Any>, value: V) -> Result<Option<&V>> {
        let k = required_key(key)?;
        Ok(self.put_if_absent(k, value))
    }

    pub fn compute_if_absent_obj<F>(&mut self, key: Option<&dyn Any>, f: F) -> Result<Option<&V>>
    where
        F: FnOnce(i32) -> Option<V>,
    {
        let k = required_key(key)?;
        Ok(self.compute_if_absent(k, f))
    }

    pub fn compute_if_present_obj<F>(&mut self, key: Option<&dyn Any>, f: F) -> Result<Option<&V>>
    where
        F: FnOnce(i32, &V) -> Option<V>,
    {
        let k = required_key(key)?;
        Ok(self.compute_if_present(k, f))
    }

    pub fn compute_obj<F>(&mut self, key: Option<&dyn Any>, f: F) -> Result<Option<&V>>
    where
        F: FnOnce(i32, Option<&V>) -> Option<V>,
    {
        let k = required_key(key)?;
        Ok(self.compute(k, f))
    }

    /// Object-typed `merge`. A null value is rejected before the key is
    /// looked at, whether or not the key is present.
    pub fn merge_obj<F>(
        &mut self,
        key: Option<&dyn Any>,
        value: Option<V>,
        f: F,
    ) -> Result<Option<&V>>
    where
        F: FnOnce(&V, V) -> Option<V>,
    {
        let value = value.ok_or(Error::NullValue)?;
        let k = required_key(key)?;
        Ok(self.merge(k, value, f))
    }

    /// Copy every entry of `other` into this map, overwriting existing keys.
    pub fn put_all(&mut self, other: &IntOpenHashMap<V>) -> Result<()>
    where
        V: Clone,
    {
        self.ensure_capacity(self.size + other.size)?;
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
        Ok(())
    }
}

/// Two maps are equal when they hold the same key-value associations.
/// Capacity, load factor and default return value do not take part.
impl<V: PartialEq> PartialEq for IntOpenHashMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.lookup(k) == Some(v))
    }
}

impl<V: Eq> Eq for IntOpenHashMap<V> {}

impl<V: PartialEq, S: BuildHasher> PartialEq<HashMap<i32, V, S>> for IntOpenHashMap<V> {
    fn eq(&self, other: &HashMap<i32, V, S>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(&k) == Some(v))
    }
}

impl<V: PartialEq, S: BuildHasher> PartialEq<IntOpenHashMap<V>> for HashMap<i32, V, S> {
    fn eq(&self, other: &IntOpenHashMap<V>) -> bool {
        other == self
    }
}

impl<V: PartialEq, S: BuildHasher> PartialEq<hashbrown::HashMap<i32, V, S>> for IntOpenHashMap<V> {
    fn eq(&self, other: &hashbrown::HashMap<i32, V, S>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(&k) == Some(v))
    }
}

impl<V: PartialEq, S: BuildHasher> PartialEq<IntOpenHashMap<V>> for hashbrown::HashMap<i32, V, S> {
    fn eq(&self, other: &IntOpenHashMap<V>) -> bool {
        other == self
    }
}

impl<V> Extend<(i32, V)> for IntOpenHashMap<V> {
    fn extend<I: IntoIterator<Item = (i32, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.ensure_capacity(self.size.saturating_add(lower)).ok();
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, V: Clone> Extend<(i32, &'a V)> for IntOpenHashMap<V> {
    fn extend<I: IntoIterator<Item = (i32, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(k, v)| (k, v.clone())));
    }
}

impl<V> FromIterator<(i32, V)> for IntOpenHashMap<V> {
    fn from_iter<I: IntoIterator<Item = (i32, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V, const N: usize> From<[(i32, V); N]> for IntOpenHashMap<V> {
    fn from(entries: [(i32, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<V: Clone, S> From<&HashMap<i32, V, S>> for IntOpenHashMap<V> {
    fn from(map: &HashMap<i32, V, S>) -> Self {
        map.iter().map(|(&k, v)| (k, v.clone())).collect()
    }
}

impl<V: Clone, S> From<&hashbrown::HashMap<i32, V, S>> for IntOpenHashMap<V> {
    fn from(map: &hashbrown::HashMap<i32, V, S>) -> Self {
        map.iter().map(|(&k, v)| (k, v.clone())).collect()
    }
}

impl<V> From<IntOpenHashMap<V>> for HashMap<i32, V> {
    fn from(map: IntOpenHashMap<V>) -> Self {
        map.into_iter().collect()
    }
}
