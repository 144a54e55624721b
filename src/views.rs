//! Live views over an IntOpenHashMap.
//!
//! A view stores no data of its own: it holds the map mutably for as long as
//! it lives and forwards every call. Removing through a view is the same as
//! removing from the map, epoch included.

use crate::entry::Entry;
use crate::error::Result;
use crate::generic::{downcast_key, downcast_value};
use crate::iter::{EntryCursor, FastEntryCursor, Iter, KeyCursor, Keys, ValueCursor, Values};
use crate::IntOpenHashMap;
use core::any::Any;

impl<V> IntOpenHashMap<V> {
    /// The keys of this map as a live set.
    pub fn key_set(&mut self) -> KeySet<'_, V> {
        KeySet { map: self }
    }

    /// The values of this map as a live collection.
    pub fn value_collection(&mut self) -> ValueCollection<'_, V> {
        ValueCollection { map: self }
    }

    /// The entries of this map as a live set.
    pub fn entry_set(&mut self) -> EntrySet<'_, V> {
        EntrySet { map: self }
    }
}

macro_rules! view_common {
    ($name:ident) => {
        impl<'a, V> $name<'a, V> {
            pub fn len(&self) -> usize {
                self.map.len()
            }

            pub fn is_empty(&self) -> bool {
                self.map.is_empty()
            }

            /// Remove every entry from the backing map.
            pub fn clear(&mut self) {
                self.map.clear()
            }

            /// The backing map, e.g. to drive a cursor obtained from this view.
            pub fn map(&self) -> &IntOpenHashMap<V> {
                &*self.map
            }

            pub fn map_mut(&mut self) -> &mut IntOpenHashMap<V> {
                &mut *self.map
            }
        }
    };
}

/// Live set of keys.
pub struct KeySet<'a, V> {
    map: &'a mut IntOpenHashMap<V>,
}

view_common!(KeySet);

impl<'a, V> KeySet<'a, V> {
    pub fn iter(&self) -> Keys<'_, V> {
        self.map.keys()
    }

    pub fn cursor(&self) -> KeyCursor<V> {
        self.map.key_cursor()
    }

    pub fn contains(&self, key: i32) -> bool {
        self.map.contains_key(key)
    }

    /// Membership for an object-typed key; null or non-`i32` keys are absent.
    pub fn contains_obj(&self, key: Option<&dyn Any>) -> bool {
        self.map.contains_key_obj(key)
    }

    /// Remove `key` from the map. Returns whether it was present.
    pub fn remove(&mut self, key: i32) -> bool {
        match self.map.find(key) {
            Some(pos) => {
                self.map.remove_entry(pos);
                true
            }
            None => false,
        }
    }

    /// Remove an object-typed key. A null key is absent; a key of another
    /// type is an error.
    pub fn remove_obj(&mut self, key: Option<&dyn Any>) -> Result<bool> {
        match downcast_key(key)? {
            Some(k) => Ok(self.remove(k)),
            None => Ok(false),
        }
    }
}

/// Live collection of values.
pub struct ValueCollection<'a, V> {
    map: &'a mut IntOpenHashMap<V>,
}

view_common!(ValueCollection);

impl<'a, V> ValueCollection<'a, V> {
    pub fn iter(&self) -> Values<'_, V> {
        self.map.values()
    }

    pub fn cursor(&self) -> ValueCursor<V> {
        self.map.value_cursor()
    }

    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    /// Membership for an object-typed value; null or mistyped values are absent.
    pub fn contains_obj(&self, value: Option<&dyn Any>) -> bool
    where
        V: PartialEq + 'static,
    {
        self.map.contains_value_obj(value)
    }

    /// Remove one entry whose value equals `value`. Returns whether one was
    /// found.
    pub fn remove(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let found = self.map.iter().find(|(_, v)| *v == value).map(|(k, _)| k);
        match found {
            Some(k) => {
                self.map.take(k);
                true
            }
            None => false,
        }
    }

    /// Remove one entry holding an object-typed value. Null is never stored;
    /// a value of another type is an error.
    pub fn remove_obj(&mut self, value: Option<&dyn Any>) -> Result<bool>
    where
        V: PartialEq + 'static,
    {
        match downcast_value::<V>(value)? {
            Some(v) => Ok(self.remove(v)),
            None => Ok(false),
        }
    }
}

/// Live set of entries.
pub struct EntrySet<'a, V> {
    map: &'a mut IntOpenHashMap<V>,
}

view_common!(EntrySet);

impl<'a, V> EntrySet<'a, V> {
    pub fn iter(&self) -> Iter<'_, V> {
        self.map.iter()
    }

    pub fn cursor(&self) -> EntryCursor<V> {
        self.map.entry_cursor()
    }

    pub fn fast_cursor(&self) -> FastEntryCursor<V> {
        self.map.fast_cursor()
    }

    /// Whether the map holds `entry`'s key with an equal value.
    pub fn contains(&self, entry: &Entry<V>) -> bool
    where
        V: PartialEq,
    {
        self.map.lookup(entry.key()) == Some(entry.value())
    }

    /// Membership for an arbitrary object. Anything that is not an
    /// `Entry<V>` is absent.
    pub fn contains_obj(&self, entry: &dyn Any) -> bool
    where
        V: PartialEq + 'static,
    {
        entry
            .downcast_ref::<Entry<V>>()
            .is_some_and(|e| self.contains(e))
    }

    /// Remove `entry` if both key and value match. Returns whether it did.
    pub fn remove(&mut self, entry: &Entry<V>) -> bool
    where
        V: PartialEq,
    {
        if !self.contains(entry) {
            return false;
        }
        self.map.take(entry.key());
        true
    }

    /// Remove an arbitrary object. Anything that is not an `Entry<V>` is
    /// absent, so nothing is removed.
    pub fn remove_obj(&mut self, entry: &dyn Any) -> bool
    where
        V: PartialEq + 'static,
    {
        match entry.downcast_ref::<Entry<V>>() {
            Some(e) => self.remove(e),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashSet;

    fn filled(n: i32) -> IntOpenHashMap<i32> {
        let mut m = IntOpenHashMap::new();
        m.set_default_return_value(Some(i32::MIN));
        for k in 0..n {
            m.insert(k, k);
        }
        m
    }

    /// Invariant: views mirror the map's size and content.
    #[test]
    fn views_are_live() {
        let mut m = filled(100);
        {
            let mut keys = m.key_set();
            assert_eq!(keys.len(), 100);
            assert!(keys.contains(42));
            assert!(keys.remove(42));
            assert!(!keys.remove(42));
            assert_eq!(keys.len(), 99);
        }
        assert!(!m.contains_key(42));
        m.insert(500, 500);
        let s: HashSet<i32> = m.key_set().iter().collect();
        assert_eq!(s.len(), 100);
        assert!(s.contains(&500));
    }

    /// Invariant: entry membership and removal require key and value equality.
    #[test]
    fn entry_set_matches_key_and_value() {
        let mut m = filled(100);
        let mut entries = m.entry_set();
        for i in 0..100 {
            assert!(entries.contains(&Entry::new(i, i)));
            assert!(!entries.contains(&Entry::new(i, i32::MIN)));
            assert!(!entries.remove(&Entry::new(i + 1, i)));
            assert!(!entries.remove(&Entry::new(i, i + 1)));
        }
        for i in 0..100 {
            assert!(entries.remove(&Entry::new(i, i)));
        }
        assert!(entries.is_empty());
    }

    /// Invariant: foreign objects are never members of the entry set.
    #[test]
    fn entry_set_rejects_foreign_objects() {
        let mut m = filled(1);
        let mut entries = m.entry_set();
        assert!(!entries.contains_obj(&"not an entry"));
        assert!(!entries.contains_obj(&(0, 0)));
        assert!(!entries.remove_obj(&Entry::new(0, 0u8)));
        assert!(entries.contains_obj(&Entry::new(0, 0)));
        assert!(entries.remove_obj(&Entry::new(0, 0)));
        assert!(entries.is_empty());
    }

    /// Invariant: key-set object queries report not-found, removals reject
    /// mistyped keys.
    #[test]
    fn key_set_object_rules() {
        let mut m = filled(3);
        let mut keys = m.key_set();
        assert!(!keys.contains_obj(None));
        assert!(!keys.contains_obj(Some(&1i64)));
        assert!(keys.contains_obj(Some(&1i32)));
        assert_eq!(keys.remove_obj(None), Ok(false));
        assert!(matches!(
            keys.remove_obj(Some(&1i64)),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(keys.remove_obj(Some(&1i32)), Ok(true));
        assert_eq!(keys.len(), 2);
    }

    /// Invariant: value removal drops exactly one matching entry.
    #[test]
    fn value_collection_removes_one_match() {
        let mut m: IntOpenHashMap<&str> = IntOpenHashMap::new();
        m.insert(1, "a");
        m.insert(2, "a");
        m.insert(3, "b");
        let mut values = m.value_collection();
        assert!(values.contains(&"a"));
        assert!(values.remove(&"a"));
        assert_eq!(values.len(), 2);
        assert!(values.contains(&"a"));
        assert!(!values.remove(&"c"));
        assert!(values.contains_obj(Some(&"b")));
        assert!(!values.contains_obj(Some(&3)));
        assert!(!values.contains_obj(None));
    }

    #[test]
    fn value_collection_remove_obj_checks_type() {
        let mut m: IntOpenHashMap<i32> = filled(3);
        let mut values = m.value_collection();
        assert!(matches!(
            values.remove_obj(Some(&1i64)),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(values.remove_obj(None), Ok(false));
        assert_eq!(values.remove_obj(Some(&7i32)), Ok(false));
        assert_eq!(values.remove_obj(Some(&1i32)), Ok(true));
        assert_eq!(values.len(), 2);
        assert!(!m.contains_key(1));
    }

    /// Invariant: removal through a view cursor leaves map and view in sync.
    #[test]
    fn key_set_cursor_removal() {
        let mut m = filled(0);
        for k in -1..=1 {
            m.insert(k, k);
        }
        let mut keys = m.key_set();
        let mut cur = keys.cursor();
        let mut removed = false;
        while let Some(k) = cur.advance(keys.map()).unwrap() {
            if k == 0 {
                assert!(!removed);
                cur.remove(keys.map_mut()).unwrap();
                removed = true;
            }
        }
        assert!(removed);
        assert_eq!(keys.len(), 2);
        let mut content: Vec<i32> = keys.iter().collect();
        content.sort_unstable();
        assert_eq!(content, vec![-1, 1]);
        assert_eq!(m.get(0), Some(&i32::MIN));
    }
}
