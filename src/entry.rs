//! Entry materializations: durable snapshots and the reused fast cursor slot.

use core::fmt;

/// A durable `(key, value)` snapshot. Owns its value and stays valid no
/// matter what happens to the map afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entry<V> {
    key: i32,
    value: V,
}

impl<V> Entry<V> {
    pub fn new(key: i32, value: V) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> i32 {
        self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Replace the snapshot's value. The map is not affected.
    pub fn set_value(&mut self, value: V) -> V {
        core::mem::replace(&mut self.value, value)
    }

    pub fn into_parts(self) -> (i32, V) {
        (self.key, self.value)
    }
}

impl<V> From<(i32, V)> for Entry<V> {
    fn from((key, value): (i32, V)) -> Self {
        Self::new(key, value)
    }
}

/// The entry under a fast cursor.
///
/// It borrows both the cursor and the map, so it is gone by the time the
/// cursor advances again. Writes go straight to the backing slot.
pub struct FastEntry<'a, V> {
    pub(crate) key: i32,
    pub(crate) value: &'a mut V,
}

impl<'a, V> FastEntry<'a, V> {
    pub fn key(&self) -> i32 {
        self.key
    }

    pub fn value(&self) -> &V {
        self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        self.value
    }

    /// Overwrite the value in place, returning the old one. The entry is not
    /// relocated and the map's epoch is untouched.
    pub fn set_value(&mut self, value: V) -> V {
        core::mem::replace(self.value, value)
    }

    /// Take a durable snapshot of the current entry.
    pub fn to_entry(&self) -> Entry<V>
    where
        V: Clone,
    {
        Entry::new(self.key, self.value.clone())
    }
}

impl<V: fmt::Debug> fmt::Debug for FastEntry<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// A fast entry equals a durable entry holding the same key and value.
impl<V: PartialEq> PartialEq<Entry<V>> for FastEntry<'_, V> {
    fn eq(&self, other: &Entry<V>) -> bool {
        self.key == other.key && *self.value == other.value
    }
}
