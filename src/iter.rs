//! Iteration over IntOpenHashMap.
//!
//! Two families live here:
//! - Borrowing iterators (`Iter`, `IterMut`, `Keys`, `Values`, `ValuesMut`,
//!   `IntoIter`). The borrow checker rules out modification of the map
//!   while they are alive.
//! - Detached cursors (`EntryCursor`, `FastEntryCursor`, `KeyCursor`,
//!   `ValueCursor`). A cursor does not borrow the map; it is handed the map
//!   on every call, so the map may be modified between steps. Each call
//!   compares the epoch captured by the cursor with the map's and fails with
//!   `Error::ConcurrentModification` if someone else changed the structure.
//!   Removing through the cursor keeps the cursor in sync.
//!
//! Cursors visit the zero key first, then the table from the last slot down
//! to slot 0. When a removal shifts an entry from the start of the table
//! into the already visited end, the entry's key is remembered and returned
//! after the scan, so every entry is seen exactly once.

use crate::entry::{Entry, FastEntry};
use crate::error::{Error, Result};
use crate::IntOpenHashMap;
use core::iter::{FusedIterator, Zip};
use core::marker::PhantomData;
use core::slice;

/// Iterator over `(key, &value)` pairs.
pub struct Iter<'a, V> {
    zero: Option<&'a V>,
    slots: Zip<slice::Iter<'a, i32>, slice::Iter<'a, Option<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i32, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.zero.take() {
            self.remaining -= 1;
            return Some((0, v));
        }
        for (&k, v) in self.slots.by_ref() {
            if k == 0 {
                continue;
            }
            if let Some(v) = v.as_ref() {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            zero: self.zero,
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(key, &mut value)` pairs.
pub struct IterMut<'a, V> {
    zero: Option<&'a mut V>,
    slots: Zip<slice::Iter<'a, i32>, slice::IterMut<'a, Option<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (i32, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.zero.take() {
            self.remaining -= 1;
            return Some((0, v));
        }
        for (&k, v) in self.slots.by_ref() {
            if k == 0 {
                continue;
            }
            if let Some(v) = v.as_mut() {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// Iterator over keys.
#[derive(Clone)]
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<V> Iterator for Keys<'_, V> {
    type Item = i32;

    #[inline]
    fn next(&mut self) -> Option<i32> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}
impl<V> FusedIterator for Keys<'_, V> {}

/// Iterator over values.
#[derive(Clone)]
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}

/// Iterator over mutable values.
pub struct ValuesMut<'a, V> {
    inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}
impl<V> FusedIterator for ValuesMut<'_, V> {}

/// Owning iterator over `(key, value)` pairs.
pub struct IntoIter<V> {
    zero: Option<V>,
    slots: Zip<std::vec::IntoIter<i32>, std::vec::IntoIter<Option<V>>>,
    remaining: usize,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (i32, V);

    fn next(&mut self) -> Option<(i32, V)> {
        if let Some(v) = self.zero.take() {
            self.remaining -= 1;
            return Some((0, v));
        }
        for (k, v) in self.slots.by_ref() {
            if k == 0 {
                continue;
            }
            if let Some(v) = v {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

impl<V> IntOpenHashMap<V> {
    pub fn iter(&self) -> Iter<'_, V> {
        let n = self.n;
        Iter {
            zero: self.values[n].as_ref(),
            slots: self.keys[..n].iter().zip(self.values[..n].iter()),
            remaining: self.size,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let n = self.n;
        let (table, zero) = self.values.split_at_mut(n);
        IterMut {
            zero: zero[0].as_mut(),
            slots: self.keys[..n].iter().zip(table.iter_mut()),
            remaining: self.size,
        }
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Visit every entry as a durable snapshot.
    pub fn for_each<F>(&self, mut f: F)
    where
        V: Clone,
        F: FnMut(Entry<V>),
    {
        self.iter().for_each(|(k, v)| f(Entry::new(k, v.clone())));
    }

    /// Visit every entry through a fast entry. Values may be replaced in
    /// place; the structure cannot change.
    pub fn fast_for_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut FastEntry<'_, V>),
    {
        for (key, value) in self.iter_mut() {
            f(&mut FastEntry { key, value });
        }
    }

    /// Cursor yielding durable entries.
    pub fn entry_cursor(&self) -> EntryCursor<V> {
        EntryCursor {
            raw: RawCursor::new(self),
            _pd: PhantomData,
        }
    }

    /// Cursor yielding a fast entry that is only valid until the next step.
    pub fn fast_cursor(&self) -> FastEntryCursor<V> {
        FastEntryCursor {
            raw: RawCursor::new(self),
            _pd: PhantomData,
        }
    }

    pub fn key_cursor(&self) -> KeyCursor<V> {
        KeyCursor {
            raw: RawCursor::new(self),
            _pd: PhantomData,
        }
    }

    pub fn value_cursor(&self) -> ValueCursor<V> {
        ValueCursor {
            raw: RawCursor::new(self),
            _pd: PhantomData,
        }
    }
}

impl<'a, V> IntoIterator for &'a IntOpenHashMap<V> {
    type Item = (i32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut IntOpenHashMap<V> {
    type Item = (i32, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

impl<V> IntoIterator for IntOpenHashMap<V> {
    type Item = (i32, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> IntoIter<V> {
        let n = self.n;
        let mut keys = self.keys.into_vec();
        keys.truncate(n);
        let mut values = self.values.into_vec();
        let zero = values.pop().flatten();
        IntoIter {
            zero,
            slots: keys.into_iter().zip(values),
            remaining: self.size,
        }
    }
}

/// What the last successful advance returned.
#[derive(Clone, Copy, Debug)]
enum Last {
    None,
    /// A table slot; the map's `n` denotes the zero key.
    Slot(usize),
    /// An entry taken from the wrapped list, located by key.
    Wrapped(i32),
}

/// Position bookkeeping shared by all cursor flavours.
#[derive(Debug)]
struct RawCursor {
    map_id: u64,
    expected_epoch: u64,
    /// Slots `>= pos` have been scanned.
    pos: usize,
    remaining: usize,
    must_return_zero: bool,
    last: Last,
    wrapped: Vec<i32>,
    next_wrapped: usize,
}

impl RawCursor {
    fn new<V>(map: &IntOpenHashMap<V>) -> Self {
        Self {
            map_id: map.id,
            expected_epoch: map.epoch(),
            pos: map.n,
            remaining: map.size,
            must_return_zero: map.contains_zero_key,
            last: Last::None,
            wrapped: Vec::new(),
            next_wrapped: 0,
        }
    }

    fn check<V>(&self, map: &IntOpenHashMap<V>) -> Result<()> {
        if map.id != self.map_id {
            return Err(Error::WrongMap);
        }
        if map.epoch() != self.expected_epoch {
            return Err(Error::ConcurrentModification {
                expected: self.expected_epoch,
                found: map.epoch(),
            });
        }
        Ok(())
    }

    /// Position of the next entry, or `None` once every entry was returned.
    fn advance<V>(&mut self, map: &IntOpenHashMap<V>) -> Result<Option<usize>> {
        self.check(map)?;
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        if self.must_return_zero {
            self.must_return_zero = false;
            self.last = Last::Slot(map.n);
            return Ok(Some(map.n));
        }
        while self.pos > 0 {
            self.pos -= 1;
            if map.keys[self.pos] != 0 {
                self.last = Last::Slot(self.pos);
                return Ok(Some(self.pos));
            }
        }
        let Some(&key) = self.wrapped.get(self.next_wrapped) else {
            return Ok(None);
        };
        self.next_wrapped += 1;
        self.last = Last::Wrapped(key);
        Ok(map.find(key))
    }

    fn remove<V>(&mut self, map: &mut IntOpenHashMap<V>) -> Result<V> {
        self.check(map)?;
        let removed = match core::mem::replace(&mut self.last, Last::None) {
            Last::None => return Err(Error::IllegalIteratorState),
            Last::Slot(pos) => map.remove_at(pos, Some(&mut self.wrapped)),
            Last::Wrapped(key) => match map.find(key) {
                Some(pos) => map.remove_at(pos, None),
                None => None,
            },
        };
        self.expected_epoch = map.epoch();
        removed.ok_or(Error::IllegalIteratorState)
    }
}

macro_rules! cursor_common {
    ($name:ident) => {
        impl<V> $name<V> {
            /// Whether another advance would yield an element.
            pub fn has_next(&self) -> bool {
                self.raw.remaining > 0
            }

            /// Number of elements not yet returned.
            pub fn remaining(&self) -> usize {
                self.raw.remaining
            }

            /// Remove the element returned by the last advance from `map`.
            ///
            /// Fails with `IllegalIteratorState` before the first advance or
            /// when the element was already removed.
            pub fn remove(&mut self, map: &mut IntOpenHashMap<V>) -> Result<V> {
                self.raw.remove(map)
            }
        }
    };
}

/// Safe cursor: every step yields a fresh durable `Entry`.
#[derive(Debug)]
pub struct EntryCursor<V> {
    raw: RawCursor,
    _pd: PhantomData<fn() -> V>,
}

cursor_common!(EntryCursor);

impl<V: Clone> EntryCursor<V> {
    pub fn advance(&mut self, map: &IntOpenHashMap<V>) -> Result<Option<Entry<V>>> {
        let Some(pos) = self.raw.advance(map)? else {
            return Ok(None);
        };
        Ok(map.values[pos]
            .as_ref()
            .map(|v| Entry::new(map.key_at(pos), v.clone())))
    }
}

/// Fast cursor: every step yields a `FastEntry` borrowing the map, which the
/// next step invalidates.
#[derive(Debug)]
pub struct FastEntryCursor<V> {
    raw: RawCursor,
    _pd: PhantomData<fn() -> V>,
}

cursor_common!(FastEntryCursor);

impl<V> FastEntryCursor<V> {
    pub fn advance<'m>(
        &mut self,
        map: &'m mut IntOpenHashMap<V>,
    ) -> Result<Option<FastEntry<'m, V>>> {
        let Some(pos) = self.raw.advance(map)? else {
            return Ok(None);
        };
        let key = map.key_at(pos);
        Ok(map.values[pos]
            .as_mut()
            .map(|value| FastEntry { key, value }))
    }
}

/// Cursor over keys.
#[derive(Debug)]
pub struct KeyCursor<V> {
    raw: RawCursor,
    _pd: PhantomData<fn() -> V>,
}

cursor_common!(KeyCursor);

impl<V> KeyCursor<V> {
    pub fn advance(&mut self, map: &IntOpenHashMap<V>) -> Result<Option<i32>> {
        Ok(self.raw.advance(map)?.map(|pos| map.key_at(pos)))
    }
}

/// Cursor over values.
#[derive(Debug)]
pub struct ValueCursor<V> {
    raw: RawCursor,
    _pd: PhantomData<fn() -> V>,
}

cursor_common!(ValueCursor);

impl<V> ValueCursor<V> {
    pub fn advance<'m>(&mut self, map: &'m IntOpenHashMap<V>) -> Result<Option<&'m V>> {
        Ok(self
            .raw
            .advance(map)?
            .and_then(|pos| map.values[pos].as_ref()))
    }
}
