//! IntOpenHashMap: the open-addressing table and its default-value policy.

use crate::cfg::trace;
use crate::config::{self, array_size, max_fill, MapConfig, DEFAULT_LOAD_FACTOR};
use crate::error::Result;
use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Capacity below which removals never shrink the table.
const SHRINK_FLOOR: usize = 16;

/// `array_size(DEFAULT_EXPECTED_SIZE, DEFAULT_LOAD_FACTOR)`.
const DEFAULT_CAPACITY: usize = 32;

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

fn next_map_id() -> u64 {
    NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed)
}

/// 2^32 divided by the golden ratio.
const INT_PHI: u32 = 0x9E37_79B9;

/// Scrambles a key so that sequential and strided keys spread over the table.
#[inline]
pub(crate) fn mix(key: i32) -> u32 {
    let h = (key as u32).wrapping_mul(INT_PHI);
    h ^ (h >> 16)
}

#[inline]
pub(crate) fn ideal_slot(key: i32, mask: usize) -> usize {
    mix(key) as usize & mask
}

/// Result of probing for a key.
pub(crate) enum Probe {
    /// The key lives at this position.
    Occupied(usize),
    /// The key is absent; this is where it would be inserted.
    Vacant(usize),
}

/// An open-addressing hash map from `i32` keys to values of type `V`.
///
/// Keys are stored unboxed in a flat power-of-two table and collisions are
/// resolved by linear probing. `0` marks an empty key slot, so the entry for
/// key `0` lives in a dedicated slot past the end of the table and its
/// presence is tracked by a flag.
///
/// Default-substituting accessors (`get`, `put`, `remove`, the compute
/// family) return the map's default return value on a miss. It starts out as
/// `None`; see [`IntOpenHashMap::set_default_return_value`].
pub struct IntOpenHashMap<V> {
    /// Key slots; `keys[n]` is unused.
    pub(crate) keys: Box<[i32]>,
    /// Value slots; `values[n]` holds the value of key `0`.
    pub(crate) values: Box<[Option<V>]>,
    pub(crate) n: usize,
    pub(crate) mask: usize,
    pub(crate) contains_zero_key: bool,
    pub(crate) size: usize,
    max_fill: usize,
    min_n: usize,
    load_factor: f32,
    pub(crate) default_value: Option<V>,
    /// Bumped on every structural change.
    pub(crate) epoch: u64,
    /// Distinguishes this map from every other one, clones included.
    pub(crate) id: u64,
}

impl<V> IntOpenHashMap<V> {
    /// Create an empty map sized for 16 entries with load factor 0.75.
    pub fn new() -> Self {
        Self::with_table(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    /// Create an empty map able to hold `expected` entries without growing.
    pub fn with_capacity(expected: usize) -> Result<Self> {
        Self::with_config(MapConfig::new().expected_size(expected))
    }

    /// Create an empty map from a validated configuration.
    pub fn with_config(config: MapConfig) -> Result<Self> {
        config::validate_load_factor(config.load_factor)?;
        let n = config.initial_capacity()?;
        Ok(Self::with_table(n, config.load_factor))
    }

    fn with_table(n: usize, load_factor: f32) -> Self {
        debug_assert!(n.is_power_of_two() && n >= 2);
        Self {
            keys: vec![0; n + 1].into_boxed_slice(),
            values: (0..=n).map(|_| None).collect(),
            n,
            mask: n - 1,
            contains_zero_key: false,
            size: 0,
            max_fill: max_fill(n, load_factor),
            min_n: n,
            load_factor,
            default_value: None,
            epoch: 0,
            id: next_map_id(),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of key slots in the table (always a power of two).
    pub fn capacity(&self) -> usize {
        self.n
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// The value substituted for absent keys by default-substituting accessors.
    pub fn default_return_value(&self) -> Option<&V> {
        self.default_value.as_ref()
    }

    /// Replace the default return value. Only later misses are affected;
    /// stored entries are never touched.
    pub fn set_default_return_value(&mut self, value: Option<V>) {
        self.default_value = value;
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    pub(crate) fn probe(&self, key: i32) -> Probe {
        if key == 0 {
            return if self.contains_zero_key {
                Probe::Occupied(self.n)
            } else {
                Probe::Vacant(self.n)
            };
        }
        let mut pos = ideal_slot(key, self.mask);
        loop {
            let cur = self.keys[pos];
            if cur == 0 {
                return Probe::Vacant(pos);
            }
            if cur == key {
                return Probe::Occupied(pos);
            }
            pos = (pos + 1) & self.mask;
        }
    }

    #[inline]
    pub(crate) fn find(&self, key: i32) -> Option<usize> {
        match self.probe(key) {
            Probe::Occupied(pos) => Some(pos),
            Probe::Vacant(_) => None,
        }
    }

    /// The stored value for `key`, ignoring the default return value.
    #[inline]
    pub(crate) fn lookup(&self, key: i32) -> Option<&V> {
        self.find(key).and_then(|pos| self.values[pos].as_ref())
    }

    /// Key stored at `pos`, which must be occupied.
    #[inline]
    pub(crate) fn key_at(&self, pos: usize) -> i32 {
        if pos == self.n {
            0
        } else {
            self.keys[pos]
        }
    }

    /// Place a new entry into the vacant slot `pos` and grow if needed.
    pub(crate) fn insert_at(&mut self, pos: usize, key: i32, value: V) {
        if pos == self.n {
            self.contains_zero_key = true;
        } else {
            self.keys[pos] = key;
        }
        self.values[pos] = Some(value);
        self.bump_epoch();
        let grow = self.size >= self.max_fill;
        self.size += 1;
        if grow {
            self.rehash(self.grown_capacity());
        }
    }

    fn grown_capacity(&self) -> usize {
        match array_size(self.size + 1, self.load_factor) {
            Ok(n) => n,
            Err(e) => panic!("{e}"),
        }
    }

    /// Move every entry into a fresh table of capacity `new_n`.
    pub(crate) fn rehash(&mut self, new_n: usize) {
        trace!(from = self.n, to = new_n, len = self.size, "rehashing table");
        let mask = new_n - 1;
        let mut keys = vec![0i32; new_n + 1].into_boxed_slice();
        let mut values: Box<[Option<V>]> = (0..=new_n).map(|_| None).collect();
        for i in 0..self.n {
            let k = self.keys[i];
            if k == 0 {
                continue;
            }
            let mut pos = ideal_slot(k, mask);
            while keys[pos] != 0 {
                pos = (pos + 1) & mask;
            }
            keys[pos] = k;
            values[pos] = self.values[i].take();
        }
        values[new_n] = self.values[self.n].take();
        self.n = new_n;
        self.mask = mask;
        self.max_fill = max_fill(new_n, self.load_factor);
        self.keys = keys;
        self.values = values;
        self.bump_epoch();
    }

    /// Free the occupied slot `pos` and close the probe gap it leaves.
    ///
    /// Entries that the backward shift moves from the start of the table to
    /// its end are pushed onto `wrapped`, which cursors use to avoid
    /// skipping them.
    pub(crate) fn remove_at(&mut self, pos: usize, wrapped: Option<&mut Vec<i32>>) -> Option<V> {
        let old = self.values[pos].take();
        if pos == self.n {
            self.contains_zero_key = false;
        } else {
            self.shift_keys(pos, wrapped);
        }
        self.size -= 1;
        self.bump_epoch();
        old
    }

    fn shift_keys(&mut self, mut pos: usize, mut wrapped: Option<&mut Vec<i32>>) {
        loop {
            let last = pos;
            pos = (last + 1) & self.mask;
            let cur = loop {
                let cur = self.keys[pos];
                if cur == 0 {
                    self.keys[last] = 0;
                    return;
                }
                let slot = ideal_slot(cur, self.mask);
                // `cur` may fill the gap unless its ideal slot lies
                // cyclically within (last, pos].
                let movable = if last <= pos {
                    last >= slot || slot > pos
                } else {
                    last >= slot && slot > pos
                };
                if movable {
                    break cur;
                }
                pos = (pos + 1) & self.mask;
            };
            if pos < last {
                if let Some(w) = wrapped.as_deref_mut() {
                    w.push(cur);
                }
            }
            self.keys[last] = cur;
            self.values[last] = self.values[pos].take();
        }
    }

    fn maybe_shrink(&mut self) {
        if self.n > self.min_n && self.size < self.max_fill / 4 && self.n > SHRINK_FLOOR {
            self.rehash(self.n / 2);
        }
    }

    pub fn contains_key(&self, key: i32) -> bool {
        self.find(key).is_some()
    }

    /// Linear scan comparing values with `==`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values.iter().any(|v| v.as_ref() == Some(value))
    }

    /// The value for `key`, or the default return value if absent.
    pub fn get(&self, key: i32) -> Option<&V> {
        match self.find(key) {
            Some(pos) => self.values[pos].as_ref(),
            None => self.default_value.as_ref(),
        }
    }

    /// The value for `key`, or `fallback` if absent. The default return value
    /// is not consulted.
    pub fn get_or<'a>(&'a self, key: i32, fallback: &'a V) -> &'a V {
        self.lookup(key).unwrap_or(fallback)
    }

    pub fn get_mut(&mut self, key: i32) -> Option<&mut V> {
        let pos = self.find(key)?;
        self.values[pos].as_mut()
    }

    /// Associate `value` with `key`, returning the previous value if the key
    /// was present.
    ///
    /// # Panics
    ///
    /// Panics if the table would have to grow past 2^30 slots.
    pub fn insert(&mut self, key: i32, value: V) -> Option<V> {
        match self.probe(key) {
            Probe::Occupied(pos) => self.values[pos].replace(value),
            Probe::Vacant(pos) => {
                self.insert_at(pos, key, value);
                None
            }
        }
    }

    /// Associate `value` with `key`, returning the previous value or, for a
    /// new key, the default return value.
    ///
    /// # Panics
    ///
    /// Panics if the table would have to grow past 2^30 slots.
    pub fn put(&mut self, key: i32, value: V) -> Option<V>
    where
        V: Clone,
    {
        self.insert(key, value).or_else(|| self.default_value.clone())
    }

    /// Remove the entry in the occupied slot `pos` and shrink the table if
    /// it became sparse.
    pub(crate) fn remove_entry(&mut self, pos: usize) -> Option<V> {
        let old = self.remove_at(pos, None);
        self.maybe_shrink();
        old
    }

    /// Remove `key`, returning its value if it was present.
    pub fn take(&mut self, key: i32) -> Option<V> {
        let pos = self.find(key)?;
        self.remove_entry(pos)
    }

    /// Remove `key`, returning its value or the default return value if it
    /// was absent.
    pub fn remove(&mut self, key: i32) -> Option<V>
    where
        V: Clone,
    {
        self.take(key).or_else(|| self.default_value.clone())
    }

    /// Remove every entry. The capacity is kept.
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        trace!(len = self.size, "clearing map");
        self.size = 0;
        self.contains_zero_key = false;
        self.keys.fill(0);
        self.values.iter_mut().for_each(|v| *v = None);
        self.bump_epoch();
    }

    /// Grow the table, if needed, so that `expected` entries fit without a
    /// rehash.
    pub fn ensure_capacity(&mut self, expected: usize) -> Result<()> {
        let needed = array_size(expected, self.load_factor)?;
        if needed > self.n {
            self.rehash(needed);
        }
        Ok(())
    }

    /// Shrink the table to the smallest capacity that holds the current
    /// entries. Returns whether the table was rebuilt.
    pub fn trim(&mut self) -> bool {
        self.trim_to(self.size)
    }

    /// Shrink the table to the smallest capacity that holds `expected`
    /// entries, but never below what the current entries need.
    pub fn trim_to(&mut self, expected: usize) -> bool {
        let Ok(l) = array_size(expected, self.load_factor) else {
            return false;
        };
        if l >= self.n || self.size > max_fill(l, self.load_factor) {
            return false;
        }
        trace!(from = self.n, to = l, "trimming table");
        self.rehash(l);
        true
    }

    /// Panics if some key cannot be reached from its ideal slot without
    /// crossing an empty slot, or if the size bookkeeping is off.
    #[cfg(test)]
    pub(crate) fn assert_probe_invariants(&self) {
        let mut occupied = 0;
        for pos in 0..self.n {
            let k = self.keys[pos];
            if k == 0 {
                assert!(self.values[pos].is_none(), "empty slot {pos} holds a value");
                continue;
            }
            occupied += 1;
            assert!(self.values[pos].is_some(), "slot {pos} lost its value");
            let mut p = ideal_slot(k, self.mask);
            while p != pos {
                assert_ne!(self.keys[p], 0, "key {k} unreachable: gap at {p}");
                assert_ne!(self.keys[p], k, "key {k} stored twice");
                p = (p + 1) & self.mask;
            }
        }
        assert_eq!(self.values[self.n].is_some(), self.contains_zero_key);
        assert_eq!(occupied + usize::from(self.contains_zero_key), self.size);
        assert!(self.size <= self.max_fill || self.size == 0);
    }
}

impl<V> Default for IntOpenHashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for IntOpenHashMap<V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            n: self.n,
            mask: self.mask,
            contains_zero_key: self.contains_zero_key,
            size: self.size,
            max_fill: self.max_fill,
            min_n: self.min_n,
            load_factor: self.load_factor,
            default_value: self.default_value.clone(),
            epoch: 0,
            id: next_map_id(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for IntOpenHashMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
