// IntOpenHashMap integration test suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Association: put/get/contains_key agree and size counts distinct keys.
// - Default value: misses report the default current at call time.
// - Key 0: stored outside the probe sequence, visible everywhere else.
// - Cursors: fail fast on interleaved structural changes, never on value
//   overwrites; removal through a cursor keeps every entry visited once.
// - Views: live, and removal through them is removal from the map.
// - Copies: clones and serde round trips are equal and independent.
use int_open_map::{Entry, Error, IntOpenHashMap, IntOpenHashMapBuilder, MapConfig};
use std::collections::{HashMap, HashSet};

const DEFAULT: i32 = -1_000_000;

fn with_default() -> IntOpenHashMap<i32> {
    let mut m = IntOpenHashMap::new();
    m.set_default_return_value(Some(DEFAULT));
    m
}

// Test: basic association with a default value switched mid-way.
// Assumes: no default initially (None on misses).
// Verifies: put returns previous or default; removal of absent keys reports
// the default; get after removal reports the default.
#[test]
fn map_basics() {
    let mut m: IntOpenHashMap<i32> = IntOpenHashMap::new();
    assert_eq!(m.put(1, 1), None);
    assert_eq!(m.len(), 1);
    assert!(m.contains_key(1));
    assert!(m.contains_value(&1));
    assert_eq!(m.put(2, 2), None);
    assert_eq!(m.len(), 2);

    m.set_default_return_value(Some(DEFAULT));
    assert_eq!(m.put(1, 3), Some(1));
    assert!(m.contains_value(&3));
    assert_eq!(m.remove(3), Some(DEFAULT));
    assert_eq!(m.put(3, 3), Some(DEFAULT));
    assert_eq!(m.len(), 3);

    let keys: HashSet<i32> = m.keys().collect();
    assert_eq!(keys, HashSet::from([1, 2, 3]));
    let mut values: Vec<i32> = m.values().copied().collect();
    values.sort_unstable();
    assert_eq!(values, vec![2, 3, 3]);
    for (k, v) in &m {
        assert_eq!(m.get(k), Some(v));
    }

    assert_eq!(m.remove(3), Some(3));
    assert_eq!(m.remove(1), Some(3));
    assert_eq!(m.remove(2), Some(2));
    assert!(m.is_empty());
    assert_eq!(m.get(1), Some(&DEFAULT));
}

// Test: size bookkeeping across insert, overwrite, remove and clear.
#[test]
fn size_and_is_empty() {
    let mut m = with_default();
    for i in 0..100 {
        assert_eq!(m.len(), i as usize);
        assert_eq!(m.put(i, i), Some(DEFAULT));
        assert!(!m.is_empty());
    }
    for i in 0..100 {
        assert_eq!(m.put(i, i), Some(i));
        assert_eq!(m.len(), 100);
    }
    for i in (0..100).rev() {
        assert_eq!(m.remove(i), Some(i));
        assert_eq!(m.len(), i as usize);
    }
    assert!(m.is_empty());
    m.extend((0..100).map(|i| (i, i)));
    m.clear();
    assert!(m.is_empty());
}

// Test: removals interleaved with entry-set bookkeeping.
// Verifies: entry-set size tracks the map; entry removal needs both key and
// value to match.
#[test]
fn remove_by_key_and_by_entry() {
    let mut m = with_default();
    for i in 0..100 {
        m.put(i, i);
    }
    for i in 0..100 {
        assert_eq!(m.remove(100 + i), Some(DEFAULT));
    }
    for i in 50..150 {
        assert_eq!(m.remove(i % 100), Some(i % 100));
        assert_eq!(m.len(), m.entry_set().len());
    }
    assert!(m.is_empty());

    for i in 0..100 {
        m.put(i, i);
    }
    for i in 0..100 {
        assert!(!m.entry_set().remove(&Entry::new(i + 1, i)));
        assert!(!m.entry_set().remove(&Entry::new(i, i + 1)));
        assert!(m.contains_key(i));
        assert!(m.entry_set().remove(&Entry::new(i, i)));
        assert!(!m.contains_key(i));
    }
}

// Test: key 0 regression.
// Assumes: key 0 is tracked by a flag, not a table slot.
// Verifies: removing 0 leaves exactly the other keys, through the map and
// through a key-set cursor.
#[test]
fn remove_zero() {
    let mut m = with_default();
    for i in -1..=1 {
        assert_eq!(m.put(i, i), Some(DEFAULT));
    }
    assert_eq!(m.remove(0), Some(0));
    let z: HashSet<i32> = m.keys().collect();
    assert_eq!(z, HashSet::from([-1, 1]));

    m.put(0, 0);
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
    assert!(!m.contains_key(0));
    assert_eq!(m.get(0), Some(&DEFAULT));
}

// Test: fast cursor writes through and removes.
// Verifies: set_value is visible through get immediately; removal through
// the cursor makes get report the default.
#[test]
fn fast_cursor_set_value_and_remove() {
    let mut m = with_default();
    for i in 0..100 {
        m.put(i, i);
    }
    let mut cur = m.fast_cursor();
    let key = {
        let mut e = cur.advance(&mut m).unwrap().expect("non-empty");
        e.set_value(1000);
        e.key()
    };
    assert_eq!(m.get(key), Some(&1000));
    assert_eq!(cur.remove(&mut m), Ok(1000));
    assert_eq!(m.get(key), Some(&DEFAULT));
}

// Test: fail-fast detection.
// Assumes: the cursor captured the epoch at creation.
// Verifies: a direct removal makes both advance and remove fail; value
// overwrites do not.
#[test]
fn cursor_detects_structural_change() {
    let mut m = with_default();
    for i in 0..10 {
        m.put(i, i);
    }
    let mut cur = m.entry_cursor();
    let first = cur.advance(&m).unwrap().expect("non-empty");
    m.put(first.key(), 77);
    assert!(cur.advance(&m).is_ok());

    m.remove(first.key());
    assert!(matches!(
        cur.advance(&m),
        Err(Error::ConcurrentModification { .. })
    ));
    assert!(matches!(
        cur.remove(&mut m),
        Err(Error::ConcurrentModification { .. })
    ));
}

// Test: iterator state machine misuse.
// Verifies: remove before advance and double remove are illegal.
#[test]
fn cursor_illegal_states() {
    let mut m: IntOpenHashMap<i32> = IntOpenHashMap::new();
    let mut empty = m.entry_cursor();
    assert_eq!(empty.advance(&m), Ok(None));
    assert_eq!(empty.remove(&mut m), Err(Error::IllegalIteratorState));

    m.put(0, 0);
    m.put(1, 1);
    let mut cur = m.fast_cursor();
    assert!(cur.advance(&mut m).unwrap().is_some());
    assert!(cur.remove(&mut m).is_ok());
    assert_eq!(cur.remove(&mut m), Err(Error::IllegalIteratorState));
    assert_eq!(m.len(), 1);
}

// Test: for_each visits every entry once with durable snapshots.
#[test]
fn for_each_and_fast_for_each() {
    let mut m: IntOpenHashMap<i32> = (0..100).map(|i| (i, i)).collect();
    let mut s = HashSet::new();
    m.for_each(|e| {
        assert!(s.insert(e));
    });
    assert_eq!(s.len(), 100);
    let mut fast = HashSet::new();
    m.fast_for_each(|e| {
        fast.insert(e.to_entry());
    });
    assert_eq!(s, fast);
}

// Test: get_or bypasses the default.
#[test]
fn get_or_fallback() {
    let mut m = with_default();
    m.put(1, 1);
    assert_eq!(*m.get_or(0, &0), 0);
    assert_eq!(*m.get_or(0, &1), 1);
    assert_eq!(*m.get_or(1, &2), 1);
    m.put(0, 1);
    assert_eq!(*m.get_or(0, &0), 1);
    assert_eq!(*m.get_or(1, &0), 1);
}

// Test: clone equality at every step and independence afterwards.
#[test]
fn clone_tracks_content() {
    let mut m: IntOpenHashMap<i32> = IntOpenHashMap::new();
    assert_eq!(m, m.clone());
    m.put(0, 1);
    assert_eq!(m, m.clone());
    m.put(0, 2);
    assert_eq!(m, m.clone());
    m.put(1, 3);
    assert_eq!(m, m.clone());
    m.remove(1);
    assert_eq!(m, m.clone());

    let mut c = m.clone();
    c.put(5, 5);
    assert_ne!(m, c);
    assert!(!m.contains_key(5));
}

// Test: equality against std maps ignores default and capacity.
#[test]
fn equality_with_std_map() {
    let mut m = with_default();
    m.put(1, 1);
    let mut std_map = HashMap::new();
    std_map.insert(1, 1);
    assert_eq!(m, std_map);
    std_map.insert(2, 2);
    assert_ne!(m, std_map);
}

// Test: configuration errors are reported, not panics.
#[test]
fn configuration_errors() {
    assert_eq!(
        MapConfig::new().load_factor(1.5).err(),
        Some(Error::InvalidLoadFactor(1.5))
    );
    assert!(matches!(
        IntOpenHashMap::<u8>::with_capacity(usize::MAX),
        Err(Error::CapacityOverflow { .. })
    ));
    let m = IntOpenHashMapBuilder::<u8>::new()
        .expected_size(3)
        .load_factor(0.25)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(m.capacity(), 16);
    assert_eq!(m.load_factor(), 0.25);
}

// Test: serde round trip for empty and populated maps.
#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    let mut m = with_default();
    let back: IntOpenHashMap<i32> =
        serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
    assert_eq!(m, back);

    m.put(0, 1);
    m.put(1, 2);
    let back: IntOpenHashMap<i32> =
        serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
    assert_eq!(m, back);
    assert_eq!(back.get(9), Some(&DEFAULT));
}
