#![cfg(test)]

// Property tests for IntOpenHashMap kept inside the crate so they can check
// the probe invariants on the private table after every step.

use crate::IntOpenHashMap;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

const DEFAULT: i32 = i32::MIN;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    ContainsValue(i32),
    ComputeIfAbsent(usize, i32),
    ComputeIfPresent(usize, i32),
    Merge(usize, i32),
    ReplaceExact(usize, i32, i32),
    RemoveExact(usize, i32),
    CursorRemove(i32),
    Trim,
    Iterate,
}

fn arb_ops(pool_len: usize) -> impl Strategy<Value = Vec<OpI>> {
    let idx = 0..pool_len;
    let small = -3i32..3;
    let op = prop_oneof![
        4 => (idx.clone(), small.clone()).prop_map(|(i, v)| OpI::Put(i, v)),
        3 => idx.clone().prop_map(OpI::Remove),
        2 => idx.clone().prop_map(OpI::Get),
        1 => (idx.clone(), small.clone()).prop_map(|(i, v)| OpI::ComputeIfAbsent(i, v)),
        1 => (idx.clone(), small.clone()).prop_map(|(i, d)| OpI::ComputeIfPresent(i, d)),
        1 => (idx.clone(), small.clone()).prop_map(|(i, v)| OpI::Merge(i, v)),
        1 => (idx.clone(), small.clone(), small.clone())
            .prop_map(|(i, o, n)| OpI::ReplaceExact(i, o, n)),
        1 => (idx.clone(), small.clone()).prop_map(|(i, v)| OpI::RemoveExact(i, v)),
        1 => (2i32..5).prop_map(OpI::CursorRemove),
        2 => prop_oneof![
            small.prop_map(OpI::ContainsValue),
            Just(OpI::Trim),
            Just(OpI::Iterate),
        ],
    ];
    proptest::collection::vec(op, 1..120)
}

fn arb_scenario() -> impl Strategy<Value = (Vec<i32>, Vec<OpI>)> {
    let key = prop_oneof![Just(0), -8i32..8, any::<i32>()];
    proptest::collection::vec(key, 1..=40)
        .prop_flat_map(|pool| arb_ops(pool.len()).prop_map(move |ops| (pool.clone(), ops)))
}

// Keys that are multiples of 2^20 share their low mixed bits, so they all
// land in slot 0 of any table of capacity 16 or less.
fn arb_clustered_scenario() -> impl Strategy<Value = (Vec<i32>, Vec<OpI>)> {
    let key = prop_oneof![Just(0), (1i32..2048).prop_map(|j| j << 20)];
    proptest::collection::vec(key, 1..=24)
        .prop_flat_map(|pool| arb_ops(pool.len()).prop_map(move |ops| (pool.clone(), ops)))
}

fn run(pool: &[i32], ops: Vec<OpI>) -> Result<(), TestCaseError> {
    let mut sut: IntOpenHashMap<i32> = IntOpenHashMap::with_capacity(2).unwrap();
    sut.set_default_return_value(Some(DEFAULT));
    let mut model: HashMap<i32, i32> = HashMap::new();
    let or_default = |v: Option<&i32>| v.copied().unwrap_or(DEFAULT);

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i];
                let prev = sut.put(k, v);
                prop_assert_eq!(prev, Some(or_default(model.insert(k, v).as_ref())));
            }
            OpI::Remove(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.remove(k), Some(or_default(model.remove(&k).as_ref())));
            }
            OpI::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(k).copied(), Some(or_default(model.get(&k))));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
            }
            OpI::ContainsValue(v) => {
                prop_assert_eq!(sut.contains_value(&v), model.values().any(|&x| x == v));
            }
            OpI::ComputeIfAbsent(i, v) => {
                let k = pool[i];
                let got = sut.compute_if_absent(k, |_| Some(v)).copied();
                let expected = *model.entry(k).or_insert(v);
                prop_assert_eq!(got, Some(expected));
            }
            OpI::ComputeIfPresent(i, d) => {
                // A zero delta asks for removal.
                let k = pool[i];
                let f = |_: i32, old: &i32| (d != 0).then(|| old.wrapping_add(d));
                let got = sut.compute_if_present(k, f).copied();
                let expected = match model.get(&k).copied() {
                    Some(old) => match f(k, &old) {
                        Some(new) => {
                            model.insert(k, new);
                            new
                        }
                        None => {
                            model.remove(&k);
                            DEFAULT
                        }
                    },
                    None => DEFAULT,
                };
                prop_assert_eq!(got, Some(expected));
            }
            OpI::Merge(i, v) => {
                // Merging into a value equal to the new one removes it.
                let k = pool[i];
                let got = sut.merge(k, v, |old, new| (*old != new).then_some(new)).copied();
                let expected = match model.get(&k).copied() {
                    None => {
                        model.insert(k, v);
                        v
                    }
                    Some(old) if old == v => {
                        model.remove(&k);
                        DEFAULT
                    }
                    Some(_) => {
                        model.insert(k, v);
                        v
                    }
                };
                prop_assert_eq!(got, Some(expected));
            }
            OpI::ReplaceExact(i, old, new) => {
                let k = pool[i];
                let hit = model.get(&k) == Some(&old);
                prop_assert_eq!(sut.replace_exact(k, &old, new), hit);
                if hit {
                    model.insert(k, new);
                }
            }
            OpI::RemoveExact(i, v) => {
                let k = pool[i];
                let hit = model.get(&k) == Some(&v);
                prop_assert_eq!(sut.remove_exact(k, &v), hit);
                if hit {
                    model.remove(&k);
                }
            }
            OpI::CursorRemove(modulus) => {
                // Remove every entry whose key is divisible by `modulus`,
                // checking that each entry is visited exactly once.
                let mut cur = sut.entry_cursor();
                let mut seen = BTreeSet::new();
                while let Some(e) = cur.advance(&sut).unwrap() {
                    prop_assert!(seen.insert(e.key()), "key {} visited twice", e.key());
                    prop_assert_eq!(Some(e.value()), model.get(&e.key()));
                    if e.key() % modulus == 0 {
                        prop_assert_eq!(cur.remove(&mut sut).unwrap(), *e.value());
                    }
                }
                prop_assert_eq!(seen, model.keys().copied().collect::<BTreeSet<_>>());
                model.retain(|k, _| k % modulus != 0);
            }
            OpI::Trim => {
                sut.trim();
            }
            OpI::Iterate => {
                let s: HashMap<i32, i32> = sut.iter().map(|(k, v)| (k, *v)).collect();
                prop_assert_eq!(&s, &model);
                prop_assert_eq!(sut.iter().len(), model.len());
            }
        }

        // Post-conditions after each op
        sut.assert_probe_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    prop_assert!(sut == model);
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - put/remove/get report the previous value or the default, like the model.
// - The compute family and conditional updates agree with the model.
// - Cursor removal visits every entry exactly once and keeps the table sound.
// - Every key stays reachable from its ideal slot after each step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(&pool, ops)?;
    }
}

// Property: Same state-machine invariants as above, with keys that all share
// one ideal slot while the table is small. This stresses long clusters,
// wraparound and backward-shift deletion.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_clustered_scenario()) {
        run(&pool, ops)?;
    }
}
