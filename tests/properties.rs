//! Property-based harness (Section 8, closing paragraph): randomized key
//! sequences cross-checked against `std::collections::BTreeMap` as the
//! reference sorted mapping, asserting invariants 1-8 after every
//! operation, for all five engines.

use std::collections::BTreeMap;

use ordinal::{AvlTree, BPlusTree, BTree, LlrbTree, RbTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug)]
enum Op {
    Insert(i32, i32),
    Replace(i32, i32),
    Remove(i32),
}

/// Generates `count` random operations over a small key domain so that
/// inserts, replaces, and removes repeatedly collide on the same keys,
/// exercising rebalancing on both growth and shrinkage.
fn random_ops(rng: &mut StdRng, count: usize, domain: i32) -> Vec<Op> {
    (0..count)
        .map(|_| {
            let key = rng.gen_range(0..domain);
            let value = rng.gen_range(0..1_000_000);
            match rng.gen_range(0..3) {
                0 => Op::Insert(key, value),
                1 => Op::Replace(key, value),
                _ => Op::Remove(key),
            }
        })
        .collect()
}

/// Runs `ops` against one engine (via the three closures) and against a
/// `BTreeMap` reference, asserting after every single operation that:
/// size, `get`, in-order traversal, and reverse traversal all agree.
fn check_against_reference<T>(
    ops: &[Op],
    mut insert: impl FnMut(&mut T, i32, i32) -> bool,
    mut replace: impl FnMut(&mut T, i32, i32) -> Option<i32>,
    mut remove: impl FnMut(&mut T, i32) -> Option<i32>,
    mut get: impl FnMut(&T, i32) -> Option<i32>,
    mut traverse: impl FnMut(&T) -> Vec<(i32, i32)>,
    mut traverse_rev: impl FnMut(&T) -> Vec<(i32, i32)>,
    mut len: impl FnMut(&T) -> usize,
    mut tree: T,
) {
    let mut reference: BTreeMap<i32, i32> = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                let tree_inserted = insert(&mut tree, k, v);
                let ref_had_key = reference.contains_key(&k);
                if !ref_had_key {
                    reference.insert(k, v);
                }
                assert_eq!(tree_inserted, !ref_had_key, "insert fail-if-present mismatch for {k}");
            }
            Op::Replace(k, v) => {
                let tree_previous = replace(&mut tree, k, v);
                let ref_previous = reference.insert(k, v);
                assert_eq!(tree_previous, ref_previous, "replace previous-value mismatch for {k}");
            }
            Op::Remove(k) => {
                let tree_removed = remove(&mut tree, k);
                let ref_removed = reference.remove(&k);
                assert_eq!(tree_removed, ref_removed, "remove mismatch for {k}");
            }
        }

        // Invariant 4: size equals distinct present keys.
        assert_eq!(len(&tree), reference.len());

        // Invariants 1-2: find agrees with the reference for every key
        // ever touched, present or erased.
        for &k in reference.keys() {
            assert_eq!(get(&tree, k), Some(reference[&k]));
        }

        // Invariant 3/6: forward and reverse traversal are the sorted
        // sequence and its exact reverse.
        let expected: Vec<(i32, i32)> = reference.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(traverse(&tree), expected);
        let mut expected_rev = expected.clone();
        expected_rev.reverse();
        assert_eq!(traverse_rev(&tree), expected_rev);
    }

    // Invariant 7: erasing every remaining key returns the tree to empty.
    let remaining: Vec<i32> = reference.keys().copied().collect();
    for k in remaining {
        assert!(remove(&mut tree, k).is_some());
    }
    assert_eq!(len(&tree), 0);
}

fn seeds() -> Vec<u64> {
    vec![1, 2, 3, 42, 1337]
}

#[test]
fn avl_matches_btreemap() {
    for seed in seeds() {
        let mut rng = StdRng::seed_from_u64(seed);
        let ops = random_ops(&mut rng, 2_000, 200);
        check_against_reference(
            &ops,
            |t: &mut AvlTree<i32, i32>, k, v| t.insert(k, v),
            |t, k, v| t.replace(k, v),
            |t, k| t.remove(&k),
            |t, k| t.get(&k).copied(),
            |t| t.iter().map(|(&k, &v)| (k, v)).collect(),
            |t| t.iter().rev().map(|(&k, &v)| (k, v)).collect(),
            |t| t.len(),
            AvlTree::new(),
        );
    }
}

#[test]
fn rb_matches_btreemap() {
    for seed in seeds() {
        let mut rng = StdRng::seed_from_u64(seed);
        let ops = random_ops(&mut rng, 2_000, 200);
        check_against_reference(
            &ops,
            |t: &mut RbTree<i32, i32>, k, v| t.insert(k, v),
            |t, k, v| t.replace(k, v),
            |t, k| t.remove(&k),
            |t, k| t.get(&k).copied(),
            |t| t.iter().map(|(&k, &v)| (k, v)).collect(),
            |t| t.iter().rev().map(|(&k, &v)| (k, v)).collect(),
            |t| t.len(),
            RbTree::new(),
        );
    }
}

#[test]
fn llrb_matches_btreemap() {
    for seed in seeds() {
        let mut rng = StdRng::seed_from_u64(seed);
        let ops = random_ops(&mut rng, 2_000, 200);
        check_against_reference(
            &ops,
            |t: &mut LlrbTree<i32, i32>, k, v| t.insert(k, v),
            |t, k, v| t.replace(k, v),
            |t, k| t.remove(&k),
            |t, k| t.get(&k).copied(),
            |t| t.iter().map(|(&k, &v)| (k, v)).collect(),
            |t| t.iter().rev().map(|(&k, &v)| (k, v)).collect(),
            |t| t.len(),
            LlrbTree::new(),
        );
    }
}

#[test]
fn btree_matches_btreemap_multiple_orders() {
    for order in [3usize, 4, 5, 8] {
        for seed in seeds() {
            let mut rng = StdRng::seed_from_u64(seed);
            let ops = random_ops(&mut rng, 1_500, 150);
            check_against_reference(
                &ops,
                |t: &mut BTree<i32, i32>, k, v| t.insert(k, v),
                |t, k, v| t.replace(k, v),
                |t, k| t.remove(&k),
                |t, k| t.get(&k).copied(),
                |t| t.iter().map(|(&k, &v)| (k, v)).collect(),
                |t| t.iter().rev().map(|(&k, &v)| (k, v)).collect(),
                |t| t.len(),
                BTree::new(order),
            );
        }
    }
}

#[test]
fn bplus_matches_btreemap_multiple_orders() {
    for order in [3usize, 4, 5, 8] {
        for seed in seeds() {
            let mut rng = StdRng::seed_from_u64(seed);
            let ops = random_ops(&mut rng, 1_500, 150);
            check_against_reference(
                &ops,
                |t: &mut BPlusTree<i32, i32>, k, v| t.insert(k, v),
                |t, k, v| t.replace(k, v),
                |t, k| t.remove(&k),
                |t, k| t.get(&k).copied(),
                |t| t.iter().map(|(&k, &v)| (k, v)).collect(),
                |t| t.iter().rev().map(|(&k, &v)| (k, v)).collect(),
                |t| t.len(),
                BPlusTree::new(order),
            );
        }
    }
}

/// Dedicated large-domain run at the size named in Section 8 ("random key
/// sequences of size <= 10,000"), against the AVL engine (representative
/// of the three BST engines sharing `cursor`'s walk).
#[test]
fn large_randomized_run_against_btreemap() {
    let mut rng = StdRng::seed_from_u64(2026);
    let ops = random_ops(&mut rng, 10_000, 3_000);
    check_against_reference(
        &ops,
        |t: &mut AvlTree<i32, i32>, k, v| t.insert(k, v),
        |t, k, v| t.replace(k, v),
        |t, k| t.remove(&k),
        |t, k| t.get(&k).copied(),
        |t| t.iter().map(|(&k, &v)| (k, v)).collect(),
        |t| t.iter().rev().map(|(&k, &v)| (k, v)).collect(),
        |t| t.len(),
        AvlTree::new(),
    );
}
