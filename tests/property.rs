//! # Property-Based Tests for the Arena-Backed B+ Tree
//!
//! Randomized testing with proptest, validating the tree against a
//! `BTreeMap` oracle:
//!
//! - Insert-then-lookup: all inserted keys must be retrievable
//! - Overwrite: the last value written for a key wins, without growth
//! - Remove-then-lookup: removed keys must not be found
//! - Lookup equivalence: linear, binary, and SIMD lookups always agree
//! - Invariants hold after arbitrary operation sequences

use bumptree::{Arena, BPlusTree};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Fan-out used by the property suites: small enough that a few hundred
/// keys already build several levels.
type PropTree<'a> = BPlusTree<'a, i32, i32, 8>;

fn prop_arena() -> Arena {
	Arena::new(8 << 20).unwrap()
}

// ===========================================================================
// Strategy Helpers
// ===========================================================================

/// Generate key-value pairs over a narrow key range so upserts happen.
fn key_value_pairs(max_len: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
	prop::collection::vec((-500..500i32, any::<i32>()), 0..max_len)
}

/// Generate a vector of unique keys for testing.
fn unique_keys(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
	prop::collection::hash_set(any::<i32>(), 0..max_len).prop_map(|s| s.into_iter().collect())
}

/// Operations that can be performed on the tree.
#[derive(Debug, Clone)]
enum Op {
	Insert(i32, i32),
	Remove(i32),
	Lookup(i32),
}

/// Generate a sequence of random operations over a narrow key range.
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
	prop::collection::vec(
		prop_oneof![
			((-300..300i32), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
			(-300..300i32).prop_map(Op::Remove),
			(-300..300i32).prop_map(Op::Lookup),
		],
		0..max_ops,
	)
}

// ===========================================================================
// Insert-Then-Lookup Properties
// ===========================================================================

proptest! {
	/// Property: after inserting entries (last value wins), every expected
	/// mapping is retrievable and the length matches the oracle.
	#[test]
	fn insert_then_lookup(entries in key_value_pairs(500)) {
		let arena = prop_arena();
		let mut tree: PropTree = BPlusTree::new_in(&arena).unwrap();
		let mut expected: BTreeMap<i32, i32> = BTreeMap::new();

		for (k, v) in &entries {
			tree.insert(*k, *v).unwrap();
			expected.insert(*k, *v);
		}

		tree.assert_invariants();

		for (k, v) in &expected {
			prop_assert_eq!(tree.find_binary(*k), Some(*v), "key {} should map to {}", k, v);
		}
		prop_assert_eq!(tree.len(), expected.len());
	}

	/// Property: all inserted keys must be retrievable.
	#[test]
	fn all_inserted_keys_exist(keys in unique_keys(500)) {
		let arena = prop_arena();
		let mut tree: PropTree = BPlusTree::new_in(&arena).unwrap();

		for k in &keys {
			tree.insert(*k, k.wrapping_mul(10)).unwrap();
		}

		tree.assert_invariants();

		for k in &keys {
			prop_assert!(tree.contains_key(*k), "key {} should exist after insertion", k);
		}
	}

	/// Property: re-inserting a key replaces its value and never grows the
	/// tree.
	#[test]
	fn overwrite_replaces_in_place(keys in unique_keys(300), replacement in any::<i32>()) {
		let arena = prop_arena();
		let mut tree: PropTree = BPlusTree::new_in(&arena).unwrap();

		for k in &keys {
			tree.insert(*k, 0).unwrap();
		}
		let len_before = tree.len();

		for k in &keys {
			let previous = tree.insert(*k, replacement).unwrap();
			prop_assert_eq!(previous, Some(0));
		}

		prop_assert_eq!(tree.len(), len_before);
		tree.assert_invariants();

		for k in &keys {
			prop_assert_eq!(tree.find_binary(*k), Some(replacement));
		}
	}
}

// ===========================================================================
// Removal Properties
// ===========================================================================

proptest! {
	/// Property: removed keys are gone, everything else survives.
	#[test]
	fn remove_then_lookup(keys in unique_keys(400), remove_mask in any::<u64>()) {
		let arena = prop_arena();
		let mut tree: PropTree = BPlusTree::new_in(&arena).unwrap();

		for k in &keys {
			tree.insert(*k, *k).unwrap();
		}

		let mut removed = Vec::new();
		for (i, k) in keys.iter().enumerate() {
			if remove_mask & (1 << (i % 64)) != 0 {
				prop_assert_eq!(tree.remove(*k), Some(*k));
				removed.push(*k);
			}
		}

		tree.assert_invariants();
		prop_assert_eq!(tree.len(), keys.len() - removed.len());

		for k in &removed {
			prop_assert_eq!(tree.find_binary(*k), None, "removed key {} still present", k);
		}
		for &k in keys.iter().filter(|k| !removed.contains(k)) {
			prop_assert_eq!(tree.find_binary(k), Some(k), "unrelated key {} was lost", k);
		}
	}
}

// ===========================================================================
// Lookup Equivalence
// ===========================================================================

proptest! {
	/// Property: the three lookup strategies agree on every probe, hit or
	/// miss, over any tree shape.
	#[test]
	fn lookup_variants_agree(
		entries in key_value_pairs(400),
		probes in prop::collection::vec(any::<i32>(), 0..200),
	) {
		let arena = prop_arena();
		let mut tree: PropTree = BPlusTree::new_in(&arena).unwrap();

		for (k, v) in &entries {
			tree.insert(*k, *v).unwrap();
		}

		// Probe both arbitrary keys and keys known to be present.
		for probe in probes.iter().chain(entries.iter().map(|(k, _)| k)) {
			let linear = tree.find_linear(*probe);
			let binary = tree.find_binary(*probe);
			let simd = tree.find_simd(*probe);
			prop_assert_eq!(linear, binary, "linear and binary disagree on {}", probe);
			prop_assert_eq!(binary, simd, "binary and simd disagree on {}", probe);
		}
	}
}

// ===========================================================================
// Oracle Comparison Over Operation Sequences
// ===========================================================================

proptest! {
	/// Property: an arbitrary operation sequence behaves exactly like a
	/// `BTreeMap`.
	#[test]
	fn matches_btreemap_oracle(ops in operations(600)) {
		let arena = prop_arena();
		let mut tree: PropTree = BPlusTree::new_in(&arena).unwrap();
		let mut oracle: BTreeMap<i32, i32> = BTreeMap::new();

		for op in &ops {
			match op {
				Op::Insert(k, v) => {
					let previous = tree.insert(*k, *v).unwrap();
					prop_assert_eq!(previous, oracle.insert(*k, *v));
				}
				Op::Remove(k) => {
					prop_assert_eq!(tree.remove(*k), oracle.remove(k));
				}
				Op::Lookup(k) => {
					prop_assert_eq!(tree.find_binary(*k), oracle.get(k).copied());
				}
			}
		}

		tree.assert_invariants();
		prop_assert_eq!(tree.len(), oracle.len());

		// Final sweep: every oracle entry via every strategy.
		for (k, v) in &oracle {
			prop_assert_eq!(tree.find_linear(*k), Some(*v));
			prop_assert_eq!(tree.find_binary(*k), Some(*v));
			prop_assert_eq!(tree.find_simd(*k), Some(*v));
		}
	}
}
