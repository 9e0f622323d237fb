//! # Test Utilities for the B+ Tree
//!
//! This module provides a loader that builds a tree with an exact,
//! hand-written structure from a JSON description. It's only compiled in
//! test builds (`#[cfg(test)]`).
//!
//! ## Purpose
//!
//! Building a specific tree shape through `insert` is indirect: the
//! structure depends on insertion order and split points. The loader lets a
//! test state the exact shape it wants to probe: which separators sit in
//! which internal node, and which entries sit in which leaf.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "root": {
//!     "keys": [10],
//!     "children": [
//!       { "entries": [[5, 50], [6, 60]] },
//!       { "entries": [[10, 100], [20, 200]] }
//!     ]
//!   },
//!   "height": 2
//! }
//! ```
//!
//! An internal node has `keys` and `children` (always one more child than
//! keys); a leaf has `entries` as `[key, value]` pairs. Keys are `i32`,
//! values `u64`, and the fan-out is fixed at 4 so shapes stay
//! hand-checkable.
//!
//! The caller supplies the arena; the loader allocates every described
//! node from it and wires the tree on top. Descriptions must already
//! satisfy the tree invariants; the loader checks child counts but trusts
//! key ordering, so pair it with `assert_invariants` in tests.

use crate::{Arena, BPlusTree, Node, NodeRef};
use serde::Deserialize;

/// The tree type fixtures produce: `i32` keys, `u64` values, fan-out 4.
pub type FixtureTree<'a> = BPlusTree<'a, i32, u64, 4>;

type FixtureRef = NodeRef<i32, u64, 4>;

/// A node in the JSON tree structure.
///
/// Uses `#[serde(untagged)]` to distinguish internal nodes (which have
/// `keys` and `children`) from leaves (which have `entries`).
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum TreeNode {
	/// An internal node: separator keys plus `keys.len() + 1` children.
	Internal {
		keys: Vec<i32>,
		children: Vec<TreeNode>,
	},
	/// A leaf node: sorted `[key, value]` entries.
	Leaf { entries: Vec<(i32, u64)> },
}

/// Top-level structure of a fixture description.
#[derive(Deserialize, Debug)]
struct SampleTree {
	root: TreeNode,
	/// 1 = single leaf, 2 = one internal level above the leaves, etc.
	height: usize,
}

/// Recursively translates a JSON node into an arena-allocated tree node.
fn translate_node(arena: &Arena, tree_node: TreeNode) -> FixtureRef {
	match tree_node {
		TreeNode::Internal {
			keys,
			children,
		} => {
			assert_eq!(
				children.len(),
				keys.len() + 1,
				"internal node needs one more child than keys"
			);

			let node = Node::<i32, u64, 4>::new_internal_in(arena).expect("fixture arena too small");
			let mut children = children.into_iter();
			let first = translate_node(arena, children.next().expect("children checked non-empty"));

			// Safety: the node was just allocated and nothing else
			// references it.
			unsafe {
				let internal = (*node.as_ptr()).as_internal_mut();
				internal.lower_edge = Some(first);
				for (key, child) in keys.into_iter().zip(children) {
					internal.push(key, translate_node(arena, child));
				}
			}
			node
		}
		TreeNode::Leaf {
			entries,
		} => {
			let node = Node::<i32, u64, 4>::new_leaf_in(arena).expect("fixture arena too small");

			// Safety: as above.
			unsafe {
				let leaf = (*node.as_ptr()).as_leaf_mut();
				for (pos, (key, value)) in entries.into_iter().enumerate() {
					leaf.insert_at(pos, key, value);
				}
			}
			node
		}
	}
}

fn count_entries(node: &TreeNode) -> usize {
	match node {
		TreeNode::Leaf {
			entries,
		} => entries.len(),
		TreeNode::Internal {
			children, ..
		} => children.iter().map(count_entries).sum(),
	}
}

/// Builds a tree with the exact structure described by `json`, allocating
/// its nodes from `arena`.
///
/// # Panics
///
/// Panics if the JSON is malformed, a child count is wrong, or the arena
/// cannot hold the described nodes.
pub fn sample_tree<'a>(arena: &'a Arena, json: &str) -> FixtureTree<'a> {
	let sample: SampleTree = serde_json::from_str(json).expect("invalid fixture json");
	let len = count_entries(&sample.root);
	let root = translate_node(arena, sample.root);

	BPlusTree {
		arena,
		root,
		height: sample.height,
		len,
	}
}
