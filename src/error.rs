//! # Error Types for the Arena-Backed B+ Tree
//!
//! This module defines the error types surfaced by tree and arena
//! operations.
//!
//! ## Error Handling Strategy
//!
//! All errors here are allocation errors, and all of them are fatal to the
//! operation that raised them: the arena is a fixed-size resource with no
//! reclamation, so there is nothing to retry against. Callers are expected
//! to size the arena so that exhaustion cannot occur in practice.
//!
//! Lookups never produce an error: a missing key is `None`, not a failure.
//!
//! Mutating operations are kept atomic with respect to these errors:
//! [`BPlusTree::insert`](crate::BPlusTree::insert) verifies the arena can
//! cover a worst-case split path before touching any node, so an `Err`
//! leaves the tree exactly as it was.

use thiserror::Error;

/// Errors raised by arena and tree operations.
///
/// Every variant is an allocation failure of some kind. None of them are
/// recoverable from within the tree; propagate them to whoever owns the
/// arena sizing decision.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The host could not supply the arena's backing buffer.
	///
	/// Raised by [`Arena::new`](crate::Arena::new) when the requested
	/// capacity is zero or the underlying allocation fails.
	#[error("failed to allocate arena backing buffer")]
	AllocationFailed,

	/// The arena's bump offset cannot cover the requested allocation.
	///
	/// `requested` is the 64-byte-rounded size that was asked for and
	/// `remaining` the bytes left before the capacity limit. The arena is
	/// not self-healing; once this fires, every subsequent allocation of
	/// the same size will fire too.
	#[error("arena exhausted: needed {requested} bytes, {remaining} remaining")]
	OutOfArena {
		/// Rounded size of the allocation that failed.
		requested: usize,
		/// Bytes still available in the arena.
		remaining: usize,
	},

	/// Node storage was requested while no arena was attached.
	///
	/// Trees constructed through [`BPlusTree::new_in`](crate::BPlusTree::new_in)
	/// always carry an arena borrow, so this variant cannot occur through
	/// the public API; it completes the failure taxonomy for alternative
	/// construction paths.
	#[error("no arena attached for node allocation")]
	ArenaUnavailable,
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
