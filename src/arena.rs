//! # Bump Allocation Arena
//!
//! All tree nodes live in a single contiguous, cache-line-aligned buffer
//! managed by [`Arena`]. Allocation is a bump of a monotone offset: round
//! the request up to a 64-byte multiple, hand out the current address,
//! advance. Nothing is ever freed individually; the whole buffer is
//! released at once when the arena is dropped, or recycled with
//! [`Arena::reset`].
//!
//! ## Why a bump arena
//!
//! - Allocation is O(1) with no free-list bookkeeping.
//! - Nodes allocated close in time are close in memory, so a descent tends
//!   to walk warm cache lines.
//! - Addresses are stable for the lifetime of the tree, which lets internal
//!   nodes hold plain child pointers.
//! - Every allocation starts on a cache line, which keeps node headers and
//!   key arrays friendly to 32-byte vector loads.
//!
//! ## Lifecycle
//!
//! Trees borrow the arena ([`BPlusTree::new_in`](crate::BPlusTree::new_in)
//! takes `&Arena`), and `reset` takes `&mut self`. The borrow checker
//! therefore enforces the one rule this design has: every tree built on an
//! arena must be gone before the arena is reset.
//!
//! The arena is a single-threaded resource. The bump offset lives in a
//! [`Cell`], so the type is deliberately `!Sync`.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;

use crate::error::{Error, Result};

/// Cache line size. Every allocation is rounded up to a multiple of this
/// and starts on such a boundary.
pub(crate) const CACHE_LINE: usize = 64;

/// A fixed-capacity bump allocator backing all nodes of one or more trees.
pub struct Arena {
	base: NonNull<u8>,
	capacity: usize,
	offset: Cell<usize>,
}

impl Arena {
	/// Acquires a zero-initialized buffer of exactly `capacity` bytes,
	/// aligned to a cache line.
	///
	/// Zeroing matters: node key arrays are read in 32-byte windows that
	/// may cover slots no one has written yet, and those reads must land
	/// on initialized memory.
	///
	/// # Errors
	///
	/// Returns [`Error::AllocationFailed`] if `capacity` is zero or the
	/// host cannot supply the buffer.
	pub fn new(capacity: usize) -> Result<Self> {
		let layout = Layout::from_size_align(capacity, CACHE_LINE)
			.map_err(|_| Error::AllocationFailed)?;
		if layout.size() == 0 {
			return Err(Error::AllocationFailed);
		}
		// Safety: layout has non-zero size and valid alignment.
		let ptr = unsafe { alloc_zeroed(layout) };
		let base = NonNull::new(ptr).ok_or(Error::AllocationFailed)?;
		Ok(Arena {
			base,
			capacity,
			offset: Cell::new(0),
		})
	}

	/// Allocates `bytes` rounded up to a 64-byte multiple, returning a
	/// pointer aligned to a cache line.
	///
	/// The returned block stays valid until the arena is reset or dropped.
	///
	/// # Errors
	///
	/// Returns [`Error::OutOfArena`] when the rounded request does not fit
	/// in the remaining capacity. The offset is left untouched in that
	/// case.
	pub fn allocate(&self, bytes: usize) -> Result<NonNull<u8>> {
		let rounded = round_up(bytes);
		let offset = self.offset.get();
		if rounded > self.capacity - offset {
			return Err(Error::OutOfArena {
				requested: rounded,
				remaining: self.capacity - offset,
			});
		}
		self.offset.set(offset + rounded);
		// Safety: offset + rounded <= capacity, so the address is inside
		// the buffer; base is 64-aligned and offset is a 64-multiple.
		Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(offset)) })
	}

	/// Rewinds the bump offset to zero, making the full capacity available
	/// again.
	///
	/// Taking `&mut self` means no tree borrowing this arena can still be
	/// alive, so no dangling node references can survive a reset. The
	/// buffer contents are left as-is; stale bytes are only ever observed
	/// through reads that new nodes bound by their own lengths.
	pub fn reset(&mut self) {
		self.offset.set(0);
	}

	/// Bytes handed out so far (always a multiple of 64).
	#[inline]
	pub fn used(&self) -> usize {
		self.offset.get()
	}

	/// Total capacity of the backing buffer in bytes.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Bytes still available before the capacity limit.
	#[inline]
	pub fn remaining(&self) -> usize {
		self.capacity - self.offset.get()
	}
}

impl Drop for Arena {
	fn drop(&mut self) {
		// Safety: base was allocated with exactly this layout, which was
		// validated in `new`.
		unsafe {
			let layout = Layout::from_size_align_unchecked(self.capacity, CACHE_LINE);
			dealloc(self.base.as_ptr(), layout);
		}
	}
}

impl fmt::Debug for Arena {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Arena")
			.field("capacity", &self.capacity)
			.field("used", &self.used())
			.finish()
	}
}

/// Rounds `bytes` up to the next multiple of the cache line size.
#[inline]
pub(crate) const fn round_up(bytes: usize) -> usize {
	(bytes + CACHE_LINE - 1) & !(CACHE_LINE - 1)
}
