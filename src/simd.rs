//! # Vectorized Key Dispatch
//!
//! AVX2 kernels for the SIMD lookup path. Both kernels answer a per-node
//! question in chunks of eight 32-bit keys with a single packed comparison
//! per chunk:
//!
//! - [`descend_index`]: index of the first key strictly greater than the
//!   needle (the descent child index in an internal node), or `len` when
//!   no key qualifies.
//! - [`match_index`]: index of the key equal to the needle (the hit slot in
//!   a leaf), if any.
//!
//! The comparison result is turned into an 8-bit lane mask with
//! `_mm256_movemask_ps`, and the lowest set bit locates the answer within
//! the chunk. Lanes at or past `len` hold indeterminate data and are
//! discarded by an index bound check before anything is trusted.
//!
//! Packed loads are only issued for windows that fit inside the node's key
//! array (`base + 8 <= cap`); when the array capacity is not a multiple of
//! the lane count, the ragged tail is compared scalar with identical
//! results. For the default fan-out of 256 the whole scan is packed.
//!
//! Prefetching is a throughput hint only: each chunk issues a T0 prefetch
//! for the following window, and [`prefetch_node`] warms the first two
//! cache lines of a child before descent. Correctness never depends on it.

/// Lane count of a 256-bit vector of 32-bit keys.
pub(crate) const LANES: usize = 8;

/// Whether the vectorized path applies to key type `K` on this host.
///
/// True exactly when `K` is `i32` and the CPU reports AVX2. Everything
/// else (other key widths, older CPUs) takes the binary-search fallback.
#[inline]
pub(crate) fn dispatchable<K: 'static>() -> bool {
	std::any::TypeId::of::<K>() == std::any::TypeId::of::<i32>()
		&& is_x86_feature_detected!("avx2")
}

/// Warms the first two cache lines of a node we are about to descend into.
#[inline]
pub(crate) fn prefetch_node(ptr: *const u8) {
	// Safety: prefetch is a hint; it never faults, whatever the address.
	unsafe {
		use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
		_mm_prefetch(ptr as *const i8, _MM_HINT_T0);
		_mm_prefetch(ptr.wrapping_add(64) as *const i8, _MM_HINT_T0);
	}
}

/// Returns the index of the first key strictly greater than `needle`, or
/// `len` when every key is `<= needle`.
///
/// # Safety
///
/// - `keys` must be valid for reads of `cap` consecutive `i32`s.
/// - `len <= cap`, and `keys[..len]` must be sorted ascending.
/// - The caller must have verified AVX2 support.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn descend_index(keys: *const i32, len: usize, cap: usize, needle: i32) -> usize {
	use std::arch::x86_64::*;

	let target = _mm256_set1_epi32(needle);
	let mut base = 0usize;

	while base < len && base + LANES <= cap {
		_mm_prefetch(keys.wrapping_add(base + LANES) as *const i8, _MM_HINT_T0);

		let chunk = _mm256_loadu_si256(keys.add(base) as *const __m256i);
		let gt = _mm256_cmpgt_epi32(chunk, target);
		let mask = _mm256_movemask_ps(_mm256_castsi256_ps(gt));

		if mask != 0 {
			let idx = base + mask.trailing_zeros() as usize;
			// A hit past `len` is an indeterminate tail lane; since the
			// live lanes of this chunk sit below it, none of them matched,
			// and no later chunk holds live lanes either.
			if idx < len {
				return idx;
			}
		}

		base += LANES;
	}

	// Ragged tail when the key array capacity is not a lane multiple.
	while base < len {
		if *keys.add(base) > needle {
			return base;
		}
		base += 1;
	}

	len
}

/// Returns the index of the key equal to `needle`, if present.
///
/// # Safety
///
/// Same contract as [`descend_index`].
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn match_index(
	keys: *const i32,
	len: usize,
	cap: usize,
	needle: i32,
) -> Option<usize> {
	use std::arch::x86_64::*;

	let target = _mm256_set1_epi32(needle);
	let mut base = 0usize;

	while base < len && base + LANES <= cap {
		_mm_prefetch(keys.wrapping_add(base + LANES) as *const i8, _MM_HINT_T0);

		let chunk = _mm256_loadu_si256(keys.add(base) as *const __m256i);
		let eq = _mm256_cmpeq_epi32(chunk, target);
		let mask = _mm256_movemask_ps(_mm256_castsi256_ps(eq));

		if mask != 0 {
			let idx = base + mask.trailing_zeros() as usize;
			if idx < len {
				return Some(idx);
			}
		}

		base += LANES;
	}

	while base < len {
		if *keys.add(base) == needle {
			return Some(base);
		}
		base += 1;
	}

	None
}
