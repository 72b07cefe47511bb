use crate::AllocNN;

use core::mem::MaybeUninit;



/// Zero the bytes `data[from..to]` (a noop if `from >= to`.)
///
/// ## Safety
/// *   The bytes `data[..to]` must be valid for writes.
/// *   The bytes `data[..to]` must be contained within a single contiguous allocation.
pub unsafe fn zero_range(data: AllocNN, from: usize, to: usize) {
    if from >= to { return }
    // SAFETY: ✔️ `data[from..to]` is in bounds of a single writeable allocation per fn preconditions
    // SAFETY: ✔️ `MaybeUninit<u8>` has trivial alignment and no invalid bit patterns
    let tail = unsafe { core::slice::from_raw_parts_mut(data.as_ptr().add(from), to - from) };
    tail.fill(MaybeUninit::new(0u8));
}

/// Copy the first `n` bytes of `src` to `dst`.
///
/// ## Safety
/// *   The bytes `src[..n]` must be valid for reads.
/// *   The bytes `dst[..n]` must be valid for writes.
/// *   `src[..n]` and `dst[..n]` must not overlap.
pub unsafe fn copy_prefix(src: AllocNN, dst: AllocNN, n: usize) {
    // SAFETY: ✔️ per fn preconditions.  `u8`-sized elements have trivial alignment.
    unsafe { core::ptr::copy_nonoverlapping(src.as_ptr().cast_const(), dst.as_ptr(), n) }
}
