//! Primitive heap traits operating on thin pointers, with alignment implied by size.
//!
//! C heaps (and platform heaps like `HeapAlloc`) merely accept a size for allocation, and a pointer for resize/free.
//! They have no alignment parameter, and guarantee no more than native alignment.
//! These are the only traits [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) needs from the heap it wraps.
//!
//! | Trait fn                                      | Primitive             |
//! | ----------------------------------------------| ----------------------|
//! | [`Alloc::alloc_uninit`] / [`Alloc::alloc_zeroed`] | `raw_allocate(size, zero)`
//! | [`Realloc::realloc_uninit`]                   | `raw_resize(block, new_size)`
//! | [`Free::free`] / [`Free::free_nullable`]      | `raw_free(block)`

use crate::*;
use crate::meta::Meta;

use core::mem::MaybeUninit;
use core::ptr::NonNull;



/// Allocation functions with alignment (up to <code>[Meta]::[MAX_ALIGN](Meta::MAX_ALIGN)</code>) implied by size:
/// <code>
/// fn [alloc_uninit](Self::alloc_uninit)(size: [usize]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;
/// fn [alloc_zeroed](Self::alloc_zeroed)(size: [usize]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;
/// </code><br>
///
/// ## Alignment Guarantees
///
/// | Requested Size                                            | Guaranteed Alignment (if successful)  |
/// | ----------------------------------------------------------| --------------------------------------|
/// | <code>1 .. [Meta]::[MAX_ALIGN](Meta::MAX_ALIGN)</code>    | The largest power of two that fits within `size`
/// | <code>[Meta]::[MAX_ALIGN](Meta::MAX_ALIGN) ..</code>      | <code>[Meta]::[MAX_ALIGN](Meta::MAX_ALIGN)</code>
///
/// ## Safety
/// *   Returned blocks must obey the alignment guarantees above and be valid for `size` bytes until freed.
/// *   Returned blocks must be exclusive (no two live blocks overlap.)
pub unsafe trait Alloc : Meta {
    /// Allocate at least `size` bytes of uninitialized memory.
    ///
    /// The resulting allocation can typically be freed with <code>[Free]::[free](Free::free)</code>
    fn alloc_uninit(&self, size: usize) -> Result<AllocNN, Self::Error>;

    /// Allocate at least `size` bytes of zeroed memory.
    ///
    /// The resulting allocation can typically be freed with <code>[Free]::[free](Free::free)</code>
    fn alloc_zeroed(&self, size: usize) -> Result<AllocNN0, Self::Error> {
        let alloc = self.alloc_uninit(size)?;
        // SAFETY: ✔️ `alloc[..size]` was just allocated
        unsafe { util::slice::zero_range(alloc, 0, size) };
        Ok(alloc.cast())
    }
}



/// Deallocation function:<br>
/// <code>[free](Self::free)(ptr: [NonNull]<[MaybeUninit]<[u8]>>)</code><br>
/// <br>
pub unsafe trait Free : Meta {
    /// Deallocate an allocation, `ptr`, belonging to `self`.
    ///
    /// ### Safety
    /// *   `ptr` must belong to `self`
    /// *   `ptr` will no longer be accessible after free
    unsafe fn free(&self, ptr: AllocNN) { unsafe { self.free_nullable(ptr.as_ptr()) } }

    /// Deallocate an allocation, `ptr`, belonging to `self`.
    ///
    /// ### Safety
    /// *   `ptr` may be null, in which case this is a noop
    /// *   `ptr` must belong to `self`
    /// *   `ptr` will no longer be accessible after free
    unsafe fn free_nullable(&self, ptr: *mut MaybeUninit<u8>) { if let Some(ptr) = NonNull::new(ptr) { unsafe { self.free(ptr) } } }
}



/// Reallocation function:<br>
/// <code>[realloc_uninit](Self::realloc_uninit)(ptr: [NonNull]<[MaybeUninit]<[u8]>>, new_size: [usize]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;</code><br>
/// <br>
///
/// No zeroing variant exists: any bytes beyond the old size are uninitialized after a resize.
/// Callers wanting zeroed growth (e.g. [`PadOverAlign`](crate::allocator::adapt::PadOverAlign)) zero the tail themselves.
pub unsafe trait Realloc : Alloc + Free {
    /// Reallocate an existing allocation, `ptr`, belonging to `self`.
    ///
    /// The first `min(old_size, new_size)` bytes are preserved.  The result may or may not be at the same address.
    ///
    /// ### Safety
    /// *   `ptr` must belong to `self`
    /// *   `ptr` will no longer be accessible after a succesful realloc (`realloc_uninit` returns <code>[Ok]\(...\)</code>)
    /// *   `ptr` remains valid and unmodified after a failed realloc (`realloc_uninit` returns <code>[Err]\(...\)</code>)
    unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, Self::Error>;
}



#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, A: Alloc> Alloc for &'a A {
    fn alloc_uninit(&self, size: usize) -> Result<AllocNN,  Self::Error> { A::alloc_uninit(self, size) }
    fn alloc_zeroed(&self, size: usize) -> Result<AllocNN0, Self::Error> { A::alloc_zeroed(self, size) }
}

#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, A: Free> Free for &'a A {
    unsafe fn free(         &self, ptr: AllocNN                 ) { unsafe { A::free(         self, ptr) } }
    unsafe fn free_nullable(&self, ptr: *mut MaybeUninit<u8>    ) { unsafe { A::free_nullable(self, ptr) } }
}

#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, A: Realloc> Realloc for &'a A {
    unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, Self::Error> { unsafe { A::realloc_uninit(self, ptr, new_size) } }
}



/// Testing functions to verify implementations of [`thin`] traits.
pub mod test {
    use super::*;

    const SIZES : [usize; 20] = [1, 2, 3, 4, 7, 8, 9, 15, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 1000, 4096];

    /// Assert that blocks are aligned to at least <code>min([Meta::MAX_ALIGN], largest power of 2 &lt;= size)</code>.
    #[track_caller] pub fn alignment<A: Alloc + Free>(allocator: A) {
        for size in SIZES {
            let expected = Alignment::new(1 << size.ilog2()).map_or(Alignment::MIN, |a| a.min(A::MAX_ALIGN));
            let allocs = [(); 4].map(|_| allocator.alloc_uninit(size));
            for alloc in allocs.iter() {
                let Ok(alloc) = alloc else { continue };
                assert!(expected.is_aligned(alloc.as_ptr() as usize), "{size} byte block {alloc:?} isn't aligned to {expected:?}");
            }
            // SAFETY: ✔️ each `alloc` was just allocated by `allocator`
            for alloc in allocs.into_iter().flatten() { unsafe { allocator.free(alloc) } }
        }
    }

    /// Assert that absurd sizes fail gracefully instead of crashing.
    #[track_caller] pub fn edge_case_sizes<A: Alloc + Free>(allocator: A) {
        let sizes = [usize::MAX, usize::MAX - 1, usize::MAX/2 + 1, isize::MAX as usize];
        for size in sizes {
            // SAFETY: ✔️ `alloc` was just allocated by `allocator`
            if let Ok(alloc) = allocator.alloc_uninit(size) { unsafe { allocator.free(alloc) } }
        }
    }

    /// Assert that [`Free::free_nullable`] accepts null.
    #[track_caller] pub fn nullable<A: Free>(allocator: A) {
        // SAFETY: ✔️ null is explicitly allowed by `free_nullable`
        unsafe { allocator.free_nullable(core::ptr::null_mut()) }
    }

    /// Assert that [`Alloc::alloc_zeroed`] zeroes memory.
    #[track_caller] pub fn zeroed_alloc<A: Alloc + Free>(allocator: A) {
        for size in [1, 2, 8, 64, 1000, 4096, 65536] {
            let Ok(alloc) = allocator.alloc_zeroed(size) else { continue };
            // SAFETY: ✔️ `alloc[..size]` was just allocated (and zeroed) by `allocator`
            let bytes = unsafe { core::slice::from_raw_parts(alloc.as_ptr(), size) };
            assert!(bytes.iter().all(|b| *b == 0), "{size} byte alloc_zeroed block wasn't zeroed");
            // SAFETY: ✔️ `alloc` was just allocated by `allocator`
            unsafe { allocator.free(alloc.cast()) };
        }
    }

    /// Assert that [`Realloc::realloc_uninit`] preserves the common prefix when growing and shrinking.
    #[track_caller] pub fn realloc_preserves<A: Realloc>(allocator: A) {
        let Ok(alloc) = allocator.alloc_uninit(64) else { return };
        // SAFETY: ✔️ `alloc[..64]` was just allocated by `allocator`
        unsafe { core::slice::from_raw_parts_mut(alloc.as_ptr(), 64) }.iter_mut().enumerate().for_each(|(i, b)| *b = MaybeUninit::new(i as u8));

        let mut alloc = alloc;
        for (old_size, new_size) in [(64, 4096), (4096, 16), (16, 1000)] {
            // SAFETY: ✔️ `alloc` belongs to `allocator`
            let realloc = match unsafe { allocator.realloc_uninit(alloc, new_size) } {
                Ok(realloc) => realloc,
                Err(_)      => break,
            };
            alloc = realloc;
            let n = 16.min(old_size).min(new_size);
            // SAFETY: ✔️ the first `n` bytes were initialized before the realloc, and must have been preserved
            let bytes = unsafe { core::slice::from_raw_parts(alloc.as_ptr().cast::<u8>(), n) };
            for (i, b) in bytes.iter().enumerate() { assert_eq!(*b, i as u8, "byte {i} not preserved when reallocating {old_size} → {new_size} bytes") }
        }
        // SAFETY: ✔️ `alloc` belongs to `allocator`
        unsafe { allocator.free(alloc) };
    }

    /// Assert that `A` supports ZSTs if [`Meta::ZST_SUPPORTED`] is set.
    #[track_caller] pub fn zst_supported_conservative<A: Alloc + Free>(allocator: A) {
        let alloc = allocator.alloc_uninit(0);
        if A::ZST_SUPPORTED { assert!(alloc.is_ok(), "alloc = {alloc:?}, ZST_SUPPORTED = {}", A::ZST_SUPPORTED) }
        // SAFETY: ✔️ `alloc` was just allocated by `allocator`
        if let Ok(alloc) = alloc { unsafe { allocator.free(alloc) } }
    }
}
