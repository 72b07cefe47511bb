//! Rusty allocator traits operating on [`Layout`]s, with explicit alignment

use crate::*;

use core::alloc::Layout;
#[cfg(doc)] use core::ptr::NonNull;



/// Allocation functions:<br>
/// <code>[alloc_uninit](Self::alloc_uninit)(layout: [Layout]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;</code><br>
/// <code>[alloc_zeroed](Self::alloc_zeroed)(layout: [Layout]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;</code><br>
/// <br>
///
/// ## Safety
/// *   Allocations created by this trait must be compatible with any other [`fat`] traits implemented on this allocator type.
/// *   Returned allocations must obey `layout` alignment and size.
pub unsafe trait Alloc : meta::Meta {
    /// Allocate at least `layout.size()` bytes of uninitialized memory aligned to `layout.align()`.
    ///
    /// The resulting allocation can typically be freed with <code>[Free]::[free](Free::free)</code>
    fn alloc_uninit(&self, layout: Layout) -> Result<AllocNN, Self::Error>;

    /// Allocate at least `layout.size()` bytes of zeroed memory aligned to `layout.align()`.
    ///
    /// The resulting allocation can typically be freed with <code>[Free]::[free](Free::free)</code>
    fn alloc_zeroed(&self, layout: Layout) -> Result<AllocNN0, Self::Error> {
        let alloc = self.alloc_uninit(layout)?;
        // SAFETY: ✔️ `alloc[..layout.size()]` was just allocated
        unsafe { util::slice::zero_range(alloc, 0, layout.size()) };
        Ok(alloc.cast())
    }
}

/// Deallocation function:<br>
/// <code>[free](Self::free)(ptr: [NonNull]&lt;\_&gt;, layout: [Layout])</code><br>
/// <br>
///
/// ## Safety
/// *   This trait must be able to free allocations made by any other [`fat`] traits implemented on this allocator type.
pub unsafe trait Free : meta::Meta {
    /// Deallocate an allocation, `ptr`, belonging to `self`.
    ///
    /// ### Safety
    /// *   `ptr` must belong to `self`
    /// *   `ptr` will no longer be accessible after free
    /// *   `layout` must exactly match the [`Layout`] last used to successfully (re)allocate `ptr`
    unsafe fn free(&self, ptr: AllocNN, layout: Layout);
}

/// Reallocation function:<br>
/// <code>[realloc_uninit](Self::realloc_uninit)(ptr: [NonNull]&lt;\_&gt;, old: [Layout], new: [Layout]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;</code><br>
/// <code>[realloc_zeroed](Self::realloc_zeroed)(ptr: [NonNull]&lt;\_&gt;, old: [Layout], new: [Layout]) -> [Result]&lt;[NonNull]&lt;\_&gt;, \_&gt;</code><br>
/// <br>
///
/// The provided implementations always relocate (allocate, copy, free.)
/// Implementors that can grow or shrink blocks in place should override both.
///
/// ## Safety
/// *   This trait must be able to reallocate allocations made by any other [`fat`] traits implemented on this allocator type.
/// *   Returned allocations must obey `new_layout` alignment and size.
pub unsafe trait Realloc : Alloc + Free {
    /// Reallocate an existing allocation, `ptr`, belonging to `self`.
    ///
    /// ### Safety
    /// *   `ptr` must belong to `self`
    /// *   `ptr` will no longer be accessible after a succesful realloc (`realloc_uninit` returns <code>[Ok]\(...\)</code>)
    /// *   `old_layout` must exactly match the [`Layout`] last used to successfully (re)allocate `ptr`
    unsafe fn realloc_uninit(&self, ptr: AllocNN, old_layout: Layout, new_layout: Layout) -> Result<AllocNN, Self::Error> {
        if old_layout == new_layout { return Ok(ptr) }
        let alloc = self.alloc_uninit(new_layout)?;
        // SAFETY: ✔️ `ptr[..old]` is live by fn precondition, `alloc[..new]` was just allocated, distinct live blocks don't overlap
        unsafe { util::slice::copy_prefix(ptr, alloc, old_layout.size().min(new_layout.size())) };
        // SAFETY: ✔️ (ptr, old_layout) was a previous valid alloc by fn safety precondition
        unsafe { self.free(ptr, old_layout) };
        Ok(alloc)
    }

    /// Reallocate an existing allocation, `ptr`, belonging to `self`.
    ///
    /// Any memory in `old_layout.size() .. new_layout.size()` will be zeroed.
    ///
    /// ### Safety
    /// *   `ptr` must belong to `self`
    /// *   `ptr` will no longer be accessible after a succesful realloc (`realloc_zeroed` returns <code>[Ok]\(...\)</code>)
    /// *   `old_layout` must exactly match the [`Layout`] last used to successfully (re)allocate `ptr`
    unsafe fn realloc_zeroed(&self, ptr: AllocNN, old_layout: Layout, new_layout: Layout) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ realloc_uninit has same prereqs as realloc_zeroed
        let alloc = unsafe { self.realloc_uninit(ptr, old_layout, new_layout) }?;
        // SAFETY: ✔️ `alloc[..new_layout.size()]` was just (re)allocated
        unsafe { util::slice::zero_range(alloc, old_layout.size(), new_layout.size()) };
        Ok(alloc)
    }
}



#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, A: Alloc> Alloc for &'a A {
    fn alloc_uninit(&self, layout: Layout) -> Result<AllocNN,  Self::Error> { A::alloc_uninit(self, layout) }
    fn alloc_zeroed(&self, layout: Layout) -> Result<AllocNN0, Self::Error> { A::alloc_zeroed(self, layout) }
}

#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, A: Free> Free for &'a A {
    unsafe fn free(&self, ptr: AllocNN, layout: Layout) { unsafe { A::free(self, ptr, layout) } }
}

#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, A: Realloc> Realloc for &'a A {
    unsafe fn realloc_uninit(&self, ptr: AllocNN, old_layout: Layout, new_layout: Layout) -> Result<AllocNN, Self::Error> { unsafe { A::realloc_uninit(self, ptr, old_layout, new_layout) } }
    unsafe fn realloc_zeroed(&self, ptr: AllocNN, old_layout: Layout, new_layout: Layout) -> Result<AllocNN, Self::Error> { unsafe { A::realloc_zeroed(self, ptr, old_layout, new_layout) } }
}



/// Testing functions to verify implementations of [`fat`] traits.
pub mod test {
    use super::*;

    fn alignments<A: meta::Meta>() -> impl Iterator<Item = Alignment> {
        let max = A::MAX_ALIGN.min(ALIGN_4096);
        (0 .. usize::BITS).map_while(move |shift| Alignment::new(1 << shift).filter(|a| *a <= max))
    }

    /// Assert that every block honors its [`Layout::align`], for every alignment up to <code>min([meta::Meta::MAX_ALIGN], 4096)</code>.
    #[track_caller] pub fn alignment<A: Alloc + Free>(allocator: A) {
        for align in alignments::<A>() {
            for size in [1, 3, 8, 17, 100, 4096] {
                let Ok(layout) = Layout::from_size_align(size, align.as_usize()) else { continue };
                let allocs = [(); 4].map(|_| allocator.alloc_uninit(layout));
                for alloc in allocs.iter() {
                    let Ok(alloc) = alloc else { continue };
                    assert!(align.is_aligned(alloc.as_ptr() as usize), "{layout:?} block {alloc:?} isn't aligned");
                }
                // SAFETY: ✔️ each `alloc` was just allocated by `allocator` with `layout`
                for alloc in allocs.into_iter().flatten() { unsafe { allocator.free(alloc, layout) } }
            }
        }
    }

    /// Assert that absurd (but valid) [`Layout`]s fail gracefully instead of crashing.
    #[track_caller] pub fn edge_case_sizes<A: Alloc + Free>(allocator: A) {
        for align in alignments::<A>() {
            let max = isize::MAX as usize - (align.as_usize() - 1);
            for size in [max, max - 1, max / 2 + 1] {
                let Ok(layout) = Layout::from_size_align(size, align.as_usize()) else { continue };
                // SAFETY: ✔️ `alloc` was just allocated by `allocator` with `layout`
                if let Ok(alloc) = allocator.alloc_uninit(layout) { unsafe { allocator.free(alloc, layout) } }
            }
        }
    }

    /// Assert that [`Alloc::alloc_zeroed`] zeroes memory.
    #[track_caller] pub fn zeroed_alloc<A: Alloc + Free>(allocator: A) {
        for align in alignments::<A>() {
            for size in [1, 8, 100, 4096] {
                let Ok(layout) = Layout::from_size_align(size, align.as_usize()) else { continue };
                let Ok(alloc) = allocator.alloc_zeroed(layout) else { continue };
                // SAFETY: ✔️ `alloc[..size]` was just allocated (and zeroed) by `allocator`
                let bytes = unsafe { core::slice::from_raw_parts(alloc.as_ptr(), size) };
                assert!(bytes.iter().all(|b| *b == 0), "{layout:?} alloc_zeroed block wasn't zeroed");
                // SAFETY: ✔️ `alloc` was just allocated by `allocator` with `layout`
                unsafe { allocator.free(alloc.cast(), layout) };
            }
        }
    }

    /// Assert that [`Realloc`] preserves the common prefix, honors the new alignment, and zeroes growth when asked.
    #[track_caller] pub fn realloc_preserves<A: Realloc>(allocator: A) {
        for align in alignments::<A>() {
            let Ok(layout) = Layout::from_size_align(32, align.as_usize()) else { continue };
            let Ok(alloc) = allocator.alloc_zeroed(layout) else { continue };
            // SAFETY: ✔️ `alloc[..32]` was just allocated by `allocator`
            unsafe { core::slice::from_raw_parts_mut(alloc.as_ptr(), 32) }.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);

            let mut alloc : (AllocNN, Layout) = (alloc.cast(), layout);
            for new_size in [200, 8, 1000] {
                let (ptr, old_layout) = alloc;
                let Ok(new_layout) = Layout::from_size_align(new_size, align.as_usize()) else { break };
                // SAFETY: ✔️ `ptr` belongs to `allocator` with `old_layout`
                let Ok(realloc) = (unsafe { allocator.realloc_zeroed(ptr, old_layout, new_layout) }) else { break };
                alloc = (realloc, new_layout);
                assert!(align.is_aligned(realloc.as_ptr() as usize), "{new_layout:?} realloc {realloc:?} isn't aligned");

                let prefix = old_layout.size().min(new_size).min(32);
                // SAFETY: ✔️ `realloc[..new_size]` was just reallocated, bytes past `old_layout.size()` were zeroed, the rest were initialized before
                let bytes = unsafe { core::slice::from_raw_parts(realloc.as_ptr().cast::<u8>(), new_size) };
                for (i, b) in bytes[..prefix].iter().enumerate() { assert_eq!(*b, i as u8, "byte {i} not preserved when reallocating {old_layout:?} → {new_layout:?}") }
                assert!(bytes[old_layout.size().min(new_size)..].iter().all(|b| *b == 0), "realloc_zeroed growth {old_layout:?} → {new_layout:?} wasn't zeroed");
            }
            let (ptr, layout) = alloc;
            // SAFETY: ✔️ `ptr` belongs to `allocator` with `layout`
            unsafe { allocator.free(ptr, layout) };
        }
    }

    /// Assert that [`meta::Meta::ZST_SUPPORTED`] accurately reflects whether zero-sized layouts can be allocated.
    #[track_caller] pub fn zst_supported_accurate<A: Alloc + Free>(allocator: A) {
        let layout = Layout::new::<()>();
        let alloc = allocator.alloc_uninit(layout);
        assert_eq!(alloc.is_ok(), A::ZST_SUPPORTED, "alloc = {alloc:?}, ZST_SUPPORTED = {}", A::ZST_SUPPORTED);
        // SAFETY: ✔️ `alloc` was just allocated by `allocator` with `layout`
        if let Ok(alloc) = alloc { unsafe { allocator.free(alloc, layout) } }
    }
}
