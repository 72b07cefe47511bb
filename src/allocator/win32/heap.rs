use crate::*;

use winapi::um::heapapi::{GetProcessHeap, HeapAlloc, HeapFree, HeapReAlloc};
use winapi::um::winnt::{HANDLE, HEAP_ZERO_MEMORY};

use core::mem::MaybeUninit;
use core::ptr::NonNull;



/// [`HeapAlloc`] / [`HeapReAlloc`] / [`HeapFree`] on <code>[GetProcessHeap]\(\)</code>
///
/// A size-only primitive heap guaranteeing [`MEMORY_ALLOCATION_ALIGNMENT`](super::MEMORY_ALLOCATION_ALIGNMENT) and nothing more.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)] #[repr(transparent)] pub struct ProcessHeap;

impl ProcessHeap {
    fn handle() -> HANDLE {
        // SAFETY: ⚠️ I assert that undefined behavior must've already happened if things have gone so catastrophically wrong as for this to fail.
        // SAFETY: ⚠️ the process heap is only accessed without `HEAP_NO_SERIALIZE`, or by code that is already undefined behavior.
        unsafe { GetProcessHeap() }
    }
}

impl meta::Meta for ProcessHeap {
    type Error = ();

    /// The alignment of memory returned by `HeapAlloc` is `MEMORY_ALLOCATION_ALIGNMENT` in WinNT.h:
    /// ```cpp
    /// #if defined(_WIN64) || defined(_M_ALPHA)
    /// #define MEMORY_ALLOCATION_ALIGNMENT 16
    /// #else
    /// #define MEMORY_ALLOCATION_ALIGNMENT 8
    /// #endif
    /// ```
    ///
    /// <https://learn.microsoft.com/en-us/windows/win32/api/heapapi/nf-heapapi-heapalloc#remarks>
    const MAX_ALIGN : Alignment = super::MEMORY_ALLOCATION_ALIGNMENT; // Verified through testing
    const MAX_SIZE  : usize     = usize::MAX/2;
    const ZST_SUPPORTED : bool  = true;
}

// SAFETY: ✔️ all thin::* impls intercompatible with each other
unsafe impl thin::Alloc for ProcessHeap {
    fn alloc_uninit(&self, size: usize) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ thread safe - we don't use HEAP_NO_SERIALIZE
        // SAFETY: ✔️ this "should" be safe for all `size`.  Unsoundness is #[test]ed for at the end of this file.
        let alloc = unsafe { HeapAlloc(Self::handle(), 0, size) };
        NonNull::new(alloc.cast()).ok_or(())
    }

    fn alloc_zeroed(&self, size: usize) -> Result<AllocNN0, Self::Error> {
        // SAFETY: ✔️ thread safe - we don't use HEAP_NO_SERIALIZE
        // SAFETY: ✔️ this "should" be safe for all `size`.  Unsoundness is #[test]ed for at the end of this file.
        // SAFETY: ✔️ HeapAlloc zeros memory when we use HEAP_ZERO_MEMORY
        let alloc = unsafe { HeapAlloc(Self::handle(), HEAP_ZERO_MEMORY, size) };
        NonNull::new(alloc.cast()).ok_or(())
    }
}

// SAFETY: ✔️ all thin::* impls intercompatible with each other
unsafe impl thin::Realloc for ProcessHeap {
    unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ thread safe - we don't use HEAP_NO_SERIALIZE
        // SAFETY: ✔️ `ptr` belongs to `self` per thin::Realloc's documented safety preconditions, and thus was allocated with `Heap{,Re}Alloc`
        // SAFETY: ✔️ on failure `HeapReAlloc` returns null and leaves `ptr` valid
        let alloc = unsafe { HeapReAlloc(Self::handle(), 0, ptr.as_ptr().cast(), new_size) };
        NonNull::new(alloc.cast()).ok_or(())
    }
}

// SAFETY: ✔️ all thin::* impls intercompatible with each other
unsafe impl thin::Free for ProcessHeap {
    unsafe fn free_nullable(&self, ptr: *mut MaybeUninit<u8>) {
        // "This pointer can be NULL."
        // https://learn.microsoft.com/en-us/windows/win32/api/heapapi/nf-heapapi-heapfree#parameters
        //
        // SAFETY: ✔️ thread safe - we don't use HEAP_NO_SERIALIZE
        // SAFETY: ✔️ `ptr` is either null (safe, tested), or belongs to `self` per thin::Free::free_nullable's documented safety preconditions
        if unsafe { HeapFree(Self::handle(), 0, ptr.cast()) } == 0 && cfg!(debug_assertions) { bug::ub::free_failed(ptr) }
    }
}



#[test] fn thin_alignment()         { thin::test::alignment(ProcessHeap) }
#[test] fn thin_edge_case_sizes()   { thin::test::edge_case_sizes(ProcessHeap) }
#[test] fn thin_nullable()          { thin::test::nullable(ProcessHeap) }
#[test] fn thin_realloc()           { thin::test::realloc_preserves(ProcessHeap) }
#[test] fn thin_zeroed()            { thin::test::zeroed_alloc(ProcessHeap) }
#[test] fn thin_zst_support()       { thin::test::zst_supported_conservative(ProcessHeap) }

#[test] fn adapted() {
    use crate::allocator::adapt::PadOverAlign;
    fat::test::alignment(PadOverAlign(ProcessHeap));
    fat::test::realloc_preserves(PadOverAlign(ProcessHeap));
}
