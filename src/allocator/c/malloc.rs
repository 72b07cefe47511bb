use crate::*;
use crate::meta::*;

use libc::{calloc, free, malloc, realloc};

use core::mem::MaybeUninit;
use core::ptr::NonNull;



/// [`malloc`](https://en.cppreference.com/w/c/memory/malloc) / [`calloc`](https://en.cppreference.com/w/c/memory/calloc) / [`realloc`](https://en.cppreference.com/w/c/memory/realloc) / [`free`](https://en.cppreference.com/w/c/memory/free)
///
/// The canonical size-only primitive heap: no alignment parameter, so wrap it in
/// [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) for anything beyond [`Meta::MAX_ALIGN`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)] #[repr(transparent)] pub struct Malloc;



impl Meta for Malloc {
    type Error = ();

    /// | Platform          | Value     |
    /// | ------------------| ----------|
    /// | Windows 32-bit    | [`8` according to Microsoft](https://learn.microsoft.com/en-us/cpp/c-runtime-library/reference/malloc#return-value)
    /// | Windows 64-bit    | [`16` according to Microsoft](https://learn.microsoft.com/en-us/cpp/c-runtime-library/reference/malloc#return-value)
    /// | C11               | <code>[_Alignof](https://en.cppreference.com/w/c/language/_Alignof)\([max_align_t](https://en.cppreference.com/w/c/types/max_align_t)\)</code>
    ///
    /// Custom `malloc` implementations providing less alignment than this are considered broken.
    const MAX_ALIGN : Alignment = if cfg!(target_env = "msvc") {
        if core::mem::size_of::<usize>() >= 8 { ALIGN_16 } else { ALIGN_8 }
    } else {
        #[cfg(not(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64"))))]
        #[allow(non_camel_case_types)] type max_align_t = f64; // conservative
        #[cfg(all(target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
        use libc::max_align_t;
        Alignment::of::<max_align_t>()
    };

    const MAX_SIZE : usize = usize::MAX; // *slightly* less in practice

    /// "If size is zero, the behavior of malloc is implementation-defined."
    ///
    /// Null results are translated into an [`Err`], but [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) never requests zero bytes anyways.
    const ZST_SUPPORTED : bool = false;
}



/// | Safety Item   | Description   |
/// | --------------| --------------|
/// | `align`       | ✔️ Validated via [`thin::test::alignment`] ("suitably aligned so that it may be assigned to a pointer to any type of object")
/// | `size`        | ✔️ Validated via [`thin::test::edge_case_sizes`]
/// | `exclusive`   | ✔️ "Each such allocation shall yield a pointer to an object disjoint from any other object."
/// | `zeroed`      | ✔️ Validated via [`thin::test::zeroed_alloc`], correct use of `calloc` ("The space is initialized to all bits zero")
/// | `threads`     | ⚠️ thread-unsafe stdlibs existed once upon a time.  Linking them into a multithreaded program is already undefined behavior.
// SAFETY: per above
unsafe impl thin::Alloc for Malloc {
    #[track_caller] fn alloc_uninit(&self, size: usize) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ this "should" be safe for all `size`.  Unsound C stdlibs are #[test]ed for at the end of this file.
        let alloc = unsafe { malloc(size) };
        NonNull::new(alloc.cast()).ok_or(())
    }

    #[track_caller] fn alloc_zeroed(&self, size: usize) -> Result<AllocNN0, Self::Error> {
        // SAFETY: ✔️ this "should" be safe for all `size`.  Unsound C stdlibs are #[test]ed for at the end of this file.
        // SAFETY: ✔️ `calloc` zeros memory
        let alloc = unsafe { calloc(1, size) };
        NonNull::new(alloc.cast()).ok_or(())
    }
}

// SAFETY: ✔️ `free` accepts null and anything from `malloc` / `calloc` / `realloc`, and reports no errors
unsafe impl thin::Free for Malloc {
    #[track_caller] unsafe fn free_nullable(&self, ptr: *mut MaybeUninit<u8>) {
        // SAFETY: ✔️ `ptr` can be null (validated via thin::test::nullable)
        // SAFETY: ✔️ `ptr` otherwise belongs to `self` per thin::Free::free_nullable's documented safety preconditions
        unsafe { free(ptr.cast()) }
    }
}

// SAFETY: ✔️ `realloc` preserves the common prefix, and leaves `ptr` valid when returning null
unsafe impl thin::Realloc for Malloc {
    #[track_caller] unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ `ptr` belongs to `self` per thin::Realloc's documented safety preconditions, and thus came from `malloc`, `calloc`, or `realloc`
        let alloc = unsafe { realloc(ptr.as_ptr().cast(), new_size) };
        NonNull::new(alloc.cast()).ok_or(())
    }
}



#[test] fn thin_alignment()             { thin::test::alignment(Malloc) }
#[test] fn thin_edge_case_sizes()       { thin::test::edge_case_sizes(Malloc) }
#[test] fn thin_nullable()              { thin::test::nullable(Malloc) }
#[test] fn thin_realloc()               { thin::test::realloc_preserves(Malloc) }
#[test] fn thin_zeroed()                { thin::test::zeroed_alloc(Malloc) }
#[test] fn thin_zst_support()           { thin::test::zst_supported_conservative(Malloc) }

#[test] fn max_align_at_least_word()    { assert!(<Malloc as Meta>::MAX_ALIGN >= Alignment::WORD) }
