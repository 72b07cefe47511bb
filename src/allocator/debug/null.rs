#![allow(unused_variables)]

use crate::*;



/// Never allocates anything, not even zero sized blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)] pub struct Null;

impl meta::Meta for Null {
    type Error                  = ();
    const MAX_ALIGN : Alignment = Alignment::MAX;
    const MAX_SIZE  : usize     = usize::MAX;
    const ZST_SUPPORTED : bool  = false;
}



// SAFETY: ✔️ always failing to allocate is a trivally safe implementation of this trait
unsafe impl thin::Alloc for Null {
    fn alloc_uninit(&self, size: usize) -> Result<AllocNN, Self::Error> { Err(()) }
    fn alloc_zeroed(&self, size: usize) -> Result<AllocNN0, Self::Error> { Err(()) }
}

// SAFETY: ✔️ this trait cannot be safely called, and simply panicing in response is a reasonable response to the caller's UB
unsafe impl thin::Free for Null {
    #[track_caller] #[inline(never)] unsafe fn free(&self, ptr: AllocNN) {
        // SAFETY: ✔️ violation of thin::Free::free's documented safety precondition that `ptr` belong to `self`
        unsafe { ub!("bug: undefined behavior: {ptr:?} does not belong to `self` as the Null allocator can't allocate anything to free in the first place") }
    }
}

// SAFETY: ✔️ always failing to reallocate is a trivally safe implementation of this trait
unsafe impl thin::Realloc for Null {
    unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, Self::Error> { Err(()) }
}



#[test] fn thin_edge_case_sizes()   { thin::test::edge_case_sizes(Null) }
#[test] fn thin_nullable()          { thin::test::nullable(Null) }
#[test] fn thin_zst_support()       { thin::test::zst_supported_conservative(Null) }

#[test] fn adapted_out_of_memory() {
    use crate::allocator::adapt::PadOverAlign;
    assert_eq!(Err(Error::OutOfMemory), PadOverAlign(Null).allocate(0,  ALIGN_1,  false));
    assert_eq!(Err(Error::OutOfMemory), PadOverAlign(Null).allocate(10, ALIGN_64, true ));
    // SAFETY: ✔️ null is always a valid argument to free
    unsafe { PadOverAlign(Null).free(core::ptr::null_mut()) };
}

#[should_panic] #[test] fn free_panics() {
    let mut byte = core::mem::MaybeUninit::new(0u8);
    // SAFETY: ❌ deliberately violates `free`'s precondition, which `Null` detects without touching `byte`
    unsafe { thin::Free::free(&Null, core::ptr::NonNull::from(&mut byte)) }
}
