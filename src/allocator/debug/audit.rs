use crate::*;
use crate::meta::*;

use core::cell::Cell;
use core::mem::MaybeUninit;



/// Wraps a primitive heap, counting live blocks and refusing requests above a byte limit.
///
/// Useful for injecting [`Error::OutOfMemory`] into [`PadOverAlign`](crate::allocator::adapt::PadOverAlign),
/// then checking that failed calls leaked no blocks (the [`live`](Self::live) count is unchanged.)
///
/// Double frees are detected once more blocks have been freed than allocated.
#[derive(Debug)] pub struct Audit<A> {
    inner:  A,
    live:   Cell<usize>,
    limit:  Cell<usize>,
}

impl<A> Audit<A> {
    /// Wrap `inner` without a limit.
    pub const fn new(inner: A) -> Self { Self::with_limit(inner, usize::MAX) }

    /// Wrap `inner`, refusing any (re)allocation of more than `limit` bytes.
    pub const fn with_limit(inner: A, limit: usize) -> Self { Self { inner, live: Cell::new(0), limit: Cell::new(limit) } }

    pub fn set_limit(&self, limit: usize) { self.limit.set(limit) }
    pub fn limit(&self) -> usize { self.limit.get() }

    /// The number of blocks allocated but not yet freed.
    pub fn live(&self) -> usize { self.live.get() }

    pub fn inner(&self) -> &A { &self.inner }

    fn admit(&self, size: usize) -> Result<(), ()> { if size <= self.limit.get() { Ok(()) } else { Err(()) } }
}

impl<A: Default> Default for Audit<A> {
    fn default() -> Self { Self::new(A::default()) }
}

impl<A: Meta> Meta for Audit<A> {
    type Error                  = ();
    const MAX_ALIGN : Alignment = A::MAX_ALIGN;
    const MAX_SIZE  : usize     = A::MAX_SIZE;
    const ZST_SUPPORTED : bool  = A::ZST_SUPPORTED;
}



// SAFETY: ✔️ blocks come straight from `A`
unsafe impl<A: thin::Alloc> thin::Alloc for Audit<A> {
    fn alloc_uninit(&self, size: usize) -> Result<AllocNN, Self::Error> {
        self.admit(size)?;
        let alloc = self.inner.alloc_uninit(size).map_err(|_| ())?;
        self.live.set(self.live.get() + 1);
        Ok(alloc)
    }

    fn alloc_zeroed(&self, size: usize) -> Result<AllocNN0, Self::Error> {
        self.admit(size)?;
        let alloc = self.inner.alloc_zeroed(size).map_err(|_| ())?;
        self.live.set(self.live.get() + 1);
        Ok(alloc)
    }
}

// SAFETY: ✔️ blocks are returned straight to `A`
unsafe impl<A: thin::Free> thin::Free for Audit<A> {
    #[track_caller] unsafe fn free(&self, ptr: AllocNN) {
        let Some(live) = self.live.get().checked_sub(1) else { bug::ub::freed_ptr_for_allocator(ptr) };
        self.live.set(live);
        // SAFETY: ✔️ `ptr` belongs to `self` and thus `self.inner` per thin::Free::free's documented safety preconditions
        unsafe { self.inner.free(ptr) }
    }

    #[track_caller] unsafe fn free_nullable(&self, ptr: *mut MaybeUninit<u8>) {
        // SAFETY: ✔️ same preconditions
        if let Some(ptr) = core::ptr::NonNull::new(ptr) { unsafe { thin::Free::free(self, ptr) } }
    }
}

// SAFETY: ✔️ blocks come straight from `A`, and failures leave `ptr` to `A`'s guarantees
unsafe impl<A: thin::Realloc> thin::Realloc for Audit<A> {
    unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, Self::Error> {
        self.admit(new_size)?;
        // SAFETY: ✔️ `ptr` belongs to `self` and thus `self.inner` per thin::Realloc::realloc_uninit's documented safety preconditions
        unsafe { self.inner.realloc_uninit(ptr, new_size) }.map_err(|_| ())
    }
}



#[cfg(feature = "libc")] #[test] fn counts() {
    use crate::allocator::c::Malloc;
    use crate::thin::{Alloc, Free, Realloc};

    let audit = Audit::with_limit(Malloc, 1024);
    let a = audit.alloc_uninit(16).unwrap();
    let b = audit.alloc_zeroed(1024).unwrap();
    assert_eq!(audit.live(), 2);
    assert!(audit.alloc_uninit(1025).is_err());
    assert_eq!(audit.live(), 2);

    // SAFETY: ✔️ `a` belongs to `audit`
    let a = unsafe { audit.realloc_uninit(a, 512) }.unwrap();
    // SAFETY: ✔️ `a` belongs to `audit`
    assert!(unsafe { audit.realloc_uninit(a, 2048) }.is_err());
    assert_eq!(audit.live(), 2);

    audit.set_limit(usize::MAX);
    // SAFETY: ✔️ `a` belongs to `audit`
    let a = unsafe { audit.realloc_uninit(a, 2048) }.unwrap();

    // SAFETY: ✔️ `a` and `b` belong to `audit`
    unsafe { audit.free(a) };
    unsafe { audit.free(b.cast()) };
    assert_eq!(audit.live(), 0);
}

#[cfg(feature = "libc")] #[test] fn thin_conformance() {
    use crate::allocator::c::Malloc;
    let audit = Audit::new(Malloc);
    thin::test::alignment(&audit);
    thin::test::edge_case_sizes(&audit);
    thin::test::nullable(&audit);
    thin::test::zeroed_alloc(&audit);
    thin::test::realloc_preserves(&audit);
    assert_eq!(audit.live(), 0);
}

#[cfg(feature = "libc")] #[should_panic] #[test] fn double_free() {
    use crate::allocator::c::Malloc;
    use crate::thin::{Alloc, Free};

    let audit = Audit::new(Malloc);
    let a = audit.alloc_uninit(16).unwrap();
    // SAFETY: ✔️ `a` belongs to `audit`
    unsafe { audit.free(a) };
    // SAFETY: ❌ deliberate double free, which `Audit` detects before `Malloc` ever sees it
    unsafe { audit.free(a) };
}
