use crate::*;
use crate::generic::*;
use crate::meta::*;

#[cfg(allocator_api = "1.50")] use core::alloc::AllocError;
use core::alloc::Layout;
use core::mem::{size_of, MaybeUninit};
use core::ptr::{null_mut, NonNull};



const WORD : usize = size_of::<*mut MaybeUninit<u8>>();
const _ : () = assert!(WORD == Alignment::WORD.as_usize());

/// Adapt a [`thin`] primitive heap (size only, no alignment parameter) to arbitrary power-of-two alignment.
///
/// Every region is carved out of an over-allocated raw block:
///
/// ```text
/// raw                                   user (aligned)
/// |                                     |
/// [ slack (< align) ][ back-pointer: raw ][ user region: size bytes ]
/// ```
///
/// The raw block is `align - 1 + WORD + size` bytes.
/// The word immediately preceding the user region always holds the raw block's address,
/// which is how [`free`](Self::free) and [`resize`](Self::resize) recover the block from the user pointer alone.
///
/// | Operation                             | Behavior |
/// | --------------------------------------| ---------|
/// | [`allocate`](Self::allocate)          | Alignments below <code>[Alignment::WORD]</code> are raised to it.  Zero sized regions are valid, non-null, and freeable.
/// | [`resize`](Self::resize)              | Resizes the raw block in place at word alignment, otherwise allocates, copies, then frees.
/// | [`free`](Self::free)                  | Null is a noop.
/// | [`free_all`](Self::free_all)          | <code>[Err]\([Error::ModeNotImplemented]\)</code>: nothing tracks the set of live regions.
/// | [`query_capabilities`](Self::query_capabilities) | Everything except [`Mode::FreeAll`] and [`Mode::QueryInfo`].
///
/// No operation synchronizes anything beyond what `A` does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)] #[repr(transparent)] pub struct PadOverAlign<A>(pub A);

impl<A> core::ops::Deref for PadOverAlign<A> {
    type Target = A;
    #[inline(always)] fn deref(&self) -> &Self::Target { &self.0 }
}

impl<A: Meta> PadOverAlign<A> {
    /// The modes supported through [`Generic`].
    pub const FEATURES : ModeSet = ModeSet::of(&[Mode::Alloc, Mode::AllocNonZeroed, Mode::Free, Mode::Resize, Mode::ResizeNonZeroed, Mode::QueryFeatures]);

    /// Raw blocks can only be resized in place if `A` keeps them (and thus back-pointers) word aligned.
    const IN_PLACE : bool = A::MAX_ALIGN.as_usize() >= WORD;

    const MAX_SPACE : usize = if A::MAX_SIZE < isize::MAX as usize { A::MAX_SIZE } else { isize::MAX as usize };

    /// `align - 1 + WORD + size`, or [`Error::OutOfMemory`] if that can't be allocated.
    fn space(size: usize, align: Alignment) -> Result<usize, Error> {
        align.mask().checked_add(WORD)
            .and_then(|s| s.checked_add(size))
            .filter(|s| *s <= Self::MAX_SPACE)
            .ok_or(Error::OutOfMemory)
    }

    /// Carve an `align`ed user region out of `raw` and write its back-pointer.
    ///
    /// ### Safety
    /// *   `raw` must be valid for writes of at least <code>[space](Self::space)\(_, align\)</code> bytes.
    unsafe fn carve(raw: AllocNN, align: Alignment) -> AllocNN {
        let misalign = (raw.as_ptr() as usize).wrapping_add(WORD) & align.mask();
        let offset = WORD + ((align.as_usize() - misalign) & align.mask());
        debug_assert!(offset < WORD + align.as_usize());
        // SAFETY: ✔️ `offset <= align - 1 + WORD`, which is in bounds of `raw` per fn precondition
        let user = unsafe { raw.add(offset) };
        // SAFETY: ✔️ `user - WORD .. user` is within `raw` since `offset >= WORD`
        unsafe { Self::write_back_pointer(user, raw) };
        user
    }

    /// ### Safety
    /// *   The word immediately preceding `user` must be valid for writes.
    unsafe fn write_back_pointer(user: AllocNN, raw: AllocNN) {
        // SAFETY: ✔️ per fn precondition.  Unaligned writes keep this sound even for heaps with less than word alignment.
        unsafe { user.as_ptr().cast::<*mut MaybeUninit<u8>>().sub(1).write_unaligned(raw.as_ptr()) }
    }

    /// Recover `(raw, offset)` from a user region, where `user == raw + offset`.
    ///
    /// ### Safety
    /// *   `user` must be a live region returned by `self`.
    #[track_caller] unsafe fn split(user: AllocNN) -> (AllocNN, usize) {
        // SAFETY: ✔️ live regions are always preceded by their back-pointer
        let raw = unsafe { user.as_ptr().cast::<*mut MaybeUninit<u8>>().sub(1).read_unaligned() };
        let offset = (user.as_ptr() as usize).wrapping_sub(raw as usize);
        match NonNull::new(raw) {
            Some(raw) if (WORD ..= isize::MAX as usize).contains(&offset) => (raw, offset),
            _ => bug::ub::corrupt_back_pointer(user, raw),
        }
    }

    /// Read the back-pointer preceding `ptr`: the raw block `ptr` was carved from.
    ///
    /// ### Safety
    /// *   `ptr` must be a live region returned by `self`.
    #[track_caller] pub unsafe fn raw_block_of(&self, ptr: AllocNN) -> AllocNN {
        // SAFETY: ✔️ per fn precondition
        unsafe { Self::split(ptr) }.0
    }

    /// The modes supported through [`Generic`], <code>[Self::FEATURES]</code>.
    pub fn query_capabilities(&self) -> ModeSet { Self::FEATURES }

    /// Always <code>[Err]\([Error::ModeNotImplemented]\)</code>: live regions aren't tracked, so there's nothing to bulk free.
    pub fn free_all(&self) -> Result<(), Error> { Err(Error::ModeNotImplemented) }
}

impl<A: thin::Alloc + thin::Free> PadOverAlign<A> {
    /// Allocate `size` bytes aligned to <code>align.[at_least_word](Alignment::at_least_word)\(\)</code>, zeroed if `zeroed`.
    ///
    /// The result is never null, even if `size == 0`.
    pub fn allocate(&self, size: usize, align: Alignment, zeroed: bool) -> Result<AllocNN, Error> {
        let align = align.at_least_word();
        let space = Self::space(size, align)?;
        let raw = if zeroed { self.0.alloc_zeroed(space).map(NonNull::cast) } else { self.0.alloc_uninit(space) };
        let raw = raw.map_err(|_| Error::OutOfMemory)?;
        // SAFETY: ✔️ `raw` was just allocated with `space` bytes
        Ok(unsafe { Self::carve(raw, align) })
    }

    /// Free a region returned by `self` (a noop if `ptr` is null.)
    ///
    /// ### Safety
    /// *   `ptr` must be null, or a live region returned by `self`.
    /// *   `ptr` will no longer be accessible after free.
    #[track_caller] pub unsafe fn free(&self, ptr: *mut MaybeUninit<u8>) {
        let Some(ptr) = NonNull::new(ptr) else { return };
        // SAFETY: ✔️ `ptr` is a live region per fn precondition
        let raw = unsafe { self.raw_block_of(ptr) };
        // SAFETY: ✔️ `raw` was allocated by `self.0`
        unsafe { thin::Free::free(&self.0, raw) }
    }
}

impl<A: thin::Realloc> PadOverAlign<A> {
    /// Resize `old` from `old_size` to `new_size` bytes aligned to <code>new_align.[at_least_word](Alignment::at_least_word)\(\)</code>.
    ///
    /// *   `old == None` is equivalent to <code>[allocate](Self::allocate)\(new_size, new_align, zeroed\)</code>.
    /// *   At word alignment, the raw block is resized in place by `A` and the user region keeps its offset within the block.
    /// *   Otherwise a fresh region is allocated, the first `min(old_size, new_size)` bytes are copied over, and `old` is freed.
    /// *   If `zeroed`, bytes `old_size .. new_size` of the result are zero.
    ///
    /// On error, `old` remains valid and unmodified.
    ///
    /// ### Safety
    /// *   `old` must be [`None`], or a live region returned by `self`.
    /// *   `old_size` must be the size `old` was last (re)allocated with.
    /// *   `old` will no longer be accessible after a successful resize.
    #[track_caller] pub unsafe fn resize(&self, old: Option<AllocNN>, old_size: usize, new_size: usize, new_align: Alignment, zeroed: bool) -> Result<AllocNN, Error> {
        let Some(old) = old else { return self.allocate(new_size, new_align, zeroed) };
        let align = new_align.at_least_word();

        if align > Alignment::WORD || !Self::IN_PLACE {
            let new = self.allocate(new_size, align, zeroed)?;
            // SAFETY: ✔️ `old[..old_size]` is live per fn precondition, `new[..new_size]` was just allocated, live regions never overlap
            unsafe { util::slice::copy_prefix(old, new, old_size.min(new_size)) };
            // SAFETY: ✔️ `old` is live per fn precondition, and no longer accessed
            unsafe { PadOverAlign::free(self, old.as_ptr()) };
            return Ok(new);
        }

        // SAFETY: ✔️ `old` is live per fn precondition
        let (raw, offset) = unsafe { Self::split(old) };
        let space = offset.checked_add(new_size).filter(|s| *s <= Self::MAX_SPACE).ok_or(Error::OutOfMemory)?;
        // SAFETY: ✔️ `raw` was allocated by `self.0`.  On failure it's untouched.
        let raw = unsafe { self.0.realloc_uninit(raw, space) }.map_err(|_| Error::OutOfMemory)?;
        // SAFETY: ✔️ `offset + new_size == space`, in bounds of the reallocated block
        let user = unsafe { raw.add(offset) };
        // SAFETY: ✔️ `offset >= WORD`, so the back-pointer slot is in bounds too
        unsafe { Self::write_back_pointer(user, raw) };
        debug_assert!(align.is_aligned(user.as_ptr() as usize));
        // SAFETY: ✔️ `user[..new_size]` is in bounds
        if zeroed { unsafe { util::slice::zero_range(user, old_size, new_size) } }
        Ok(user)
    }
}



// meta::*

impl<A: Meta> Meta for PadOverAlign<A> {
    type Error                  = Error;
    const MAX_ALIGN : Alignment = Alignment::MAX;
    const MAX_SIZE  : usize     = Self::MAX_SPACE.saturating_sub(WORD);
    const ZST_SUPPORTED : bool  = true;
}



// fat::*

// SAFETY: ✔️ `allocate` honors `layout.align()` (raised to word alignment) and `layout.size()`
unsafe impl<A: thin::Alloc + thin::Free> fat::Alloc for PadOverAlign<A> {
    fn alloc_uninit(&self, layout: Layout) -> Result<AllocNN, Self::Error> { self.allocate(layout.size(), layout.into(), false) }
    fn alloc_zeroed(&self, layout: Layout) -> Result<AllocNN0, Self::Error> { self.allocate(layout.size(), layout.into(), true).map(NonNull::cast) }
}

// SAFETY: ✔️ every region carries the back-pointer needed to free it, regardless of `layout`
unsafe impl<A: thin::Alloc + thin::Free> fat::Free for PadOverAlign<A> {
    #[track_caller] unsafe fn free(&self, ptr: AllocNN, _layout: Layout) {
        // SAFETY: ✔️ `ptr` belongs to `self` per fat::Free::free's documented safety preconditions
        unsafe { PadOverAlign::free(self, ptr.as_ptr()) }
    }
}

// SAFETY: ✔️ `resize` honors `new_layout`, preserves the common prefix, and leaves `ptr` untouched on failure
unsafe impl<A: thin::Realloc> fat::Realloc for PadOverAlign<A> {
    #[track_caller] unsafe fn realloc_uninit(&self, ptr: AllocNN, old_layout: Layout, new_layout: Layout) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ `ptr` belongs to `self` with `old_layout` per fat::Realloc's documented safety preconditions
        unsafe { self.resize(Some(ptr), old_layout.size(), new_layout.size(), new_layout.into(), false) }
    }

    #[track_caller] unsafe fn realloc_zeroed(&self, ptr: AllocNN, old_layout: Layout, new_layout: Layout) -> Result<AllocNN, Self::Error> {
        // SAFETY: ✔️ `ptr` belongs to `self` with `old_layout` per fat::Realloc's documented safety preconditions
        unsafe { self.resize(Some(ptr), old_layout.size(), new_layout.size(), new_layout.into(), true) }
    }
}



// generic::*

fn normalize(align: usize) -> Result<Alignment, Error> { Alignment::normalize(align).ok_or(Error::InvalidArgument) }

// SAFETY: ✔️ regions honor the normalized alignment, `Mode::Alloc` / `Mode::Resize` zero, and every mode answers with its documented `Output`
unsafe impl<A: thin::Realloc> Generic for PadOverAlign<A> {
    fn features(&self) -> ModeSet { Self::FEATURES }

    #[track_caller] unsafe fn dispatch(&self, request: Request) -> Result<Output, Error> {
        let Request { mode, size, align, old, old_size } = request;
        let region = |ptr: AllocNN| Output::Region(NonNull::slice_from_raw_parts(ptr.cast(), size));
        let old = NonNull::new(old.cast::<MaybeUninit<u8>>());
        match mode {
            Mode::Alloc             => self.allocate(size, normalize(align)?, true ).map(region),
            Mode::AllocNonZeroed    => self.allocate(size, normalize(align)?, false).map(region),
            // SAFETY: ✔️ `old` is null or live per Generic::dispatch's documented safety preconditions
            Mode::Resize            => unsafe { self.resize(old, old_size, size, normalize(align)?, true ) }.map(region),
            // SAFETY: ✔️ `old` is null or live per Generic::dispatch's documented safety preconditions
            Mode::ResizeNonZeroed   => unsafe { self.resize(old, old_size, size, normalize(align)?, false) }.map(region),
            Mode::Free              => {
                // SAFETY: ✔️ `old` is null or live per Generic::dispatch's documented safety preconditions
                unsafe { PadOverAlign::free(self, old.map_or(null_mut(), NonNull::as_ptr)) };
                Ok(Output::Done)
            },
            Mode::FreeAll           => self.free_all().map(|()| Output::Done),
            Mode::QueryFeatures     => Ok(Output::Features(self.query_capabilities())),
            Mode::QueryInfo         => Err(Error::ModeNotImplemented),
        }
    }
}



// core::*

// SAFETY: ✔️ same guarantees as fat::*, with failure mapped to null
unsafe impl<A: thin::Realloc> core::alloc::GlobalAlloc for PadOverAlign<A> {
    #[track_caller] unsafe fn alloc(&self, layout: Layout) -> *mut u8 { self.allocate(layout.size(), layout.into(), false).map_or(null_mut(), |p| p.as_ptr().cast()) }
    #[track_caller] unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 { self.allocate(layout.size(), layout.into(), true).map_or(null_mut(), |p| p.as_ptr().cast()) }
    #[track_caller] unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        // SAFETY: ✔️ `ptr` belongs to `self` per GlobalAlloc::dealloc's documented safety preconditions
        unsafe { PadOverAlign::free(self, ptr.cast()) }
    }
    #[track_caller] unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: ✔️ `ptr` belongs to `self` with `layout` per GlobalAlloc::realloc's documented safety preconditions
        unsafe { self.resize(NonNull::new(ptr.cast()), layout.size(), new_size, layout.into(), false) }.map_or(null_mut(), |p| p.as_ptr().cast())
    }
}

#[cfg(allocator_api = "1.50")] fn slice(ptr: AllocNN, len: usize) -> NonNull<[u8]> { NonNull::slice_from_raw_parts(ptr.cast(), len) }

// SAFETY: ✔️ same guarantees as fat::*.  Regions stay valid while the allocator (or a copy of it) lives, as `A`'s blocks do.
#[cfg(allocator_api = "1.50")] unsafe impl<A: thin::Realloc> core::alloc::Allocator for PadOverAlign<A> {
    #[track_caller] fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        Ok(slice(PadOverAlign::allocate(self, layout.size(), layout.into(), false)?, layout.size()))
    }

    #[track_caller] fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        Ok(slice(PadOverAlign::allocate(self, layout.size(), layout.into(), true)?, layout.size()))
    }

    #[track_caller] unsafe fn deallocate(&self, ptr: NonNull<u8>, _layout: Layout) {
        // SAFETY: ✔️ `ptr` belongs to `self` per Allocator::deallocate's documented safety preconditions
        unsafe { PadOverAlign::free(self, ptr.cast::<MaybeUninit<u8>>().as_ptr()) }
    }

    #[track_caller] unsafe fn grow(&self, ptr: NonNull<u8>, old_layout: Layout, new_layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        // SAFETY: ✔️ `ptr` belongs to `self` with `old_layout` per Allocator::grow's documented safety preconditions
        Ok(slice(unsafe { self.resize(Some(ptr.cast()), old_layout.size(), new_layout.size(), new_layout.into(), false) }?, new_layout.size()))
    }

    #[track_caller] unsafe fn grow_zeroed(&self, ptr: NonNull<u8>, old_layout: Layout, new_layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        // SAFETY: ✔️ `ptr` belongs to `self` with `old_layout` per Allocator::grow_zeroed's documented safety preconditions
        Ok(slice(unsafe { self.resize(Some(ptr.cast()), old_layout.size(), new_layout.size(), new_layout.into(), true) }?, new_layout.size()))
    }

    #[track_caller] unsafe fn shrink(&self, ptr: NonNull<u8>, old_layout: Layout, new_layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        // SAFETY: ✔️ `ptr` belongs to `self` with `old_layout` per Allocator::shrink's documented safety preconditions
        Ok(slice(unsafe { self.resize(Some(ptr.cast()), old_layout.size(), new_layout.size(), new_layout.into(), false) }?, new_layout.size()))
    }
}



#[cfg(test)] mod tests {
    use super::*;
    use crate::allocator::debug::Audit;

    #[cfg(feature = "libc")] use crate::allocator::c::Malloc;

    fn bytes<'a>(ptr: AllocNN, len: usize) -> &'a mut [u8] {
        // SAFETY: ⚠️ test only: callers pass live, initialized regions of at least `len` bytes
        unsafe { core::slice::from_raw_parts_mut(ptr.as_ptr().cast(), len) }
    }

    /// Claims only byte alignment, forcing every resize through the relocate path.
    #[cfg(feature = "libc")] #[derive(Clone, Copy, Debug, Default)] struct ByteAligned(Malloc);
    #[cfg(feature = "libc")] impl Meta for ByteAligned {
        type Error                  = ();
        const MAX_ALIGN : Alignment = ALIGN_1;
        const MAX_SIZE  : usize     = usize::MAX;
        const ZST_SUPPORTED : bool  = false;
    }
    #[cfg(feature = "libc")] #[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ delegates to `Malloc`, which guarantees more than claimed
    unsafe impl thin::Alloc for ByteAligned { fn alloc_uninit(&self, size: usize) -> Result<AllocNN, ()> { thin::Alloc::alloc_uninit(&self.0, size) } }
    #[cfg(feature = "libc")] #[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ delegates to `Malloc`
    unsafe impl thin::Free for ByteAligned { unsafe fn free(&self, ptr: AllocNN) { unsafe { thin::Free::free(&self.0, ptr) } } }
    #[cfg(feature = "libc")] #[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ delegates to `Malloc`
    unsafe impl thin::Realloc for ByteAligned { unsafe fn realloc_uninit(&self, ptr: AllocNN, new_size: usize) -> Result<AllocNN, ()> { unsafe { thin::Realloc::realloc_uninit(&self.0, ptr, new_size) } } }



    #[cfg(feature = "libc")] #[test] fn allocate_10_align_64() {
        let a = PadOverAlign(Audit::new(Malloc));
        let p = a.allocate(10, ALIGN_64, false).unwrap();
        assert!(ALIGN_64.is_aligned(p.as_ptr() as usize));

        // SAFETY: ✔️ `p` is live, and preceded by its back-pointer
        let back = unsafe { p.as_ptr().cast::<usize>().sub(1).read_unaligned() };
        // SAFETY: ✔️ `p` is live
        let raw = unsafe { a.raw_block_of(p) };
        assert_eq!(back, raw.as_ptr() as usize);
        assert!(raw.as_ptr() as usize + WORD <= p.as_ptr() as usize);
        assert!(p.as_ptr() as usize + 10 <= raw.as_ptr() as usize + 63 + WORD + 10);
        assert_eq!(a.live(), 1);

        // SAFETY: ✔️ `p` is live
        unsafe { a.free(p.as_ptr()) };
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn zero_sized() {
        let a = PadOverAlign(Audit::new(Malloc));
        for align in [ALIGN_1, ALIGN_8, ALIGN_4096] {
            let p = a.allocate(0, align, false).unwrap();
            assert!(align.at_least_word().is_aligned(p.as_ptr() as usize));
            // SAFETY: ✔️ `p` is live
            unsafe { a.free(p.as_ptr()) };
        }
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn below_word_alignment_is_raised() {
        let a = PadOverAlign(Malloc);
        for align in [ALIGN_1, ALIGN_2, ALIGN_4] {
            let p = a.allocate(3, align, false).unwrap();
            assert!(Alignment::WORD.is_aligned(p.as_ptr() as usize));
            // SAFETY: ✔️ `p` is live
            unsafe { a.free(p.as_ptr()) };
        }
    }

    #[cfg(feature = "libc")] #[test] fn free_null() {
        let a = PadOverAlign(Audit::new(Malloc));
        // SAFETY: ✔️ null is always a valid argument to free
        unsafe { a.free(core::ptr::null_mut()) };
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn grow_zeroed_without_escalation() {
        let a = PadOverAlign(Malloc);
        let p = a.allocate(100, ALIGN_16, true).unwrap();
        assert!(bytes(p, 100).iter().all(|b| *b == 0));
        bytes(p, 100).fill(0xFF);

        // SAFETY: ✔️ `p` is live with 100 bytes
        let p = unsafe { a.resize(Some(p), 100, 200, ALIGN_16, true) }.unwrap();
        assert!(ALIGN_16.is_aligned(p.as_ptr() as usize));
        assert!(bytes(p, 200)[..100].iter().all(|b| *b == 0xFF));
        assert!(bytes(p, 200)[100..].iter().all(|b| *b == 0x00));

        // SAFETY: ✔️ `p` is live
        unsafe { a.free(p.as_ptr()) };
    }

    #[cfg(feature = "libc")] #[test] fn in_place_resize_preserves_offset() {
        let a = PadOverAlign(Audit::new(Malloc));
        let p = a.allocate(10, ALIGN_64, false).unwrap();
        bytes(p, 10).copy_from_slice(b"0123456789");
        // SAFETY: ✔️ `p` is live
        let offset = p.as_ptr() as usize - unsafe { a.raw_block_of(p) }.as_ptr() as usize;

        // SAFETY: ✔️ `p` is live with 10 bytes
        let q = unsafe { a.resize(Some(p), 10, 100_000, ALIGN_WORD, true) }.unwrap();
        // SAFETY: ✔️ `q` is live
        let raw = unsafe { a.raw_block_of(q) };
        assert_eq!(q.as_ptr() as usize - raw.as_ptr() as usize, offset);
        assert!(Alignment::WORD.is_aligned(q.as_ptr() as usize));
        assert_eq!(&bytes(q, 100_000)[..10], b"0123456789");
        assert!(bytes(q, 100_000)[10..].iter().all(|b| *b == 0));
        assert_eq!(a.live(), 1);

        // SAFETY: ✔️ `q` is live with 100,000 bytes
        let r = unsafe { a.resize(Some(q), 100_000, 4, ALIGN_1, false) }.unwrap();
        assert_eq!(&bytes(r, 4)[..], b"0123");
        // SAFETY: ✔️ `r` is live
        unsafe { a.free(r.as_ptr()) };
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn alignment_escalation_relocates() {
        let a = PadOverAlign(Audit::new(Malloc));
        let p = a.allocate(32, ALIGN_WORD, false).unwrap();
        bytes(p, 32).iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);

        // SAFETY: ✔️ `p` is live with 32 bytes
        let q = unsafe { a.resize(Some(p), 32, 32, ALIGN_64, false) }.unwrap();
        assert_ne!(p, q);
        assert!(ALIGN_64.is_aligned(q.as_ptr() as usize));
        assert!(bytes(q, 32).iter().enumerate().all(|(i, b)| *b == i as u8));
        assert_eq!(a.live(), 1);

        // SAFETY: ✔️ `q` is live with 32 bytes
        let r = unsafe { a.resize(Some(q), 32, 40, ALIGN_4096, false) }.unwrap();
        assert_ne!(q, r);
        assert!(ALIGN_4096.is_aligned(r.as_ptr() as usize));
        assert!(bytes(r, 32).iter().enumerate().all(|(i, b)| *b == i as u8));
        assert_eq!(a.live(), 1);

        // SAFETY: ✔️ `r` is live
        unsafe { a.free(r.as_ptr()) };
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn escalation_shrink_and_grow() {
        let a = PadOverAlign(Audit::new(Malloc));
        let mut p = a.allocate(64, ALIGN_8, true).unwrap();
        bytes(p, 64).fill(0xAB);
        let mut size = 64;
        for (new_size, align) in [(16, ALIGN_128), (512, ALIGN_4096), (8, ALIGN_32), (256, ALIGN_256)] {
            // SAFETY: ✔️ `p` is live with `size` bytes
            p = unsafe { a.resize(Some(p), size, new_size, align, true) }.unwrap();
            assert!(align.is_aligned(p.as_ptr() as usize));
            let keep = size.min(new_size).min(8);
            assert!(bytes(p, new_size)[..keep].iter().all(|b| *b == 0xAB));
            assert!(bytes(p, new_size)[size.min(new_size)..].iter().all(|b| *b == 0));
            size = new_size;
            assert_eq!(a.live(), 1);
        }
        // SAFETY: ✔️ `p` is live
        unsafe { a.free(p.as_ptr()) };
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn out_of_memory_is_not_destructive() {
        let a = PadOverAlign(Audit::with_limit(Malloc, 4096));
        let p = a.allocate(100, ALIGN_16, false).unwrap();
        bytes(p, 100).fill(0x5A);
        assert_eq!(a.live(), 1);

        assert_eq!(Err(Error::OutOfMemory), a.allocate(8192, ALIGN_16, true));
        assert_eq!(Err(Error::OutOfMemory), a.allocate(usize::MAX, ALIGN_1, false));
        assert_eq!(Err(Error::OutOfMemory), a.allocate(16, Alignment::MAX, false));
        // SAFETY: ✔️ `p` is live with 100 bytes, and remains live after each failure
        assert_eq!(Err(Error::OutOfMemory), unsafe { a.resize(Some(p), 100, 8192, ALIGN_16, true) });   // relocate path
        // SAFETY: ✔️ `p` is live with 100 bytes
        assert_eq!(Err(Error::OutOfMemory), unsafe { a.resize(Some(p), 100, 8192, ALIGN_WORD, true) }); // in place path
        // SAFETY: ✔️ `p` is live with 100 bytes
        assert_eq!(Err(Error::OutOfMemory), unsafe { a.resize(Some(p), 100, usize::MAX, ALIGN_WORD, false) });
        assert_eq!(a.live(), 1);
        assert!(bytes(p, 100).iter().all(|b| *b == 0x5A));

        // SAFETY: ✔️ `p` is live
        unsafe { a.free(p.as_ptr()) };
        assert_eq!(a.live(), 0);
    }

    #[cfg(feature = "libc")] #[test] fn resize_null_allocates() {
        let a = PadOverAlign(Audit::new(Malloc));
        // SAFETY: ✔️ `None` is always valid
        let p = unsafe { a.resize(None, 0, 48, ALIGN_512, true) }.unwrap();
        assert!(ALIGN_512.is_aligned(p.as_ptr() as usize));
        assert!(bytes(p, 48).iter().all(|b| *b == 0));
        assert_eq!(a.live(), 1);
        // SAFETY: ✔️ `p` is live
        unsafe { a.free(p.as_ptr()) };
    }

    #[cfg(feature = "libc")] #[test] fn narrow_heap_always_relocates() {
        let a = PadOverAlign(ByteAligned(Malloc));
        let p = a.allocate(24, ALIGN_WORD, false).unwrap();
        bytes(p, 24).fill(7);
        // SAFETY: ✔️ `p` is live with 24 bytes
        let q = unsafe { a.resize(Some(p), 24, 4000, ALIGN_WORD, true) }.unwrap();
        assert_ne!(p, q);
        assert!(bytes(q, 4000)[..24].iter().all(|b| *b == 7));
        assert!(bytes(q, 4000)[24..].iter().all(|b| *b == 0));
        // SAFETY: ✔️ `q` is live
        unsafe { a.free(q.as_ptr()) };
    }

    #[cfg(feature = "libc")] #[test] fn generic_interface() {
        let a = PadOverAlign(Audit::new(Malloc));

        let r = Generic::alloc(&a, 40, 0).unwrap();
        assert_eq!(r.len(), 40);
        assert!(Alignment::WORD.is_aligned(r.cast::<u8>().as_ptr() as usize));
        // SAFETY: ✔️ `r` is zeroed and live
        assert!(unsafe { r.as_ref() }.iter().all(|b| *b == 0));

        // SAFETY: ✔️ `r` is live with 40 bytes
        let r = unsafe { Generic::resize(&a, r.cast().as_ptr(), 40, 100, 48) }.unwrap();
        assert_eq!(r.len(), 100);
        assert!(ALIGN_64.is_aligned(r.cast::<u8>().as_ptr() as usize));
        // SAFETY: ✔️ `r` is zeroed and live
        assert!(unsafe { r.as_ref() }.iter().all(|b| *b == 0));

        // SAFETY: ✔️ `r` is live with 100 bytes
        let r = unsafe { Generic::resize_non_zeroed(&a, r.cast().as_ptr(), 100, 10, 8) }.unwrap();
        assert_eq!(r.len(), 10);

        let s = Generic::alloc_non_zeroed(&a, 0, 1).unwrap();
        assert_eq!(s.len(), 0);
        assert_eq!(a.live(), 2);

        // SAFETY: ✔️ `r` and `s` are live, null is always valid
        unsafe { Generic::free(&a, r.cast().as_ptr()) }.unwrap();
        unsafe { Generic::free(&a, s.cast().as_ptr()) }.unwrap();
        unsafe { Generic::free(&a, core::ptr::null_mut()) }.unwrap();
        assert_eq!(a.live(), 0);

        assert_eq!(Err(Error::InvalidArgument), Generic::alloc(&a, 8, usize::MAX));
        assert_eq!(a.live(), 0);
    }

    #[test] fn unsupported_modes() {
        let a = PadOverAlign(crate::allocator::debug::Null);
        assert_eq!(Err(Error::ModeNotImplemented), a.free_all());
        // SAFETY: ✔️ `free_all` is unsupported, so frees nothing
        assert_eq!(Err(Error::ModeNotImplemented), unsafe { Generic::free_all(&a) });
        assert_eq!(Err(Error::ModeNotImplemented), a.query_info());
        assert_eq!(Err(Error::OutOfMemory), Generic::alloc(&a, 1, 1));
    }

    #[test] fn capabilities() {
        let a = PadOverAlign(crate::allocator::debug::Null);
        let expected = ModeSet::of(&[Mode::Alloc, Mode::AllocNonZeroed, Mode::Free, Mode::Resize, Mode::ResizeNonZeroed, Mode::QueryFeatures]);
        assert_eq!(a.query_capabilities(), expected);
        assert_eq!(a.query_features(), Ok(expected));
        assert_eq!(a.features(), expected);
        assert!(!expected.contains(Mode::FreeAll));
        assert!(!expected.contains(Mode::QueryInfo));
    }

    #[cfg(feature = "libc")] #[test] fn global_alloc() {
        use core::alloc::GlobalAlloc;
        let a = PadOverAlign(Malloc);
        let layout = Layout::from_size_align(24, 256).unwrap();
        // SAFETY: ✔️ `layout` is non-zero sized
        let p = unsafe { GlobalAlloc::alloc_zeroed(&a, layout) };
        assert!(!p.is_null());
        assert!(ALIGN_256.is_aligned(p as usize));
        // SAFETY: ✔️ `p` was allocated with `layout`
        let p = unsafe { GlobalAlloc::realloc(&a, p, layout, 1000) };
        assert!(!p.is_null());
        assert!(ALIGN_256.is_aligned(p as usize));
        // SAFETY: ✔️ `p` was reallocated with `1000` bytes
        unsafe { GlobalAlloc::dealloc(&a, p, Layout::from_size_align(1000, 256).unwrap()) };
    }

    #[cfg(feature = "libc")] #[test] fn fat_alignment()          { fat::test::alignment(PadOverAlign(Malloc)) }
    #[cfg(feature = "libc")] #[test] fn fat_edge_case_sizes()    { fat::test::edge_case_sizes(PadOverAlign(Malloc)) }
    #[cfg(feature = "libc")] #[test] fn fat_realloc()            { fat::test::realloc_preserves(PadOverAlign(Malloc)) }
    #[cfg(feature = "libc")] #[test] fn fat_zeroed()             { fat::test::zeroed_alloc(PadOverAlign(Malloc)) }
    #[cfg(feature = "libc")] #[test] fn fat_zst_support()        { fat::test::zst_supported_accurate(PadOverAlign(Malloc)) }
    #[cfg(feature = "libc")] #[test] fn fat_narrow_heap()        { fat::test::realloc_preserves(PadOverAlign(ByteAligned(Malloc))) }

    #[cfg(feature = "libc")] #[test] fn threads() {
        let a = PadOverAlign(Malloc);
        std::thread::scope(|s| {
            for t in 0 .. 4u8 {
                s.spawn(move || {
                    for i in 0 .. 100 {
                        let align = Alignment::new(1 << (i % 10)).unwrap();
                        let p = a.allocate(i * 3, align, true).unwrap();
                        bytes(p, i * 3).fill(t);
                        // SAFETY: ✔️ `p` is live with `i * 3` bytes
                        let p = unsafe { a.resize(Some(p), i * 3, i * 5, ALIGN_WORD, true) }.unwrap();
                        assert!(bytes(p, i * 5)[..i * 3].iter().all(|b| *b == t));
                        // SAFETY: ✔️ `p` is live
                        unsafe { a.free(p.as_ptr()) };
                    }
                });
            }
        });
    }

    #[cfg(all(feature = "libc", allocator_api = "1.50"))] #[test] fn allocator_api() {
        use alloc::vec::Vec;

        #[derive(Clone, Copy)] #[repr(C, align(4096))] struct Page([u8; 4096]);
        let mut v = Vec::new_in(PadOverAlign(Malloc));
        for i in 0 .. 5 { v.push(Page([i; 4096])) }
        for page in v.iter() { assert!(ALIGN_4096.is_aligned(page as *const Page as usize)) }
        let v2 = v.clone();
        assert_eq!(5, v2.len());
    }
}
