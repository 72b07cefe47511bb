//! [`ARegion`]: an owning, zero-initialized, aligned byte buffer over any [`Generic`] allocator

use crate::*;
use crate::generic::*;

use bytemuck::{Pod, PodCastError};

use core::fmt::{self, Debug, Formatter};
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;



/// An owned region of `len` zero-initialized (or since written) bytes, aligned to [`align`](Self::align).
///
/// Every byte is initialized ([`Generic::alloc`] and [`Generic::resize`] zero), so safe byte access is sound.
/// Sufficiently aligned regions can be viewed as slices of any [`Pod`] type via [`cast_slice`](Self::cast_slice).
///
/// ## Examples
/// ```
/// # #[cfg(feature = "libc")] {
/// use overalign::{allocator::{adapt::PadOverAlign, c::Malloc}, region::ARegion};
/// let mut r = ARegion::new(PadOverAlign(Malloc), 64, 64).unwrap();
/// assert_eq!(r.as_ptr() as usize % 64, 0);
/// r.cast_slice_mut::<u32>().unwrap()[3] = 42;
/// r.resize(128, 4096).unwrap();
/// assert_eq!(r.as_ptr() as usize % 4096, 0);
/// assert_eq!(r.cast_slice::<u32>().unwrap()[3], 42);
/// assert_eq!(r.cast_slice::<u32>().unwrap()[31], 0);
/// # }
/// ```
pub struct ARegion<A: Generic> {
    allocator:  A,
    data:       NonNull<u8>,
    len:        usize,
    align:      Alignment,
}

// SAFETY: ✔️ `ARegion` exclusively owns plain bytes, so only `A` matters
unsafe impl<A: Generic + Send> Send for ARegion<A> {}
// SAFETY: ✔️ `ARegion` exclusively owns plain bytes, so only `A` matters
unsafe impl<A: Generic + Sync> Sync for ARegion<A> {}

impl<A: Generic> Drop for ARegion<A> {
    fn drop(&mut self) {
        // SAFETY: ✔️ we previously allocated `self.data` with `self.allocator` and will never access that region again
        let result = unsafe { self.allocator.free(self.data.as_ptr()) };
        debug_assert!(result.is_ok(), "freeing {self:?} failed: {result:?}");
    }
}

impl<A: Generic> ARegion<A> {
    /// Allocate `len` zeroed bytes from `allocator`, aligned to <code>[Alignment::normalize]\(align\)</code>.
    ///
    /// ## Failure Modes
    /// *   <code>[Err]\([Error::InvalidArgument]\)</code> if `align` can't be normalized
    /// *   <code>[Err]\([Error::OutOfMemory]\)</code> when out of memory
    #[track_caller] pub fn new(allocator: A, len: usize, align: usize) -> Result<Self, Error> {
        let align = Alignment::normalize(align).ok_or(Error::InvalidArgument)?;
        let data = allocator.alloc(len, align.as_usize())?;
        Ok(Self { allocator, data: data.cast(), len, align })
    }

    /// Resize to `new_len` bytes aligned to <code>[Alignment::normalize]\(new_align\)</code>.
    ///
    /// The first `min(len, new_len)` bytes are preserved, and any growth is zeroed.
    /// On error, `self` is unchanged.
    #[track_caller] pub fn resize(&mut self, new_len: usize, new_align: usize) -> Result<(), Error> {
        let align = Alignment::normalize(new_align).ok_or(Error::InvalidArgument)?;
        // SAFETY: ✔️ `self.data` is live with `self.len` bytes, and is replaced by the result on success
        let data = unsafe { self.allocator.resize(self.data.as_ptr(), self.len, new_len, align.as_usize()) }?;
        self.data   = data.cast();
        self.len    = new_len;
        self.align  = align;
        Ok(())
    }

    /// The [`Generic`] allocator this region belongs to.
    pub fn allocator(this: &Self) -> &A { &this.allocator }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// The alignment the region is guaranteed to start at.
    pub fn align(&self) -> Alignment { self.align }

    /// Never null, even when empty.
    pub fn as_ptr(&self) -> *const u8 { self.data.as_ptr() }
    pub fn as_mut_ptr(&mut self) -> *mut u8 { self.data.as_ptr() }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: ✔️ `self.data[..self.len]` is live, initialized, and exclusively owned by `self`
        unsafe { core::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: ✔️ `self.data[..self.len]` is live, initialized, and exclusively owned by `self`
        unsafe { core::slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    /// View the region as `[T]`.
    ///
    /// Succeeds whenever `align_of::<T>() <= self.align()` and `len` is a multiple of `size_of::<T>()`.
    pub fn cast_slice<T: Pod>(&self) -> Result<&[T], PodCastError> { bytemuck::try_cast_slice(self.as_bytes()) }

    /// View the region as `[T]`, mutably.
    ///
    /// Succeeds whenever `align_of::<T>() <= self.align()` and `len` is a multiple of `size_of::<T>()`.
    pub fn cast_slice_mut<T: Pod>(&mut self) -> Result<&mut [T], PodCastError> { bytemuck::try_cast_slice_mut(self.as_bytes_mut()) }
}

impl<A: Generic> Deref for ARegion<A> {
    type Target = [u8];
    fn deref(&self) -> &[u8] { self.as_bytes() }
}

impl<A: Generic> DerefMut for ARegion<A> {
    fn deref_mut(&mut self) -> &mut [u8] { self.as_bytes_mut() }
}

impl<A: Generic> Debug for ARegion<A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ARegion").field("data", &self.data).field("len", &self.len).field("align", &self.align).finish()
    }
}



#[test] fn null() {
    use crate::allocator::{adapt::PadOverAlign, debug::Null};
    assert_eq!(Error::OutOfMemory,      ARegion::new(PadOverAlign(Null), 0, 0).unwrap_err());
    assert_eq!(Error::InvalidArgument,  ARegion::new(PadOverAlign(Null), 0, usize::MAX).unwrap_err());
}

#[cfg(feature = "libc")] #[test] fn lifecycle() {
    use crate::allocator::{adapt::PadOverAlign, c::Malloc, debug::Audit};

    let alloc = PadOverAlign(Audit::new(Malloc));
    {
        let mut r = ARegion::new(&alloc, 10, 32).unwrap();
        assert_eq!(alloc.live(), 1);
        assert_eq!(r.len(), 10);
        assert_eq!(r.align(), ALIGN_32);
        assert!(ALIGN_32.is_aligned(r.as_ptr() as usize));
        assert!(r.iter().all(|b| *b == 0));
        r.copy_from_slice(b"overalign!");

        r.resize(1000, 0).unwrap();
        assert_eq!(r.align(), ALIGN_WORD);
        assert_eq!(&r[..10], b"overalign!");
        assert!(r[10..].iter().all(|b| *b == 0));

        assert_eq!(Error::InvalidArgument, r.resize(5, usize::MAX).unwrap_err());
        assert_eq!(r.len(), 1000);

        r.resize(0, 0).unwrap();
        assert!(r.is_empty());
        assert!(!r.as_ptr().is_null());
        assert_eq!(alloc.live(), 1);
    }
    assert_eq!(alloc.live(), 0);
}

#[cfg(feature = "libc")] #[test] fn failed_resize_is_harmless() {
    use crate::allocator::{adapt::PadOverAlign, c::Malloc, debug::Audit};

    let alloc = PadOverAlign(Audit::with_limit(Malloc, 1024));
    let mut r = ARegion::new(&alloc, 100, 16).unwrap();
    r.fill(0x11);
    assert_eq!(Error::OutOfMemory, r.resize(4096, 16).unwrap_err());
    assert_eq!(Error::OutOfMemory, r.resize(4096, 0).unwrap_err());
    assert_eq!(r.len(), 100);
    assert_eq!(r.align(), ALIGN_16);
    assert!(r.iter().all(|b| *b == 0x11));
    drop(r);
    assert_eq!(alloc.live(), 0);
}

#[cfg(feature = "libc")] #[test] fn cast_slice() {
    use crate::allocator::{adapt::PadOverAlign, c::Malloc};

    let mut r = ARegion::new(PadOverAlign(Malloc), 64, 64).unwrap();
    r.cast_slice_mut::<u64>().unwrap()[7] = u64::MAX;
    assert_eq!(r.cast_slice::<u64>().unwrap().len(), 8);
    assert_eq!(r.cast_slice::<u128>().unwrap().len(), 4);
    assert_eq!(r[63], 0xFF);

    r.resize(60, 64).unwrap();
    assert_eq!(r.cast_slice::<u64>().unwrap_err(), PodCastError::OutputSliceWouldHaveSlop);
    assert_eq!(r.cast_slice::<u32>().unwrap().len(), 15);
}
