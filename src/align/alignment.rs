use crate::*;

#[cfg(doc)] use core::alloc::*;
use core::alloc::Layout;
use core::fmt::{self, Debug, Formatter};
use core::mem::{align_of, size_of};
use core::num::{NonZeroUsize, TryFromIntError};



/// A valid [`Layout`] alignment (a power of 2)
///
/// Available in named constant forms (`ALIGN_1` ..= `ALIGN_4096`, `ALIGN_WORD`), which have been `#[doc(hidden)]` to avoid spam.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)] #[repr(transparent)] pub struct Alignment(NonZeroUsize);
const _ : () = assert!(align_of::<Alignment>() == align_of::<usize>());
const _ : () = assert!(size_of ::<Alignment>() == size_of ::<usize>());

impl Alignment {
    #[track_caller] pub(crate) const fn constant(align: usize) -> Self { match Self::new(align) { Some(a) => a, None => panic!("Alignment::constant(align): invalid constant") } }

    /// Returns [`None`] unless `align` is a valid power of 2 (which also implies nonzero)
    pub const fn new(align: usize) -> Option<Self> {
        // SAFETY: ✔️ just checked `align` is a power of 2
        if align.is_power_of_two() { Some(unsafe { Self::new_unchecked(align) }) } else { None }
    }

    /// Returns the [`Alignment`] of `T`.
    pub const fn of<T>() -> Self {
        // SAFETY: ✔️ Rust alignments are always powers of 2
        unsafe { Self::new_unchecked(align_of::<T>()) }
    }

    /// **Undefined behavior** unless `align` is a valid power of 2 (which also implies nonzero)
    pub const unsafe fn new_unchecked(align: usize) -> Self {
        // SAFETY: ✔️ powers of 2 are nonzero, per fn precondition
        Self(unsafe { NonZeroUsize::new_unchecked(align) })
    }

    /// Normalize an alignment argument of the [`generic`](crate::generic) interface:
    ///
    /// | `align`               | Result |
    /// | ----------------------| -------|
    /// | `0`                   | [`Alignment::WORD`] (the default)
    /// | power of 2            | <code>align.[max](Self::max)\([WORD](Self::WORD)\)</code>
    /// | anything else         | the next power of 2, raised to [`WORD`](Self::WORD)
    /// | overflows             | [`None`]
    pub fn normalize(align: usize) -> Option<Self> {
        if align == 0 { return Some(Self::WORD) }
        Self::new(align.checked_next_power_of_two()?).map(Self::at_least_word)
    }

    /// Returns the alignment as a [`usize`]
    pub const fn as_usize   (self) -> usize         { self.0.get() }

    /// Returns the alignment as a [`NonZeroUsize`]
    pub const fn as_nonzero (self) -> NonZeroUsize  { self.0 }

    /// The larger of `self` and `other`.
    pub const fn max(self, other: Self) -> Self { if self.as_usize() >= other.as_usize() { self } else { other } }

    /// <code>self.[max](Self::max)\([Alignment::WORD]\)</code> - no allocation made by [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) is aligned to less.
    pub const fn at_least_word(self) -> Self { self.max(Self::WORD) }

    /// `addr & self.mask() == addr % self`
    pub const fn mask(self) -> usize { self.as_usize() - 1 }

    /// Returns `true` if `addr` is a multiple of `self`.
    pub const fn is_aligned(self, addr: usize) -> bool { addr & self.mask() == 0 }

    /// Round `addr` up to the next multiple of `self`, or [`None`] on overflow.
    pub const fn align_up(self, addr: usize) -> Option<usize> {
        match addr.checked_add(self.mask()) {
            Some(addr)  => Some(addr & !self.mask()),
            None        => None,
        }
    }

    /// Minimum representable alignment (e.g. `1`)
    pub const MIN : Alignment = ALIGN_1;

    /// Alignment of a machine word (a pointer.)  This is the floor of every [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) allocation, as it keeps the back-pointer word naturally aligned.
    pub const WORD : Alignment = Alignment::of::<*mut u8>();

    /// Maximum representable alignment
    ///
    /// | Bits  | MAX                           |
    /// | ------| ------------------------------|
    /// | 16    | 2<sup>15</sup> B = 32 KiB     |
    /// | 32    | 2<sup>31</sup> B = 2 GiB      |
    /// | 64    | 2<sup>63</sup> B = 8 EiB      |
    pub const MAX : Alignment = Alignment::constant(usize::MAX/2+1);
}

impl From<Layout   > for Alignment      { fn from(value: Layout   ) -> Self { Self::new(value.align()).unwrap_or(Self::MAX) } }
impl From<Alignment> for usize          { fn from(align: Alignment) -> Self { align.as_usize()   } }
impl From<Alignment> for NonZeroUsize   { fn from(align: Alignment) -> Self { align.as_nonzero() } }

fn try_from_int_error() -> TryFromIntError {
    // SAFETY: ✔️ 0 is never a valid NonZeroUsize
    unsafe { NonZeroUsize::try_from(0).unwrap_err_unchecked() }
}
impl TryFrom<usize          > for Alignment { fn try_from(align: usize          ) -> Result<Self, Self::Error> { Self::new(align      ).ok_or_else(try_from_int_error) } type Error = TryFromIntError; }
impl TryFrom<NonZeroUsize   > for Alignment { fn try_from(align: NonZeroUsize   ) -> Result<Self, Self::Error> { Self::new(align.get()).ok_or_else(try_from_int_error) } type Error = TryFromIntError; }

impl Debug for Alignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut v = self.as_usize();
        for unit in ["B", "KiB", "MiB", "GiB", "TiB", "PiB"] {
            if v <= 8192 { return write!(f, "{v} {unit}") }
            v >>= 10;
        }
        write!(f, "{v} EiB")
    }
}



#[test] fn normalize() {
    assert_eq!(Alignment::normalize(0),     Some(Alignment::WORD));
    assert_eq!(Alignment::normalize(1),     Some(Alignment::WORD));
    assert_eq!(Alignment::normalize(64),    Some(ALIGN_64));
    assert_eq!(Alignment::normalize(48),    Some(ALIGN_64));
    assert_eq!(Alignment::normalize(usize::MAX), None);
    assert_eq!(Alignment::normalize(usize::MAX/2+2), None);
}

#[test] fn align_up() {
    assert_eq!(ALIGN_64.align_up(0),    Some(0));
    assert_eq!(ALIGN_64.align_up(1),    Some(64));
    assert_eq!(ALIGN_64.align_up(64),   Some(64));
    assert_eq!(ALIGN_64.align_up(65),   Some(128));
    assert_eq!(ALIGN_64.align_up(usize::MAX), None);
    assert!( ALIGN_16.is_aligned(48));
    assert!(!ALIGN_16.is_aligned(40));
}

#[test] fn debug() {
    use alloc::format;
    assert_eq!("16 B",      format!("{:?}", ALIGN_16));
    assert_eq!("4096 B",    format!("{:?}", ALIGN_4096));
    assert_eq!("16 KiB",    format!("{:?}", Alignment::constant(16 << 10)));
}
