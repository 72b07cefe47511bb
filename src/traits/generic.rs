//! A small, closed, mode-based allocation interface: one [`Generic::dispatch`] entry point taking a [`Request`].
//!
//! Callers written against [`Generic`] can swap one conforming allocator for another without caring how it satisfies alignment.
//! The provided verbs ([`Generic::alloc`], [`Generic::resize`], [`Generic::free`], ...) build the [`Request`] and unpack the [`Output`] for you.

use crate::*;

use core::fmt::{self, Debug, Formatter};
use core::ptr::{null_mut, NonNull};



/// Which verb a [`Request`] invokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)] #[repr(u8)] pub enum Mode {
    /// Allocate a zeroed region.
    Alloc,
    /// Allocate a region with unspecified contents.
    AllocNonZeroed,
    /// Free a region (null is a noop.)
    Free,
    /// Free every region the allocator has handed out.
    FreeAll,
    /// Resize a region, zeroing any growth.
    Resize,
    /// Resize a region, leaving any growth unspecified.
    ResizeNonZeroed,
    /// Report which [`Mode`]s are supported.
    QueryFeatures,
    /// Report allocator [`Info`].
    QueryInfo,
}

impl Mode {
    /// Every mode, in declaration order.
    pub const ALL : [Mode; 8] = [Mode::Alloc, Mode::AllocNonZeroed, Mode::Free, Mode::FreeAll, Mode::Resize, Mode::ResizeNonZeroed, Mode::QueryFeatures, Mode::QueryInfo];

    const fn bit(self) -> u8 { 1 << (self as u8) }
}



/// A set of [`Mode`]s, e.g. the answer to [`Mode::QueryFeatures`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)] pub struct ModeSet(u8);

impl ModeSet {
    pub const EMPTY : ModeSet = ModeSet(0);

    pub const fn of(modes: &[Mode]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < modes.len() {
            set = set.with(modes[i]);
            i += 1;
        }
        set
    }

    #[must_use] pub const fn with(self, mode: Mode) -> Self { Self(self.0 | mode.bit()) }
    pub const fn contains(self, mode: Mode) -> bool { self.0 & mode.bit() != 0 }
    pub const fn is_empty(self) -> bool { self.0 == 0 }
    pub fn iter(self) -> impl Iterator<Item = Mode> { Mode::ALL.into_iter().filter(move |m| self.contains(*m)) }
}

impl Debug for ModeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.debug_set().entries(self.iter()).finish() }
}

impl FromIterator<Mode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self { iter.into_iter().fold(Self::EMPTY, Self::with) }
}



/// The arguments of a single [`Generic::dispatch`] call.
///
/// Every verb takes the same arguments, even those it ignores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)] pub struct Request {
    pub mode:       Mode,
    /// Requested size of the (new) region in bytes.
    pub size:       usize,
    /// Requested alignment.  `0` means the default (word) alignment, see [`Alignment::normalize`].
    pub align:      usize,
    /// The existing region for [`Mode::Free`] / [`Mode::Resize`] / [`Mode::ResizeNonZeroed`], or null.
    pub old:        *mut u8,
    /// The size `old` was last (re)allocated with.
    pub old_size:   usize,
}

impl Request {
    /// A request for `mode` with every other argument zeroed / null.
    pub const fn new(mode: Mode) -> Self { Self { mode, size: 0, align: 0, old: null_mut(), old_size: 0 } }
}

/// The answer to [`Mode::QueryInfo`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)] pub struct Info {
    /// The largest alignment the allocator can honor.
    pub max_align:  Alignment,
    /// The largest region the allocator should be expected to succeed in allocating.
    pub max_size:   usize,
}

/// The successful result of a [`Generic::dispatch`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)] pub enum Output {
    /// The (re)allocated region, for [`Mode::Alloc`], [`Mode::AllocNonZeroed`], [`Mode::Resize`], and [`Mode::ResizeNonZeroed`].
    Region(NonNull<[u8]>),
    /// Nothing to report, for [`Mode::Free`] and [`Mode::FreeAll`].
    Done,
    /// The supported modes, for [`Mode::QueryFeatures`].
    Features(ModeSet),
    /// Allocator details, for [`Mode::QueryInfo`].
    Info(Info),
}



/// A mode-based allocator.
///
/// ## Safety
/// *   [`Output::Region`]s must start at a multiple of <code>[Alignment::normalize]\(request.align\)</code> and be valid for `request.size` bytes until freed.
/// *   [`Output::Region`]s must never be null, even for zero sized requests, and must be accepted by [`Mode::Free`] / [`Mode::Resize`].
/// *   [`Mode::Alloc`] regions must be zeroed.  [`Mode::Resize`] must zero <code>old_size .. size</code>.
/// *   Resizes must preserve the first <code>min(old_size, size)</code> bytes.
/// *   Failed resizes must leave `old` valid and unmodified.
/// *   Each mode must answer with the [`Output`] variant documented for it.
pub unsafe trait Generic {
    /// The modes [`dispatch`](Self::dispatch) supports.
    fn features(&self) -> ModeSet;

    /// Perform `request`.
    ///
    /// ### Safety
    /// *   For [`Mode::Free`], [`Mode::Resize`], and [`Mode::ResizeNonZeroed`]: `request.old` must be null, or a live region returned by `self`.
    /// *   `request.old_size` must match the size `request.old` was last (re)allocated with.
    /// *   `request.old` will no longer be accessible after a successful free or resize.
    /// *   For [`Mode::FreeAll`]: every region returned by `self` will no longer be accessible.
    unsafe fn dispatch(&self, request: Request) -> Result<Output, Error>;

    /// Allocate `size` zeroed bytes aligned to <code>[Alignment::normalize]\(align\)</code>.
    fn alloc(&self, size: usize, align: usize) -> Result<NonNull<[u8]>, Error> {
        // SAFETY: ✔️ allocation requests carry no pointers
        let output = unsafe { self.dispatch(Request { size, align, ..Request::new(Mode::Alloc) }) }?;
        Ok(region(Mode::Alloc, output))
    }

    /// Allocate `size` bytes of unspecified contents aligned to <code>[Alignment::normalize]\(align\)</code>.
    fn alloc_non_zeroed(&self, size: usize, align: usize) -> Result<NonNull<[u8]>, Error> {
        // SAFETY: ✔️ allocation requests carry no pointers
        let output = unsafe { self.dispatch(Request { size, align, ..Request::new(Mode::AllocNonZeroed) }) }?;
        Ok(region(Mode::AllocNonZeroed, output))
    }

    /// Resize `old` from `old_size` to `size` bytes aligned to <code>[Alignment::normalize]\(align\)</code>, zeroing any growth.
    ///
    /// ### Safety
    /// See [`dispatch`](Self::dispatch).
    unsafe fn resize(&self, old: *mut u8, old_size: usize, size: usize, align: usize) -> Result<NonNull<[u8]>, Error> {
        // SAFETY: ✔️ same preconditions
        let output = unsafe { self.dispatch(Request { mode: Mode::Resize, size, align, old, old_size }) }?;
        Ok(region(Mode::Resize, output))
    }

    /// Resize `old` from `old_size` to `size` bytes aligned to <code>[Alignment::normalize]\(align\)</code>, leaving any growth unspecified.
    ///
    /// ### Safety
    /// See [`dispatch`](Self::dispatch).
    unsafe fn resize_non_zeroed(&self, old: *mut u8, old_size: usize, size: usize, align: usize) -> Result<NonNull<[u8]>, Error> {
        // SAFETY: ✔️ same preconditions
        let output = unsafe { self.dispatch(Request { mode: Mode::ResizeNonZeroed, size, align, old, old_size }) }?;
        Ok(region(Mode::ResizeNonZeroed, output))
    }

    /// Free `old` (a noop if null.)
    ///
    /// ### Safety
    /// See [`dispatch`](Self::dispatch).
    unsafe fn free(&self, old: *mut u8) -> Result<(), Error> {
        // SAFETY: ✔️ same preconditions
        let output = unsafe { self.dispatch(Request { old, ..Request::new(Mode::Free) }) }?;
        done(Mode::Free, output)
    }

    /// Free every region `self` has handed out.
    ///
    /// ### Safety
    /// See [`dispatch`](Self::dispatch).
    unsafe fn free_all(&self) -> Result<(), Error> {
        // SAFETY: ✔️ same preconditions
        let output = unsafe { self.dispatch(Request::new(Mode::FreeAll)) }?;
        done(Mode::FreeAll, output)
    }

    fn query_features(&self) -> Result<ModeSet, Error> {
        // SAFETY: ✔️ queries carry no pointers
        match unsafe { self.dispatch(Request::new(Mode::QueryFeatures)) }? {
            Output::Features(features)  => Ok(features),
            other                       => bug::mismatched_output(Mode::QueryFeatures, other),
        }
    }

    fn query_info(&self) -> Result<Info, Error> {
        // SAFETY: ✔️ queries carry no pointers
        match unsafe { self.dispatch(Request::new(Mode::QueryInfo)) }? {
            Output::Info(info)  => Ok(info),
            other               => bug::mismatched_output(Mode::QueryInfo, other),
        }
    }
}

#[track_caller] fn region(mode: Mode, output: Output) -> NonNull<[u8]> {
    match output {
        Output::Region(region)  => region,
        other                   => bug::mismatched_output(mode, other),
    }
}

#[track_caller] fn done(mode: Mode, output: Output) -> Result<(), Error> {
    match output {
        Output::Done    => Ok(()),
        other           => bug::mismatched_output(mode, other),
    }
}

#[allow(clippy::undocumented_unsafe_blocks)] // SAFETY: ✔️ same trait, same prereqs
unsafe impl<'a, G: Generic> Generic for &'a G {
    fn features(&self) -> ModeSet { G::features(self) }
    unsafe fn dispatch(&self, request: Request) -> Result<Output, Error> { unsafe { G::dispatch(self, request) } }
}



#[test] fn mode_set() {
    let set = ModeSet::of(&[Mode::Free, Mode::Alloc]);
    assert!(set.contains(Mode::Alloc));
    assert!(set.contains(Mode::Free));
    assert!(!set.contains(Mode::FreeAll));
    assert!(!set.is_empty());
    assert!(ModeSet::EMPTY.is_empty());
    assert_eq!(set, [Mode::Alloc, Mode::Free].into_iter().collect());
    assert_eq!(set.with(Mode::QueryInfo).iter().count(), 3);
    assert_eq!(ModeSet::of(&Mode::ALL).iter().collect::<alloc::vec::Vec<_>>(), Mode::ALL);
}

#[test] fn mode_set_debug() {
    use alloc::format;
    assert_eq!("{}",                        format!("{:?}", ModeSet::EMPTY));
    assert_eq!("{Alloc, Free}",             format!("{:?}", ModeSet::of(&[Mode::Free, Mode::Alloc])));
    assert_eq!("{FreeAll, QueryInfo}",      format!("{:?}", ModeSet::EMPTY.with(Mode::QueryInfo).with(Mode::FreeAll)));
}

#[test] fn request_new() {
    let r = Request::new(Mode::QueryFeatures);
    assert_eq!(r.mode, Mode::QueryFeatures);
    assert_eq!((r.size, r.align, r.old_size), (0, 0, 0));
    assert!(r.old.is_null());
}
