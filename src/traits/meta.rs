//! Metadata traits common to all (de)allocators

use crate::*;

use core::fmt::Debug;



/// Allocator metadata (are ZSTs supported, max allocation size/alignment, error type, etc.)
pub trait Meta {
    /// The error type returned from failed (re)allocation.
    type Error : Debug;

    /// Indicates the maximum alignment this allocator should be expected to provide.
    ///
    /// *   For [`thin`] allocators (primitive heaps) this is a *guarantee* for any block of at least this many bytes:
    ///     blocks are aligned to <code>min(MAX_ALIGN, largest power of 2 &lt;= size)</code>.
    ///     [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) relies on this being at least [`Alignment::WORD`] to resize in place.
    /// *   For [`fat`] allocators, requesting more alignment than this is almost certainly a bug.
    ///
    /// | Platform                      | Common Values for `malloc` and friends    |
    /// | ------------------------------| ------------------------------------------|
    /// | 32&zwj;-&zwj;bit&nbsp;Windows | `MEMORY_ALLOCATION_ALIGNMENT == 8`
    /// | 64&zwj;-&zwj;bit&nbsp;Windows | `MEMORY_ALLOCATION_ALIGNMENT == 16`
    /// | C stdlib                      | <code>[Alignment]::[of](Alignment::of)::&lt;[max_align_t](https://en.cppreference.com/w/c/types/max_align_t)&gt;()</code>
    const MAX_ALIGN : Alignment;

    /// Indicates the maximum size this allocator should be expected to succeed in allocating.
    /// Requesting an allocation larger than this is almost certainly a bug, and may be rejected up front.
    const MAX_SIZE : usize;

    /// Indicates if this allocator supports zero-sized allocations.
    /// While this is nice and Rust-friendly, it may not be supported by C allocators.
    const ZST_SUPPORTED : bool;
}

impl<'a, A: Meta> Meta for &'a A {
    type Error                      = A::Error;
    const MAX_ALIGN     : Alignment = A::MAX_ALIGN;
    const MAX_SIZE      : usize     = A::MAX_SIZE;
    const ZST_SUPPORTED : bool      = A::ZST_SUPPORTED;
}
