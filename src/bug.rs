//! Bug reporting panics

use crate::generic::{Mode, Output};

use core::ffi::c_void;
use core::mem::MaybeUninit;
use core::ptr::NonNull;



pub trait AsPtr : Copy                  { fn as_ptr(self) -> *mut c_void; }
impl AsPtr for *mut    MaybeUninit<u8>  { fn as_ptr(self) -> *mut c_void { self.cast() } }
impl AsPtr for NonNull<MaybeUninit<u8>> { fn as_ptr(self) -> *mut c_void { self.as_ptr().cast() } }

/// Report bugs that indicate Undefined Behavior
pub mod ub {
    use super::*;

    #[track_caller] #[inline(never)] pub fn corrupt_back_pointer(ptr: impl AsPtr, raw: impl AsPtr) -> ! {
        let ptr = ptr.as_ptr();
        let raw = raw.as_ptr();
        panic!("bug: undefined behavior: the back-pointer preceding {ptr:?} reads {raw:?}, which can't be the start of its block (the region was never allocated by this allocator, was already freed, or the heap is corrupt)");
    }

    #[track_caller] #[inline(never)] pub fn freed_ptr_for_allocator(ptr: impl AsPtr) -> ! {
        let ptr = ptr.as_ptr();
        panic!("bug: undefined behavior: {ptr:?} belongs to this allocator, but it was already freed");
    }

    #[track_caller] #[inline(never)] pub fn free_failed(ptr: impl AsPtr) -> ! {
        let ptr = ptr.as_ptr();
        panic!("bug: undefined behavior: freeing {ptr:?} failed (typically this means the pointer didn't belong to the allocator, or there was heap corruption)");
    }
}

/// A [`Generic`](crate::generic::Generic) implementation answered `mode` with the wrong kind of [`Output`].
#[track_caller] #[inline(never)] pub fn mismatched_output(mode: Mode, output: Output) -> ! {
    panic!("bug: {mode:?} was answered with {output:?}");
}
