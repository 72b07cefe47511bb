#![feature(allocator_api)]

use core::alloc::{AllocError, Allocator, Layout};
use core::ptr::NonNull;

struct Probe;

unsafe impl Allocator for Probe {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<[u8]>, AllocError> { Err(AllocError) }
    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
    fn allocate_zeroed(&self, _layout: Layout) -> Result<NonNull<[u8]>, AllocError> { Err(AllocError) }
    unsafe fn grow(&self, _ptr: NonNull<u8>, _old: Layout, _new: Layout) -> Result<NonNull<[u8]>, AllocError> { Err(AllocError) }
    unsafe fn grow_zeroed(&self, _ptr: NonNull<u8>, _old: Layout, _new: Layout) -> Result<NonNull<[u8]>, AllocError> { Err(AllocError) }
    unsafe fn shrink(&self, _ptr: NonNull<u8>, _old: Layout, _new: Layout) -> Result<NonNull<[u8]>, AllocError> { Err(AllocError) }
}
