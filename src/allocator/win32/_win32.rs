#![cfg(all(target_os = "windows", feature = "win32"))]
//! [`ProcessHeap`]
//!
//! | Rust                                      | Win32 |
//! | ------------------------------------------| ------|
//! | [`thin::Alloc::alloc_uninit`]             | <code>[HeapAlloc](https://learn.microsoft.com/en-us/windows/win32/api/heapapi/nf-heapapi-heapalloc)\(GetProcessHeap\(\), 0, size\)</code>
//! | [`thin::Alloc::alloc_zeroed`]             | <code>[HeapAlloc](https://learn.microsoft.com/en-us/windows/win32/api/heapapi/nf-heapapi-heapalloc)\(GetProcessHeap\(\), HEAP_ZERO_MEMORY, size\)</code>
//! | [`thin::Realloc::realloc_uninit`]         | <code>[HeapReAlloc](https://learn.microsoft.com/en-us/windows/win32/api/heapapi/nf-heapapi-heaprealloc)\(GetProcessHeap\(\), 0, ptr, size\)</code>
//! | [`thin::Free::free`]                      | <code>[HeapFree](https://learn.microsoft.com/en-us/windows/win32/api/heapapi/nf-heapapi-heapfree)\(GetProcessHeap\(\), 0, ptr\)</code>

#[cfg(doc)] use crate::*;

mod heap;               pub use heap::ProcessHeap;

/// | Arch      | Value |
/// | ----------| -----:|
/// | i686      |  8    |
/// | x86_64    | 16    |
const MEMORY_ALLOCATION_ALIGNMENT : crate::Alignment = crate::Alignment::constant(winapi::um::winnt::MEMORY_ALLOCATION_ALIGNMENT);
