#![cfg(feature = "libc")]
//! [`Malloc`]
//!
//! | Rust                                      | C                     |
//! | ------------------------------------------| ----------------------|
//! | [`thin::Alloc::alloc_uninit`]             | [`malloc`](https://en.cppreference.com/w/c/memory/malloc)
//! | [`thin::Alloc::alloc_zeroed`]             | [`calloc`](https://en.cppreference.com/w/c/memory/calloc)
//! | [`thin::Realloc::realloc_uninit`]         | [`realloc`](https://en.cppreference.com/w/c/memory/realloc)
//! | [`thin::Free::free`]                      | [`free`](https://en.cppreference.com/w/c/memory/free)

#[cfg(doc)] use crate::*;

mod malloc;         pub use malloc::Malloc;
