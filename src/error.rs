//! [`Error`], the failure taxonomy shared by [`generic`](crate::generic) and [`PadOverAlign`](crate::allocator::adapt::PadOverAlign)

use core::fmt::{self, Display, Formatter};



/// Why a (re)allocation or query failed.
///
/// Failures are reported once, immediately, and never retried internally.
/// A failed call leaves every previously returned region valid and unmodified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)] pub enum Error {
    /// The primitive heap refused the request, or the padded request size didn't fit in the address space.
    OutOfMemory,

    /// The requested alignment couldn't be normalized to a representable power of two.
    ///
    /// Alignments *below* the word size are never an error - they're raised to the word size.
    InvalidArgument,

    /// The requested [`Mode`](crate::generic::Mode) isn't supported (e.g. [`FreeAll`](crate::generic::Mode::FreeAll) or [`QueryInfo`](crate::generic::Mode::QueryInfo).)
    ModeNotImplemented,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory          => write!(f, "out of memory"),
            Error::InvalidArgument      => write!(f, "invalid argument: alignment can't be represented as a power of two"),
            Error::ModeNotImplemented   => write!(f, "allocator mode not implemented"),
        }
    }
}

#[cfg(feature = "std")] impl std::error::Error for Error {}
#[cfg(allocator_api = "1.50")] impl From<Error> for core::alloc::AllocError { fn from(_: Error) -> Self { core::alloc::AllocError } }



#[test] fn display() {
    use alloc::string::ToString;
    assert_eq!("out of memory",                     Error::OutOfMemory.to_string());
    assert_eq!("allocator mode not implemented",    Error::ModeNotImplemented.to_string());
    assert!(Error::InvalidArgument.to_string().starts_with("invalid argument"));
}
