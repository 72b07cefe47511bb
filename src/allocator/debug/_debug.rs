//! [`Audit`], [`Null`]: primitive heaps for testing [`PadOverAlign`](crate::allocator::adapt::PadOverAlign) failure paths

mod audit;  pub use audit::Audit;
mod null;   pub use null::Null;
