//! [`PadOverAlign`]

mod pad_over_align;     pub use pad_over_align::PadOverAlign;
