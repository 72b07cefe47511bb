//! Allocator traits, from the primitive heap ([`thin`]) up to the mode-based [`generic`] interface

pub mod meta;
pub mod thin;
pub mod fat;
pub mod generic;
