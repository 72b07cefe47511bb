//! Allocator implementations: the [`PadOverAlign`](adapt::PadOverAlign) adapter, and primitive heaps for it to wrap

#[path = "adapt/_adapt.rs"  ] pub mod adapt;
#[path = "c/_c.rs"          ] pub mod c;
#[path = "debug/_debug.rs"  ] pub mod debug;
#[path = "win32/_win32.rs"  ] pub mod win32;
