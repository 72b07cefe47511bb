use crate::Alignment;



macro_rules! constants {
    ( $($id:ident = $value:expr),* $(,)? ) => {$(
        #[doc(hidden)] pub const $id : Alignment = Alignment::constant($value);
    )*};
}

constants! {
    ALIGN_1 = 1, ALIGN_2 = 2, ALIGN_4 = 4, ALIGN_8 = 8, ALIGN_16 = 16, ALIGN_32 = 32, ALIGN_64 = 64,
    ALIGN_128 = 128, ALIGN_256 = 256, ALIGN_512 = 512, ALIGN_1024 = 1024, ALIGN_2048 = 2048, ALIGN_4096 = 4096,
}

/// The back-pointer floor, <code>[Alignment]::[WORD](Alignment::WORD)</code>
#[doc(hidden)] pub const ALIGN_WORD : Alignment = Alignment::WORD;
