#![cfg(feature = "libc")]

use overalign::*;
use overalign::allocator::{adapt::PadOverAlign, c::Malloc, debug::Audit};
use overalign::generic::Generic;

use proptest::prelude::*;

use std::mem::MaybeUninit;
use std::ptr::NonNull;

type AllocNN = NonNull<MaybeUninit<u8>>;

fn bytes<'a>(ptr: AllocNN, len: usize) -> &'a mut [u8] {
    // SAFETY: ⚠️ test only: callers pass live, initialized regions of at least `len` bytes
    unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr().cast(), len) }
}

fn alignment() -> impl Strategy<Value = Alignment> {
    (0u32 ..= 12).prop_map(|shift| Alignment::new(1 << shift).unwrap())
}

proptest! {
    #[test]
    fn allocations_are_aligned(size in 0usize .. 5000, align in alignment(), zeroed in any::<bool>()) {
        let a = PadOverAlign(Audit::new(Malloc));
        let p = a.allocate(size, align, zeroed).unwrap();
        prop_assert!(align.at_least_word().is_aligned(p.as_ptr() as usize));
        // SAFETY: ✔️ `p` is live
        let raw = unsafe { a.raw_block_of(p) };
        prop_assert!(raw.as_ptr() as usize + std::mem::size_of::<usize>() <= p.as_ptr() as usize);
        if zeroed { prop_assert!(bytes(p, size).iter().all(|b| *b == 0)) }
        // SAFETY: ✔️ `p` is live
        unsafe { a.free(p.as_ptr()) };
        prop_assert_eq!(a.live(), 0);
    }

    #[test]
    fn resize_preserves_prefix_and_zeroes_growth(
        old_size in 0usize .. 3000,
        new_size in 0usize .. 3000,
        old_align in alignment(),
        new_align in alignment(),
        fill in 1u8 ..,
    ) {
        let a = PadOverAlign(Audit::new(Malloc));
        let p = a.allocate(old_size, old_align, true).unwrap();
        bytes(p, old_size).fill(fill);

        // SAFETY: ✔️ `p` is live with `old_size` bytes
        let q = unsafe { a.resize(Some(p), old_size, new_size, new_align, true) }.unwrap();
        prop_assert!(new_align.at_least_word().is_aligned(q.as_ptr() as usize));
        let keep = old_size.min(new_size);
        prop_assert!(bytes(q, new_size)[..keep].iter().all(|b| *b == fill));
        prop_assert!(bytes(q, new_size)[keep..].iter().all(|b| *b == 0));
        if new_align > Alignment::WORD { prop_assert_ne!(p, q) }
        prop_assert_eq!(a.live(), 1);

        // SAFETY: ✔️ `q` is live
        unsafe { a.free(q.as_ptr()) };
        prop_assert_eq!(a.live(), 0);
    }

    #[test]
    fn failed_resize_leaves_region_intact(
        size in 1usize .. 512,
        grow in 1024usize .. 1 << 20,
        align in alignment(),
        new_align in alignment(),
    ) {
        let a = PadOverAlign(Audit::with_limit(Malloc, 1024 + 4096 + 8));
        let p = a.allocate(size, align, false).unwrap();
        bytes(p, size).fill(0xC3);
        // SAFETY: ✔️ `p` is live with `size` bytes
        let r = unsafe { a.resize(Some(p), size, grow + 8192, new_align, true) };
        prop_assert_eq!(r, Err(Error::OutOfMemory));
        prop_assert_eq!(a.live(), 1);
        prop_assert!(bytes(p, size).iter().all(|b| *b == 0xC3));
        // SAFETY: ✔️ `p` is still live
        unsafe { a.free(p.as_ptr()) };
        prop_assert_eq!(a.live(), 0);
    }

    #[test]
    fn generic_alignment_is_normalized(size in 0usize .. 1000, align in 0usize .. 5000) {
        let a = PadOverAlign(Malloc);
        let r = Generic::alloc(&a, size, align).unwrap();
        let expected = Alignment::normalize(align).unwrap();
        prop_assert!(expected >= Alignment::WORD);
        prop_assert!(expected.as_usize() >= align);
        prop_assert!(expected.is_aligned(r.cast::<u8>().as_ptr() as usize));
        prop_assert_eq!(r.len(), size);
        // SAFETY: ✔️ `r` is live
        unsafe { Generic::free(&a, r.cast().as_ptr()) }.unwrap();
    }

    #[test]
    fn unrelated_regions_survive_frees(sizes in proptest::collection::vec((0usize .. 300, alignment()), 1 .. 32)) {
        let a = PadOverAlign(Audit::new(Malloc));
        let regions = sizes.iter().enumerate().map(|(i, &(size, align))| {
            let p = a.allocate(size, align, false).unwrap();
            bytes(p, size).fill(i as u8);
            (p, size)
        }).collect::<Vec<_>>();

        for (p, _) in regions.iter().step_by(2) {
            // SAFETY: ✔️ each even region is live, and freed exactly once
            unsafe { a.free(p.as_ptr()) };
        }
        for (i, (p, size)) in regions.iter().enumerate().skip(1).step_by(2) {
            prop_assert!(bytes(*p, *size).iter().all(|b| *b == i as u8));
            // SAFETY: ✔️ each odd region is live, and freed exactly once
            unsafe { a.free(p.as_ptr()) };
        }
        prop_assert_eq!(a.live(), 0);
    }
}
