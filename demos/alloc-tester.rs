extern crate std;

use overalign::*;
use overalign::allocator::*;
use overalign::allocator::adapt::PadOverAlign;



/// Largest alignment [`Test::padded`] bothers probing.
const MAX_PROBE : usize = 1 << 20;

struct Test<A> {
    pub name:   &'static str,
    pub create: fn()->A,
    pub thin:   Option<AlignmentRange>,
    pub padded: Option<AlignmentRange>,
}

#[derive(Clone, Copy, Debug)] struct AlignmentRange {
    pub min: Alignment,
    pub max: Alignment,
}

impl AlignmentRange {
    fn describe(this: Option<Self>) -> String {
        this.map_or_else(String::new, |t| if t.min == t.max { format!("{:?}", t.min) } else { format!("{:?} ..= {:?}", t.min, t.max) })
    }
}

/// The largest power of two dividing every address in `addrs`.
fn common_alignment(addrs: impl Iterator<Item = usize>) -> Alignment {
    let bits = addrs.fold(0, |x, y| x | y);
    Alignment::new(1 << bits.trailing_zeros().min(usize::BITS - 2)).unwrap_or(Alignment::MAX)
}

impl<A: thin::Realloc> Test<A> {
    pub fn new(name: &'static str, create: fn()->A) -> Self {
        Self { name, create, thin: None, padded: None }
    }

    /// Observed alignment of the raw primitive heap, for tiny (min) and large (max) blocks.
    pub fn thin(&mut self) -> &mut Self {
        let mut thin = AlignmentRange { min: Alignment::MAX, max: Alignment::MAX };
        for (dst, min_size) in [(&mut thin.min, 1), (&mut thin.max, 4096)] {
            for _ in 0 .. 100 {
                let alloc = (self.create)();
                let addrs = (0 .. 4096).filter_map(|i| alloc.alloc_uninit(i%16+min_size).ok()).collect::<Vec<_>>();
                let align = common_alignment(addrs.iter().map(|addr| addr.as_ptr() as usize));
                addrs.iter().copied().for_each(|addr| unsafe { alloc.free(addr) });
                *dst = align.min(*dst);
            }
        }
        self.thin = Some(thin);
        self
    }

    /// Observed default alignment of [`PadOverAlign`] (min), and the largest alignment it was able to honor (max).
    pub fn padded(&mut self) -> &mut Self {
        let alloc = PadOverAlign((self.create)());
        let addrs = (0 .. 4096).filter_map(|i| alloc.allocate(i%16+1, ALIGN_1, false).ok()).collect::<Vec<_>>();
        let min = common_alignment(addrs.iter().map(|addr| addr.as_ptr() as usize));
        addrs.iter().for_each(|addr| unsafe { alloc.free(addr.as_ptr()) });

        let mut max = min;
        while let Some(next) = max.as_usize().checked_shl(1).and_then(Alignment::new) {
            if next.as_usize() > MAX_PROBE { break }
            let Ok(addr) = alloc.allocate(1, next, false) else { break };
            let ok = next.is_aligned(addr.as_ptr() as usize);
            unsafe { alloc.free(addr.as_ptr()) };
            if !ok { break }
            max = next;
        }

        self.padded = Some(AlignmentRange { min, max });
        self
    }

    pub fn print(&self) {
        let name    = self.name;
        let thin    = AlignmentRange::describe(self.thin);
        let padded  = AlignmentRange::describe(self.padded);
        println!("{name: <20}{thin: <20}{padded: <20}");
    }
}

fn main() {
    println!("{: <20}{: <20}{: <20}", "",          "thin::Alloc",   "PadOverAlign", );
    println!("{: <20}{: <20}{: <20}", "Allocator", "Alignment",     "Alignment",    );
    println!("{:=<60}", "");
    #[cfg(feature = "libc")]    Test::new("Malloc",             || c::Malloc                        ).thin().padded().print();
    #[cfg(feature = "libc")]    Test::new("Audit<Malloc>",      || debug::Audit::new(c::Malloc)     ).thin().padded().print();
    #[cfg(all(windows, feature = "win32"))] {
        println!();
        println!("win32:");
        Test::new("ProcessHeap",        || win32::ProcessHeap               ).thin().padded().print();
    }
}
