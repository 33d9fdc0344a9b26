use bitflags::bitflags;

bitflags! {
    /// Arithmetic status flags, at their architectural EFLAGS bit positions.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct StatusFlags: u16 {
        const CF = 1 << 0;
        const PF = 1 << 2;
        const AF = 1 << 4;
        const ZF = 1 << 6;
        const SF = 1 << 7;
        const OF = 1 << 11;
    }
}

impl StatusFlags {
    /// All six status bits.
    pub const STATUS: Self = Self::all();

    /// Lowest set flag, if any.
    pub fn lowest(self) -> Option<Self> {
        let bits = self.bits();
        if bits == 0 {
            return None;
        }
        Some(Self::from_bits_retain(bits & bits.wrapping_neg()))
    }

    /// Short architectural name of a single flag (`"CF"`, `"ZF"`, ...).
    pub fn flag_name(self) -> Option<&'static str> {
        self.iter_names()
            .next()
            .filter(|_| self.bits().count_ones() == 1)
            .map(|(name, _)| name)
    }
}
