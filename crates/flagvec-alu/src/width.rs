use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// Operand size of a binary instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    pub const ALL: [Width; 4] = [Width::W8, Width::W16, Width::W32, Width::W64];

    pub fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Width::W8),
            16 => Some(Width::W16),
            32 => Some(Width::W32),
            64 => Some(Width::W64),
            _ => None,
        }
    }

    /// All-ones value of this width, which is also its unsigned maximum.
    pub fn mask(self) -> u64 {
        if self == Width::W64 {
            u64::MAX
        } else {
            (1u64 << self.bits()) - 1
        }
    }

    pub fn sign_bit(self) -> u64 {
        1u64 << (self.bits() - 1)
    }

    pub fn truncate(self, value: u64) -> u64 {
        value & self.mask()
    }

    /// Sign-extends the low `from` bits of `value` to this width.
    pub fn sign_extend_from(self, value: u64, from: Width) -> u64 {
        let shift = 64 - from.bits();
        let wide = ((value << shift) as i64 >> shift) as u64;
        self.truncate(wide)
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

impl FromStr for Width {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('u')
            .or_else(|| trimmed.strip_prefix('U'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(Width::from_bits)
            .ok_or_else(|| ParseError::UnsupportedWidth(s.to_string()))
    }
}
