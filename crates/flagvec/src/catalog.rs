//! Instruction families the generator knows how to cover.

use flagvec_alu::{StatusFlags, Width};
use serde::Serialize;

const LOGIC_FLAGS: StatusFlags = StatusFlags::PF.union(StatusFlags::ZF).union(StatusFlags::SF);
const ARITH_FLAGS: StatusFlags = StatusFlags::STATUS;
const BIT_TEST_FLAGS: StatusFlags = StatusFlags::CF;

const ALL_WIDTHS: &[Width] = &[Width::W8, Width::W16, Width::W32, Width::W64];
const NO_BYTE_WIDTHS: &[Width] = &[Width::W16, Width::W32, Width::W64];

/// Static description of one instruction family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrDescriptor {
    pub name: &'static str,
    pub widths: &'static [Width],
    /// Flags the coverage planner tries to show both set and clear.
    pub active_flags: StatusFlags,
    /// Emits a second row per slot with CF forced in.
    pub carry_in: bool,
    /// Also covers the `r/m, imm8` (and for 64-bit `r/m, imm32`) encodings.
    pub imm_variants: bool,
}

impl InstrDescriptor {
    pub fn active_flag_count(&self) -> u32 {
        self.active_flags.bits().count_ones()
    }

    pub fn carry_factor(&self) -> usize {
        if self.carry_in {
            2
        } else {
            1
        }
    }
}

/// The binary instructions covered by the generated tables, in emission order.
pub fn x86_catalog() -> Vec<InstrDescriptor> {
    let logic = |name| InstrDescriptor {
        name,
        widths: ALL_WIDTHS,
        active_flags: LOGIC_FLAGS,
        carry_in: false,
        imm_variants: true,
    };
    let arith = |name, carry_in| InstrDescriptor {
        name,
        widths: ALL_WIDTHS,
        active_flags: ARITH_FLAGS,
        carry_in,
        imm_variants: true,
    };
    let bit_test = |name| InstrDescriptor {
        name,
        widths: NO_BYTE_WIDTHS,
        active_flags: BIT_TEST_FLAGS,
        carry_in: false,
        imm_variants: false,
    };

    vec![
        logic("and"),
        logic("or"),
        logic("xor"),
        logic("test"),
        arith("add", false),
        arith("adc", true),
        arith("sub", false),
        arith("sbb", true),
        arith("cmp", false),
        bit_test("bt"),
        bit_test("btc"),
        bit_test("btr"),
        bit_test("bts"),
    ]
}

/// How the second operand is produced for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OuterVariant {
    /// Full register-width operand.
    Native,
    /// 8-bit immediate sign-extended to the operand width.
    Imm8,
    /// 32-bit immediate sign-extended to 64 bits.
    Imm32,
}

impl OuterVariant {
    /// Runs to perform for one (instruction, width) table, in order.
    pub fn variants_for(width: Width, imm_variants: bool) -> &'static [OuterVariant] {
        if !imm_variants {
            return &[OuterVariant::Native];
        }
        match width {
            Width::W8 => &[OuterVariant::Native],
            Width::W16 | Width::W32 => &[OuterVariant::Native, OuterVariant::Imm8],
            Width::W64 => &[OuterVariant::Native, OuterVariant::Imm8, OuterVariant::Imm32],
        }
    }

    pub fn imm_bits(self) -> Option<u32> {
        match self {
            OuterVariant::Native => None,
            OuterVariant::Imm8 => Some(8),
            OuterVariant::Imm32 => Some(32),
        }
    }
}
